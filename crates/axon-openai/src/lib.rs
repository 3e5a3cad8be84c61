//! `OpenAI` adapter for axon
//!
//! Translates the unified request model into the vendor's JSON and
//! multipart payloads, and normalizes buffered and SSE responses back into
//! [`axon_core::UnifiedResponse`] values and stream events.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod alias;
mod error;
pub mod format;
mod http_client;
pub mod image;
mod normalize;
mod provider;
mod sse;
mod stream;

pub use provider::OpenAiProvider;
