//! Shared model for axon provider adapters
//!
//! Defines the provider-agnostic request/response types, the unified error,
//! the per-request context and the [`Provider`] trait every adapter
//! implements.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod context;
pub mod error;
pub mod hooks;
pub mod provider;
pub mod types;

pub use context::RequestContext;
pub use error::{ErrorField, ErrorKind, UnifiedError};
pub use hooks::{NoopHooks, Outcome, PostHookRunner};
pub use provider::{EventStream, Provider};
