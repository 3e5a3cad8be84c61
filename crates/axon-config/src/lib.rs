#![allow(clippy::must_use_candidate)]

mod env;
mod loader;
pub mod provider;
pub mod telemetry;

use indexmap::IndexMap;
use serde::Deserialize;

pub use provider::{AllowedRequests, NetworkConfig, ProviderConfig, RequestKind};
pub use telemetry::{LogFormat, TelemetryConfig};

/// Top-level axon configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Provider configurations keyed by name; the key is stamped on every response
    #[serde(default)]
    pub providers: IndexMap<String, ProviderConfig>,
}
