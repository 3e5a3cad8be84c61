//! Provider configuration pointed at the mock backend

use axon_config::{AllowedRequests, ProviderConfig};
use axon_openai::OpenAiProvider;
use secrecy::SecretString;

/// Builder for test provider configurations
pub struct ProviderBuilder {
    config: ProviderConfig,
}

impl ProviderBuilder {
    /// Configuration with a test key and the given base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            config: ProviderConfig {
                api_key: Some(SecretString::from("test-key")),
                base_url: base_url.parse().expect("valid URL"),
                ..ProviderConfig::default()
            },
        }
    }

    /// Drop the configured key
    pub fn without_api_key(mut self) -> Self {
        self.config.api_key = None;
        self
    }

    /// Echo the decoded vendor body on buffered responses
    pub fn with_raw_response(mut self) -> Self {
        self.config.send_back_raw_response = true;
        self
    }

    /// Add a header sent on every request
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.config.extra_headers.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Replace the operation allow-list
    pub fn with_allowed(mut self, allowed: AllowedRequests) -> Self {
        self.config.allowed_requests = allowed;
        self
    }

    /// Bound the stream event channel
    pub fn with_buffer(mut self, size: usize) -> Self {
        self.config.network.stream_buffer_size = size;
        self
    }

    pub fn config(self) -> ProviderConfig {
        self.config
    }

    /// Build a provider registered under the `openai` key
    pub fn build(self) -> OpenAiProvider {
        OpenAiProvider::new("openai", self.config).expect("valid provider config")
    }
}
