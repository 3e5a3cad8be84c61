use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then parses and
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a placeholder cannot be
    /// resolved, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml_str(&raw)
    }

    /// Parse configuration from TOML text, expanding placeholders first
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`], minus file access
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if no provider is configured or a provider has an
    /// unusable network or header setting
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.providers.is_empty() {
            anyhow::bail!("at least one provider must be configured");
        }

        for (name, provider) in &self.providers {
            if provider.network.stream_buffer_size == 0 {
                anyhow::bail!("provider '{name}': network.stream_buffer_size must be greater than 0");
            }

            provider
                .network
                .request_timeout_duration()
                .map_err(|e| anyhow::anyhow!("provider '{name}': network.request_timeout: {e}"))?;
            provider
                .network
                .stream_read_timeout_duration()
                .map_err(|e| anyhow::anyhow!("provider '{name}': network.stream_read_timeout: {e}"))?;

            for (header, value) in &provider.extra_headers {
                http::HeaderName::from_bytes(header.as_bytes())
                    .map_err(|e| anyhow::anyhow!("provider '{name}': invalid header name '{header}': {e}"))?;
                http::HeaderValue::from_str(value)
                    .map_err(|e| anyhow::anyhow!("provider '{name}': invalid value for header '{header}': {e}"))?;
            }
        }

        Ok(())
    }
}
