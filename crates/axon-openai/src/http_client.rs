use std::time::Duration;

use axon_config::NetworkConfig;
use reqwest::{Client, ClientBuilder};

/// Clients for buffered and streaming requests
///
/// Buffered calls get a whole-request timeout. Streams can run for minutes,
/// so their client only limits connect time and the gap between reads.
#[derive(Debug, Clone)]
pub(crate) struct HttpClients {
    pub buffered: Client,
    pub streaming: Client,
}

pub(crate) fn build(network: &NetworkConfig) -> anyhow::Result<HttpClients> {
    let request_timeout = network.request_timeout_duration()?;

    let buffered = base(request_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

    let mut streaming = base(request_timeout);
    if let Some(read_timeout) = network.stream_read_timeout_duration()? {
        streaming = streaming.read_timeout(read_timeout);
    }
    let streaming = streaming
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build streaming HTTP client: {e}"))?;

    Ok(HttpClients { buffered, streaming })
}

fn base(connect_timeout: Duration) -> ClientBuilder {
    Client::builder()
        .connect_timeout(connect_timeout)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_defaults() {
        assert!(build(&NetworkConfig::default()).is_ok());
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let network = NetworkConfig {
            stream_read_timeout: Some("eventually".to_owned()),
            ..Default::default()
        };
        assert!(build(&network).is_err());
    }
}
