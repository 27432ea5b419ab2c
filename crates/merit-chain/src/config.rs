use backoff::ExponentialBackoff;
use std::time::Duration;
use url::Url;

/// Configuration for the chain adapters
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of the authoritative node
    pub rpc_url: Url,

    /// Per-request timeout applied to every outbound call
    pub request_timeout: Duration,

    /// Backoff strategy for transient failures
    pub retry_backoff: ExponentialBackoff,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: Url::parse("http://127.0.0.1:8545").expect("default RPC URL is valid"),
            request_timeout: Duration::from_secs(10),
            retry_backoff: ExponentialBackoff {
                initial_interval: Duration::from_millis(250),
                max_interval: Duration::from_secs(5),
                max_elapsed_time: Some(Duration::from_secs(30)), // bound the whole retry loop
                multiplier: 2.0,
                ..Default::default()
            },
        }
    }
}
