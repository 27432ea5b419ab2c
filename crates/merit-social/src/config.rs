use backoff::ExponentialBackoff;
use std::time::Duration;
use url::Url;

/// Configuration for the hub client
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Base URL of the hub's HTTP API
    pub base_url: Url,

    /// Optional API key sent as `x-api-key` on every request
    pub api_key: Option<String>,

    /// Page size for cursor-driven enumeration
    pub page_size: usize,

    /// Per-request timeout applied to every outbound call
    pub request_timeout: Duration,

    /// Backoff strategy for transient failures
    pub retry_backoff: ExponentialBackoff,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://127.0.0.1:2281").expect("default hub URL is valid"),
            api_key: None,
            page_size: 100,
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
