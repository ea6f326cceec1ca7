use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for fetching CSV documents over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,

    /// Retries after the first attempt for transient failures (default: 3)
    pub max_retries: u32,

    /// Upper bound for the exponential backoff in seconds (default: 30)
    pub backoff_max_secs: u64,

    /// User agent string to send
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 3,
            backoff_max_secs: 30,
            user_agent: concat!("sheetfeed/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
