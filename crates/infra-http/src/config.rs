// HTTP transport configuration
use serde::Deserialize;
use std::time::Duration;

/// Base URL relative destinations are resolved against
pub const DEFAULT_BASE_URL: &str = "https://api.policeroleplay.community/";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for `ReqwestTransport`
///
/// Deserializable so it can sit directly in the application config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpTransportConfig {
    pub base_url: String,
    /// Whole-request timeout, in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl HttpTransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("prc-dispatch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
