//! Client configuration types.

use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest list body read from a URL source (1 GiB)
pub const DEFAULT_MAX_LIST_BYTES: usize = 1024 * 1024 * 1024;

/// Default `User-Agent` sent with every request
#[must_use]
pub fn default_user_agent() -> String {
    format!("blockhole/{}", env!("CARGO_PKG_VERSION"))
}

/// HTTP settings shared by [`crate::InstanceClient`] and [`crate::UrlFetcher`]
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Per-request timeout
    pub timeout: Duration,

    /// `User-Agent` header value
    pub user_agent: String,

    /// Maximum number of body bytes read from a URL source
    pub max_list_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
            max_list_bytes: DEFAULT_MAX_LIST_BYTES,
        }
    }
}

impl HttpConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set the URL source size cap
    #[must_use]
    pub const fn max_list_bytes(mut self, max: usize) -> Self {
        self.max_list_bytes = max;
        self
    }

    /// Build a reqwest client from these settings
    pub(crate) fn http_client(&self) -> blockhole_core::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| blockhole_core::BlockholeError::Http(e.to_string()))
    }
}
