use std::time::Duration;

/// The base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Builder for [`HttpBackendConfig`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HttpBackendConfigBuilder {
    base_url: Option<String>,
    top_k: Option<u32>,
    timeout: Option<Duration>,
}

impl HttpBackendConfigBuilder {
    /// Creates a builder with every option unset.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom base URL. The `/upload` and `/query` endpoints are
    /// resolved relative to it.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets how many passages the backend retrieves per question, unless
    /// a request asks for a specific number itself.
    #[inline]
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Sets a timeout for each request. Requests never time out by default.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> HttpBackendConfig {
        let base_url = self
            .base_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        HttpBackendConfig {
            base_url: base_url.trim_end_matches('/').to_owned(),
            top_k: self.top_k,
            timeout: self.timeout,
        }
    }
}

/// Configuration for [`HttpBackend`](crate::HttpBackend).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpBackendConfig {
    pub(crate) base_url: String,
    pub(crate) top_k: Option<u32>,
    pub(crate) timeout: Option<Duration>,
}

impl HttpBackendConfig {
    /// Returns the base URL, without a trailing slash.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[inline]
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        HttpBackendConfigBuilder::new().build()
    }
}
