//! Client configuration

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::{HttpError, HttpResult};
use crate::init::RequestInit;
use crate::interceptor::Interceptor;

/// Configuration for [`HttpClient`](crate::HttpClient)
#[derive(Clone)]
pub struct FetchConfig {
    /// Base URL every request path is joined onto (e.g., "https://api.example.com")
    pub base_url: Option<String>,

    /// Default request options, overridden per call
    pub init: RequestInit,

    /// Hook invoked with the final URL and options before dispatch
    pub interceptor: Option<Arc<dyn Interceptor>>,

    /// Timeout applied when a call does not set its own
    pub default_timeout: Option<Duration>,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Idle connection timeout
    pub pool_idle_timeout: Duration,

    /// Whether to follow redirects
    pub follow_redirects: bool,

    /// Maximum number of redirects to follow
    pub max_redirects: usize,

    /// User-Agent header value
    pub user_agent: String,

    /// Whether to accept invalid certificates (for testing only)
    pub danger_accept_invalid_certs: bool,

    /// Enable gzip compression
    pub gzip: bool,

    /// Enable brotli compression
    pub brotli: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            init: RequestInit::default(),
            interceptor: None,
            default_timeout: None,
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 10,
            pool_idle_timeout: Duration::from_secs(90),
            follow_redirects: true,
            max_redirects: 10,
            user_agent: format!("fetchkit/{}", env!("CARGO_PKG_VERSION")),
            danger_accept_invalid_certs: false,
            gzip: true,
            brotli: true,
        }
    }
}

impl FetchConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the default request options
    pub fn init(mut self, init: RequestInit) -> Self {
        self.init = init;
        self
    }

    /// Set the pre-dispatch interceptor
    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptor = Some(Arc::new(interceptor));
        self
    }

    /// Set the timeout used by calls that don't pass one
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set max idle connections per host
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Set idle connection timeout
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set whether to follow redirects
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Set maximum redirects
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Accept invalid certificates (DANGER - testing only)
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.danger_accept_invalid_certs = accept;
        self
    }

    /// Enable/disable gzip compression
    pub fn gzip(mut self, enabled: bool) -> Self {
        self.gzip = enabled;
        self
    }

    /// Enable/disable brotli compression
    pub fn brotli(mut self, enabled: bool) -> Self {
        self.brotli = enabled;
        self
    }

    /// Check the configuration before a client is built from it
    pub fn validate(&self) -> HttpResult<()> {
        if let Some(base) = &self.base_url {
            let parsed = Url::parse(base).map_err(|e| {
                HttpError::Config(format!("base_url '{}' is not a valid URL: {}", base, e))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(HttpError::Config(format!(
                    "base_url '{}' must use http or https",
                    base
                )));
            }
            if parsed.cannot_be_a_base() {
                return Err(HttpError::Config(format!(
                    "base_url '{}' cannot be used as a base",
                    base
                )));
            }
        }

        for (name, value) in self.init.headers.iter() {
            http::HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                HttpError::Config(format!("invalid default header name '{}'", name))
            })?;
            http::HeaderValue::from_str(value).map_err(|_| {
                HttpError::Config(format!("invalid value for default header '{}'", name))
            })?;
        }

        if self.follow_redirects && self.max_redirects == 0 {
            return Err(HttpError::Config(
                "max_redirects must be at least 1 when following redirects".to_string(),
            ));
        }

        Ok(())
    }

    /// Parsed base URL; only meaningful after [`validate`](Self::validate)
    pub(crate) fn parsed_base_url(&self) -> Option<Url> {
        self.base_url.as_deref().and_then(|b| Url::parse(b).ok())
    }
}

impl fmt::Debug for FetchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchConfig")
            .field("base_url", &self.base_url)
            .field("init", &self.init)
            .field("interceptor", &self.interceptor.is_some())
            .field("default_timeout", &self.default_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("follow_redirects", &self.follow_redirects)
            .field("max_redirects", &self.max_redirects)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::Credentials;

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();
        assert!(config.base_url.is_none());
        assert!(config.interceptor.is_none());
        assert!(config.default_timeout.is_none());
        assert!(config.follow_redirects);
        assert_eq!(config.max_redirects, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = FetchConfig::new()
            .base_url("https://api.example.com")
            .init(RequestInit::new().credentials(Credentials::Include))
            .interceptor(|_: &str, _: &mut RequestInit| {})
            .default_timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(20);

        assert_eq!(config.base_url, Some("https://api.example.com".to_string()));
        assert_eq!(config.init.credentials, Some(Credentials::Include));
        assert!(config.interceptor.is_some());
        assert_eq!(config.default_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.pool_max_idle_per_host, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        let err = FetchConfig::new().base_url("not a url").validate().unwrap_err();
        assert!(matches!(err, HttpError::Config(_)));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = FetchConfig::new()
            .base_url("ftp://files.example.com")
            .validate()
            .unwrap_err();
        assert!(matches!(err, HttpError::Config(_)));
    }

    #[test]
    fn test_rejects_invalid_default_headers() {
        let err = FetchConfig::new()
            .init(RequestInit::new().header("bad header", "x"))
            .validate()
            .unwrap_err();
        assert!(matches!(err, HttpError::Config(_)));

        let err = FetchConfig::new()
            .init(RequestInit::new().header("x-ok", "line\nbreak"))
            .validate()
            .unwrap_err();
        assert!(matches!(err, HttpError::Config(_)));
    }

    #[test]
    fn test_rejects_zero_redirect_budget() {
        assert!(FetchConfig::new().max_redirects(0).validate().is_err());
        assert!(FetchConfig::new()
            .follow_redirects(false)
            .max_redirects(0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_debug_hides_interceptor() {
        let config = FetchConfig::new().interceptor(|_: &str, _: &mut RequestInit| {});
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("interceptor: true"));
    }
}
