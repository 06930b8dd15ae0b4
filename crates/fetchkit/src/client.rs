//! Request dispatcher and verb helpers

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use reqwest::cookie::Jar;
use url::Url;

use crate::abort::{millis, AbortGuard};
use crate::config::FetchConfig;
use crate::error::{HttpError, HttpResult};
use crate::init::{Credentials, RequestBody, RequestInit};
use crate::method::HttpMethod;
use crate::request::RequestBuilder;
use crate::response::Response;
use crate::url::{resolve_url, same_origin};

/// Configured HTTP client.
///
/// Cloning is cheap; clones share the configuration, the transport and the
/// cookie jar.
///
/// # Example
///
/// ```ignore
/// use fetchkit::{FetchConfig, HttpClient, RequestInit};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = FetchConfig::new()
///         .base_url("https://api.example.com")
///         .init(RequestInit::new().header("Accept", "application/json"));
///
///     let client = HttpClient::new(config)?;
///
///     let user: serde_json::Value = client.get("/users/1").timeout_ms(2_000).json().await?;
///     println!("{}", user);
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

struct HttpClientInner {
    /// Transport with the cookie jar attached
    with_cookies: reqwest::Client,
    /// Transport that never sends or stores cookies
    without_cookies: reqwest::Client,
    cookies: Arc<Jar>,
    base_url: Option<Url>,
    config: FetchConfig,
}

impl HttpClient {
    /// Validate `config` and build a client from it
    pub fn new(config: FetchConfig) -> HttpResult<Self> {
        config.validate()?;

        let cookies = Arc::new(Jar::default());
        let with_cookies = build_transport(&config, Some(cookies.clone()))?;
        let without_cookies = build_transport(&config, None)?;

        tracing::debug!(
            "Created HTTP client (base_url: {:?}, interceptor: {})",
            config.base_url,
            config.interceptor.is_some()
        );

        Ok(Self {
            inner: Arc::new(HttpClientInner {
                with_cookies,
                without_cookies,
                cookies,
                base_url: config.parsed_base_url(),
                config,
            }),
        })
    }

    /// Client shared by the crate-level verb functions, built once with
    /// default configuration
    pub fn shared() -> HttpResult<Self> {
        static SHARED: OnceLock<Result<HttpClient, String>> = OnceLock::new();

        SHARED
            .get_or_init(|| HttpClient::new(FetchConfig::default()).map_err(|e| e.to_string()))
            .clone()
            .map_err(HttpError::Config)
    }

    /// Get the base URL
    pub fn base_url(&self) -> Option<&str> {
        self.inner.config.base_url.as_deref()
    }

    pub fn config(&self) -> &FetchConfig {
        &self.inner.config
    }

    /// Cookie jar used by requests sent with credentials
    pub fn cookies(&self) -> &Arc<Jar> {
        &self.inner.cookies
    }

    /// Resolve, merge, intercept and send a request.
    ///
    /// `body` is serialized to JSON and used only when neither the
    /// configured nor the per-call options carry an explicit body. The
    /// returned response has not had its body read; it stays under the same
    /// timeout and cancellation as the dispatch.
    pub async fn dispatch(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<serde_json::Value>,
        init: Option<RequestInit>,
        timeout: Option<Duration>,
    ) -> HttpResult<Response> {
        let resolved = resolve_url(self.base_url(), url)?;

        let mut init = match init {
            Some(per_call) => self.inner.config.init.merged_with(&per_call),
            None => self.inner.config.init.clone(),
        };
        init.method = Some(method);

        if init.body.is_none() {
            if let Some(value) = body {
                init.body = Some(RequestBody::Text(serde_json::to_string(&value)?));
                if !init.headers.contains("content-type") {
                    init.headers.insert("content-type", "application/json");
                }
            }
        }

        if let Some(interceptor) = &self.inner.config.interceptor {
            tracing::trace!("Running interceptor for {} {}", method, resolved);
            interceptor.intercept(&resolved, &mut init);
        }

        let target = Url::parse(&resolved)?;
        let method = init.method.unwrap_or(method);
        let timeout = timeout.or(self.inner.config.default_timeout);
        let guard = AbortGuard::new(init.signal.clone(), timeout);

        let builder = self.build_request(method, target, init)?;

        tracing::debug!(
            method = %method,
            url = %resolved,
            timeout_ms = timeout.map(millis),
            "Dispatching request"
        );

        let start = Instant::now();
        let result = guard
            .run(async move { builder.send().await.map_err(HttpError::from) })
            .await;
        let latency = start.elapsed();

        match result {
            Ok(response) => {
                tracing::debug!(
                    "{} {} -> {} in {}ms",
                    method,
                    resolved,
                    response.status().as_u16(),
                    millis(latency)
                );
                Ok(Response::new(response, guard, latency))
            }
            Err(err) => {
                tracing::warn!("{} request failed: {}", method, err.sanitized_message());
                Err(err)
            }
        }
    }

    fn build_request(
        &self,
        method: HttpMethod,
        target: Url,
        init: RequestInit,
    ) -> HttpResult<reqwest::RequestBuilder> {
        let transport = if self.sends_cookies(init.credentials_mode(), &target) {
            &self.inner.with_cookies
        } else {
            &self.inner.without_cookies
        };

        let mut headers = reqwest::header::HeaderMap::with_capacity(init.headers.len());
        for (name, value) in init.headers.iter() {
            let name = http::HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| HttpError::InvalidRequest(format!("invalid header name '{}'", name)))?;
            let value = http::HeaderValue::from_str(value).map_err(|_| {
                HttpError::InvalidRequest(format!("invalid value for header '{}'", name))
            })?;
            headers.insert(name, value);
        }

        let mut builder = transport
            .request(method.to_reqwest(), target)
            .headers(headers);
        if let Some(body) = init.body {
            builder = builder.body(body);
        }
        Ok(builder)
    }

    fn sends_cookies(&self, credentials: Credentials, target: &Url) -> bool {
        match credentials {
            Credentials::Omit => false,
            Credentials::Include => true,
            Credentials::SameOrigin => self
                .inner
                .base_url
                .as_ref()
                .map_or(true, |base| same_origin(base, target)),
        }
    }

    /// Create a request builder for any method
    pub fn request(&self, method: HttpMethod, url: &str) -> RequestBuilder {
        RequestBuilder::new(self.clone(), method, url)
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(HttpMethod::Get, url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(HttpMethod::Post, url)
    }

    pub fn put(&self, url: &str) -> RequestBuilder {
        self.request(HttpMethod::Put, url)
    }

    pub fn patch(&self, url: &str) -> RequestBuilder {
        self.request(HttpMethod::Patch, url)
    }

    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.request(HttpMethod::Delete, url)
    }

    pub fn head(&self, url: &str) -> RequestBuilder {
        self.request(HttpMethod::Head, url)
    }

    pub fn options(&self, url: &str) -> RequestBuilder {
        self.request(HttpMethod::Options, url)
    }
}

fn build_transport(config: &FetchConfig, cookies: Option<Arc<Jar>>) -> HttpResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(config.pool_idle_timeout)
        .user_agent(&config.user_agent);

    // Configure redirects
    if config.follow_redirects {
        builder = builder.redirect(reqwest::redirect::Policy::limited(config.max_redirects));
    } else {
        builder = builder.redirect(reqwest::redirect::Policy::none());
    }

    // Configure compression
    builder = builder.gzip(config.gzip).brotli(config.brotli);

    // Danger: Accept invalid certificates (testing only)
    if config.danger_accept_invalid_certs {
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(jar) = cookies {
        builder = builder.cookie_provider(jar);
    }

    Ok(builder.build()?)
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.inner.config.base_url)
            .field("default_timeout", &self.inner.config.default_timeout)
            .field("interceptor", &self.inner.config.interceptor.is_some())
            .finish()
    }
}
