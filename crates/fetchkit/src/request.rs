//! Pending request handle

use std::future::IntoFuture;
use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::client::HttpClient;
use crate::error::{HttpError, HttpResult};
use crate::init::{Credentials, RequestBody, RequestInit};
use crate::method::HttpMethod;
use crate::response::Response;

/// A request that has been described but not yet sent.
///
/// Nothing goes over the wire until the builder is awaited (yielding the
/// raw [`Response`] whatever its status) or consumed through one of the
/// body helpers, which additionally fail with [`HttpError::Status`] when the
/// status is outside 2xx.
///
/// ```ignore
/// let user: User = client.get("/users/1").timeout_ms(500).json().await?;
/// let echoed = client.post("/echo").json_body(&payload).text().await?;
/// let response = client.head("/").await?;
/// ```
#[must_use = "requests do nothing unless awaited"]
pub struct RequestBuilder {
    client: Option<HttpClient>,
    method: HttpMethod,
    url: String,
    body: Option<serde_json::Value>,
    init: RequestInit,
    timeout: Option<Duration>,
    error: Option<HttpError>,
}

impl RequestBuilder {
    pub(crate) fn new(client: HttpClient, method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            client: Some(client),
            method,
            url: url.into(),
            body: None,
            init: RequestInit::default(),
            timeout: None,
            error: None,
        }
    }

    /// Builder that fails with `error` once sent
    pub(crate) fn failed(method: HttpMethod, url: impl Into<String>, error: HttpError) -> Self {
        Self {
            client: None,
            method,
            url: url.into(),
            body: None,
            init: RequestInit::default(),
            timeout: None,
            error: Some(error),
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Serialize `body` as the JSON request body.
    ///
    /// Ignored when the request options carry an explicit body.
    pub fn json_body<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.body = Some(value),
            Err(e) => {
                self.error.get_or_insert(HttpError::Json(format!(
                    "Failed to serialize request body: {}",
                    e
                )));
            }
        }
        self
    }

    /// Set the per-call request options, replacing any set so far
    pub fn init(mut self, init: RequestInit) -> Self {
        self.init = init;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.init.headers.insert(name, value);
        self
    }

    /// Set an explicit body
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.init.body = Some(body.into());
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.init.credentials = Some(credentials);
        self
    }

    /// Cancel the request (and its body read) when `signal` fires
    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.init.signal = Some(signal);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout_ms(self, millis: u64) -> Self {
        self.timeout(Duration::from_millis(millis))
    }

    /// Dispatch the request and return the response without reading its body
    pub async fn send(self) -> HttpResult<Response> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let client = self.client.ok_or_else(|| {
            HttpError::Config("request has no client to dispatch through".to_string())
        })?;

        client
            .dispatch(self.method, &self.url, self.body, Some(self.init), self.timeout)
            .await
    }

    /// Dispatch, require a 2xx status and deserialize the body from JSON
    pub async fn json<T: DeserializeOwned>(self) -> HttpResult<T> {
        self.send().await?.error_for_status().await?.json().await
    }

    /// Dispatch, require a 2xx status and read the body as text
    pub async fn text(self) -> HttpResult<String> {
        self.send().await?.error_for_status().await?.text().await
    }

    /// Dispatch, require a 2xx status and read the raw body
    pub async fn bytes(self) -> HttpResult<Bytes> {
        self.send().await?.error_for_status().await?.bytes().await
    }
}

impl IntoFuture for RequestBuilder {
    type Output = HttpResult<Response>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("init", &self.init)
            .field("timeout", &self.timeout)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;

    fn client() -> HttpClient {
        HttpClient::new(FetchConfig::new().base_url("https://api.example.com")).unwrap()
    }

    #[test]
    fn test_request_builder_collects_options() {
        let token = CancellationToken::new();
        let builder = client()
            .post("/users")
            .header("X-Custom", "value")
            .credentials(Credentials::Include)
            .signal(token)
            .timeout_ms(250)
            .json_body(&serde_json::json!({"key": "value"}));

        assert_eq!(builder.method(), HttpMethod::Post);
        assert_eq!(builder.url(), "/users");
        assert_eq!(builder.init.headers.get("x-custom"), Some("value"));
        assert_eq!(builder.init.credentials, Some(Credentials::Include));
        assert!(builder.init.signal.is_some());
        assert_eq!(builder.timeout, Some(Duration::from_millis(250)));
        assert_eq!(builder.body, Some(serde_json::json!({"key": "value"})));
    }

    #[test]
    fn test_init_replaces_per_call_options() {
        let builder = client()
            .get("/")
            .header("X-Dropped", "1")
            .init(RequestInit::new().header("X-Kept", "2"));

        assert!(!builder.init.headers.contains("x-dropped"));
        assert_eq!(builder.init.headers.get("x-kept"), Some("2"));
    }

    #[tokio::test]
    async fn test_unserializable_body_fails_on_send() {
        use std::collections::HashMap;

        let mut bad = HashMap::new();
        bad.insert(vec![1u8], "map keys must be strings");

        let err = client().post("/").json_body(&bad).send().await.unwrap_err();
        assert!(matches!(err, HttpError::Json(_)));
    }

    #[tokio::test]
    async fn test_url_mismatch_fails_on_send() {
        let err = client().get("users").send().await.unwrap_err();
        assert!(matches!(err, HttpError::UrlMismatch { .. }));
    }

    #[tokio::test]
    async fn test_failed_builder_reports_its_error() {
        let err = RequestBuilder::failed(
            HttpMethod::Get,
            "/",
            HttpError::Config("no transport".into()),
        )
        .text()
        .await
        .unwrap_err();
        assert!(matches!(err, HttpError::Config(_)));
    }
}
