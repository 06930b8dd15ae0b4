//! HTTP response types

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::abort::AbortGuard;
use crate::error::{HttpError, HttpResult};

/// Response whose headers have arrived but whose body has not been read.
///
/// Body readers run under the same timeout and cancellation as the request
/// that produced the response. They do not look at the status code; use
/// [`error_for_status`](Self::error_for_status) or the helpers on
/// [`RequestBuilder`](crate::RequestBuilder) for that.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
    guard: AbortGuard,
    latency: Duration,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response, guard: AbortGuard, latency: Duration) -> Self {
        Self {
            inner,
            guard,
            latency,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    pub fn status_code(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Check if status is success (2xx)
    pub fn ok(&self) -> bool {
        self.inner.status().is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Final URL (may differ from request URL due to redirects)
    pub fn url(&self) -> &str {
        self.inner.url().as_str()
    }

    /// Time until the response headers arrived
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Turn a non-2xx response into [`HttpError::Status`].
    ///
    /// The error carries the response body as text, read on a best-effort
    /// basis. Cancellation or timeout during that read is reported instead.
    pub async fn error_for_status(self) -> HttpResult<Self> {
        if self.ok() {
            return Ok(self);
        }

        let status = self.status();
        let url = self.url().to_string();
        let body = match self.text().await {
            Ok(body) => body,
            Err(err @ (HttpError::Aborted | HttpError::Timeout { .. })) => return Err(err),
            Err(_) => String::new(),
        };
        let err = HttpError::Status {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            url,
            body,
        };
        tracing::warn!("{}", err.sanitized_message());
        Err(err)
    }

    /// Read the body as raw bytes
    pub async fn bytes(self) -> HttpResult<Bytes> {
        let Response { inner, guard, .. } = self;
        guard
            .run(async move { inner.bytes().await.map_err(HttpError::from) })
            .await
    }

    /// Read the body as text (UTF-8)
    pub async fn text(self) -> HttpResult<String> {
        let Response { inner, guard, .. } = self;
        guard
            .run(async move { inner.text().await.map_err(HttpError::from) })
            .await
    }

    /// Read the body and deserialize it from JSON
    pub async fn json<T: DeserializeOwned>(self) -> HttpResult<T> {
        let body = self.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| HttpError::Json(format!("Failed to deserialize JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> Response {
        response_with_guard(status, body, AbortGuard::default())
    }

    fn response_with_guard(status: u16, body: &'static str, guard: AbortGuard) -> Response {
        let raw = http::Response::builder()
            .status(status)
            .header("Content-Type", "application/json; charset=utf-8")
            .body(body)
            .unwrap();
        Response::new(reqwest::Response::from(raw), guard, Duration::ZERO)
    }

    #[test]
    fn test_response_status_checks() {
        assert!(response(200, "").ok());
        assert!(response(204, "").ok());
        assert!(!response(404, "").ok());
        assert_eq!(response(500, "").status_code(), 500);
    }

    #[test]
    fn test_response_header_case_insensitive() {
        let response = response(200, "");
        assert_eq!(
            response.header("content-type"),
            Some("application/json; charset=utf-8")
        );
        assert_eq!(
            response.header("CONTENT-TYPE"),
            Some("application/json; charset=utf-8")
        );
        assert_eq!(response.header("x-missing"), None);
    }

    #[tokio::test]
    async fn test_response_json() {
        let value: serde_json::Value = response(200, r#"{"name": "Alice", "age": 30}"#)
            .json()
            .await
            .unwrap();
        assert_eq!(value["name"], "Alice");
        assert_eq!(value["age"], 30);
    }

    #[tokio::test]
    async fn test_response_json_parse_failure() {
        let err = response(200, "not json")
            .json::<serde_json::Value>()
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Json(_)));
    }

    #[tokio::test]
    async fn test_error_for_status_keeps_body() {
        let err = response(500, "whoops").error_for_status().await.unwrap_err();
        match err {
            HttpError::Status {
                status,
                status_text,
                body,
                ..
            } => {
                assert_eq!(status, 500);
                assert_eq!(status_text, "Internal Server Error");
                assert_eq!(body, "whoops");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_for_status_passes_success_through() {
        let text = response(200, "fine")
            .error_for_status()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(text, "fine");
    }

    #[tokio::test]
    async fn test_error_for_status_reports_cancellation_during_body_read() {
        let token = tokio_util::sync::CancellationToken::new();
        token.cancel();
        let guard = AbortGuard::new(Some(token), None);

        let err = response_with_guard(500, "whoops", guard)
            .error_for_status()
            .await
            .unwrap_err();
        assert!(err.is_aborted());
    }

    #[tokio::test]
    async fn test_error_for_status_reports_timeout_during_body_read() {
        let guard = AbortGuard::new(None, Some(Duration::ZERO));

        let err = response_with_guard(503, "busy", guard)
            .error_for_status()
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Timeout { timeout_ms: 0 }));
    }
}
