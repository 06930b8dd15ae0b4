//! Error types and classification

use thiserror::Error;

/// Errors produced while configuring a client, dispatching a request or
/// consuming a response body
#[derive(Error, Debug)]
pub enum HttpError {
    /// Rejected client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Base URL and request path disagree on where the joining slash goes
    #[error("URL mismatch: cannot join base URL '{base_url}' with path '{path}' (exactly one of them must carry the '/' separator)")]
    UrlMismatch { base_url: String, path: String },

    /// Request did not finish before its timeout elapsed
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Request was cancelled through its caller-supplied signal
    #[error("Request aborted")]
    Aborted,

    /// Server answered with a status outside 2xx
    #[error("HTTP {status} {status_text} for {url}")]
    Status {
        status: u16,
        status_text: String,
        url: String,
        body: String,
    },

    /// Invalid request construction (headers, body)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(String),

    /// Transport error
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// URL parse error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type for HTTP operations
pub type HttpResult<T> = Result<T, HttpError>;

/// Error category for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorCategory {
    /// Configuration validation errors
    Config,
    /// URL resolution or parsing errors
    Url,
    /// Timeout errors
    Timeout,
    /// Caller cancellation
    Aborted,
    /// Non-2xx responses
    Status,
    /// Connection-related errors (DNS, TCP, TLS)
    Connection,
    /// Invalid request construction
    Request,
    /// Response parsing errors
    Response,
    /// Unknown/other errors
    Unknown,
}

impl HttpError {
    /// Categorize the error for reporting
    pub fn category(&self) -> HttpErrorCategory {
        match self {
            HttpError::Config(_) => HttpErrorCategory::Config,
            HttpError::UrlMismatch { .. } | HttpError::UrlParse(_) => HttpErrorCategory::Url,
            HttpError::Timeout { .. } => HttpErrorCategory::Timeout,
            HttpError::Aborted => HttpErrorCategory::Aborted,
            HttpError::Status { .. } => HttpErrorCategory::Status,
            HttpError::InvalidRequest(_) => HttpErrorCategory::Request,
            HttpError::Json(_) => HttpErrorCategory::Response,
            HttpError::Reqwest(e) => {
                if e.is_connect() {
                    HttpErrorCategory::Connection
                } else if e.is_timeout() {
                    HttpErrorCategory::Timeout
                } else if e.is_builder() || e.is_request() {
                    HttpErrorCategory::Request
                } else if e.is_body() || e.is_decode() {
                    HttpErrorCategory::Response
                } else {
                    HttpErrorCategory::Unknown
                }
            }
        }
    }

    /// Status code carried by an HTTP status error
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            HttpError::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.category() == HttpErrorCategory::Timeout
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, HttpError::Aborted)
    }

    /// Sanitize error message (remove sensitive info like credentials, internal IPs)
    pub fn sanitized_message(&self) -> String {
        let msg = self.to_string();
        sanitize_error_message(&msg)
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::Json(err.to_string())
    }
}

/// Sanitize error messages by removing sensitive information
fn sanitize_error_message(msg: &str) -> String {
    use regex::Regex;
    use std::sync::OnceLock;

    static URL_CREDS_RE: OnceLock<Regex> = OnceLock::new();
    static INTERNAL_IP_RE: OnceLock<Regex> = OnceLock::new();
    static AUTH_HEADER_RE: OnceLock<Regex> = OnceLock::new();

    let url_creds_re = URL_CREDS_RE
        .get_or_init(|| Regex::new(r"(https?)://[^@/\s:]+:[^@/\s]+@").expect("valid regex"));
    let internal_ip_re = INTERNAL_IP_RE.get_or_init(|| {
        Regex::new(r"\b(10\.|172\.(1[6-9]|2[0-9]|3[01])\.|192\.168\.)\d+\.\d+\b")
            .expect("valid regex")
    });
    let auth_header_re = AUTH_HEADER_RE.get_or_init(|| {
        Regex::new(r"(?i)(authorization:\s*bearer|bearer|api[_-]?key|token)\s*[:=]?\s*\S+")
            .expect("valid regex")
    });

    let sanitized = url_creds_re.replace_all(msg, "$1://[REDACTED]@");
    let sanitized = internal_ip_re.replace_all(&sanitized, "[INTERNAL_IP]");
    let sanitized = auth_header_re.replace_all(&sanitized, "$1: [REDACTED]");

    sanitized.to_string()
}
