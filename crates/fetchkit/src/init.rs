//! Request options and how configuration layers merge into them

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::method::HttpMethod;

/// Ordered header list with case-insensitive names.
///
/// Names keep the spelling they were inserted with. Inserting a name that is
/// already present (ignoring ASCII case) replaces the existing entry in place
/// and adopts the new spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a header
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx] = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    /// Get a header value (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay `overrides` on top of these headers, key by key
    pub fn merge(&mut self, overrides: &Headers) {
        for (name, value) in overrides.iter() {
            self.insert(name, value);
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Whether the client's cookie jar travels with a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Credentials {
    /// Never attach cookies
    Omit,
    /// Attach cookies only when the request targets the base URL's origin
    #[default]
    SameOrigin,
    /// Always attach cookies
    Include,
}

/// Explicit request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Text(String),
    Bytes(Bytes),
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(bytes))
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<RequestBody> for reqwest::Body {
    fn from(body: RequestBody) -> Self {
        match body {
            RequestBody::Text(text) => reqwest::Body::from(text),
            RequestBody::Bytes(bytes) => reqwest::Body::from(bytes),
        }
    }
}

/// Request options, used both as client-wide defaults and per call.
///
/// Every field is optional so that a per-call value can be told apart from
/// "fall back to the configured default".
#[derive(Debug, Clone, Default)]
pub struct RequestInit {
    /// Method; filled in by the dispatcher from the verb
    pub method: Option<HttpMethod>,
    pub headers: Headers,
    /// Explicit body; takes precedence over a JSON body value
    pub body: Option<RequestBody>,
    pub credentials: Option<Credentials>,
    /// Caller-supplied cancellation
    pub signal: Option<CancellationToken>,
}

impl RequestInit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replace all headers
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Layer `overrides` on top of these options.
    ///
    /// Scalar fields come from `overrides` when set there; headers merge key
    /// by key with `overrides` winning.
    pub fn merged_with(&self, overrides: &RequestInit) -> RequestInit {
        let mut headers = self.headers.clone();
        headers.merge(&overrides.headers);

        RequestInit {
            method: overrides.method.or(self.method),
            headers,
            body: overrides.body.clone().or_else(|| self.body.clone()),
            credentials: overrides.credentials.or(self.credentials),
            signal: overrides.signal.clone().or_else(|| self.signal.clone()),
        }
    }

    /// Effective credentials mode
    pub fn credentials_mode(&self) -> Credentials {
        self.credentials.unwrap_or_default()
    }
}
