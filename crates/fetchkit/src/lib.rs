//! fetchkit: configurable async HTTP request helper
//!
//! A thin layer over `reqwest` that adds the conveniences applications
//! usually rebuild on top of a bare fetch primitive.
//!
//! # Architecture
//!
//! - `HttpClient`: resolves paths against a base URL, merges configured
//!   default options with per-call ones, runs the interceptor and dispatches
//! - `RequestBuilder`: pending request returned by the verb methods; await it
//!   for the raw `Response`, or call `json`/`text`/`bytes` to get a body and
//!   fail on non-2xx statuses
//! - `RequestInit`: request options (headers, body, credentials, signal)
//! - `FetchConfig`: base URL, default options, interceptor and transport
//!   settings
//!
//! Timeouts and caller cancellation (`CancellationToken`) are composed per
//! request; whichever fires first ends the request with
//! [`HttpError::Timeout`] or [`HttpError::Aborted`].
//!
//! The crate-level verb functions use a shared client with default
//! configuration:
//!
//! ```ignore
//! let body = fetchkit::get("https://example.com/").text().await?;
//! ```

mod abort;
pub mod client;
pub mod config;
pub mod error;
pub mod init;
pub mod interceptor;
pub mod method;
pub mod request;
pub mod response;
pub mod url;

pub use client::HttpClient;
pub use config::FetchConfig;
pub use error::{HttpError, HttpErrorCategory, HttpResult};
pub use init::{Credentials, Headers, RequestBody, RequestInit};
pub use interceptor::Interceptor;
pub use method::HttpMethod;
pub use request::RequestBuilder;
pub use response::Response;
pub use self::url::resolve_url;

pub use tokio_util::sync::CancellationToken;

/// Start a request through the shared default client
pub fn request(method: HttpMethod, url: &str) -> RequestBuilder {
    match HttpClient::shared() {
        Ok(client) => client.request(method, url),
        Err(err) => RequestBuilder::failed(method, url, err),
    }
}

pub fn get(url: &str) -> RequestBuilder {
    request(HttpMethod::Get, url)
}

pub fn post(url: &str) -> RequestBuilder {
    request(HttpMethod::Post, url)
}

pub fn put(url: &str) -> RequestBuilder {
    request(HttpMethod::Put, url)
}

pub fn patch(url: &str) -> RequestBuilder {
    request(HttpMethod::Patch, url)
}

pub fn delete(url: &str) -> RequestBuilder {
    request(HttpMethod::Delete, url)
}

pub fn head(url: &str) -> RequestBuilder {
    request(HttpMethod::Head, url)
}

pub fn options(url: &str) -> RequestBuilder {
    request(HttpMethod::Options, url)
}
