//! Pre-dispatch hook

use crate::init::RequestInit;

/// Called with the resolved URL and the final request options right before
/// a request is handed to the transport.
///
/// Runs synchronously on the dispatching task. Changes made to `init` are
/// what gets sent, which makes this the place for auth header injection as
/// well as logging.
pub trait Interceptor: Send + Sync {
    fn intercept(&self, url: &str, init: &mut RequestInit);
}

impl<F> Interceptor for F
where
    F: Fn(&str, &mut RequestInit) + Send + Sync,
{
    fn intercept(&self, url: &str, init: &mut RequestInit) {
        self(url, init)
    }
}
