//! Timeout and cancellation composition

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{HttpError, HttpResult};

/// Scope a request (and later its body read) runs under.
///
/// Combines an optional deadline with an optional caller-supplied
/// cancellation token. Whichever fires first ends the guarded future with
/// [`HttpError::Timeout`] or [`HttpError::Aborted`]. The deadline is fixed
/// when the guard is created, so a body read shares the budget left over
/// from the dispatch.
#[derive(Debug, Clone, Default)]
pub(crate) struct AbortGuard {
    signal: Option<CancellationToken>,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl AbortGuard {
    pub(crate) fn new(signal: Option<CancellationToken>, timeout: Option<Duration>) -> Self {
        Self {
            signal,
            timeout,
            deadline: timeout.and_then(|t| Instant::now().checked_add(t)),
        }
    }

    /// Drive `fut` to completion unless cancelled or timed out first
    pub(crate) async fn run<F, T>(&self, fut: F) -> HttpResult<T>
    where
        F: Future<Output = HttpResult<T>>,
    {
        let cancelled = async {
            match &self.signal {
                Some(token) => token.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(HttpError::Aborted),
            _ = expired => Err(HttpError::Timeout {
                timeout_ms: self.timeout_ms(),
            }),
            result = fut => result,
        }
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.map(millis).unwrap_or_default()
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
