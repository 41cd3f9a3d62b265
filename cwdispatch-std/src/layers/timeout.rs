//! Timeout layer for time-limited handlers.

use cwdispatch_core::{Context, Handler, HandlerResult, IntoOutcome, InvocationError};
use std::time::Duration;
use tokio::time::timeout;

/// A handler that fails with [`InvocationError::Timeout`] when the inner
/// handler runs longer than `duration`.
///
/// The inner future is dropped on timeout.
pub struct TimeoutHandler<H> {
    inner: H,
    duration: Duration,
}

impl<H> TimeoutHandler<H> {
    /// Wrap `inner` with a time limit.
    pub fn new(inner: H, duration: Duration) -> Self {
        Self { inner, duration }
    }

    /// The time limit.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl<T, H> Handler<T> for TimeoutHandler<H>
where
    T: Send + 'static,
    H: Handler<T>,
{
    type Output = HandlerResult;

    async fn call(&self, detail: T, ctx: Context) -> HandlerResult {
        match timeout(self.duration, self.inner.call(detail, ctx)).await {
            Ok(output) => output.into_outcome(),
            Err(_) => Err(Box::new(InvocationError::Timeout(self.duration))),
        }
    }
}
