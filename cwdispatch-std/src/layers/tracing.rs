//! Span instrumentation for handlers.

use cwdispatch_core::{Context, Handler};
use tracing::Instrument;

/// A handler wrapper that runs the inner handler inside a `handler` span
/// carrying the handler name and the request id.
pub struct InstrumentedHandler<H> {
    inner: H,
    name: &'static str,
}

impl<H> InstrumentedHandler<H> {
    /// Wrap `inner`, naming its span `name`.
    pub const fn new(inner: H, name: &'static str) -> Self {
        Self { inner, name }
    }
}

impl<H: Clone> Clone for InstrumentedHandler<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            name: self.name,
        }
    }
}

impl<T, H> Handler<T> for InstrumentedHandler<H>
where
    T: Send + 'static,
    H: Handler<T>,
{
    type Output = H::Output;

    async fn call(&self, detail: T, ctx: Context) -> H::Output {
        let span = tracing::info_span!(
            "handler",
            handler = %self.name,
            request_id = %ctx.request_id(),
        );
        self.inner.call(detail, ctx).instrument(span).await
    }
}
