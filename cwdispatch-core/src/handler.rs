//! # Handler
//!
//! The typed endpoint an event is dispatched to. A handler receives the
//! event detail already decoded into its payload type `T`, together with the
//! invocation [`Context`].
//!
//! # Dependencies
//!
//! Handlers hold their collaborators (cloud clients, configuration) as plain
//! fields, or as captured state in a closure. The dispatcher owns nothing but
//! the handler value itself.
//!
//! # Usage Patterns
//!
//! 1. **Direct closure**: `|detail: StateChange, ctx: Context| async move { ... }`
//! 2. **Struct implementation**: `impl Handler<StateChange> for MyHandler`
//!
//! [`Context`]: crate::Context

use crate::{context::Context, response::IntoOutcome};
use std::future::Future;

/// The terminal endpoint for one kind of event detail.
///
/// Handlers receive a fully owned, decoded payload and perform async
/// business logic. Their output is converted with [`IntoOutcome`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle event details of type `{T}`",
    label = "missing `Handler<{T}>` implementation",
    note = "Handlers are `Fn(T, Context) -> impl Future` closures or implement `Handler<{T}>`."
)]
pub trait Handler<T>: Send + Sync + 'static {
    /// The output type of the handler, usually `()`, `Result`, or [`Json`](crate::Json).
    type Output: IntoOutcome;

    /// Executes the handler logic.
    fn call(&self, detail: T, ctx: Context) -> impl Future<Output = Self::Output> + Send;
}

// Blanket impl for closures
impl<F, T, Fut> Handler<T> for F
where
    F: Fn(T, Context) -> Fut + Send + Sync + 'static,
    Fut: Future + Send,
    Fut::Output: IntoOutcome,
{
    type Output = Fut::Output;

    fn call(&self, detail: T, ctx: Context) -> impl Future<Output = Self::Output> + Send {
        (self)(detail, ctx)
    }
}
