//! The dispatcher: one inbound event in, one [`DispatchResult`] out.
//!
//! Each call walks `Parsing -> Matching -> Decoding -> Invoking ->
//! Aggregating`. Only `Parsing` can fail the whole call. Decode and handler
//! failures, panics included, are recorded against the registration that
//! produced them, and never stop sibling registrations.
//!
//! Every handler receives the caller's [`Context`] with the envelope's
//! [`EventHeader`](cwdispatch_core::EventHeader) attached.
//!
//! # Deadlines
//!
//! Handlers already running are never aborted. Once the context's deadline
//! has passed no further handler is started, and every registration that did
//! not get to run is reported as
//! [`FailureKind::DeadlineExceeded`](cwdispatch_core::FailureKind::DeadlineExceeded).

use crate::{
    config::{DispatchMode, DispatcherConfig},
    registration::Registration,
    registry::Registry,
};
use cwdispatch_core::{
    BoxError, Context, DispatchError, DispatchResult, EventEnvelope, Failure, HandlerOutcome,
    HandlerResult, InvocationError, Outcome,
};
use futures::{
    FutureExt,
    future::{BoxFuture, join_all},
};
use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use tracing::Instrument;

#[derive(Debug, Clone, Copy)]
enum Stage {
    Parsing,
    Matching,
    Decoding,
    Invoking,
    Aggregating,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parsing => "parsing",
            Stage::Matching => "matching",
            Stage::Decoding => "decoding",
            Stage::Invoking => "invoking",
            Stage::Aggregating => "aggregating",
        };
        f.write_str(name)
    }
}

/// A matched registration after decoding: either ready to invoke, or
/// already failed.
enum Prepared<'a> {
    Ready(BoxFuture<'a, HandlerResult>),
    Failed(Failure),
}

/// Routes events to the handlers of a finalized [`Registry`].
///
/// Cheap to clone; clones share the registry.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Finalize `registry` and dispatch with default settings.
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, DispatcherConfig::default())
    }

    /// Finalize `registry` and dispatch with `config`.
    pub fn with_config(mut registry: Registry, config: DispatcherConfig) -> Self {
        registry.finalize();
        Self {
            registry: Arc::new(registry),
            config,
        }
    }

    /// The frozen registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Active settings.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Parse `message` as an event envelope and dispatch it.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the message is not JSON or not an event
    /// envelope. No handler has run in that case.
    pub async fn dispatch(
        &self,
        message: &[u8],
        ctx: Context,
    ) -> Result<DispatchResult, DispatchError> {
        tracing::debug!(stage = %Stage::Parsing, request_id = ctx.request_id(), bytes = message.len());

        if self.config.log_raw_message {
            tracing::info!(
                request_id = ctx.request_id(),
                raw = %String::from_utf8_lossy(message.trim_ascii()),
                "raw message"
            );
        }

        let envelope = match EventEnvelope::from_slice(message) {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::error!(request_id = ctx.request_id(), %error, "rejected inbound message");
                return Err(error);
            }
        };

        Ok(self.dispatch_envelope(&envelope, ctx).await)
    }

    /// Dispatch an already parsed envelope.
    pub async fn dispatch_envelope(&self, envelope: &EventEnvelope, ctx: Context) -> DispatchResult {
        let span = tracing::info_span!(
            "dispatch",
            event_id = envelope.id(),
            source = envelope.source(),
            detail_type = envelope.detail_type(),
            request_id = ctx.request_id(),
        );
        self.run(envelope, ctx).instrument(span).await
    }

    async fn run(&self, envelope: &EventEnvelope, ctx: Context) -> DispatchResult {
        let ctx = ctx.with_header(envelope.header().clone());
        let matched = self.registry.matching(envelope);
        tracing::debug!(stage = %Stage::Matching, matched = matched.len());

        if matched.is_empty() {
            tracing::debug!(stage = %Stage::Aggregating, "no registration matched");
            return DispatchResult::NoMatch;
        }

        tracing::debug!(stage = %Stage::Decoding);
        let prepared: Vec<Prepared<'_>> = matched
            .iter()
            .map(|&registration| {
                let ctx = ctx.clone();
                let decoded = panic::catch_unwind(AssertUnwindSafe(move || {
                    registration.prepare(envelope.detail(), ctx)
                }));
                match decoded {
                    Ok(Ok(call)) => Prepared::Ready(call),
                    Ok(Err(error)) => Prepared::Failed(Failure::decode(error)),
                    Err(panic) => {
                        Prepared::Failed(Failure::decode_panicked(panic_message(panic.as_ref())))
                    }
                }
            })
            .collect();

        tracing::debug!(stage = %Stage::Invoking, mode = ?self.config.mode);
        let statuses = match self.config.mode {
            DispatchMode::Sequential => {
                let mut statuses = Vec::with_capacity(prepared.len());
                for step in prepared {
                    statuses.push(self.invoke(step, &ctx).await);
                }
                statuses
            }
            DispatchMode::Concurrent => {
                join_all(prepared.into_iter().map(|step| self.invoke(step, &ctx))).await
            }
        };

        tracing::debug!(stage = %Stage::Aggregating);
        let outcomes: Vec<Outcome> = matched
            .iter()
            .zip(statuses)
            .map(|(registration, status)| outcome(registration, status))
            .collect();

        let result = DispatchResult::aggregate(outcomes);
        tracing::debug!(
            succeeded = result.successes().count(),
            failed = result.failures().count(),
            "dispatch complete"
        );
        result
    }

    async fn invoke(&self, step: Prepared<'_>, ctx: &Context) -> HandlerOutcome {
        let call = match step {
            Prepared::Ready(call) => call,
            Prepared::Failed(failure) => return HandlerOutcome::Failure(failure),
        };

        if ctx.is_expired() {
            return HandlerOutcome::Failure(Failure::deadline_exceeded());
        }

        let guarded = AssertUnwindSafe(call).catch_unwind();
        let caught = match self.config.handler_timeout {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(caught) => caught,
                Err(_) => return invocation_failure(InvocationError::Timeout(limit)),
            },
            None => guarded.await,
        };

        match caught {
            Ok(result) => HandlerOutcome::from(result),
            Err(panic) => invocation_failure(InvocationError::Panic(panic_message(panic.as_ref()))),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registrations", &self.registry.len())
            .field("config", &self.config)
            .finish()
    }
}

fn outcome(registration: &Registration, status: HandlerOutcome) -> Outcome {
    if let HandlerOutcome::Failure(failure) = &status {
        tracing::warn!(
            registration = registration.name(),
            index = registration.index(),
            kind = ?failure.kind,
            error = %failure.message,
            "registration failed"
        );
    }
    Outcome {
        registration: registration.info(),
        status,
    }
}

fn invocation_failure(error: InvocationError) -> HandlerOutcome {
    let error: BoxError = Box::new(error);
    HandlerOutcome::Failure(Failure::handler(error))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
