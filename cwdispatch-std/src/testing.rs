//! Testing utilities for cwdispatch.
//!
//! Ready-made handlers and envelope fixtures for exercising registries and
//! dispatchers in tests.
//!
//! # Features
//!
//! - [`RecordingHandler`]: records every payload it receives
//! - [`FailingHandler`]: always returns an error
//! - [`PanickingHandler`]: always panics
//! - [`SlowHandler`]: sleeps before succeeding
//! - [`envelope_json`] / [`envelope`]: build a complete event envelope

use cwdispatch_core::{BoxError, Context, EventEnvelope, Handler, RawValue};
use serde_json::json;
use std::{
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Recording Handler
// ============================================================================

/// A handler that records every decoded payload and request id it receives.
///
/// Clones share the recording.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingHandler::<StateChange>::new();
/// registry.register::<StateChange, _>("aws.ec2", "*", recorder.clone())?;
///
/// dispatcher.dispatch(message, ctx).await?;
///
/// assert_eq!(recorder.count(), 1);
/// ```
pub struct RecordingHandler<T> {
    payloads: Arc<Mutex<Vec<T>>>,
    request_ids: Arc<Mutex<Vec<String>>>,
}

impl<T: Clone> RecordingHandler<T> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            payloads: Arc::new(Mutex::new(Vec::new())),
            request_ids: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Payloads received so far, in call order.
    pub fn payloads(&self) -> Vec<T> {
        lock(&self.payloads).clone()
    }

    /// Request ids of the contexts received so far.
    pub fn request_ids(&self) -> Vec<String> {
        lock(&self.request_ids).clone()
    }

    /// Number of calls.
    pub fn count(&self) -> usize {
        lock(&self.payloads).len()
    }

    /// Forget everything recorded.
    pub fn clear(&self) {
        lock(&self.payloads).clear();
        lock(&self.request_ids).clear();
    }
}

impl<T: Clone> Default for RecordingHandler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for RecordingHandler<T> {
    fn clone(&self) -> Self {
        Self {
            payloads: self.payloads.clone(),
            request_ids: self.request_ids.clone(),
        }
    }
}

impl<T: Send + 'static> Handler<T> for RecordingHandler<T> {
    type Output = ();

    async fn call(&self, detail: T, ctx: Context) {
        lock(&self.request_ids).push(ctx.request_id().to_string());
        lock(&self.payloads).push(detail);
    }
}

// ============================================================================
// Failing Handler
// ============================================================================

/// A handler that always fails with the given message.
#[derive(Clone)]
pub struct FailingHandler {
    message: String,
    calls: Arc<AtomicUsize>,
}

impl FailingHandler {
    /// Create a handler failing with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of calls.
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<T: Send + 'static> Handler<T> for FailingHandler {
    type Output = Result<(), BoxError>;

    async fn call(&self, _detail: T, _ctx: Context) -> Self::Output {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.message.clone().into())
    }
}

// ============================================================================
// Panicking Handler
// ============================================================================

/// A handler that panics with the given message when called.
#[derive(Clone, Copy)]
pub struct PanickingHandler {
    message: &'static str,
}

impl PanickingHandler {
    /// Create a handler panicking with `message`.
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

impl<T: Send + 'static> Handler<T> for PanickingHandler {
    type Output = ();

    async fn call(&self, _detail: T, _ctx: Context) {
        panic!("{}", self.message)
    }
}

// ============================================================================
// Slow Handler
// ============================================================================

/// A handler that sleeps for a fixed delay, then succeeds.
#[derive(Clone)]
pub struct SlowHandler {
    delay: Duration,
    completed: Arc<AtomicUsize>,
}

impl SlowHandler {
    /// Create a handler sleeping for `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of calls that ran to completion.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl<T: Send + 'static> Handler<T> for SlowHandler {
    type Output = ();

    async fn call(&self, _detail: T, _ctx: Context) {
        tokio::time::sleep(self.delay).await;
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Envelope fixtures
// ============================================================================

/// A complete event envelope as JSON text, with fixed metadata.
pub fn envelope_json(source: &str, detail_type: &str, detail: RawValue) -> String {
    json!({
        "version": "0",
        "id": "7bf73129-1428-4cd3-a780-95db273d1602",
        "detail-type": detail_type,
        "source": source,
        "account": "123456789012",
        "time": "2015-11-11T21:29:54Z",
        "region": "us-east-1",
        "resources": [],
        "detail": detail,
    })
    .to_string()
}

/// The envelope [`envelope_json`] describes, already parsed.
pub fn envelope(source: &str, detail_type: &str, detail: RawValue) -> EventEnvelope {
    EventEnvelope::new(source, detail_type, detail)
        .with_id("7bf73129-1428-4cd3-a780-95db273d1602")
        .with_origin("123456789012", "us-east-1")
        .with_time(fixture_time())
}

fn fixture_time() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(1_447_277_394, 0).unwrap_or_default()
}
