//! Execution context handed to every handler.
//!
//! The hosting runtime supplies the invocation's request id and deadline.
//! The dispatcher attaches the [`EventHeader`] of the event being dispatched,
//! hands the same context to every handler, and consults the deadline before
//! starting each one.

use crate::envelope::EventHeader;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// Per-invocation context supplied by the hosting runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    request_id: String,
    deadline: Option<Instant>,
    invoked_function_arn: Option<String>,
    function_name: Option<String>,
    header: Option<Arc<EventHeader>>,
}

impl Context {
    /// Create a context for the given runtime request id, with no deadline.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..Self::default()
        }
    }

    /// Set an absolute deadline for the invocation.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the deadline relative to now.
    ///
    /// A timeout too large to represent leaves the context without a deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    /// Set the ARN the function was invoked through.
    pub fn with_function_arn(mut self, arn: impl Into<String>) -> Self {
        self.invoked_function_arn = Some(arn.into());
        self
    }

    /// Set the name of the invoked function.
    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    /// Attach the metadata of the event being handled.
    pub fn with_header(mut self, header: impl Into<Arc<EventHeader>>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Runtime request id.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Absolute deadline, if the runtime imposed one.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// ARN the function was invoked through.
    pub fn invoked_function_arn(&self) -> Option<&str> {
        self.invoked_function_arn.as_deref()
    }

    /// Name of the invoked function.
    pub fn function_name(&self) -> Option<&str> {
        self.function_name.as_deref()
    }

    /// Metadata of the event being handled.
    ///
    /// Always set for contexts handed out by the dispatcher.
    pub fn header(&self) -> Option<&EventHeader> {
        self.header.as_deref()
    }

    /// Time left until the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Whether the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}
