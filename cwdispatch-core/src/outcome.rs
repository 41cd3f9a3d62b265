//! Per-registration outcomes.

use crate::{
    error::{BoxError, DecodeError, InvocationError},
    payload::RawValue,
};
use serde::Serialize;
use std::{error::Error, fmt, sync::Arc};

/// Why a matched registration did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The event detail did not fit the registration's payload type; the
    /// handler was not invoked.
    DecodeFailed,
    /// The handler returned an error, panicked, or timed out.
    HandlerError,
    /// The invocation deadline passed before the handler could be started.
    DeadlineExceeded,
}

/// A failed outcome.
#[derive(Clone, Serialize)]
pub struct Failure {
    /// Failure category.
    pub kind: FailureKind,
    /// Human-readable description.
    pub message: String,
    /// The underlying error, if any.
    #[serde(skip)]
    pub cause: Option<Arc<dyn Error + Send + Sync>>,
}

impl Failure {
    /// The detail could not be decoded for this registration.
    pub fn decode(error: DecodeError) -> Self {
        Self {
            kind: FailureKind::DecodeFailed,
            message: error.to_string(),
            cause: Some(Arc::new(error)),
        }
    }

    /// Decoding the detail panicked; the handler was not invoked.
    pub fn decode_panicked(message: impl fmt::Display) -> Self {
        Self {
            kind: FailureKind::DecodeFailed,
            message: format!("decoding panicked: {message}"),
            cause: None,
        }
    }

    /// The handler raised `error`.
    pub fn handler(error: BoxError) -> Self {
        Self {
            kind: FailureKind::HandlerError,
            message: error.to_string(),
            cause: Some(Arc::from(error)),
        }
    }

    /// The handler never ran because the deadline had passed.
    pub fn deadline_exceeded() -> Self {
        let error = InvocationError::DeadlineExceeded;
        Self {
            kind: FailureKind::DeadlineExceeded,
            message: error.to_string(),
            cause: Some(Arc::new(error)),
        }
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failure")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("cause", &self.cause.as_ref().map(|c| c.to_string()))
            .finish()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Result of decoding and invoking one matched registration.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum HandlerOutcome {
    /// The handler completed, optionally producing a result.
    Success(Option<RawValue>),
    /// Decoding or invocation failed.
    Failure(Failure),
}

impl HandlerOutcome {
    /// Whether this is a [`HandlerOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, HandlerOutcome::Success(_))
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            HandlerOutcome::Failure(failure) => Some(failure),
            HandlerOutcome::Success(_) => None,
        }
    }

    /// The handler's result value, if it succeeded with one.
    pub fn value(&self) -> Option<&RawValue> {
        match self {
            HandlerOutcome::Success(value) => value.as_ref(),
            HandlerOutcome::Failure(_) => None,
        }
    }
}

impl From<crate::response::HandlerResult> for HandlerOutcome {
    fn from(result: crate::response::HandlerResult) -> Self {
        match result {
            Ok(value) => HandlerOutcome::Success(value),
            Err(error) => HandlerOutcome::Failure(Failure::handler(error)),
        }
    }
}

/// Identity of a registration, attached to every outcome it produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationInfo {
    /// Position in the registry (registration order).
    pub index: usize,
    /// Diagnostic name; defaults to the payload type name.
    pub name: String,
    /// Source pattern as registered.
    pub source: String,
    /// Detail-type pattern as registered.
    pub detail_type: String,
}

/// The outcome of one matched registration for one envelope.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    /// Which registration this outcome belongs to.
    pub registration: RegistrationInfo,
    /// What happened.
    pub status: HandlerOutcome,
}

impl Outcome {
    /// Whether the registration's handler succeeded.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
