//! Error types for cwdispatch.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`CwDispatchError`] - Top-level error type for all cwdispatch operations
//! - [`DispatchError`] - Fatal errors that stop a dispatch before any handler runs
//! - [`PayloadError`] - The inbound bytes are not well-formed JSON
//! - [`EnvelopeError`] - Well-formed JSON that is not an event envelope
//! - [`DecodeError`] - An event detail does not fit a handler's payload type
//! - [`RegistrationError`] - Registry misuse at initialization time
//! - [`InvocationError`] - Faults raised around a handler invocation
//! - [`ConfigError`] - Invalid dispatcher configuration

use crate::payload::Shape;
use std::time::Duration;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all cwdispatch operations.
#[derive(Error, Debug)]
pub enum CwDispatchError {
    /// The inbound event could not be turned into an envelope.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A handler could not be registered.
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// The dispatcher configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors that abort a whole dispatch.
///
/// These are raised while parsing; no handler has been invoked when one is
/// returned.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The message is not well-formed JSON.
    #[error(transparent)]
    Parse(#[from] PayloadError),

    /// The message is JSON, but not an event envelope.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

/// Errors raised by the raw payload model.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// The message contained nothing but whitespace.
    #[error("message is empty")]
    Empty,

    /// The message is not valid JSON.
    #[error("failed to parse message as JSON")]
    Parse(#[source] serde_json::Error),

    /// A value could not be encoded back into a raw payload.
    #[error("failed to encode value as JSON")]
    Encode(#[source] serde_json::Error),
}

/// Errors raised while building an envelope from a raw payload.
#[derive(Error, Debug)]
pub enum EnvelopeError {
    /// The top-level value is not an object.
    #[error("received message is not an event (expected object, found {found})")]
    NotAnObject {
        /// Shape of the top-level value.
        found: Shape,
    },

    /// A required property is absent.
    #[error("received message is not an event (missing \"{0}\" property)")]
    MissingField(&'static str),

    /// A required string property is present but empty.
    #[error("received message is not an event (empty \"{0}\" property)")]
    EmptyField(&'static str),

    /// A property holds the wrong kind of value.
    #[error("property \"{field}\" must be {expected}, found {found}")]
    WrongType {
        /// Wire name of the property.
        field: &'static str,
        /// Shape the envelope requires.
        expected: Shape,
        /// Shape actually received.
        found: Shape,
    },

    /// The `time` property is not an RFC 3339 timestamp.
    #[error("property \"time\" is not an RFC 3339 timestamp: {value}")]
    InvalidTimestamp {
        /// The rejected text.
        value: String,
        /// Underlying parse failure.
        #[source]
        error: chrono::ParseError,
    },
}

/// The event detail could not be decoded into a handler's payload type.
#[derive(Error, Debug)]
#[error("cannot decode {actual_shape} into `{expected_type}`: {error}")]
pub struct DecodeError {
    /// Name of the payload type the handler expects.
    pub expected_type: &'static str,
    /// Shape of the detail that was received.
    pub actual_shape: Shape,
    #[source]
    error: serde_json::Error,
}

impl DecodeError {
    /// Create a decode error for target type `T`.
    pub fn new<T: ?Sized>(actual_shape: Shape, error: serde_json::Error) -> Self {
        Self {
            expected_type: std::any::type_name::<T>(),
            actual_shape,
            error,
        }
    }

    /// The underlying deserializer message (e.g. "missing field `instanceId`").
    pub fn reason(&self) -> String {
        self.error.to_string()
    }
}

/// Errors that can occur while registering handlers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The same (source, detail-type) pattern pair is already registered.
    #[error("a handler is already registered for source `{source_pattern}` and detail-type `{detail_type}`")]
    Duplicate {
        /// Source pattern of the rejected registration.
        source_pattern: String,
        /// Detail-type pattern of the rejected registration.
        detail_type: String,
    },

    /// The registry has been finalized.
    #[error("registry is finalized; no further handlers may be registered")]
    Closed,

    /// A match pattern is malformed.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Faults raised around a handler invocation, rather than by handler logic.
#[derive(Error, Debug)]
pub enum InvocationError {
    /// The handler panicked during execution.
    #[error("handler panicked: {0}")]
    Panic(String),

    /// The handler ran longer than its time limit.
    #[error("handler timed out after {0:?}")]
    Timeout(Duration),

    /// The invocation deadline passed before the handler was started.
    #[error("deadline exceeded before handler was started")]
    DeadlineExceeded,
}

/// Errors raised while loading dispatcher configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Unknown dispatch mode name.
    #[error("unknown dispatch mode `{0}` (expected `concurrent` or `sequential`)")]
    InvalidMode(String),

    /// A boolean setting has an unrecognized value.
    #[error("invalid boolean `{value}` for {key}")]
    InvalidFlag {
        /// Setting name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },

    /// A duration setting is not a whole number of milliseconds.
    #[error("invalid duration `{value}` for {key} (expected milliseconds)")]
    InvalidDuration {
        /// Setting name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },
}

// Convenience conversions
impl From<BoxError> for CwDispatchError {
    fn from(err: BoxError) -> Self {
        CwDispatchError::Custom(err)
    }
}

impl From<PayloadError> for CwDispatchError {
    fn from(err: PayloadError) -> Self {
        CwDispatchError::Dispatch(DispatchError::Parse(err))
    }
}

impl From<EnvelopeError> for CwDispatchError {
    fn from(err: EnvelopeError) -> Self {
        CwDispatchError::Dispatch(DispatchError::Envelope(err))
    }
}
