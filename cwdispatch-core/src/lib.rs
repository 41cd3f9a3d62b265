//! # cwdispatch-core
//!
//! Core types for the cwdispatch event routing library.
//!
//! This crate has minimal dependencies and holds everything a handler author
//! needs to see: the envelope model, the handler trait, and the outcome
//! types. The registry, matcher and dispatcher live in `cwdispatch-std`.
//!
//! # Model
//!
//! ## Raw payload ([`payload`])
//!
//! Inbound bytes are parsed into a schema-less [`RawValue`] tree. Typed
//! payloads are decoded from that tree only once a handler has been chosen.
//!
//! ## Envelope ([`EventEnvelope`])
//!
//! The generic event wrapper: `source`, `detail-type`, metadata, and the
//! still-raw `detail`. Handlers see the metadata as an [`EventHeader`]
//! through [`Context::header`].
//!
//! ## Handler ([`Handler`])
//!
//! The terminal endpoint. Receives the decoded detail and a [`Context`],
//! returns anything implementing [`IntoOutcome`].
//!
//! ## Outcomes ([`Outcome`], [`DispatchResult`])
//!
//! Each matched registration produces exactly one [`Outcome`]; the dispatcher
//! folds them into a single [`DispatchResult`].
//!
//! # Error Types
//!
//! - [`CwDispatchError`] - Top-level error type
//! - [`DispatchError`] - Fatal parse errors
//! - [`DecodeError`] - Per-registration decode failures
//! - [`RegistrationError`] - Registry misuse

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod detail_type;
mod envelope;
mod error;
mod handler;
mod name_value;
mod outcome;
pub mod payload;
mod response;
mod result;

// Re-exports
pub use context::Context;
pub use detail_type::DetailType;
pub use envelope::{EventEnvelope, EventHeader};
pub use error::{
    BoxError, ConfigError, CwDispatchError, DecodeError, DispatchError, EnvelopeError,
    InvocationError, PayloadError, RegistrationError,
};
pub use handler::Handler;
pub use name_value::NameValueList;
pub use outcome::{Failure, FailureKind, HandlerOutcome, Outcome, RegistrationInfo};
pub use payload::{RawObject, RawValue, Shape};
pub use response::{HandlerResult, IntoOutcome, Json};
pub use result::DispatchResult;
