//! # cwdispatch - typed dispatch for cloud event notifications
//!
//! `cwdispatch` routes event envelopes (a `source`, a `detail-type` and a
//! JSON `detail`) to handlers registered for them, decodes the detail into
//! each handler's own payload type, and folds every handler's outcome into a
//! single [`DispatchResult`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cwdispatch::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! #[serde(rename_all = "kebab-case")]
//! struct StateChange {
//!     instance_id: String,
//!     state: String,
//! }
//!
//! async fn on_state_change(detail: StateChange, _ctx: Context) -> Result<(), BoxError> {
//!     tracing::info!(instance = %detail.instance_id, state = %detail.state);
//!     Ok(())
//! }
//!
//! let mut registry = Registry::new();
//! registry.register::<StateChange, _>(
//!     "aws.ec2",
//!     "EC2 Instance State-change Notification",
//!     on_state_change,
//! )?;
//!
//! let dispatcher = Dispatcher::new(registry);
//! let result = dispatcher.dispatch(&bytes, Context::new(request_id)).await?;
//! ```
//!
//! ## Matching
//!
//! Patterns are exact strings or a prefix ending in a single `*`. Exact
//! beats wildcard, and a longer prefix beats a shorter one; see
//! [`matcher`] for how the two axes combine.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use cwdispatch_core::{
    // Errors
    BoxError,
    ConfigError,
    // Context
    Context,
    CwDispatchError,
    DecodeError,
    // Payload binding
    DetailType,
    DispatchError,
    // Results
    DispatchResult,
    EnvelopeError,
    // Envelope
    EventEnvelope,
    EventHeader,
    Failure,
    FailureKind,
    // Handler
    Handler,
    HandlerOutcome,
    HandlerResult,
    IntoOutcome,
    InvocationError,
    Json,
    NameValueList,
    Outcome,
    PayloadError,
    // Raw payload
    RawObject,
    RawValue,
    RegistrationError,
    RegistrationInfo,
    Shape,
    payload,
};

pub use cwdispatch_std::{
    config::{DispatchMode, DispatcherConfig},
    dispatcher::Dispatcher,
    matcher,
    pattern::{Pattern, Specificity},
    registration::{EnvelopeFilter, Registration},
    registry::Registry,
};

/// Handler wrappers.
pub mod layers {
    pub use cwdispatch_std::layers::{InstrumentedHandler, TimeoutHandler};
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use cwdispatch_std::testing::*;
}

/// Prelude module - common imports for cwdispatch.
///
/// # Usage
///
/// ```rust,ignore
/// use cwdispatch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, Context, DetailType, DispatchError, DispatchResult, Dispatcher,
        DispatcherConfig, EventEnvelope, EventHeader, Handler, Json, Outcome, RawValue,
        Registration, Registry,
    };
}

#[cfg(feature = "macros")]
pub use cwdispatch_macros::DetailType;
