//! Handler wrappers.
//!
//! Each layer is itself a [`Handler`](cwdispatch_core::Handler), so layers
//! stack and can be registered like any other handler.

pub mod timeout;
pub mod tracing;

pub use self::tracing::InstrumentedHandler;
pub use timeout::TimeoutHandler;
