//! Response conversion traits.

use crate::{error::BoxError, payload::RawValue};
use serde::Serialize;

/// What a single handler invocation produced: an optional result value, or
/// the error it raised.
pub type HandlerResult = Result<Option<RawValue>, BoxError>;

/// Trait for converting a handler's output into a [`HandlerResult`].
///
/// # Default Implementations
///
/// - `()` → success without a result
/// - `RawValue` / `String` → success with that result
/// - [`Json<T>`] → success with `T` encoded as JSON
/// - `Option<T>` → `None` is success without a result, `Some` delegates
/// - `Result<T, E>` → delegates to `T`, or fails with `E`
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `IntoOutcome`",
    label = "missing `IntoOutcome` implementation",
    note = "Handlers must return (), a RawValue, Json<T>, Option<_> or Result<_, E>."
)]
pub trait IntoOutcome {
    /// Convert the output into a handler result.
    fn into_outcome(self) -> HandlerResult;
}

/// Wraps a serializable handler result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl IntoOutcome for () {
    fn into_outcome(self) -> HandlerResult {
        Ok(None)
    }
}

impl IntoOutcome for RawValue {
    fn into_outcome(self) -> HandlerResult {
        Ok(Some(self))
    }
}

impl IntoOutcome for String {
    fn into_outcome(self) -> HandlerResult {
        Ok(Some(RawValue::String(self)))
    }
}

impl<T: Serialize> IntoOutcome for Json<T> {
    fn into_outcome(self) -> HandlerResult {
        match serde_json::to_value(&self.0) {
            Ok(value) => Ok(Some(value)),
            Err(e) => Err(Box::new(e)),
        }
    }
}

impl<T: IntoOutcome> IntoOutcome for Option<T> {
    fn into_outcome(self) -> HandlerResult {
        match self {
            Some(t) => t.into_outcome(),
            None => Ok(None),
        }
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: Into<BoxError>,
{
    fn into_outcome(self) -> HandlerResult {
        match self {
            Ok(t) => t.into_outcome(),
            Err(e) => Err(e.into()),
        }
    }
}
