//! Handler registrations.
//!
//! A [`Registration`] binds a (source, detail-type) pattern pair to a typed
//! handler. The handler's payload type is erased behind [`ErasedHandler`] so
//! registrations for different types can share one registry, while decoding
//! still happens against the concrete type chosen at registration time.

use crate::pattern::{Pattern, Specificity};
use cwdispatch_core::{
    Context, DecodeError, EventEnvelope, Handler, HandlerResult, IntoOutcome, RawValue,
    RegistrationError, RegistrationInfo, payload,
};
use futures::{FutureExt, future::BoxFuture};
use serde::de::DeserializeOwned;
use std::{fmt, marker::PhantomData, sync::Arc};

/// Predicate applied to an envelope after both patterns matched.
pub type EnvelopeFilter = Arc<dyn Fn(&EventEnvelope) -> bool + Send + Sync>;

/// Type-erased handler.
///
/// Decodes the raw detail into the handler's payload type and, on success,
/// returns the not-yet-polled invocation future.
pub trait ErasedHandler: Send + Sync {
    /// Decode `detail` and prepare the call.
    ///
    /// The handler itself does not run until the returned future is polled.
    fn prepare<'a>(
        &'a self,
        detail: &RawValue,
        ctx: Context,
    ) -> Result<BoxFuture<'a, HandlerResult>, DecodeError>;
}

/// Wrapper implementing [`ErasedHandler`] for a typed handler.
pub struct TypedHandler<T, H> {
    handler: H,
    _payload: PhantomData<fn() -> T>,
}

impl<T, H> TypedHandler<T, H> {
    /// Wrap a typed handler.
    pub const fn new(handler: H) -> Self {
        Self {
            handler,
            _payload: PhantomData,
        }
    }
}

impl<T, H> ErasedHandler for TypedHandler<T, H>
where
    T: DeserializeOwned + Send + 'static,
    H: Handler<T>,
{
    fn prepare<'a>(
        &'a self,
        detail: &RawValue,
        ctx: Context,
    ) -> Result<BoxFuture<'a, HandlerResult>, DecodeError> {
        let payload: T = payload::decode(detail)?;
        Ok(async move { self.handler.call(payload, ctx).await.into_outcome() }.boxed())
    }
}

/// A pattern pair bound to a typed handler.
pub struct Registration {
    index: usize,
    name: String,
    source: Pattern,
    detail_type: Pattern,
    filter: Option<EnvelopeFilter>,
    handler: Box<dyn ErasedHandler>,
}

impl Registration {
    /// Bind `handler` to events matching `source` and `detail_type`.
    ///
    /// The event detail is decoded into `T` before the handler is called.
    /// The registration is named after `T` unless renamed with
    /// [`Registration::named`].
    pub fn new<T, H>(source: &str, detail_type: &str, handler: H) -> Result<Self, RegistrationError>
    where
        T: DeserializeOwned + Send + 'static,
        H: Handler<T>,
    {
        Ok(Self {
            index: 0,
            name: short_type_name::<T>().to_string(),
            source: Pattern::parse(source)?,
            detail_type: Pattern::parse(detail_type)?,
            filter: None,
            handler: Box::new(TypedHandler::<T, H>::new(handler)),
        })
    }

    /// Set the diagnostic name reported in outcomes and logs.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Only match envelopes accepted by `filter`, in addition to the patterns.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&EventEnvelope) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Position in the registry.
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Diagnostic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source pattern.
    pub fn source(&self) -> &Pattern {
        &self.source
    }

    /// Detail-type pattern.
    pub fn detail_type(&self) -> &Pattern {
        &self.detail_type
    }

    /// Whether both patterns are the same as `other`'s.
    pub fn same_patterns(&self, other: &Registration) -> bool {
        self.source == other.source && self.detail_type == other.detail_type
    }

    /// Per-axis specificity against `envelope`, or `None` when this
    /// registration does not apply to it.
    pub fn specificity(&self, envelope: &EventEnvelope) -> Option<(Specificity, Specificity)> {
        let source = self.source.specificity(envelope.source())?;
        let detail_type = self.detail_type.specificity(envelope.detail_type())?;
        if let Some(filter) = &self.filter {
            if !filter(envelope) {
                return None;
            }
        }
        Some((source, detail_type))
    }

    /// Decode the envelope detail and prepare the handler call.
    pub fn prepare<'a>(
        &'a self,
        detail: &RawValue,
        ctx: Context,
    ) -> Result<BoxFuture<'a, HandlerResult>, DecodeError> {
        self.handler.prepare(detail, ctx)
    }

    /// Identity attached to this registration's outcomes.
    pub fn info(&self) -> RegistrationInfo {
        RegistrationInfo {
            index: self.index,
            name: self.name.clone(),
            source: self.source.to_string(),
            detail_type: self.detail_type.to_string(),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("source", &self.source)
            .field("detail_type", &self.detail_type)
            .field("filtered", &self.filter.is_some())
            .finish_non_exhaustive()
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(at) => &full[at + 2..],
        None => full,
    }
}
