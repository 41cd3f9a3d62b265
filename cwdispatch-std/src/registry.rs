//! The registration list.

use crate::registration::Registration;
use cwdispatch_core::{DetailType, EventEnvelope, Handler, RegistrationError};
use serde::de::DeserializeOwned;

/// An ordered list of registrations.
///
/// Populated once at initialization, then frozen with
/// [`Registry::finalize`]. A frozen registry is read-only and can be shared
/// between concurrent dispatches without locking.
#[derive(Debug, Default)]
pub struct Registry {
    registrations: Vec<Registration>,
    finalized: bool,
}

impl Registry {
    /// Create an empty, open registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events matching `source` and `detail_type`,
    /// decoding the detail into `T`.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::Closed`] after [`Registry::finalize`].
    /// - [`RegistrationError::InvalidPattern`] for a malformed pattern.
    /// - [`RegistrationError::Duplicate`] when the pattern pair is taken.
    pub fn register<T, H>(
        &mut self,
        source: &str,
        detail_type: &str,
        handler: H,
    ) -> Result<&mut Self, RegistrationError>
    where
        T: DeserializeOwned + Send + 'static,
        H: Handler<T>,
    {
        self.ensure_open()?;
        self.add(Registration::new::<T, H>(source, detail_type, handler)?)
    }

    /// Register `handler` for the events `T` declares through [`DetailType`].
    pub fn on<T, H>(&mut self, handler: H) -> Result<&mut Self, RegistrationError>
    where
        T: DetailType,
        H: Handler<T>,
    {
        self.register::<T, H>(T::SOURCE, T::DETAIL_TYPE, handler)
    }

    /// Append a prepared registration.
    pub fn add(&mut self, mut registration: Registration) -> Result<&mut Self, RegistrationError> {
        self.ensure_open()?;

        if self
            .registrations
            .iter()
            .any(|existing| existing.same_patterns(&registration))
        {
            return Err(RegistrationError::Duplicate {
                source_pattern: registration.source().to_string(),
                detail_type: registration.detail_type().to_string(),
            });
        }

        registration.set_index(self.registrations.len());
        tracing::debug!(
            index = registration.index(),
            name = registration.name(),
            source = %registration.source(),
            detail_type = %registration.detail_type(),
            "handler registered"
        );
        self.registrations.push(registration);
        Ok(self)
    }

    /// Freeze the registry. Idempotent.
    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    /// Whether the registry has been frozen.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Registrations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.registrations.iter()
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Registrations that apply to `envelope`, in registration order.
    ///
    /// See [`crate::matcher::select`].
    pub fn matching(&self, envelope: &EventEnvelope) -> Vec<&Registration> {
        crate::matcher::select(self, envelope)
    }

    fn ensure_open(&self) -> Result<(), RegistrationError> {
        if self.finalized {
            Err(RegistrationError::Closed)
        } else {
            Ok(())
        }
    }
}
