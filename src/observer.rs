//! Diagnostic observers for resolution and dispatch events.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::key::TypeKey;

/// Observer trait for container events.
///
/// Observers are called synchronously on the resolving thread, so keep
/// implementations cheap.
///
/// # Examples
///
/// ```
/// use wireup::{Constructor, Container, ContainerOptions, DiObserver, Injectable, TypeKey};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Counting { built: AtomicUsize }
///
/// impl DiObserver for Counting {
///     fn resolving(&self, _key: &TypeKey) {}
///     fn resolved(&self, _key: &TypeKey, _elapsed: Duration) {
///         self.built.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// #[derive(Default)]
/// struct Service;
/// impl Injectable for Service {
///     fn constructors() -> Vec<Constructor<Self>> { vec![Constructor::from_default()] }
/// }
///
/// let observer = Arc::new(Counting::default());
/// let container = Container::with_options(ContainerOptions::new().observer(observer.clone()));
/// container.resolve_concrete::<Service>().unwrap();
/// assert_eq!(observer.built.load(Ordering::SeqCst), 1);
/// ```
pub trait DiObserver: Send + Sync {
    /// An implementation is about to be constructed.
    fn resolving(&self, key: &TypeKey);

    /// Construction of an implementation finished.
    fn resolved(&self, key: &TypeKey, elapsed: Duration);

    /// Construction of an implementation failed.
    fn instantiation_failed(&self, key: &TypeKey, error: &DiError) {
        let _ = (key, error);
    }

    /// A message was routed to `delivered` instances.
    fn message_sent(&self, message: &TypeKey, delivered: usize) {
        let _ = (message, delivered);
    }
}

/// Registered observers.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new(observers: Vec<Arc<dyn DiObserver>>) -> Self {
        Self { observers }
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, key: &TypeKey) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, key: &TypeKey, elapsed: Duration) {
        for observer in &self.observers {
            observer.resolved(key, elapsed);
        }
    }

    pub(crate) fn instantiation_failed(&self, key: &TypeKey, error: &DiError) {
        for observer in &self.observers {
            observer.instantiation_failed(key, error);
        }
    }

    pub(crate) fn message_sent(&self, message: &TypeKey, delivered: usize) {
        for observer in &self.observers {
            observer.message_sent(message, delivered);
        }
    }
}

/// Built-in observer forwarding events to `tracing`.
///
/// ```
/// use wireup::{Container, ContainerOptions, LoggingObserver};
/// use std::sync::Arc;
///
/// let options = ContainerOptions::new().observer(Arc::new(LoggingObserver::new()));
/// let _container = Container::with_options(options);
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self { prefix: "[wireup]".to_string() }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, key: &TypeKey) {
        tracing::debug!("{} Resolving: {}", self.prefix, key.display_name());
    }

    fn resolved(&self, key: &TypeKey, elapsed: Duration) {
        tracing::debug!("{} Resolved: {} in {:?}", self.prefix, key.display_name(), elapsed);
    }

    fn instantiation_failed(&self, key: &TypeKey, error: &DiError) {
        tracing::warn!("{} FAILED to build {}: {}", self.prefix, key.display_name(), error);
    }

    fn message_sent(&self, message: &TypeKey, delivered: usize) {
        tracing::debug!("{} Sent {} to {} handler(s)", self.prefix, message.display_name(), delivered);
    }
}
