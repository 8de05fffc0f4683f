//! Disposal trait for resource cleanup.

/// Trait for synchronous resource release.
///
/// Implement this for singletons that hold resources needing structured
/// teardown (flushing buffers, closing connections). A singleton registered
/// with [`disposable()`](crate::Registration::disposable) is released once,
/// when its root container is disposed or its last owning handle drops.
///
/// Implementing `Dispose` alone releases nothing: without `disposable()` on
/// the registration the container never calls [`dispose`](Dispose::dispose).
/// Transients and bound instances are never released by the container.
///
/// # Examples
///
/// ```
/// use wireup::{Container, Constructor, Dispose, Injectable};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Cache {
///     flushed: AtomicBool,
/// }
///
/// impl Injectable for Cache {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::from_default()]
///     }
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         self.flushed.store(true, Ordering::SeqCst);
///     }
/// }
///
/// let container = Container::new();
/// container.configure(|c| {
///     c.add::<Cache>().as_singleton().disposable();
/// }).unwrap();
///
/// let cache = container.resolve::<Cache>().unwrap();
/// container.dispose();
/// assert!(cache.flushed.load(Ordering::SeqCst));
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Releases the resources held by `self`.
    fn dispose(&self);
}
