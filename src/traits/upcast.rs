//! Coercion from an implementation to the contract it is registered under.

use std::sync::Arc;

/// Converts a shared implementation into a shared contract.
///
/// Every type upcasts to itself. For trait-object contracts use the
/// [`implements!`](crate::implements) macro, which writes the unsizing
/// coercion for you.
///
/// # Examples
///
/// ```
/// use wireup::{implements, Upcast};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// implements!(English => dyn Greeter);
///
/// let greeter: Arc<dyn Greeter> = Arc::new(English).upcast();
/// assert_eq!(greeter.greet(), "hello");
/// ```
pub trait Upcast<I: ?Sized + Send + Sync + 'static>: Send + Sync + 'static {
    /// Performs the coercion, keeping the same allocation.
    fn upcast(self: Arc<Self>) -> Arc<I>;
}

impl<T: Send + Sync + 'static> Upcast<T> for T {
    #[inline]
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Declares that an implementation type can be registered for one or more
/// trait-object contracts.
///
/// ```
/// use wireup::implements;
///
/// trait Reader: Send + Sync {}
/// trait Writer: Send + Sync {}
///
/// struct File;
/// impl Reader for File {}
/// impl Writer for File {}
///
/// implements!(File => dyn Reader, dyn Writer);
/// ```
#[macro_export]
macro_rules! implements {
    ($impl:ty => $($contract:ty),+ $(,)?) => {
        $(
            impl $crate::Upcast<$contract> for $impl {
                #[inline]
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$contract> {
                    self
                }
            }
        )+
    };
}
