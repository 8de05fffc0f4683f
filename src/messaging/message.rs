//! Message and handler traits.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Delivery configuration carried by every message.
///
/// `on_default` runs the handlers synchronously on the sending thread;
/// `in_background` additionally schedules an independent background
/// invocation per handler. A message selecting neither path is rejected by
/// [`Messenger::send`](crate::Messenger::send).
///
/// # Examples
///
/// ```
/// use wireup::Delivery;
///
/// let default = Delivery::default();
/// assert!(default.on_default && !default.in_background);
///
/// let both = Delivery::default().in_background();
/// assert!(both.on_default && both.in_background);
///
/// let sync_only = both.on_default_thread();
/// assert!(sync_only.on_default && !sync_only.in_background);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Delivery {
    /// Invoke handlers synchronously on the sending thread
    pub on_default: bool,
    /// Schedule a fire-and-forget background invocation
    pub in_background: bool,
}

impl Delivery {
    pub const fn new(on_default: bool, in_background: bool) -> Self {
        Self { on_default, in_background }
    }

    /// Also deliver in the background.
    pub const fn in_background(mut self) -> Self {
        self.in_background = true;
        self
    }

    /// Deliver on the sending thread only.
    pub const fn on_default_thread(mut self) -> Self {
        self.on_default = true;
        self.in_background = false;
        self
    }

    /// Deliver in the background only.
    pub const fn background_only() -> Self {
        Self::new(false, true)
    }

    /// Whether at least one delivery path is selected.
    #[inline]
    pub fn is_routable(&self) -> bool {
        self.on_default || self.in_background
    }
}

impl Default for Delivery {
    fn default() -> Self {
        Self::new(true, false)
    }
}

/// A broadcastable message.
///
/// The payload is the implementing type's own fields; `delivery` selects how
/// handlers are invoked.
///
/// ```
/// use wireup::{Delivery, Message};
///
/// struct AddMessage { how_much: i32 }
/// impl Message for AddMessage {}
///
/// struct Audit;
/// impl Message for Audit {
///     fn delivery(&self) -> Delivery { Delivery::background_only() }
/// }
///
/// assert_eq!(AddMessage { how_much: 1 }.delivery(), Delivery::default());
/// assert!(!Audit.delivery().on_default);
/// ```
pub trait Message: Any + Send + Sync {
    fn delivery(&self) -> Delivery {
        Delivery::default()
    }
}

/// A single-argument handler for messages of type `M`.
pub trait Handle<M: Message>: Send + Sync + 'static {
    fn handle(&self, message: &M);
}

/// Declares the handlers an enrolled type exposes.
///
/// # Examples
///
/// ```
/// use wireup::{Handle, Message, Routes, Subscriber};
/// use std::sync::atomic::{AtomicI32, Ordering};
///
/// struct AddMessage { how_much: i32 }
/// impl Message for AddMessage {}
///
/// struct Counter { count: AtomicI32 }
///
/// impl Handle<AddMessage> for Counter {
///     fn handle(&self, message: &AddMessage) {
///         self.count.fetch_add(message.how_much, Ordering::SeqCst);
///     }
/// }
///
/// impl Subscriber for Counter {
///     fn subscribe(routes: &mut Routes<Self>) {
///         routes.route::<AddMessage>();
///     }
/// }
///
/// let routes = Routes::<Counter>::collect();
/// assert!(routes.handles::<AddMessage>());
/// ```
pub trait Subscriber: Send + Sync + Sized + 'static {
    fn subscribe(routes: &mut Routes<Self>);
}

pub(crate) type RouteFn<T> = Arc<dyn Fn(&T, &(dyn Any + Send + Sync)) + Send + Sync>;

/// Handler table of one subscriber type, keyed by message type.
pub struct Routes<T> {
    handlers: HashMap<TypeId, RouteFn<T>>,
}

impl<T: Send + Sync + 'static> Routes<T> {
    fn new() -> Self {
        Self { handlers: HashMap::new() }
    }

    /// Runs `T::subscribe` against an empty table.
    pub fn collect() -> Self
    where
        T: Subscriber,
    {
        let mut routes = Self::new();
        T::subscribe(&mut routes);
        routes
    }

    /// Routes messages of type `M` to `T`'s `Handle<M>` impl.
    pub fn route<M: Message>(&mut self) -> &mut Self
    where
        T: Handle<M>,
    {
        let handler: RouteFn<T> = Arc::new(|target: &T, message: &(dyn Any + Send + Sync)| {
            if let Some(message) = message.downcast_ref::<M>() {
                Handle::<M>::handle(target, message);
            }
        });
        self.handlers.insert(TypeId::of::<M>(), handler);
        self
    }

    /// Whether a handler for `M` was routed.
    pub fn handles<M: Message>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<M>())
    }

    pub(crate) fn get(&self, message: TypeId) -> Option<&RouteFn<T>> {
        self.handlers.get(&message)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T> fmt::Debug for Routes<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Routes")
            .field("subscriber", &std::any::type_name::<T>())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
