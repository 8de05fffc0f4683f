//! Weak-lifetime publish/subscribe bus.
//!
//! Instances enrolled for messaging are observed through `Weak` handles, so
//! the bus never keeps a subscriber alive. Dead entries are pruned on the
//! next [`Messenger::send`].

mod message;

pub use message::{Delivery, Handle, Message, Routes, Subscriber};

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::{DiError, DiResult};

type Invocation = Arc<dyn Fn(&(dyn Any + Send + Sync)) + Send + Sync>;

/// One enrolled instance, erased over its concrete type.
trait Target: Send + Sync {
    fn implementation(&self) -> TypeId;
    fn is_dead(&self) -> bool;
    fn kill(&self);
    /// Strong invocation for messages of type `message`, if the instance is
    /// alive and handles it.
    fn bind(&self, message: TypeId) -> Option<Invocation>;
}

struct WeakTarget<T> {
    weak: Weak<T>,
    routes: Arc<Routes<T>>,
    killed: AtomicBool,
}

impl<T: Send + Sync + 'static> Target for WeakTarget<T> {
    fn implementation(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn is_dead(&self) -> bool {
        self.killed.load(Ordering::Acquire) || self.weak.strong_count() == 0
    }

    fn kill(&self) {
        self.killed.store(true, Ordering::Release);
    }

    fn bind(&self, message: TypeId) -> Option<Invocation> {
        if self.killed.load(Ordering::Acquire) {
            return None;
        }
        let route = self.routes.get(message)?.clone();
        let target = self.weak.upgrade()?;
        Some(Arc::new(move |message: &(dyn Any + Send + Sync)| route(&*target, message)))
    }
}

/// The messaging bus.
///
/// A container owns one `Messenger`, shared by all of its children; it can
/// also be used on its own.
///
/// # Examples
///
/// ```
/// use wireup::{Handle, Message, Messenger, Subscriber, Routes};
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
///
/// struct Ping;
/// impl Message for Ping {}
///
/// #[derive(Default)]
/// struct Listener { hits: AtomicI32 }
/// impl Handle<Ping> for Listener {
///     fn handle(&self, _: &Ping) { self.hits.fetch_add(1, Ordering::SeqCst); }
/// }
/// impl Subscriber for Listener {
///     fn subscribe(routes: &mut Routes<Self>) { routes.route::<Ping>(); }
/// }
///
/// let bus = Messenger::new();
/// let listener = Arc::new(Listener::default());
/// bus.subscribe(&listener);
///
/// assert_eq!(bus.send(Ping).unwrap(), 1);
/// assert_eq!(listener.hits.load(Ordering::SeqCst), 1);
///
/// drop(listener);
/// assert_eq!(bus.send(Ping).unwrap(), 0);
/// ```
#[derive(Default)]
pub struct Messenger {
    entries: Mutex<Vec<Box<dyn Target>>>,
}

impl Messenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enrolls `instance` with a prebuilt route table.
    pub fn register<T: Subscriber>(&self, instance: &Arc<T>, routes: Arc<Routes<T>>) {
        let entry = WeakTarget {
            weak: Arc::downgrade(instance),
            routes,
            killed: AtomicBool::new(false),
        };
        self.entries.lock().push(Box::new(entry));
        tracing::debug!(subscriber = std::any::type_name::<T>(), "enrolled for messaging");
    }

    /// Enrolls `instance`, collecting its routes from [`Subscriber::subscribe`].
    pub fn subscribe<T: Subscriber>(&self, instance: &Arc<T>) {
        self.register(instance, Arc::new(Routes::collect()));
    }

    /// Stops delivery to every live instance whose runtime type is
    /// `implementation`. The instances themselves are untouched.
    pub fn unregister(&self, implementation: TypeId) -> usize {
        let entries = self.entries.lock();
        let mut killed = 0;
        for entry in entries.iter() {
            if entry.implementation() == implementation && !entry.is_dead() {
                entry.kill();
                killed += 1;
            }
        }
        tracing::debug!(killed, "unregistered from messaging");
        killed
    }

    /// Broadcasts `message` to every live instance handling its type, in
    /// enrollment order. Returns the number of instances it was routed to.
    ///
    /// Handlers run outside the bus lock. Background invocations are
    /// fire-and-forget.
    pub fn send<M: Message>(&self, message: M) -> DiResult<usize> {
        let delivery = message.delivery();
        if !delivery.is_routable() {
            return Err(DiError::InvalidMessage(std::any::type_name::<M>()));
        }

        let invocations: Vec<Invocation> = {
            let mut entries = self.entries.lock();
            let before = entries.len();
            entries.retain(|entry| !entry.is_dead());
            let pruned = before - entries.len();
            if pruned > 0 {
                tracing::debug!(pruned, "pruned dead messaging entries");
            }
            entries
                .iter()
                .filter_map(|entry| entry.bind(TypeId::of::<M>()))
                .collect()
        };

        let message = Arc::new(message);
        for invocation in &invocations {
            if delivery.on_default {
                let payload: &(dyn Any + Send + Sync) = &*message;
                invocation(payload);
            }
            if delivery.in_background {
                let invocation = invocation.clone();
                let message = message.clone();
                spawn_detached(move || {
                    let payload: &(dyn Any + Send + Sync) = &*message;
                    invocation(payload);
                });
            }
        }

        tracing::trace!(
            message = std::any::type_name::<M>(),
            delivered = invocations.len(),
            "message sent"
        );
        Ok(invocations.len())
    }

    /// Number of entries still alive and not unregistered.
    pub fn live_count(&self) -> usize {
        self.entries.lock().iter().filter(|entry| !entry.is_dead()).count()
    }
}

impl fmt::Debug for Messenger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Messenger")
            .field("entries", &self.entries.lock().len())
            .finish()
    }
}

#[cfg(feature = "async")]
fn spawn_detached<F>(job: F)
where
    F: FnOnce() + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(job);
        }
        Err(_) => {
            std::thread::spawn(job);
        }
    }
}

#[cfg(not(feature = "async"))]
fn spawn_detached<F>(job: F)
where
    F: FnOnce() + Send + 'static,
{
    std::thread::spawn(job);
}
