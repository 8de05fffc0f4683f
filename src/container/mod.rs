//! The container: registry, singleton cache and parent link.
//!
//! A [`Container`] is a cheap-clone handle. Root containers own the
//! singleton cache; children created with [`Container::create_child`]
//! overlay their own registrations on top of their parent and bubble every
//! singleton request to the root.

mod resolve;
mod scope;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::ReentrantMutex;

use crate::internal::DisposeBag;
use crate::messaging::Messenger;
use crate::observer::Observers;
use crate::options::ContainerOptions;
use crate::registration::{AnyArc, DescriptorId, Registry};

/// Inversion-of-control container.
///
/// Every operation runs under one reentrant lock per container, so a
/// singleton is constructed at most once even under concurrent first
/// access, and constructors may resolve further dependencies on the same
/// thread.
///
/// Handles created by the caller own the tree: when the last of them (and
/// the last child) is dropped, the root is disposed. The handle a
/// constructor receives for a `Container` parameter does not own it, so a
/// singleton holding one does not keep its root alive.
///
/// # Examples
///
/// ```
/// use wireup::{Container, Constructor, Injectable};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct A;
/// impl Injectable for A {
///     fn constructors() -> Vec<Constructor<Self>> { vec![Constructor::from_default()] }
/// }
///
/// struct B { a: Arc<A> }
/// impl Injectable for B {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|args| Ok(B { a: args.take()? })).dependency::<A>("a")]
///     }
/// }
///
/// let container = Container::new();
/// container.configure(|c| {
///     c.add::<A>();
///     c.add::<B>();
/// }).unwrap();
///
/// let b = container.resolve::<B>().unwrap();
/// let _a: &A = &b.a;
/// assert!(container.resolve::<A>().is_ok());
/// ```
#[derive(Clone)]
pub struct Container {
    // dropped before `inner`, so teardown runs against a live container
    owner: Option<Arc<Owner>>,
    inner: Arc<ContainerInner>,
}

/// Held by every owning handle of a root. The last drop disposes the tree.
struct Owner {
    inner: Weak<ContainerInner>,
}

impl Drop for Owner {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            let released = inner.teardown();
            tracing::debug!(released, "released singletons on container drop");
        }
    }
}

pub(crate) struct ContainerInner {
    state: ReentrantMutex<RefCell<State>>,
    parent: Option<Container>,
    /// Shared by the whole container tree
    messenger: Arc<Messenger>,
    options: Arc<ContainerOptions>,
    observers: Observers,
    /// Set once the root is disposed; shared by the whole container tree
    disposed: Arc<AtomicBool>,
}

#[derive(Default)]
struct State {
    registry: Registry,
    /// Root only
    singletons: HashMap<DescriptorId, AnyArc>,
    disposers: DisposeBag,
    bootstrapped: bool,
}

/// Non-owning handle to a [`Container`].
#[derive(Clone)]
pub struct WeakContainer {
    inner: Weak<ContainerInner>,
    owner: Option<Weak<Owner>>,
}

impl WeakContainer {
    /// The container, if any handle to it is still alive.
    pub fn upgrade(&self) -> Option<Container> {
        let inner = self.inner.upgrade()?;
        let owner = self.owner.as_ref().and_then(Weak::upgrade);
        Some(Container { owner, inner })
    }
}

impl fmt::Debug for WeakContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakContainer")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl Container {
    fn from_parts(
        parent: Option<Container>,
        messenger: Arc<Messenger>,
        options: Arc<ContainerOptions>,
        disposed: Arc<AtomicBool>,
    ) -> Self {
        let observers = Observers::new(options.observers.clone());
        let is_root = parent.is_none();
        let inner = Arc::new(ContainerInner {
            state: ReentrantMutex::new(RefCell::new(State::default())),
            parent,
            messenger,
            options,
            observers,
            disposed,
        });
        let owner = is_root.then(|| Arc::new(Owner { inner: Arc::downgrade(&inner) }));
        Self { owner, inner }
    }

    /// Handle to the same container that does not keep its root from being
    /// disposed.
    pub(crate) fn unowned(&self) -> Container {
        Container { owner: None, inner: self.inner.clone() }
    }

    /// Non-owning handle to this container.
    pub fn downgrade(&self) -> WeakContainer {
        WeakContainer {
            inner: Arc::downgrade(&self.inner),
            owner: self.owner.as_ref().map(Arc::downgrade),
        }
    }

    /// Whether the container tree has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Options shared by this container's tree.
    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    /// Messenger shared by this container's tree.
    pub fn messenger(&self) -> &Arc<Messenger> {
        &self.inner.messenger
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Container {}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.inner.state.lock();
        let state = guard.borrow();
        f.debug_struct("Container")
            .field("root", &self.inner.parent.is_none())
            .field("owned", &self.owner.is_some())
            .field("registered_types", &state.registry.contract_count())
            .field("singletons", &state.singletons.len())
            .finish()
    }
}

impl ContainerInner {
    /// Marks the tree disposed, runs the pending release hooks and empties
    /// the singleton cache. Returns how many hooks ran; zero after the first
    /// call.
    fn teardown(&self) -> usize {
        let (pending, cached) = {
            let guard = self.state.lock();
            let mut state = guard.borrow_mut();
            if self.disposed.swap(true, Ordering::AcqRel) {
                return 0;
            }
            (state.disposers.take(), std::mem::take(&mut state.singletons))
        };
        let released = pending.run_all_reverse();
        // after the release hooks
        drop(cached);
        released
    }
}
