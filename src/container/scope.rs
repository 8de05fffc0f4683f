//! Scope manager: container tree, configuration and lifecycle.

use std::any::TypeId;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::Container;
use crate::configuration::Configuration;
use crate::descriptors::DescriptorInfo;
use crate::error::{DiError, DiResult};
use crate::key::TypeKey;
use crate::messaging::{Message, Messenger};
use crate::options::ContainerOptions;
use crate::registration::Descriptor;

impl Container {
    /// Creates a root container with default options.
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    /// Creates a root container.
    pub fn with_options(options: ContainerOptions) -> Self {
        Self::from_parts(
            None,
            Arc::new(Messenger::new()),
            Arc::new(options),
            Arc::new(AtomicBool::new(false)),
        )
    }

    /// Creates a child whose unresolved lookups fall through to `self`.
    ///
    /// Children share the root's options, messenger and singleton cache, and
    /// cannot register singletons of their own.
    ///
    /// ```
    /// use wireup::{Container, Constructor, Injectable};
    /// use std::sync::Arc;
    ///
    /// #[derive(Default)]
    /// struct Settings;
    /// impl Injectable for Settings {
    ///     fn constructors() -> Vec<Constructor<Self>> { vec![Constructor::from_default()] }
    /// }
    ///
    /// let root = Container::new();
    /// root.configure(|c| { c.add::<Settings>().as_singleton(); }).unwrap();
    ///
    /// let child = root.create_child();
    /// let a = child.resolve::<Settings>().unwrap();
    /// let b = root.resolve::<Settings>().unwrap();
    /// assert!(Arc::ptr_eq(&a, &b));
    ///
    /// let refused = child.configure(|c| { c.add::<Settings>().as_singleton(); });
    /// assert!(refused.is_err());
    /// ```
    pub fn create_child(&self) -> Container {
        tracing::trace!("creating child container");
        Self::from_parts(
            Some(self.clone()),
            self.inner.messenger.clone(),
            self.inner.options.clone(),
            self.inner.disposed.clone(),
        )
    }

    /// The root of this container's tree.
    pub fn root(&self) -> Container {
        let mut current = self;
        while let Some(parent) = &current.inner.parent {
            current = parent;
        }
        current.clone()
    }

    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    pub fn parent(&self) -> Option<&Container> {
        self.inner.parent.as_ref()
    }

    /// Applies registrations staged by `f`.
    ///
    /// Registrations are appended; earlier ones are never removed. The first
    /// call on a root also registers [`Container`] as a singleton resolving
    /// to the root itself. Nothing is merged when `f` staged an error, when a
    /// child configuration marks anything singleton, or when a contract would
    /// get a second default.
    pub fn configure<F>(&self, f: F) -> DiResult<()>
    where
        F: FnOnce(&mut Configuration),
    {
        let guard = self.inner.state.lock();
        let bootstrap = self.is_root() && !guard.borrow().bootstrapped;

        let mut staged = Configuration::new();
        if bootstrap {
            staged.push(Descriptor::container_self());
        }
        f(&mut staged);
        let staged = staged.finish()?;

        if !self.is_root() {
            if let Some((descriptor, _)) = staged.iter().find(|(d, _)| d.singleton) {
                return Err(DiError::Configuration(format!(
                    "{} cannot be registered as a singleton in a child container",
                    descriptor.implementation.display_name()
                )));
            }
        }

        let mut state = guard.borrow_mut();
        for (descriptor, is_default) in &staged {
            if *is_default && state.registry.has_default(&descriptor.contract) {
                return Err(DiError::Configuration(format!(
                    "a default implementation of {} is already declared",
                    descriptor.contract.display_name()
                )));
            }
        }

        // a configure nested inside `f` may already have bootstrapped
        let already_bootstrapped = state.bootstrapped;
        let mut registered = 0;
        for (descriptor, is_default) in staged {
            if descriptor.self_reference && already_bootstrapped {
                continue;
            }
            registered += 1;
            let descriptor = Arc::new(descriptor);
            if is_default {
                state.registry.set_default(descriptor.clone());
            }
            state.registry.insert(descriptor);
        }
        state.bootstrapped = true;
        tracing::debug!(registered, root = self.is_root(), "configuration applied");
        Ok(())
    }

    /// Whether `I` has local registrations.
    pub fn contains<I: ?Sized + 'static>(&self) -> bool {
        let guard = self.inner.state.lock();
        let contains = guard.borrow().registry.contains(&TypeKey::of::<I>());
        contains
    }

    /// Whether `T` is locally registered as an implementation of `I`.
    pub fn contains_implementation<I: ?Sized + 'static, T: ?Sized + 'static>(&self) -> bool {
        let implementation = TypeKey::of::<T>();
        let guard = self.inner.state.lock();
        let state = guard.borrow();
        state
            .registry
            .get(&TypeKey::of::<I>())
            .map_or(false, |list| list.iter().any(|d| d.implementation == implementation))
    }

    /// Whether any local registration carries `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        let guard = self.inner.state.lock();
        let contains = guard.borrow().registry.contains_key(key);
        contains
    }

    /// Number of singleton instances held, the root container included.
    /// Always zero on a child.
    pub fn singleton_count(&self) -> usize {
        let guard = self.inner.state.lock();
        let state = guard.borrow();
        state.singletons.len() + usize::from(state.bootstrapped && self.is_root())
    }

    /// Number of distinct contracts registered locally.
    pub fn registered_type_count(&self) -> usize {
        let guard = self.inner.state.lock();
        let count = guard.borrow().registry.contract_count();
        count
    }

    /// Snapshot of the local registrations, in registration order per contract.
    pub fn descriptors(&self) -> Vec<DescriptorInfo> {
        let guard = self.inner.state.lock();
        let state = guard.borrow();
        state
            .registry
            .iter()
            .map(|d| DescriptorInfo::from_descriptor(d, &state.registry))
            .collect()
    }

    /// Releases every cached singleton registered as disposable, once, and
    /// empties the singleton cache. Returns how many were released.
    ///
    /// Afterwards every resolution in the tree fails with
    /// [`DiError::Disposed`]. Runs automatically when the last owning handle
    /// of a root container drops. Does nothing on a child.
    pub fn dispose(&self) -> usize {
        if !self.is_root() {
            return 0;
        }
        let released = self.inner.teardown();
        tracing::debug!(released, "container disposed");
        released
    }

    /// Broadcasts `message` to every live enrolled instance. Returns how many
    /// instances it was routed to.
    pub fn send<M: Message>(&self, message: M) -> DiResult<usize> {
        let delivered = self.inner.messenger.send(message)?;
        self.inner.observers.message_sent(&TypeKey::of::<M>(), delivered);
        Ok(delivered)
    }

    /// Stops message delivery to every live instance of `T`.
    pub fn unregister_for_messaging<T: 'static>(&self) -> usize {
        self.inner.messenger.unregister(TypeId::of::<T>())
    }

    /// Number of live enrolled instances.
    pub fn messaging_count(&self) -> usize {
        self.inner.messenger.live_count()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
