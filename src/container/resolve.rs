//! Resolution engine.

use std::sync::Arc;
use std::time::Instant;

use super::Container;
use crate::constructor::{Arguments, Injectable, Lazy, Parameter, Shape};
use crate::error::{DiError, DiResult};
use crate::internal::StackGuard;
use crate::key::TypeKey;
use crate::options::ConstructorPolicy;
use crate::registration::{unerase, AnyArc, Built, Descriptor, ImplicitFn};

impl Container {
    /// Resolves the contract `I`.
    ///
    /// Uses the declared default if there is one, otherwise the first
    /// registration. A container without local registrations for `I` asks its
    /// parent. Fails with [`DiError::ResolutionNotFound`] when nothing in the
    /// chain knows `I`; see [`resolve_concrete`](Self::resolve_concrete) for
    /// building unregistered types.
    ///
    /// ```
    /// use wireup::{implements, Container, Constructor, Injectable};
    ///
    /// trait Clock: Send + Sync { fn now(&self) -> u64; }
    ///
    /// #[derive(Default)]
    /// struct Fixed;
    /// impl Clock for Fixed { fn now(&self) -> u64 { 42 } }
    /// impl Injectable for Fixed {
    ///     fn constructors() -> Vec<Constructor<Self>> { vec![Constructor::from_default()] }
    /// }
    /// implements!(Fixed => dyn Clock);
    ///
    /// let container = Container::new();
    /// container.configure(|c| { c.add_using::<dyn Clock, Fixed>(); }).unwrap();
    /// assert_eq!(container.resolve::<dyn Clock>().unwrap().now(), 42);
    /// ```
    pub fn resolve<I: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<I>> {
        let value = self.resolve_erased(TypeKey::of::<I>(), None)?;
        unerase::<I>(&value)
    }

    /// Resolves `T`, building it directly when nothing in the chain has
    /// registered it.
    pub fn resolve_concrete<T: Injectable>(&self) -> DiResult<Arc<T>> {
        let value = self.resolve_erased(TypeKey::of::<T>(), Some(Descriptor::implicit::<T>))?;
        unerase::<T>(&value)
    }

    /// Resolves the registration of `I` under `key`.
    ///
    /// The declared default wins if it carries `key`, otherwise the first
    /// registration with that key. Falls back to the parent when nothing
    /// matches locally.
    pub fn resolve_keyed<I: ?Sized + Send + Sync + 'static>(&self, key: &str) -> DiResult<Arc<I>> {
        let value = self.resolve_keyed_erased(TypeKey::of::<I>(), key)?;
        unerase::<I>(&value)
    }

    /// Resolves every registration of `I`, in registration order.
    ///
    /// Empty when `I` is registered nowhere in the chain.
    pub fn resolve_all<I: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Vec<Arc<I>>> {
        self.resolve_all_erased(TypeKey::of::<I>(), None, None)?
            .iter()
            .map(unerase::<I>)
            .collect()
    }

    /// Resolves every registration of `I` under `key`, in registration order.
    pub fn resolve_all_keyed<I: ?Sized + Send + Sync + 'static>(&self, key: &str) -> DiResult<Vec<Arc<I>>> {
        self.resolve_all_erased(TypeKey::of::<I>(), Some(key), None)?
            .iter()
            .map(unerase::<I>)
            .collect()
    }

    /// Like [`resolve_all`](Self::resolve_all), but an unregistered `T` yields
    /// one directly built instance.
    pub fn resolve_all_concrete<T: Injectable>(&self) -> DiResult<Vec<Arc<T>>> {
        self.resolve_all_erased(TypeKey::of::<T>(), None, Some(Descriptor::implicit::<T>))?
            .iter()
            .map(unerase::<T>)
            .collect()
    }

    /// Deferred resolution of `I`; nothing is built until [`Lazy::get`].
    ///
    /// ```
    /// use wireup::{Container, Constructor, Injectable};
    ///
    /// #[derive(Default)]
    /// struct Expensive;
    /// impl Injectable for Expensive {
    ///     fn constructors() -> Vec<Constructor<Self>> { vec![Constructor::from_default()] }
    /// }
    ///
    /// let container = Container::new();
    /// let lazy = container.resolve_lazy::<Expensive>();
    /// container.configure(|c| { c.add::<Expensive>(); }).unwrap();
    /// assert!(lazy.get().is_ok());
    /// ```
    pub fn resolve_lazy<I: ?Sized + Send + Sync + 'static>(&self) -> Lazy<I> {
        Lazy::new(self.downgrade())
    }

    pub(crate) fn resolve_erased(&self, contract: TypeKey, implicit: Option<ImplicitFn>) -> DiResult<AnyArc> {
        let guard = self.inner.state.lock();
        let selected = guard.borrow().registry.select(&contract);
        match selected {
            Some(descriptor) => self.activate(&descriptor),
            None => match (&self.inner.parent, implicit) {
                (Some(parent), _) => parent.resolve_erased(contract, implicit),
                (None, Some(make)) => self.activate(&Arc::new(make())),
                (None, None) => Err(DiError::ResolutionNotFound {
                    type_name: contract.display_name(),
                    key: None,
                }),
            },
        }
    }

    pub(crate) fn resolve_keyed_erased(&self, contract: TypeKey, key: &str) -> DiResult<AnyArc> {
        let guard = self.inner.state.lock();
        let selected = guard.borrow().registry.select_keyed(&contract, key);
        match (selected, &self.inner.parent) {
            (Some(descriptor), _) => self.activate(&descriptor),
            (None, Some(parent)) => parent.resolve_keyed_erased(contract, key),
            (None, None) => Err(DiError::ResolutionNotFound {
                type_name: contract.display_name(),
                key: Some(key.to_string()),
            }),
        }
    }

    pub(crate) fn resolve_all_erased(
        &self,
        contract: TypeKey,
        key: Option<&str>,
        implicit: Option<ImplicitFn>,
    ) -> DiResult<Vec<AnyArc>> {
        let guard = self.inner.state.lock();
        let local: Option<Vec<Arc<Descriptor>>> = guard.borrow().registry.get(&contract).map(|list| {
            list.iter()
                .filter(|d| key.map_or(true, |k| d.has_key(k)))
                .cloned()
                .collect()
        });
        match local {
            Some(descriptors) => descriptors.iter().map(|d| self.activate(d)).collect(),
            None => match (&self.inner.parent, implicit) {
                (Some(parent), _) => parent.resolve_all_erased(contract, key, implicit),
                (None, Some(make)) if key.is_none() => Ok(vec![self.activate(&Arc::new(make()))?]),
                (None, _) => Ok(Vec::new()),
            },
        }
    }

    /// Produces the instance for one descriptor: bound instance, cached
    /// singleton or a fresh construction.
    fn activate(&self, descriptor: &Arc<Descriptor>) -> DiResult<AnyArc> {
        if self.is_disposed() {
            return Err(DiError::Disposed);
        }
        if let Some(bound) = &descriptor.bound {
            return Ok(bound.instance.clone());
        }
        if !descriptor.singleton {
            return Ok(self.build(descriptor)?.instance);
        }
        if let Some(parent) = &self.inner.parent {
            return parent.activate(descriptor);
        }
        if descriptor.self_reference {
            return Ok(self.build(descriptor)?.instance);
        }

        let guard = self.inner.state.lock();
        // disposal happens under this lock
        if self.is_disposed() {
            return Err(DiError::Disposed);
        }
        let cached = guard.borrow().singletons.get(&descriptor.id).cloned();
        if let Some(instance) = cached {
            return Ok(instance);
        }

        let built = self.build(descriptor)?;
        let mut state = guard.borrow_mut();
        state.singletons.insert(descriptor.id, built.instance.clone());
        if let Some(releaser) = &descriptor.releaser {
            let releaser = releaser.clone();
            let concrete = built.concrete;
            state.disposers.push(
                descriptor.implementation.display_name(),
                Box::new(move || releaser(&concrete)),
            );
        }
        tracing::debug!(
            implementation = descriptor.implementation.display_name(),
            "cached singleton"
        );
        Ok(built.instance)
    }

    /// Runs the descriptor's activator and enrolls the result for messaging.
    fn build(&self, descriptor: &Descriptor) -> DiResult<Built> {
        let key = descriptor.implementation;
        let _guard = if self.inner.options.detect_cycles {
            Some(StackGuard::enter(key)?)
        } else {
            None
        };

        let observers = &self.inner.observers;
        let started = observers.has_observers().then(Instant::now);
        observers.resolving(&key);

        match (descriptor.activator)(self, descriptor) {
            Ok(built) => {
                if let Some(enroll) = &descriptor.enrollment {
                    enroll(&self.inner.messenger, &built.concrete);
                }
                if let Some(started) = started {
                    observers.resolved(&key, started.elapsed());
                }
                tracing::trace!(implementation = key.display_name(), "constructed");
                Ok(built)
            }
            Err(error) => {
                observers.instantiation_failed(&key, &error);
                Err(error)
            }
        }
    }

    /// Picks a constructor of `T`, resolves its arguments and invokes it.
    pub(crate) fn construct<T: Injectable>(&self, descriptor: &Descriptor) -> DiResult<T> {
        let type_name = std::any::type_name::<T>();
        let mut constructors = T::constructors();
        if constructors.is_empty() {
            return Err(DiError::instantiation(type_name, "no accessible constructor"));
        }
        if self.inner.options.constructor_policy == ConstructorPolicy::Strict && constructors.len() > 1 {
            return Err(DiError::UnsupportedConstructorShape {
                type_name,
                count: constructors.len(),
            });
        }

        let mut chosen = 0;
        for (index, constructor) in constructors.iter().enumerate() {
            if constructor.params.len() > constructors[chosen].params.len() {
                chosen = index;
            }
        }
        let constructor = constructors.swap_remove(chosen);

        let mut values = Vec::with_capacity(constructor.params.len());
        for param in &constructor.params {
            let value = match descriptor.arguments.get(param.name) {
                Some(literal) => literal.clone(),
                None => Some(
                    self.resolve_parameter(param)
                        .map_err(|error| wrap_dependency_error(type_name, error))?,
                ),
            };
            values.push((param.name, value));
        }

        let mut arguments = Arguments::new(values);
        (constructor.build)(&mut arguments).map_err(|source| DiError::instantiation(type_name, source))
    }

    fn resolve_parameter(&self, param: &Parameter) -> DiResult<AnyArc> {
        match param.shape {
            Shape::Single { implicit } => self.resolve_erased(param.key, implicit),
            Shape::All { collect } => collect(self.resolve_all_erased(param.key, None, None)?),
            Shape::Lazy { make } => Ok(make(self.downgrade())),
        }
    }
}

/// Attaches the dependent's name to a failed dependency. Cycles pass through
/// untouched so the caller sees the full path.
fn wrap_dependency_error(type_name: &'static str, error: DiError) -> DiError {
    match error {
        DiError::CyclicDependency(_) => error,
        other => DiError::instantiation(type_name, other),
    }
}
