//! Descriptor and registry types.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::constructor::{CustomArguments, Injectable};
use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::key::TypeKey;
use crate::messaging::Messenger;
use crate::traits::Upcast;

// Type-erased Arc for storage. A resolved instance of contract `I` is stored
// as an `Arc<I>` boxed inside this, so unsized contracts erase the same way
// as concrete types.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Erases a shared instance of `I`.
#[inline]
pub(crate) fn erase<I: ?Sized + Send + Sync + 'static>(value: Arc<I>) -> AnyArc {
    Arc::new(value)
}

/// Recovers the `Arc<I>` stored by [`erase`].
#[inline]
pub(crate) fn unerase<I: ?Sized + Send + Sync + 'static>(value: &AnyArc) -> DiResult<Arc<I>> {
    value
        .downcast_ref::<Arc<I>>()
        .cloned()
        .ok_or(DiError::TypeMismatch(std::any::type_name::<I>()))
}

/// Output of an activation: the contract-typed instance and the concrete one.
pub(crate) struct Built {
    /// `Arc<I>` for the descriptor's contract
    pub(crate) instance: AnyArc,
    /// `Arc<T>` for the implementation type
    pub(crate) concrete: AnyArc,
}

pub(crate) type Activator = Arc<dyn Fn(&Container, &Descriptor) -> DiResult<Built> + Send + Sync>;
pub(crate) type Enrollment = Arc<dyn Fn(&Messenger, &AnyArc) + Send + Sync>;
pub(crate) type Releaser = Arc<dyn Fn(&AnyArc) + Send + Sync>;
pub(crate) type ImplicitFn = fn() -> Descriptor;

/// Process-unique identity of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct DescriptorId(u64);

impl DescriptorId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        DescriptorId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A pre-built instance attached to a descriptor.
#[derive(Clone)]
pub(crate) struct Bound {
    pub(crate) instance: AnyArc,
    pub(crate) concrete: AnyArc,
}

/// One implementation registration and its configured options
pub(crate) struct Descriptor {
    pub(crate) id: DescriptorId,
    pub(crate) contract: TypeKey,
    pub(crate) implementation: TypeKey,
    pub(crate) lookup_key: String,
    pub(crate) singleton: bool,
    pub(crate) enrollment: Option<Enrollment>,
    pub(crate) bound: Option<Bound>,
    pub(crate) arguments: CustomArguments,
    pub(crate) releaser: Option<Releaser>,
    pub(crate) activator: Activator,
    /// Root bootstrap entry resolving to the container itself
    pub(crate) self_reference: bool,
}

impl Descriptor {
    /// Descriptor building `T` for contract `I` through its constructors.
    pub(crate) fn new<I, T>(lookup_key: String) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        T: Injectable + Upcast<I>,
    {
        let activator = move |container: &Container, descriptor: &Descriptor| -> DiResult<Built> {
            let value = container.construct::<T>(descriptor)?;
            let concrete = Arc::new(value);
            Ok(Built {
                instance: erase::<I>(concrete.clone().upcast()),
                concrete: erase(concrete),
            })
        };
        Self {
            id: DescriptorId::next(),
            contract: TypeKey::of::<I>(),
            implementation: TypeKey::of::<T>(),
            lookup_key,
            singleton: false,
            enrollment: None,
            bound: None,
            arguments: CustomArguments::default(),
            releaser: None,
            activator: Arc::new(activator),
            self_reference: false,
        }
    }

    /// Descriptor for an unregistered concrete type requested directly.
    pub(crate) fn implicit<T: Injectable>() -> Self {
        Self::new::<T, T>(String::new())
    }

    /// Descriptor for a shared instance of a contract whose concrete type is unknown.
    pub(crate) fn shared<I: ?Sized + Send + Sync + 'static>(instance: Arc<I>) -> Self {
        let erased = erase(instance);
        let activator_value = erased.clone();
        Self {
            id: DescriptorId::next(),
            contract: TypeKey::of::<I>(),
            implementation: TypeKey::of::<I>(),
            lookup_key: String::new(),
            singleton: false,
            enrollment: None,
            bound: Some(Bound { instance: erased.clone(), concrete: erased }),
            arguments: CustomArguments::default(),
            releaser: None,
            activator: Arc::new(move |_: &Container, _: &Descriptor| {
                Ok(Built { instance: activator_value.clone(), concrete: activator_value.clone() })
            }),
            self_reference: false,
        }
    }

    /// Root bootstrap descriptor: `Container` resolves to an unowned handle
    /// of the root itself.
    pub(crate) fn container_self() -> Self {
        let activator = |container: &Container, _: &Descriptor| -> DiResult<Built> {
            let erased = erase(Arc::new(container.root().unowned()));
            Ok(Built { instance: erased.clone(), concrete: erased })
        };
        Self {
            id: DescriptorId::next(),
            contract: TypeKey::of::<Container>(),
            implementation: TypeKey::of::<Container>(),
            lookup_key: String::new(),
            singleton: true,
            enrollment: None,
            bound: None,
            arguments: CustomArguments::default(),
            releaser: None,
            activator: Arc::new(activator),
            self_reference: true,
        }
    }

    /// Whether the descriptor answers to `key`.
    #[inline]
    pub(crate) fn has_key(&self, key: &str) -> bool {
        self.lookup_key == key
    }
}

impl std::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("id", &self.id)
            .field("contract", &self.contract.display_name())
            .field("implementation", &self.implementation.display_name())
            .field("lookup_key", &self.lookup_key)
            .field("singleton", &self.singleton)
            .field("messaging", &self.enrollment.is_some())
            .field("bound", &self.bound.is_some())
            .field("arguments", &self.arguments)
            .finish()
    }
}

/// Registry holding all descriptors of one container
#[derive(Default)]
pub(crate) struct Registry {
    /// Descriptors per contract, in registration order (append-only)
    entries: HashMap<TypeKey, Vec<Arc<Descriptor>>>,
    /// Contract insertion order, for stable iteration
    order: Vec<TypeKey>,
    /// Designated default implementation per contract
    defaults: HashMap<TypeKey, Arc<Descriptor>>,
}

impl Registry {
    /// Appends a descriptor for its contract.
    pub(crate) fn insert(&mut self, descriptor: Arc<Descriptor>) {
        let contract = descriptor.contract;
        match self.entries.get_mut(&contract) {
            Some(list) => list.push(descriptor),
            None => {
                self.order.push(contract);
                self.entries.insert(contract, vec![descriptor]);
            }
        }
    }

    /// Marks an already inserted descriptor as the default for its contract.
    pub(crate) fn set_default(&mut self, descriptor: Arc<Descriptor>) {
        self.defaults.insert(descriptor.contract, descriptor);
    }

    #[inline]
    pub(crate) fn has_default(&self, contract: &TypeKey) -> bool {
        self.defaults.contains_key(contract)
    }

    #[inline]
    pub(crate) fn get(&self, contract: &TypeKey) -> Option<&[Arc<Descriptor>]> {
        self.entries.get(contract).map(Vec::as_slice)
    }

    #[inline]
    pub(crate) fn contains(&self, contract: &TypeKey) -> bool {
        self.entries.contains_key(contract)
    }

    /// Default override if declared, otherwise the first registered descriptor.
    pub(crate) fn select(&self, contract: &TypeKey) -> Option<Arc<Descriptor>> {
        let list = self.entries.get(contract)?;
        self.defaults
            .get(contract)
            .or_else(|| list.first())
            .cloned()
    }

    /// Like [`select`](Self::select) but restricted to descriptors under `key`.
    pub(crate) fn select_keyed(&self, contract: &TypeKey, key: &str) -> Option<Arc<Descriptor>> {
        let list = self.entries.get(contract)?;
        if let Some(default) = self.defaults.get(contract) {
            if default.has_key(key) {
                return Some(default.clone());
            }
        }
        list.iter().find(|d| d.has_key(key)).cloned()
    }

    /// Whether any descriptor of any contract answers to `key`.
    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.entries.values().flatten().any(|d| d.has_key(key))
    }

    /// Number of distinct contracts registered.
    #[inline]
    pub(crate) fn contract_count(&self) -> usize {
        self.entries.len()
    }

    /// Iterator over all descriptors in contract insertion order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<Descriptor>> {
        self.order
            .iter()
            .filter_map(|contract| self.entries.get(contract))
            .flatten()
    }

    /// Whether `descriptor` is the declared default for its contract.
    pub(crate) fn is_default(&self, descriptor: &Descriptor) -> bool {
        self.defaults
            .get(&descriptor.contract)
            .map_or(false, |d| d.id == descriptor.id)
    }
}
