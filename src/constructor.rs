//! Constructor metadata supplied by implementation types.
//!
//! The container cannot inspect a type's constructors at runtime, so every
//! implementation it builds describes them through [`Injectable`]: an ordered
//! list of named, typed parameters plus a closure that assembles the value
//! from the resolved arguments.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::{Container, WeakContainer};
use crate::error::{BoxError, DiError, DiResult};
use crate::key::TypeKey;
use crate::registration::{erase, unerase, AnyArc, Descriptor, ImplicitFn};

/// A type the container knows how to build.
///
/// # Examples
///
/// ```rust
/// use wireup::{Container, Constructor, Injectable};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Engine;
/// impl Injectable for Engine {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::from_default()]
///     }
/// }
///
/// struct Car { engine: Arc<Engine> }
/// impl Injectable for Car {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|args| Ok(Car { engine: args.take()? }))
///             .dependency::<Engine>("engine")]
///     }
/// }
///
/// let container = Container::new();
/// let car = container.resolve_concrete::<Car>().unwrap();
/// let _engine: &Engine = &car.engine;
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Every public constructor of the type, in declaration order.
    fn constructors() -> Vec<Constructor<Self>>;
}

type BuildFn<T> = Arc<dyn Fn(&mut Arguments) -> Result<T, BoxError> + Send + Sync>;
type CollectFn = fn(Vec<AnyArc>) -> DiResult<AnyArc>;
type LazyFn = fn(WeakContainer) -> AnyArc;

/// How a parameter is satisfied when no custom argument names it.
#[derive(Clone, Copy)]
pub(crate) enum Shape {
    /// A single instance of the declared type
    Single { implicit: Option<ImplicitFn> },
    /// Every registered implementation, in registration order
    All { collect: CollectFn },
    /// A deferred factory resolving at call time
    Lazy { make: LazyFn },
}

/// One named constructor parameter.
#[derive(Clone, Copy)]
pub struct Parameter {
    pub(crate) name: &'static str,
    pub(crate) key: TypeKey,
    pub(crate) shape: Shape,
}

impl Parameter {
    /// Parameter name, matched against custom arguments.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared parameter type.
    pub fn type_key(&self) -> TypeKey {
        self.key
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self.shape {
            Shape::Single { .. } => "single",
            Shape::All { .. } => "all",
            Shape::Lazy { .. } => "lazy",
        };
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("type", &self.key.display_name())
            .field("shape", &shape)
            .finish()
    }
}

/// A constructor: ordered parameters and the closure that consumes them.
pub struct Constructor<T> {
    pub(crate) params: Vec<Parameter>,
    pub(crate) build: BuildFn<T>,
}

impl<T: Send + Sync + 'static> Constructor<T> {
    /// Creates a constructor from its build closure. Parameters are declared
    /// afterwards, in the order the closure consumes them.
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&mut Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self { params: Vec::new(), build: Arc::new(build) }
    }

    /// Parameterless constructor using `Default`.
    pub fn from_default() -> Self
    where
        T: Default,
    {
        Self::new(|_| Ok(T::default()))
    }

    /// Declares a parameter of any type, resolved from the registry.
    pub fn param<A: ?Sized + Send + Sync + 'static>(mut self, name: &'static str) -> Self {
        self.params.push(Parameter {
            name,
            key: TypeKey::of::<A>(),
            shape: Shape::Single { implicit: None },
        });
        self
    }

    /// Declares a concrete dependency, built directly when nothing is registered for it.
    pub fn dependency<D: Injectable>(mut self, name: &'static str) -> Self {
        self.params.push(Parameter {
            name,
            key: TypeKey::of::<D>(),
            shape: Shape::Single { implicit: Some(Descriptor::implicit::<D>) },
        });
        self
    }

    /// Declares a sequence parameter receiving every implementation of `I`.
    pub fn all<I: ?Sized + Send + Sync + 'static>(mut self, name: &'static str) -> Self {
        self.params.push(Parameter {
            name,
            key: TypeKey::of::<I>(),
            shape: Shape::All { collect: collect_all::<I> },
        });
        self
    }

    /// Declares a lazy factory parameter for `I`.
    pub fn lazy<I: ?Sized + Send + Sync + 'static>(mut self, name: &'static str) -> Self {
        self.params.push(Parameter {
            name,
            key: TypeKey::of::<I>(),
            shape: Shape::Lazy { make: make_lazy::<I> },
        });
        self
    }

    /// Declared parameters, in order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.params
    }
}

impl<T> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("type", &std::any::type_name::<T>())
            .field("params", &self.params)
            .finish()
    }
}

fn collect_all<I: ?Sized + Send + Sync + 'static>(values: Vec<AnyArc>) -> DiResult<AnyArc> {
    let items = values
        .iter()
        .map(unerase::<I>)
        .collect::<DiResult<Vec<Arc<I>>>>()?;
    Ok(Arc::new(items))
}

fn make_lazy<I: ?Sized + Send + Sync + 'static>(container: WeakContainer) -> AnyArc {
    Arc::new(Lazy::<I>::new(container))
}

/// Positional argument values handed to a constructor's build closure.
///
/// Each accessor consumes the next parameter in declaration order.
pub struct Arguments {
    values: std::vec::IntoIter<(&'static str, Option<AnyArc>)>,
}

impl Arguments {
    pub(crate) fn new(values: Vec<(&'static str, Option<AnyArc>)>) -> Self {
        Self { values: values.into_iter() }
    }

    fn next_value<A: ?Sized>(&mut self) -> DiResult<(&'static str, Option<AnyArc>)> {
        self.values
            .next()
            .ok_or(DiError::TypeMismatch(std::any::type_name::<A>()))
    }

    /// Next argument as a shared instance. Fails if the argument is null.
    pub fn take<A: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Arc<A>> {
        match self.next_value::<A>()? {
            (_, Some(value)) => unerase::<A>(&value),
            (name, None) => Err(DiError::NullArgument(name)),
        }
    }

    /// Next argument, `None` when a null custom argument was supplied.
    pub fn optional<A: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Option<Arc<A>>> {
        match self.next_value::<A>()? {
            (_, Some(value)) => unerase::<A>(&value).map(Some),
            (_, None) => Ok(None),
        }
    }

    /// Next argument cloned out of its shared wrapper.
    pub fn value<V: Clone + Send + Sync + 'static>(&mut self) -> DiResult<V> {
        self.take::<V>().map(|v| (*v).clone())
    }

    /// Next argument as a sequence declared with [`Constructor::all`].
    pub fn all<I: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Vec<Arc<I>>> {
        let (_, value) = self.next_value::<I>()?;
        value
            .and_then(|v| v.downcast_ref::<Vec<Arc<I>>>().cloned())
            .ok_or(DiError::TypeMismatch(std::any::type_name::<Vec<Arc<I>>>()))
    }

    /// Next argument as a factory declared with [`Constructor::lazy`].
    pub fn lazy<I: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Lazy<I>> {
        let (_, value) = self.next_value::<I>()?;
        value
            .and_then(|v| v.downcast_ref::<Lazy<I>>().cloned())
            .ok_or(DiError::TypeMismatch(std::any::type_name::<Lazy<I>>()))
    }

    /// Arguments not yet consumed.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

/// Literal constructor arguments keyed by parameter name.
///
/// Parameters named here receive the literal verbatim (including null);
/// every other parameter is resolved by type.
///
/// # Examples
///
/// ```rust
/// use wireup::CustomArguments;
///
/// let args = CustomArguments::new()
///     .with("count", 5i32)
///     .null("helper");
/// assert_eq!(args.len(), 2);
/// assert!(args.contains("count"));
/// ```
#[derive(Clone, Default)]
pub struct CustomArguments {
    values: HashMap<String, Option<AnyArc>>,
}

impl CustomArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies an owned literal for `name`.
    pub fn with<V: Send + Sync + 'static>(self, name: impl Into<String>, value: V) -> Self {
        self.with_shared(name, Arc::new(value))
    }

    /// Supplies a shared instance (possibly a trait object) for `name`.
    pub fn with_shared<A: ?Sized + Send + Sync + 'static>(mut self, name: impl Into<String>, value: Arc<A>) -> Self {
        self.values.insert(name.into(), Some(erase(value)));
        self
    }

    /// Supplies null for `name`.
    pub fn null(mut self, name: impl Into<String>) -> Self {
        self.values.insert(name.into(), None);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Option<AnyArc>> {
        self.values.get(name)
    }
}

impl fmt::Debug for CustomArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// A deferred resolution of `I`.
///
/// Returned for lazy-shaped parameters and by
/// [`Container::resolve_lazy`]; nothing is built until [`get`](Lazy::get)
/// runs. Holds the container weakly.
pub struct Lazy<I: ?Sized> {
    container: WeakContainer,
    _contract: PhantomData<fn() -> Arc<I>>,
}

impl<I: ?Sized + Send + Sync + 'static> Lazy<I> {
    pub(crate) fn new(container: WeakContainer) -> Self {
        Self { container, _contract: PhantomData }
    }

    /// Resolves `I` now.
    pub fn get(&self) -> DiResult<Arc<I>> {
        let container: Container = self.container.upgrade().ok_or(DiError::ContainerDropped)?;
        container.resolve::<I>()
    }
}

impl<I: ?Sized> Clone for Lazy<I> {
    fn clone(&self) -> Self {
        Self { container: self.container.clone(), _contract: PhantomData }
    }
}

impl<I: ?Sized> fmt::Debug for Lazy<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("contract", &std::any::type_name::<I>())
            .finish()
    }
}
