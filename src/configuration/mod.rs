//! Configuration registry: staged registrations applied by
//! [`Container::configure`](crate::Container::configure).

pub mod module_system;
pub use module_system::RegistryModule;

use std::marker::PhantomData;
use std::sync::Arc;

use crate::constructor::{CustomArguments, Injectable};
use crate::error::DiError;
use crate::key::TypeKey;
use crate::messaging::{Messenger, Routes, Subscriber};
use crate::registration::{erase, AnyArc, Bound, Descriptor};
use crate::traits::{Dispose, Upcast};

/// Registrations staged by one `configure` call.
///
/// Every `add*` call appends a new registration, even for a contract that is
/// already registered, and returns a [`Registration`] handle for fluent
/// options.
///
/// # Examples
///
/// ```rust
/// use wireup::{implements, Container, Constructor, Injectable};
///
/// trait Simple: Send + Sync { fn name(&self) -> &'static str; }
///
/// #[derive(Default)]
/// struct First;
/// impl Simple for First { fn name(&self) -> &'static str { "first" } }
/// impl Injectable for First {
///     fn constructors() -> Vec<Constructor<Self>> { vec![Constructor::from_default()] }
/// }
///
/// #[derive(Default)]
/// struct Second;
/// impl Simple for Second { fn name(&self) -> &'static str { "second" } }
/// impl Injectable for Second {
///     fn constructors() -> Vec<Constructor<Self>> { vec![Constructor::from_default()] }
/// }
///
/// implements!(First => dyn Simple);
/// implements!(Second => dyn Simple);
///
/// let container = Container::new();
/// container.configure(|c| {
///     c.add_using::<dyn Simple, First>();
///     c.add_default::<dyn Simple, Second>();
/// }).unwrap();
///
/// assert_eq!(container.resolve::<dyn Simple>().unwrap().name(), "second");
/// let all: Vec<_> = container.resolve_all::<dyn Simple>().unwrap()
///     .iter().map(|s| s.name()).collect();
/// assert_eq!(all, ["first", "second"]);
/// ```
#[derive(Default)]
pub struct Configuration {
    descriptors: Vec<Descriptor>,
    /// Indices into `descriptors` declared as defaults
    defaults: Vec<usize>,
    /// First error raised while staging
    error: Option<DiError>,
}

impl Configuration {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, descriptor: Descriptor) -> &mut Descriptor {
        let index = self.descriptors.len();
        self.descriptors.push(descriptor);
        &mut self.descriptors[index]
    }

    /// Registers `T` as its own contract.
    pub fn add<T: Injectable>(&mut self) -> Registration<'_, T, T> {
        self.add_using_keyed::<T, T>("")
    }

    /// Registers `T` as its own contract under a lookup key.
    pub fn add_keyed<T: Injectable>(&mut self, key: impl Into<String>) -> Registration<'_, T, T> {
        self.add_using_keyed::<T, T>(key)
    }

    /// Registers `T` as an implementation of `I`.
    pub fn add_using<I, T>(&mut self) -> Registration<'_, I, T>
    where
        I: ?Sized + Send + Sync + 'static,
        T: Injectable + Upcast<I>,
    {
        self.add_using_keyed::<I, T>("")
    }

    /// Registers `T` as an implementation of `I` under a lookup key.
    pub fn add_using_keyed<I, T>(&mut self, key: impl Into<String>) -> Registration<'_, I, T>
    where
        I: ?Sized + Send + Sync + 'static,
        T: Injectable + Upcast<I>,
    {
        Registration::new(self.push(Descriptor::new::<I, T>(key.into())))
    }

    /// Registers `T` as an implementation of `I` and marks it as the one
    /// unkeyed resolution of `I` returns.
    ///
    /// A contract has at most one default per container; a second
    /// declaration fails the `configure` call.
    pub fn add_default<I, T>(&mut self) -> Registration<'_, I, T>
    where
        I: ?Sized + Send + Sync + 'static,
        T: Injectable + Upcast<I>,
    {
        let contract = TypeKey::of::<I>();
        if self.defaults.iter().any(|&i| self.descriptors[i].contract == contract) {
            self.fail(DiError::Configuration(format!(
                "a default implementation of {} is already declared",
                contract.display_name()
            )));
        }
        self.defaults.push(self.descriptors.len());
        Registration::new(self.push(Descriptor::new::<I, T>(String::new())))
    }

    /// Registers a pre-built instance for `I`. It is returned as-is on every
    /// resolution.
    pub fn bind<I: ?Sized + Send + Sync + 'static>(&mut self, instance: Arc<I>) -> &mut Self {
        self.push(Descriptor::shared(instance));
        self
    }

    /// Runs `module` against this configuration.
    pub fn add_registry<M: RegistryModule + ?Sized>(&mut self, module: &M) -> &mut Self {
        if let Err(error) = module.register(self) {
            let error = match error {
                DiError::Configuration(_) => error,
                other => DiError::Configuration(format!(
                    "registry module {} failed: {}",
                    std::any::type_name::<M>(),
                    other
                )),
            };
            self.fail(error);
        }
        self
    }

    /// Instantiates the parameterless module `M` and runs it.
    pub fn add_registry_default<M: RegistryModule + Default>(&mut self) -> &mut Self {
        self.add_registry(&M::default())
    }

    /// Number of registrations staged so far.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    fn fail(&mut self, error: DiError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Staged descriptors paired with their default flag, or the first
    /// staging error.
    pub(crate) fn finish(self) -> Result<Vec<(Descriptor, bool)>, DiError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let defaults = self.defaults;
        Ok(self
            .descriptors
            .into_iter()
            .enumerate()
            .map(|(i, d)| (d, defaults.contains(&i)))
            .collect())
    }
}

/// Fluent options for one registration of `T` under contract `I`.
pub struct Registration<'a, I: ?Sized, T> {
    descriptor: &'a mut Descriptor,
    _marker: PhantomData<(fn() -> Arc<I>, fn() -> T)>,
}

impl<'a, I, T> Registration<'a, I, T>
where
    I: ?Sized + Send + Sync + 'static,
    T: Injectable + Upcast<I>,
{
    fn new(descriptor: &'a mut Descriptor) -> Self {
        Self { descriptor, _marker: PhantomData }
    }

    /// One instance for the whole container tree, cached at the root.
    /// Rejected when configuring a child container.
    pub fn as_singleton(self) -> Self {
        self.descriptor.singleton = true;
        self
    }

    /// Enrolls every instance this registration constructs with the
    /// container's messenger.
    pub fn for_messaging(self) -> Self
    where
        T: Subscriber,
    {
        let routes = Arc::new(Routes::<T>::collect());
        self.descriptor.enrollment = Some(Arc::new(move |messenger: &Messenger, concrete: &AnyArc| {
            if let Some(instance) = concrete.downcast_ref::<Arc<T>>() {
                messenger.register(instance, routes.clone());
            }
        }));
        self
    }

    /// Returns `instance` for every resolution instead of constructing.
    pub fn bind_to(self, instance: T) -> Self {
        let concrete = Arc::new(instance);
        self.descriptor.bound = Some(Bound {
            instance: erase::<I>(concrete.clone().upcast()),
            concrete: erase(concrete),
        });
        self
    }

    /// Supplies constructor arguments by parameter name, replacing any set
    /// earlier.
    pub fn with_custom_constructor(self, arguments: CustomArguments) -> Self {
        self.descriptor.arguments = arguments;
        self
    }

    /// Releases the cached singleton through [`Dispose`] when the root
    /// container is torn down.
    pub fn disposable(self) -> Self
    where
        T: Dispose,
    {
        self.descriptor.releaser = Some(Arc::new(|concrete: &AnyArc| {
            if let Some(instance) = concrete.downcast_ref::<Arc<T>>() {
                instance.dispose();
            }
        }));
        self
    }

    /// Lookup key of this registration; empty when unkeyed.
    pub fn key(&self) -> &str {
        &self.descriptor.lookup_key
    }
}
