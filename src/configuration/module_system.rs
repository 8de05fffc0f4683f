//! Registry modules for composing configuration from reusable units.

use crate::configuration::Configuration;
use crate::DiResult;

/// A reusable unit of registrations.
///
/// Modules are applied with [`Configuration::add_registry`] or, for
/// parameterless modules, [`Configuration::add_registry_default`]. A module
/// error aborts the whole `configure` call and nothing is merged.
///
/// # Example
///
/// ```rust
/// use wireup::{Configuration, Container, Constructor, DiResult, Injectable, RegistryModule};
///
/// #[derive(Default)]
/// struct UserStore;
/// impl Injectable for UserStore {
///     fn constructors() -> Vec<Constructor<Self>> { vec![Constructor::from_default()] }
/// }
///
/// #[derive(Default)]
/// struct UserModule;
///
/// impl RegistryModule for UserModule {
///     fn register(&self, config: &mut Configuration) -> DiResult<()> {
///         config.add::<UserStore>().as_singleton();
///         Ok(())
///     }
/// }
///
/// let container = Container::new();
/// container.configure(|c| {
///     c.add_registry_default::<UserModule>();
/// }).unwrap();
/// assert!(container.contains::<UserStore>());
/// ```
pub trait RegistryModule {
    /// Adds this module's registrations to `config`.
    fn register(&self, config: &mut Configuration) -> DiResult<()>;
}
