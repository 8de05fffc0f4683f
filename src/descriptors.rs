//! Registration descriptors for introspection and diagnostics.

use crate::key::TypeKey;
use crate::lifetime::Lifetime;
use crate::registration::{Descriptor, Registry};

/// Snapshot of one registration in a container's local registry.
///
/// # Examples
///
/// ```rust
/// use wireup::{Container, Constructor, Injectable, Lifetime};
///
/// #[derive(Default)]
/// struct Database;
/// impl Injectable for Database {
///     fn constructors() -> Vec<Constructor<Self>> { vec![Constructor::from_default()] }
/// }
///
/// let container = Container::new();
/// container.configure(|c| {
///     c.add_keyed::<Database>("primary").as_singleton();
/// }).unwrap();
///
/// let descriptors = container.descriptors();
/// let db = descriptors.iter()
///     .find(|d| d.implementation_name().contains("Database"))
///     .unwrap();
/// assert_eq!(db.lifetime, Lifetime::Singleton);
/// assert_eq!(db.lookup_key(), Some("primary"));
/// ```
#[derive(Debug, Clone)]
pub struct DescriptorInfo {
    /// Contract the registration answers for
    pub contract: TypeKey,
    /// Implementation type built for it
    pub implementation: TypeKey,
    pub lifetime: Lifetime,
    lookup_key: String,
    /// Instances are enrolled with the messenger
    pub messaging: bool,
    /// Resolves to a pre-built instance
    pub bound: bool,
    /// Declared as the contract's default
    pub is_default: bool,
    /// Number of custom constructor arguments
    pub custom_arguments: usize,
}

impl DescriptorInfo {
    pub(crate) fn from_descriptor(descriptor: &Descriptor, registry: &Registry) -> Self {
        Self {
            contract: descriptor.contract,
            implementation: descriptor.implementation,
            lifetime: Lifetime::from_flag(descriptor.singleton),
            lookup_key: descriptor.lookup_key.clone(),
            messaging: descriptor.enrollment.is_some(),
            bound: descriptor.bound.is_some(),
            is_default: registry.is_default(descriptor),
            custom_arguments: descriptor.arguments.len(),
        }
    }

    /// Lookup key, `None` for unkeyed registrations.
    pub fn lookup_key(&self) -> Option<&str> {
        if self.lookup_key.is_empty() {
            None
        } else {
            Some(&self.lookup_key)
        }
    }

    pub fn contract_name(&self) -> &'static str {
        self.contract.display_name()
    }

    pub fn implementation_name(&self) -> &'static str {
        self.implementation.display_name()
    }
}
