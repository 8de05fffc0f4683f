//! Type keys for the registry.

use std::any::TypeId;
use std::hash::{Hash, Hasher};

/// Identity of a requested contract or implementation type.
///
/// Keys group registrations in the registry. Equality and hashing use the
/// `TypeId` only; the name is carried along for diagnostics and error
/// messages.
///
/// # Examples
///
/// ```rust
/// use wireup::{TypeKey, key_of_type};
///
/// trait Logger: Send + Sync {}
///
/// let a = key_of_type::<dyn Logger>();
/// let b = TypeKey::of::<dyn Logger>();
/// assert_eq!(a, b);
/// assert!(a.display_name().contains("Logger"));
/// assert_ne!(a, key_of_type::<String>());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for the (possibly unsized) type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Human-readable type name (`std::any::type_name`).
    #[inline]
    pub fn display_name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Helper for creating type keys
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> TypeKey {
    TypeKey::of::<T>()
}
