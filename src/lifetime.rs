//! Instance lifetimes.

/// How long a resolved instance lives.
///
/// # Examples
///
/// ```rust
/// use wireup::Lifetime;
///
/// assert_ne!(Lifetime::Singleton, Lifetime::Transient);
/// assert_eq!(Lifetime::default(), Lifetime::Transient);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
    /// One instance per registration, cached at the root container
    Singleton,
    /// A fresh instance per resolution
    #[default]
    Transient,
}

impl Lifetime {
    pub(crate) fn from_flag(singleton: bool) -> Self {
        if singleton {
            Lifetime::Singleton
        } else {
            Lifetime::Transient
        }
    }
}
