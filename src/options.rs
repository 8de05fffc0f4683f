//! Container options.

use std::fmt;
use std::sync::Arc;

use crate::observer::DiObserver;

/// How a constructor is chosen when a type declares several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum ConstructorPolicy {
    /// Pick the constructor with the most parameters; ties go to the first declared
    #[default]
    MostParameters,
    /// Reject types declaring more than one constructor
    Strict,
}

/// Options fixed when a root container is created. Children inherit them.
///
/// # Examples
///
/// ```rust
/// use wireup::{Container, ContainerOptions, ConstructorPolicy};
///
/// let options = ContainerOptions::new()
///     .constructor_policy(ConstructorPolicy::Strict)
///     .detect_cycles(false);
///
/// let container = Container::with_options(options);
/// assert_eq!(container.options().constructor_policy, ConstructorPolicy::Strict);
/// assert!(!container.create_child().options().detect_cycles);
/// ```
#[derive(Clone)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    pub constructor_policy: ConstructorPolicy,
    /// Reject re-entrant resolution of an implementation already being built
    pub detect_cycles: bool,
    #[cfg_attr(feature = "config", serde(skip))]
    pub(crate) observers: Vec<Arc<dyn DiObserver>>,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            constructor_policy: ConstructorPolicy::default(),
            detect_cycles: true,
            observers: Vec::new(),
        }
    }
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constructor_policy(mut self, policy: ConstructorPolicy) -> Self {
        self.constructor_policy = policy;
        self
    }

    pub fn detect_cycles(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }

    /// Adds a resolution observer.
    pub fn observer(mut self, observer: Arc<dyn DiObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Parses options from JSON. Missing fields take their defaults.
    ///
    /// ```rust
    /// use wireup::{ContainerOptions, ConstructorPolicy};
    ///
    /// let options = ContainerOptions::from_json(r#"{ "constructor_policy": "strict" }"#).unwrap();
    /// assert_eq!(options.constructor_policy, ConstructorPolicy::Strict);
    /// assert!(options.detect_cycles);
    /// ```
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> crate::DiResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| crate::DiError::Configuration(format!("invalid container options: {}", e)))
    }
}

impl fmt::Debug for ContainerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerOptions")
            .field("constructor_policy", &self.constructor_policy)
            .field("detect_cycles", &self.detect_cycles)
            .field("observers", &self.observers.len())
            .finish()
    }
}
