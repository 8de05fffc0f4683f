//! Error types for the container.

use std::fmt;

/// Boxed error returned by constructor closures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Container errors
///
/// Represents the various error conditions that can occur while configuring a
/// container, building objects or dispatching messages. Every error surfaces
/// synchronously to the caller of the failing operation.
///
/// # Examples
///
/// ```rust
/// use wireup::{Container, DiError};
///
/// trait Unregistered: Send + Sync {}
///
/// let container = Container::new();
/// match container.resolve::<dyn Unregistered>() {
///     Err(DiError::ResolutionNotFound { type_name, key }) => {
///         assert!(type_name.contains("Unregistered"));
///         assert_eq!(key, None);
///     }
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use wireup::DiError;
///
/// let circular = DiError::CyclicDependency(vec!["ServiceA", "ServiceB", "ServiceA"]);
/// assert_eq!(circular.to_string(), "Cyclic dependency: ServiceA -> ServiceB -> ServiceA");
/// ```
#[derive(Debug)]
pub enum DiError {
    /// Invalid configuration (bad registry module, singleton on a child, duplicate default)
    Configuration(String),
    /// Constructing an implementation failed; carries the originating cause
    Instantiation {
        /// Implementation type that could not be built
        type_name: &'static str,
        /// Underlying failure
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    /// More than one constructor under the strict constructor policy
    UnsupportedConstructorShape {
        /// Implementation type with the ambiguous constructors
        type_name: &'static str,
        /// Number of declared constructors
        count: usize,
    },
    /// Nothing registered for the requested contract (or key) and no parent to ask
    ResolutionNotFound {
        /// Requested contract
        type_name: &'static str,
        /// Lookup key, when the request was keyed
        key: Option<String>,
    },
    /// Message selects neither synchronous nor background delivery
    InvalidMessage(&'static str),
    /// Cyclic dependency detected (includes path)
    CyclicDependency(Vec<&'static str>),
    /// A value had a different type than the one requested
    TypeMismatch(&'static str),
    /// A required constructor argument was supplied as null
    NullArgument(&'static str),
    /// A lazy factory outlived the container it resolves from
    ContainerDropped,
    /// The container tree was disposed; nothing more is built from it
    Disposed,
}

impl DiError {
    /// Wraps a construction failure for `type_name`.
    pub(crate) fn instantiation(type_name: &'static str, source: impl Into<BoxError>) -> Self {
        DiError::Instantiation { type_name, source: source.into() }
    }
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            DiError::Instantiation { type_name, source } => {
                write!(f, "Failed to create an instance of {}: {}", type_name, source)
            }
            DiError::UnsupportedConstructorShape { type_name, count } => {
                write!(f, "{} declares {} constructors; only one is supported", type_name, count)
            }
            DiError::ResolutionNotFound { type_name, key: None } => {
                write!(f, "No registration found for {}", type_name)
            }
            DiError::ResolutionNotFound { type_name, key: Some(key) } => {
                write!(f, "No registration found for {} with key '{}'", type_name, key)
            }
            DiError::InvalidMessage(msg) => write!(f, "Invalid message: {}", msg),
            DiError::CyclicDependency(path) => {
                write!(f, "Cyclic dependency: {}", path.join(" -> "))
            }
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::NullArgument(name) => write!(f, "Argument '{}' is null", name),
            DiError::ContainerDropped => write!(f, "Container was dropped before the lazy factory ran"),
            DiError::Disposed => write!(f, "Container has been disposed"),
        }
    }
}

impl std::error::Error for DiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiError::Instantiation { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type for container operations
///
/// # Examples
///
/// ```rust
/// use wireup::{DiResult, DiError};
///
/// fn failing_operation() -> DiResult<()> {
///     Err(DiError::InvalidMessage("no delivery path"))
/// }
///
/// assert!(failing_operation().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
