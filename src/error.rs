//! Error types for the injector.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Shared, type-erased error raised by a constructor's build function.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Dependency injection errors
///
/// Represents the conditions that can occur while looking up bindings,
/// selecting constructors, or building instances.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{DiError, Injectable, Constructor, Injector};
///
/// struct Unbound;
/// impl Injectable for Unbound {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|_| Ok(Unbound))]
///     }
/// }
///
/// let injector = Injector::new();
/// match injector.get_provider::<Unbound>() {
///     Err(DiError::BindingNotFound(name)) => assert!(name.ends_with("Unbound")),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_inject::DiError;
///
/// let cycle = DiError::CyclicDependency(vec!["A", "B", "A"]);
/// assert_eq!(cycle.to_string(), "Cyclic dependency: A -> B -> A");
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// A concrete type was requested through `get_provider` without a binding,
    /// or an interface with no binding had to be resolved
    BindingNotFound(&'static str),
    /// No usable constructor: none declared, several declared and none
    /// marked, or a provider root whose constructor is neither marked nor
    /// parameterless
    ConstructorNotFound(&'static str),
    /// More than one constructor carries the injection marker
    TooManyConstructors(&'static str, usize),
    /// Argument binding or the build function itself failed
    ConstructionFailed {
        type_name: &'static str,
        reason: Arc<dyn StdError + Send + Sync + 'static>,
    },
    /// Cyclic dependency detected (includes path)
    CyclicDependency(Vec<&'static str>),
    /// Maximum recursion depth exceeded
    DepthExceeded(usize),
    /// Type downcast failed
    TypeMismatch(&'static str),
}

impl DiError {
    /// Wraps a build failure for `type_name`.
    pub fn construction_failed(type_name: &'static str, reason: impl Into<BoxError>) -> Self {
        let reason: BoxError = reason.into();
        DiError::ConstructionFailed {
            type_name,
            reason: Arc::from(reason),
        }
    }

    /// True for errors caused by the binding or constructor configuration
    /// rather than by a build function at runtime.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, DiError::ConstructionFailed { .. })
    }
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::BindingNotFound(name) => write!(f, "Binding not found: {}", name),
            DiError::ConstructorNotFound(name) => {
                write!(f, "No injectable constructor found for: {}", name)
            }
            DiError::TooManyConstructors(name, count) => {
                write!(f, "{} constructors marked for injection on: {}", count, name)
            }
            DiError::ConstructionFailed { type_name, reason } => {
                write!(f, "Failed to construct {}: {}", type_name, reason)
            }
            DiError::CyclicDependency(path) => {
                write!(f, "Cyclic dependency: {}", path.join(" -> "))
            }
            DiError::DepthExceeded(depth) => write!(f, "Max depth {} exceeded", depth),
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
        }
    }
}

impl StdError for DiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DiError::ConstructionFailed { reason, .. } => Some(&**reason as &(dyn StdError + 'static)),
            _ => None,
        }
    }
}

/// Result type for DI operations
///
/// A convenience alias for `Result<T, DiError>` used throughout ferrous-inject.
pub type DiResult<T> = Result<T, DiError>;
