//! Constructor descriptors and argument binding.

use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, DiError, DiResult};
use crate::key::Key;
use crate::registration::{AnyArc, ConcreteType};
use crate::service::Service;

type BuildFn<T> = Box<dyn Fn(&mut Arguments) -> Result<T, BoxError> + Send + Sync>;

/// One constructor of an [`Injectable`](crate::Injectable) type.
///
/// A constructor is an ordered parameter list, an optional injection marker,
/// and the build function that turns resolved arguments into an instance.
/// Parameters are declared with [`param`](Self::param) in the same order the
/// build function pulls them from [`Arguments`].
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{Constructor, Injectable};
/// use std::sync::Arc;
///
/// struct Database;
/// impl Injectable for Database {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|_| Ok(Database))]
///     }
/// }
///
/// struct Repository { db: Option<Arc<Database>> }
/// impl Injectable for Repository {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![
///             // Ignored while another constructor carries the marker
///             Constructor::new(|_| Ok(Repository { db: None })),
///             Constructor::new(|args| Ok(Repository { db: Some(args.next::<Database>()?) }))
///                 .param::<Database>()
///                 .inject(),
///         ]
///     }
/// }
///
/// let ctors = Repository::constructors();
/// assert!(!ctors[0].is_marked());
/// assert!(ctors[1].is_marked());
/// assert_eq!(ctors[1].arity(), 1);
/// ```
pub struct Constructor<T> {
    params: Vec<Dependency>,
    marked: bool,
    build: BuildFn<T>,
}

impl<T: Send + Sync + 'static> Constructor<T> {
    /// Creates an unmarked constructor with no parameters.
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&mut Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            params: Vec::new(),
            marked: false,
            build: Box::new(build),
        }
    }

    /// Appends a parameter of type `P`.
    pub fn param<P: ?Sized + Service>(mut self) -> Self {
        self.params.push(Dependency::of::<P>());
        self
    }

    /// Marks this constructor as the one to use for injection.
    pub fn inject(mut self) -> Self {
        self.marked = true;
        self
    }

    /// Whether the constructor carries the injection marker.
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Declared parameter keys, in order.
    pub fn parameter_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.params.iter().map(|dep| dep.key)
    }

    pub(crate) fn erase(self) -> ErasedConstructor {
        let build = self.build;
        ErasedConstructor {
            params: self.params,
            marked: self.marked,
            build: Box::new(move |args: &mut Arguments| build(args).map(|value| Arc::new(value) as AnyArc)),
        }
    }
}

impl<T> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("params", &self.params.iter().map(|d| d.key.display_name()).collect::<Vec<_>>())
            .field("marked", &self.marked)
            .finish()
    }
}

/// A declared parameter: the requested key plus how to build it when no
/// binding exists.
#[derive(Clone, Copy)]
pub(crate) struct Dependency {
    pub(crate) key: Key,
    pub(crate) self_binding: Option<ConcreteType>,
}

impl Dependency {
    pub(crate) fn of<P: ?Sized + Service>() -> Self {
        Self {
            key: P::key(),
            self_binding: P::self_binding(),
        }
    }
}

pub(crate) struct ErasedConstructor {
    pub(crate) params: Vec<Dependency>,
    pub(crate) marked: bool,
    pub(crate) build: Box<dyn Fn(&mut Arguments) -> Result<AnyArc, BoxError> + Send + Sync>,
}

impl ErasedConstructor {
    pub(crate) fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Applies the constructor-selection policy.
///
/// One constructor is used unconditionally. With several, exactly one must
/// carry the marker.
pub(crate) fn select(
    owner: Key,
    mut constructors: Vec<ErasedConstructor>,
) -> DiResult<ErasedConstructor> {
    match constructors.len() {
        0 => Err(DiError::ConstructorNotFound(owner.display_name())),
        1 => constructors
            .pop()
            .ok_or(DiError::ConstructorNotFound(owner.display_name())),
        _ => {
            let mut marked: Vec<_> = constructors.into_iter().filter(|c| c.marked).collect();
            match marked.len() {
                0 => Err(DiError::ConstructorNotFound(owner.display_name())),
                1 => marked
                    .pop()
                    .ok_or(DiError::ConstructorNotFound(owner.display_name())),
                count => Err(DiError::TooManyConstructors(owner.display_name(), count)),
            }
        }
    }
}

/// Resolved constructor arguments, handed to the build function.
///
/// Arguments come out in declaration order; asking for a type other than
/// the one declared at that position is an error.
pub struct Arguments {
    owner: &'static str,
    values: std::vec::IntoIter<(Key, AnyArc)>,
    position: usize,
}

impl Arguments {
    pub(crate) fn new(owner: &'static str, values: Vec<(Key, AnyArc)>) -> Self {
        Self {
            owner,
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Takes the next argument as `P`.
    pub fn next<P: ?Sized + Service>(&mut self) -> Result<Arc<P>, ArgumentError> {
        let expected = P::key();
        let position = self.position;
        let (declared, value) = self.values.next().ok_or(ArgumentError::Missing {
            owner: self.owner,
            position,
            expected: expected.display_name(),
        })?;
        self.position += 1;

        if declared != expected {
            return Err(ArgumentError::Mismatch {
                owner: self.owner,
                position,
                expected: expected.display_name(),
                declared: declared.display_name(),
            });
        }

        P::from_any(value).ok_or(ArgumentError::Mismatch {
            owner: self.owner,
            position,
            expected: expected.display_name(),
            declared: declared.display_name(),
        })
    }

    /// Number of arguments not yet taken.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

/// Argument binding failure inside a build function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// The build function asked for more arguments than were declared
    Missing {
        owner: &'static str,
        position: usize,
        expected: &'static str,
    },
    /// The requested type differs from the declared parameter type
    Mismatch {
        owner: &'static str,
        position: usize,
        expected: &'static str,
        declared: &'static str,
    },
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentError::Missing { owner, position, expected } => write!(
                f,
                "{} requested argument #{} as {} but no such parameter was declared",
                owner, position, expected
            ),
            ArgumentError::Mismatch { owner, position, expected, declared } => write!(
                f,
                "{} requested argument #{} as {} but it was declared as {}",
                owner, position, expected, declared
            ),
        }
    }
}

impl std::error::Error for ArgumentError {}
