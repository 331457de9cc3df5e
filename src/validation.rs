//! Whole-graph verification of the binding tables.
//!
//! `get_provider` only checks the immediately bound type; a missing binding
//! or a cycle deeper in the graph surfaces when the provider is invoked.
//! [`Injector::validate`] walks every binding's constructor graph up front,
//! without building anything, and reports all structural errors at once.

use std::collections::HashSet;

use crate::constructor::{self, Dependency};
use crate::error::{DiError, DiResult};
use crate::injector::Injector;
use crate::internal::ResolutionPath;
use crate::key::Key;
use crate::registration::ConcreteType;

/// Result of [`Injector::validate`].
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Number of distinct concrete types whose constructor graph was walked
    pub checked: usize,
    /// Structural errors, in discovery order
    pub errors: Vec<DiError>,
}

impl ValidationReport {
    /// True when no structural error was found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turns the report into a result carrying the first error.
    pub fn into_result(self) -> DiResult<()> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Injector {
    /// Checks every binding without constructing anything.
    ///
    /// Every bound type is checked as a potential provider root: it gets the
    /// same root check [`get_provider`](Injector::get_provider) performs, so
    /// with [`InjectorOptions::require_marked_root`] set a binding whose lone
    /// constructor takes parameters without the marker is reported as
    /// [`DiError::ConstructorNotFound`], even when it is only ever reached
    /// as a nested parameter. Turn the option off to validate such bindings
    /// by nested-resolution rules only.
    ///
    /// Below the roots it reports [`DiError::BindingNotFound`] for unbound
    /// interfaces, [`DiError::ConstructorNotFound`] and
    /// [`DiError::TooManyConstructors`] for unusable constructor sets, and
    /// [`DiError::CyclicDependency`] for cycles. Types already in the
    /// singleton cache are treated as valid.
    ///
    /// [`InjectorOptions::require_marked_root`]: crate::InjectorOptions::require_marked_root
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_inject::{interface, Constructor, DiError, Injectable, Injector};
    /// use std::sync::Arc;
    ///
    /// pub trait Clock: Send + Sync {}
    /// interface!(dyn Clock);
    ///
    /// struct Scheduler { _clock: Arc<dyn Clock> }
    /// impl Injectable for Scheduler {
    ///     fn constructors() -> Vec<Constructor<Self>> {
    ///         vec![
    ///             Constructor::new(|args| Ok(Scheduler { _clock: args.next::<dyn Clock>()? }))
    ///                 .param::<dyn Clock>()
    ///                 .inject(),
    ///         ]
    ///     }
    /// }
    ///
    /// let injector = Injector::new();
    /// injector.bind::<Scheduler, Scheduler>();
    ///
    /// let report = injector.validate();
    /// assert!(!report.is_valid());
    /// assert!(matches!(report.errors[0], DiError::BindingNotFound(_)));
    /// ```
    pub fn validate(&self) -> ValidationReport {
        let mut walker = Walker::new(self);

        for (_, concrete) in self.binding_roots() {
            if let Err(err) = self.check_root_constructor(&concrete) {
                walker.report(err);
                continue;
            }
            let mut path = ResolutionPath::new(self.options().max_depth);
            walker.visit_concrete(concrete, &mut path);
        }

        tracing::debug!(
            target: "ferrous_inject",
            checked = walker.verified.len(),
            errors = walker.errors.len(),
            "binding graph validated"
        );

        ValidationReport {
            checked: walker.verified.len(),
            errors: walker.errors,
        }
    }

    /// Walks the constructor graph below `concrete` as if it were entered
    /// next on `path`, without building anything. Cycle paths include the
    /// frames already on `path`.
    pub(crate) fn walk_from(&self, concrete: ConcreteType, path: &ResolutionPath) -> Vec<DiError> {
        let mut walker = Walker::new(self);
        walker.visit_concrete(concrete, &mut path.clone());
        walker.errors
    }
}

struct Walker<'a> {
    injector: &'a Injector,
    verified: HashSet<Key>,
    reported: HashSet<String>,
    errors: Vec<DiError>,
}

impl<'a> Walker<'a> {
    fn new(injector: &'a Injector) -> Self {
        Self {
            injector,
            verified: HashSet::new(),
            reported: HashSet::new(),
            errors: Vec::new(),
        }
    }

    fn report(&mut self, err: DiError) {
        if self.reported.insert(err.to_string()) {
            self.errors.push(err);
        }
    }

    fn visit_dependency(&mut self, dependency: &Dependency, path: &mut ResolutionPath) {
        match self.injector.binding_for(dependency) {
            Ok(binding) => self.visit_concrete(binding.concrete, path),
            Err(err) => self.report(err),
        }
    }

    fn visit_concrete(&mut self, concrete: ConcreteType, path: &mut ResolutionPath) {
        let key = concrete.key();
        if self.verified.contains(&key) || self.injector.cached(&key).is_some() {
            return;
        }

        let result = path.with_entered(key, |path| {
            let selected = constructor::select(key, concrete.constructors())?;
            for parameter in &selected.params {
                self.visit_dependency(parameter, path);
            }
            Ok(())
        });

        match result {
            Ok(()) => {
                self.verified.insert(key);
            }
            Err(err) => self.report(err),
        }
    }
}
