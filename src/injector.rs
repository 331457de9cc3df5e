//! The injector: binding tables, singleton cache and the resolution engine.

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::OnceCell;

use crate::constructor::{self, Arguments, Dependency};
use crate::descriptors::BindingDescriptor;
use crate::error::{DiError, DiResult};
use crate::internal::sync::{lock, read, write, Mutex, RwLock};
use crate::internal::ResolutionPath;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::observer::{DiObserver, Observers};
use crate::options::InjectorOptions;
use crate::registration::{AnyArc, Binding, Bindings, ConcreteType, Map};
use crate::service::{Implements, Service};

type SingletonSlot = Arc<OnceCell<AnyArc>>;

/// Dependency injection container.
///
/// Owns the transient and singleton binding tables and the cache of built
/// singletons. Cloning an `Injector` is cheap and yields another handle to
/// the same container; the state is dropped with the last handle
/// (including handles held by [`Provider`]s).
///
/// # Examples
///
/// ```
/// use ferrous_inject::{implements, interface, Constructor, Injectable, Injector};
/// use std::sync::Arc;
///
/// pub trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
/// interface!(dyn Greeter);
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
/// impl Injectable for English {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|_| Ok(English))]
///     }
/// }
/// implements!(English => dyn Greeter);
///
/// let injector = Injector::new();
/// injector.bind::<dyn Greeter, English>();
///
/// let provider = injector.get_provider::<dyn Greeter>().unwrap().unwrap();
/// assert_eq!(provider.get().unwrap().greet(), "hello");
/// ```
#[derive(Clone)]
pub struct Injector {
    inner: Arc<InjectorInner>,
}

struct InjectorInner {
    bindings: RwLock<Bindings>,
    singletons: Mutex<Map<Key, SingletonSlot>>,
    observers: RwLock<Observers>,
    // Concrete types whose constructor graph has been walked without finding
    // a cycle. Cleared whenever a binding changes.
    acyclic: Mutex<HashSet<Key>>,
    options: InjectorOptions,
}

impl Injector {
    /// Creates an empty injector with default options.
    pub fn new() -> Self {
        Self::with_options(InjectorOptions::default())
    }

    /// Creates an empty injector with the given options.
    pub fn with_options(options: InjectorOptions) -> Self {
        Self {
            inner: Arc::new(InjectorInner {
                bindings: RwLock::new(Bindings::default()),
                singletons: Mutex::new(Map::default()),
                observers: RwLock::new(Observers::default()),
                acyclic: Mutex::new(HashSet::new()),
                options,
            }),
        }
    }

    /// The options this injector was created with.
    pub fn options(&self) -> &InjectorOptions {
        &self.inner.options
    }

    /// Registers `C` as the transient implementation of `I`.
    ///
    /// Nothing is checked at bind time. A previous transient binding for `I`
    /// is replaced.
    pub fn bind<I, C>(&self) -> &Self
    where
        I: ?Sized + Service,
        C: Implements<I>,
    {
        self.insert_binding::<I, C>(Lifetime::Transient)
    }

    /// Registers `C` as the singleton implementation of `I`.
    ///
    /// The first instance of `C` built through any binding is cached and
    /// returned for every later request that maps to `C`.
    pub fn bind_singleton<I, C>(&self) -> &Self
    where
        I: ?Sized + Service,
        C: Implements<I>,
    {
        self.insert_binding::<I, C>(Lifetime::Singleton)
    }

    fn insert_binding<I, C>(&self, lifetime: Lifetime) -> &Self
    where
        I: ?Sized + Service,
        C: Implements<I>,
    {
        let key = I::key();
        let binding = Binding::new::<I, C>();
        let concrete = binding.concrete.key();
        let replaced = write(&self.inner.bindings).insert(lifetime, key, binding);
        lock(&self.inner.acyclic).clear();
        tracing::debug!(
            target: "ferrous_inject",
            requested = key.display_name(),
            concrete = concrete.display_name(),
            %lifetime,
            replaced = replaced.is_some(),
            "binding registered"
        );
        self
    }

    /// Registers an observer for resolution events.
    pub fn add_observer(&self, observer: Arc<dyn DiObserver>) -> &Self {
        write(&self.inner.observers).add(observer);
        self
    }

    /// Returns a deferred provider for `I`.
    ///
    /// - `I` is bound: the bound concrete type's constructor set is checked
    ///   (shallowly) and a provider is returned. Nothing is built yet.
    /// - `I` is an unbound concrete type: [`DiError::BindingNotFound`].
    /// - `I` is an unbound interface: `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`DiError::ConstructorNotFound`] when the concrete type has no usable
    /// constructor, or when its selected constructor takes parameters without
    /// the injection marker and [`InjectorOptions::require_marked_root`] is
    /// set. [`DiError::TooManyConstructors`] when several constructors are
    /// marked.
    pub fn get_provider<I: ?Sized + Service>(&self) -> DiResult<Option<Provider<I>>> {
        let key = I::key();
        let concrete = read(&self.inner.bindings)
            .lookup(&key)
            .map(|(_, binding)| binding.concrete);

        match concrete {
            Some(concrete) => {
                self.check_root_constructor(&concrete)?;
                Ok(Some(Provider::new(self.clone())))
            }
            None if key.is_interface() => {
                tracing::trace!(
                    target: "ferrous_inject",
                    requested = key.display_name(),
                    "no binding for interface, nothing to provide"
                );
                Ok(None)
            }
            None => Err(DiError::BindingNotFound(key.display_name())),
        }
    }

    /// Resolves `I` immediately.
    ///
    /// Unlike [`get_provider`](Self::get_provider), an unbound concrete type
    /// is built from its own constructors (self-resolution). An unbound
    /// interface is [`DiError::BindingNotFound`].
    pub fn resolve<I: ?Sized + Service>(&self) -> DiResult<Arc<I>> {
        let dependency = Dependency::of::<I>();
        let mut path = ResolutionPath::new(self.inner.options.max_depth);
        let any = self.resolve_dependency(&dependency, &mut path)?;
        I::from_any(any).ok_or(DiError::TypeMismatch(std::any::type_name::<I>()))
    }

    /// Describes every binding, sorted by requested type name.
    pub fn binding_descriptors(&self) -> Vec<BindingDescriptor> {
        let cache = lock(&self.inner.singletons);
        let mut descriptors: Vec<_> = read(&self.inner.bindings)
            .iter()
            .map(|(key, lifetime, binding)| {
                let concrete = binding.concrete.key();
                BindingDescriptor {
                    key: *key,
                    lifetime,
                    impl_key: concrete,
                    cached: cache.get(&concrete).map_or(false, |slot| slot.get().is_some()),
                }
            })
            .collect();
        descriptors.sort_by(|a, b| {
            a.type_name()
                .cmp(b.type_name())
                .then_with(|| a.lifetime.to_string().cmp(&b.lifetime.to_string()))
        });
        descriptors
    }

    /// Number of concrete types with a cached singleton instance.
    pub fn cached_singletons(&self) -> usize {
        lock(&self.inner.singletons)
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    /// Renders the binding tables as text, one line per binding with its
    /// concrete type, lifetime and whether a singleton instance is cached.
    ///
    /// Only available with the `diagnostics` feature.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Injector Debug ===\n");
        s.push_str("Bindings:\n");
        for d in self.binding_descriptors() {
            s.push_str(&format!(
                "  {} -> {} ({}){}\n",
                d.type_name(),
                d.impl_type_name(),
                d.lifetime,
                if d.cached { " [cached]" } else { "" }
            ));
        }
        s
    }

    // ----- Resolution engine -----

    pub(crate) fn bindings_len(&self) -> usize {
        read(&self.inner.bindings).len()
    }

    /// Finds the binding to use for a requested dependency: transient table,
    /// singleton table, then self-resolution.
    pub(crate) fn binding_for(&self, dependency: &Dependency) -> DiResult<Binding> {
        if let Some((_, binding)) = read(&self.inner.bindings).lookup(&dependency.key) {
            return Ok(binding.clone());
        }
        dependency
            .self_binding
            .map(Binding::identity)
            .ok_or(DiError::BindingNotFound(dependency.key.display_name()))
    }

    pub(crate) fn is_singleton(&self, concrete: &Key) -> bool {
        read(&self.inner.bindings).is_singleton(concrete)
    }

    pub(crate) fn cached(&self, concrete: &Key) -> Option<AnyArc> {
        lock(&self.inner.singletons)
            .get(concrete)
            .and_then(|slot| slot.get().cloned())
    }

    /// Every bound key with its concrete type, sorted by requested name.
    pub(crate) fn binding_roots(&self) -> Vec<(Key, ConcreteType)> {
        let mut roots: Vec<_> = read(&self.inner.bindings)
            .iter()
            .map(|(key, _, binding)| (*key, binding.concrete))
            .collect();
        roots.sort_by_key(|(key, _)| key.display_name());
        roots
    }

    pub(crate) fn check_root_constructor(&self, concrete: &ConcreteType) -> DiResult<()> {
        let selected = constructor::select(concrete.key(), concrete.constructors())?;
        if self.inner.options.require_marked_root && selected.arity() > 0 && !selected.marked {
            return Err(DiError::ConstructorNotFound(concrete.key().display_name()));
        }
        Ok(())
    }

    /// Snapshot of the observer list. No lock is held while observers run,
    /// so they may register further observers.
    fn observers(&self) -> Option<Observers> {
        let observers = read(&self.inner.observers);
        observers.has_observers().then(|| observers.clone())
    }

    fn resolve_dependency(&self, dependency: &Dependency, path: &mut ResolutionPath) -> DiResult<AnyArc> {
        let Some(observers) = self.observers() else {
            return self.resolve_uninstrumented(dependency, path);
        };

        let requested_from = path.requested_from();
        observers.resolving(&dependency.key, requested_from.as_ref());
        let start = Instant::now();
        let result = self.resolve_uninstrumented(dependency, path);
        match &result {
            Ok(_) => observers.resolved(&dependency.key, start.elapsed()),
            Err(err) => observers.resolution_failed(&dependency.key, err),
        }
        result
    }

    fn resolve_uninstrumented(&self, dependency: &Dependency, path: &mut ResolutionPath) -> DiResult<AnyArc> {
        let binding = self.binding_for(dependency)?;
        let concrete = binding.concrete;
        let concrete_key = concrete.key();

        if let Some(instance) = self.cached(&concrete_key) {
            return binding.present(instance);
        }

        let instance = if self.is_singleton(&concrete_key) {
            // Cycles must fail before any slot is entered: a slot being
            // initialized on this thread, or on another thread waiting for
            // one of ours, would block forever.
            self.ensure_acyclic(concrete, path)?;
            let slot = self.slot_for(concrete_key);
            path.with_entered(concrete_key, |path| {
                let mut built = false;
                let instance = slot
                    .get_or_try_init(|| {
                        built = true;
                        self.construct(&concrete, path)
                    })?
                    .clone();
                if built {
                    tracing::trace!(
                        target: "ferrous_inject",
                        concrete = concrete_key.display_name(),
                        "singleton cached"
                    );
                    if let Some(observers) = self.observers() {
                        observers.singleton_cached(&concrete_key);
                    }
                }
                Ok(instance)
            })?
        } else {
            path.with_entered(concrete_key, |path| self.construct(&concrete, path))?
        };

        binding.present(instance)
    }

    /// Walks the graph below a singleton before its slot is entered and
    /// fails with the cycle if there is one. Clean graphs are remembered
    /// until the next binding change.
    fn ensure_acyclic(&self, concrete: ConcreteType, path: &ResolutionPath) -> DiResult<()> {
        let key = concrete.key();
        if lock(&self.inner.acyclic).contains(&key) {
            return Ok(());
        }

        let errors = self.walk_from(concrete, path);
        if errors.is_empty() {
            lock(&self.inner.acyclic).insert(key);
            return Ok(());
        }

        // Other structural errors surface from the resolution itself
        match errors
            .into_iter()
            .find(|err| matches!(err, DiError::CyclicDependency(_) | DiError::DepthExceeded(_)))
        {
            Some(err) => {
                tracing::debug!(
                    target: "ferrous_inject",
                    concrete = key.display_name(),
                    error = %err,
                    "cycle found before entering singleton slot"
                );
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn slot_for(&self, concrete: Key) -> SingletonSlot {
        lock(&self.inner.singletons)
            .entry(concrete)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Selects a constructor, resolves its parameters in order and runs it.
    fn construct(&self, concrete: &ConcreteType, path: &mut ResolutionPath) -> DiResult<AnyArc> {
        let key = concrete.key();
        let name = key.display_name();
        let selected = constructor::select(key, concrete.constructors())?;
        tracing::trace!(
            target: "ferrous_inject",
            concrete = name,
            arity = selected.arity(),
            marked = selected.marked,
            depth = path.depth(),
            "constructor selected"
        );

        let mut values = Vec::with_capacity(selected.arity());
        for parameter in &selected.params {
            let value = self.resolve_dependency(parameter, path)?;
            values.push((parameter.key, value));
        }

        let mut arguments = Arguments::new(name, values);
        match catch_unwind(AssertUnwindSafe(|| (selected.build)(&mut arguments))) {
            Ok(Ok(instance)) => Ok(instance),
            Ok(Err(reason)) => Err(DiError::construction_failed(name, reason)),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                if let Some(observers) = self.observers() {
                    observers.factory_panic(&key, &message);
                }
                Err(DiError::construction_failed(name, format!("constructor panicked: {}", message)))
            }
        }
    }
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("bindings", &self.bindings_len())
            .field("cached_singletons", &self.cached_singletons())
            .field("options", &self.inner.options)
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Deferred, zero-argument factory for `I`.
///
/// Obtained from [`Injector::get_provider`]. Every [`get`](Self::get) runs a
/// full resolution against the injector's current bindings; singleton
/// bindings still hand out their cached instance.
pub struct Provider<I: ?Sized> {
    injector: Injector,
    _marker: PhantomData<fn() -> Arc<I>>,
}

impl<I: ?Sized + Service> Provider<I> {
    fn new(injector: Injector) -> Self {
        Self {
            injector,
            _marker: PhantomData,
        }
    }

    /// Resolves an instance.
    pub fn get(&self) -> DiResult<Arc<I>> {
        self.injector.resolve::<I>()
    }
}

impl<I: ?Sized> Clone for Provider<I> {
    fn clone(&self) -> Self {
        Self {
            injector: self.injector.clone(),
            _marker: PhantomData,
        }
    }
}

impl<I: ?Sized> fmt::Debug for Provider<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("service", &std::any::type_name::<I>())
            .finish()
    }
}
