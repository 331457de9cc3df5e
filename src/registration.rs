//! Binding tables and type-erased concrete descriptors.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::constructor::{Constructor, ErasedConstructor};
use crate::error::{DiError, DiResult};
use crate::key::{key_of_type, Key};
use crate::lifetime::Lifetime;
use crate::service::{Implements, Injectable, Service};

/// Type-erased Arc for storage
pub type AnyArc = Arc<dyn Any + Send + Sync>;

#[cfg(feature = "ahash")]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;

type UpcastFn = Arc<dyn Fn(AnyArc) -> DiResult<AnyArc> + Send + Sync>;

/// Descriptor of a concrete type: its key and its constructor set.
#[derive(Clone, Copy)]
pub struct ConcreteType {
    key: Key,
    constructors: fn() -> Vec<ErasedConstructor>,
}

impl ConcreteType {
    pub(crate) fn of<T: Injectable>() -> Self {
        Self {
            key: key_of_type::<T>(),
            constructors: erased_constructors::<T>,
        }
    }

    /// Key of the concrete type.
    pub fn key(&self) -> Key {
        self.key
    }

    pub(crate) fn constructors(&self) -> Vec<ErasedConstructor> {
        (self.constructors)()
    }
}

impl fmt::Debug for ConcreteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConcreteType").field(&self.key.display_name()).finish()
    }
}

fn erased_constructors<T: Injectable>() -> Vec<ErasedConstructor> {
    T::constructors().into_iter().map(Constructor::erase).collect()
}

/// One row of a binding table: what to build and how to present it as the
/// requested type.
#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) concrete: ConcreteType,
    upcast: Option<UpcastFn>,
}

impl Binding {
    pub(crate) fn new<I, C>() -> Self
    where
        I: ?Sized + Service,
        C: Implements<I>,
    {
        let upcast = move |any: AnyArc| -> DiResult<AnyArc> {
            let concrete = any
                .downcast::<C>()
                .map_err(|_| DiError::TypeMismatch(std::any::type_name::<C>()))?;
            Ok(I::into_any(C::upcast(concrete)))
        };
        Self {
            concrete: ConcreteType::of::<C>(),
            upcast: Some(Arc::new(upcast)),
        }
    }

    /// Binding used for self-resolution: the instance is already in the
    /// requested representation.
    pub(crate) fn identity(concrete: ConcreteType) -> Self {
        Self { concrete, upcast: None }
    }

    #[inline]
    pub(crate) fn present(&self, instance: AnyArc) -> DiResult<AnyArc> {
        match &self.upcast {
            Some(upcast) => upcast(instance),
            None => Ok(instance),
        }
    }
}

/// The transient and singleton binding tables.
#[derive(Default)]
pub(crate) struct Bindings {
    transient: Map<Key, Binding>,
    singleton: Map<Key, Binding>,
}

impl Bindings {
    /// Inserts a binding, replacing any previous one for the same key in
    /// the same table.
    pub(crate) fn insert(&mut self, lifetime: Lifetime, key: Key, binding: Binding) -> Option<Binding> {
        match lifetime {
            Lifetime::Transient => self.transient.insert(key, binding),
            Lifetime::Singleton => self.singleton.insert(key, binding),
        }
    }

    /// Looks a key up in the transient table, then the singleton table.
    pub(crate) fn lookup(&self, key: &Key) -> Option<(Lifetime, &Binding)> {
        self.transient
            .get(key)
            .map(|b| (Lifetime::Transient, b))
            .or_else(|| self.singleton.get(key).map(|b| (Lifetime::Singleton, b)))
    }

    /// Whether `concrete` is the target of any singleton binding.
    pub(crate) fn is_singleton(&self, concrete: &Key) -> bool {
        self.singleton.values().any(|b| &b.concrete.key == concrete)
    }

    pub(crate) fn len(&self) -> usize {
        self.transient.len() + self.singleton.len()
    }

    /// All bindings, transient table first.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, Lifetime, &Binding)> {
        self.transient
            .iter()
            .map(|(k, b)| (k, Lifetime::Transient, b))
            .chain(self.singleton.iter().map(|(k, b)| (k, Lifetime::Singleton, b)))
    }
}
