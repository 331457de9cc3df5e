//! Binding descriptors for introspection and diagnostics.

use crate::key::Key;
use crate::lifetime::Lifetime;

/// Binding descriptor for introspection and diagnostics
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{Constructor, Injectable, Injector, Lifetime};
///
/// struct Database;
/// impl Injectable for Database {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|_| Ok(Database))]
///     }
/// }
///
/// let injector = Injector::new();
/// injector.bind_singleton::<Database, Database>();
///
/// let descriptors = injector.binding_descriptors();
/// assert_eq!(descriptors.len(), 1);
/// assert_eq!(descriptors[0].lifetime, Lifetime::Singleton);
/// assert!(!descriptors[0].cached);
///
/// injector.resolve::<Database>().unwrap();
/// assert!(injector.binding_descriptors()[0].cached);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDescriptor {
    /// The requested type
    pub key: Key,
    /// Which table the binding lives in
    pub lifetime: Lifetime,
    /// The concrete type that gets built
    pub impl_key: Key,
    /// Whether an instance of the concrete type is in the singleton cache
    pub cached: bool,
}

impl BindingDescriptor {
    /// Name of the requested type.
    pub fn type_name(&self) -> &'static str {
        self.key.display_name()
    }

    /// Name of the concrete type.
    pub fn impl_type_name(&self) -> &'static str {
        self.impl_key.display_name()
    }

    /// Whether the requested type is an interface.
    pub fn is_interface(&self) -> bool {
        self.key.is_interface()
    }
}
