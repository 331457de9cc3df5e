//! Binding lifetime definitions.

/// Binding lifetimes controlling instance caching behavior
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{Injector, Injectable, Constructor};
/// use std::sync::Arc;
///
/// struct Clock;
/// impl Injectable for Clock {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|_| Ok(Clock))]
///     }
/// }
///
/// struct Pool;
/// impl Injectable for Pool {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|_| Ok(Pool))]
///     }
/// }
///
/// let injector = Injector::new();
/// injector.bind::<Clock, Clock>();
/// injector.bind_singleton::<Pool, Pool>();
///
/// // Transient: new instance every time
/// let c1 = injector.resolve::<Clock>().unwrap();
/// let c2 = injector.resolve::<Clock>().unwrap();
/// assert!(!Arc::ptr_eq(&c1, &c2));
///
/// // Singleton: same instance every time
/// let p1 = injector.resolve::<Pool>().unwrap();
/// let p2 = injector.resolve::<Pool>().unwrap();
/// assert!(Arc::ptr_eq(&p1, &p2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Single instance per injector, cached forever
    ///
    /// The cache is keyed by the concrete type, so every interface bound
    /// to the same concrete type shares the instance.
    Singleton,
    /// New instance per resolution, never cached
    Transient,
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lifetime::Singleton => f.write_str("singleton"),
            Lifetime::Transient => f.write_str("transient"),
        }
    }
}
