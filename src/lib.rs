//! # ferrous-inject
//!
//! A small constructor-injection container: bind requested types to concrete
//! implementations, then ask for deferred providers or resolve instances
//! directly. Constructor parameters are resolved recursively.
//!
//! ## Features
//!
//! - **Interfaces and concrete types**: bind a trait object type or a struct
//!   to the concrete type that gets built
//! - **Two lifetimes**: transient (a fresh instance per request) and
//!   singleton (one instance per concrete type, shared by every binding
//!   that targets it)
//! - **Constructor selection**: a lone constructor is used as is; among
//!   several, exactly one must be marked with [`Constructor::inject`]
//! - **Cycle detection**: cyclic graphs fail with the offending path instead
//!   of overflowing the stack
//! - **Thread-safe**: the injector is `Send + Sync`, and each singleton is
//!   built at most once even under concurrent first requests
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_inject::{implements, interface, Constructor, Injectable, Injector};
//! use std::sync::{Arc, Mutex};
//!
//! pub trait Logger: Send + Sync {
//!     fn log(&self, message: &str);
//!     fn lines(&self) -> Vec<String>;
//! }
//!
//! pub trait Cache: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//!
//! interface!(dyn Logger, dyn Cache);
//!
//! #[derive(Default)]
//! struct MemoryLogger {
//!     lines: Mutex<Vec<String>>,
//! }
//!
//! impl Logger for MemoryLogger {
//!     fn log(&self, message: &str) {
//!         self.lines.lock().unwrap().push(message.to_string());
//!     }
//!     fn lines(&self) -> Vec<String> {
//!         self.lines.lock().unwrap().clone()
//!     }
//! }
//!
//! impl Injectable for MemoryLogger {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new(|_| Ok(MemoryLogger::default()))]
//!     }
//! }
//!
//! struct LruCache;
//! impl Cache for LruCache {
//!     fn name(&self) -> &'static str { "lru" }
//! }
//! impl Injectable for LruCache {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new(|_| Ok(LruCache))]
//!     }
//! }
//!
//! implements!(MemoryLogger => dyn Logger);
//! implements!(LruCache => dyn Cache);
//!
//! struct UserService {
//!     logger: Arc<dyn Logger>,
//!     cache: Arc<dyn Cache>,
//! }
//!
//! impl Injectable for UserService {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![
//!             Constructor::new(|args| {
//!                 Ok(UserService {
//!                     logger: args.next::<dyn Logger>()?,
//!                     cache: args.next::<dyn Cache>()?,
//!                 })
//!             })
//!             .param::<dyn Logger>()
//!             .param::<dyn Cache>()
//!             .inject(),
//!         ]
//!     }
//! }
//!
//! let injector = Injector::new();
//! injector
//!     .bind_singleton::<dyn Logger, MemoryLogger>()
//!     .bind::<dyn Cache, LruCache>()
//!     .bind::<UserService, UserService>();
//!
//! let provider = injector.get_provider::<UserService>().unwrap().unwrap();
//! let service = provider.get().unwrap();
//! service.logger.log(service.cache.name());
//!
//! // The logger is a singleton: the service saw the same instance.
//! let logger = injector.resolve::<dyn Logger>().unwrap();
//! assert_eq!(logger.lines(), vec!["lru".to_string()]);
//! ```
//!
//! ## Lookup Rules
//!
//! - [`Injector::get_provider`] on an unbound interface returns `Ok(None)`;
//!   on an unbound concrete type it fails with [`DiError::BindingNotFound`].
//! - Constructor parameters and [`Injector::resolve`] fall back to building
//!   an unbound concrete type from its own constructors. Unbound interfaces
//!   are always [`DiError::BindingNotFound`].
//! - Failures raised by a build function surface as
//!   [`DiError::ConstructionFailed`] with the original error as its source.

pub mod constructor;
pub mod descriptors;
pub mod error;
pub mod injector;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod options;
pub mod service;
pub mod validation;

// Internal modules
mod internal;
mod registration;

// Re-export core types
pub use constructor::{ArgumentError, Arguments, Constructor};
pub use descriptors::BindingDescriptor;
pub use error::{BoxError, DiError, DiResult};
pub use injector::{Injector, Provider};
pub use key::{key_of_trait, key_of_type, Key};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, LoggingObserver};
pub use options::InjectorOptions;
pub use registration::{AnyArc, ConcreteType};
pub use service::{Implements, Injectable, Service};
pub use validation::ValidationReport;
