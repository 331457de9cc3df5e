//! Declaring requestable types.
//!
//! Three traits describe what the injector can hand out:
//!
//! - [`Service`]: anything that can be requested, concrete or interface.
//! - [`Injectable`]: a concrete type with a declared constructor set.
//! - [`Implements<I>`]: the coercion from a concrete type to an interface
//!   it satisfies, used by bindings.
//!
//! Concrete types get [`Service`] for free by implementing [`Injectable`].
//! Interfaces are trait object types and are declared with the
//! [`interface!`](crate::interface) macro; the coercions with
//! [`implements!`](crate::implements).

use std::sync::Arc;

use crate::constructor::Constructor;
use crate::key::{key_of_type, Key};
use crate::registration::{AnyArc, ConcreteType};

/// A type that can be requested from the injector.
///
/// The erased representation stored in the tables is `Arc<T>` for concrete
/// types and `Arc<Arc<dyn Trait>>` for interfaces.
pub trait Service: Send + Sync + 'static {
    /// Binding-table key for this type.
    fn key() -> Key;

    #[doc(hidden)]
    fn into_any(this: Arc<Self>) -> AnyArc;

    #[doc(hidden)]
    fn from_any(any: AnyArc) -> Option<Arc<Self>>;

    /// Descriptor used when the type is resolved without a binding.
    ///
    /// Interfaces have none and can only be satisfied through a binding.
    #[doc(hidden)]
    fn self_binding() -> Option<ConcreteType> {
        None
    }
}

/// A concrete type the injector knows how to construct.
///
/// Lists every constructor the type exposes. With a single constructor the
/// injector uses it as is; with several, exactly one must be marked with
/// [`Constructor::inject`].
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{Constructor, Injectable};
/// use std::sync::Arc;
///
/// struct Config { port: u16 }
/// impl Injectable for Config {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|_| Ok(Config { port: 8080 }))]
///     }
/// }
///
/// struct Server { config: Arc<Config> }
/// impl Injectable for Server {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![
///             Constructor::new(|args| Ok(Server { config: args.next::<Config>()? }))
///                 .param::<Config>()
///                 .inject(),
///         ]
///     }
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// The accessible constructors of this type, in declaration order.
    fn constructors() -> Vec<Constructor<Self>>;
}

impl<T: Injectable> Service for T {
    #[inline]
    fn key() -> Key {
        key_of_type::<T>()
    }

    #[inline]
    fn into_any(this: Arc<Self>) -> AnyArc {
        this
    }

    #[inline]
    fn from_any(any: AnyArc) -> Option<Arc<Self>> {
        any.downcast::<T>().ok()
    }

    fn self_binding() -> Option<ConcreteType> {
        Some(ConcreteType::of::<T>())
    }
}

/// Coercion from a concrete type to a requested type `I`.
///
/// Every [`Injectable`] implements `Implements<Self>`, so a concrete type can
/// be bound to itself. Interface implementations are declared with
/// [`implements!`](crate::implements).
pub trait Implements<I: ?Sized + Service>: Injectable {
    /// Converts a constructed instance into the requested type.
    fn upcast(this: Arc<Self>) -> Arc<I>;
}

impl<T: Injectable> Implements<T> for T {
    #[inline]
    fn upcast(this: Arc<Self>) -> Arc<T> {
        this
    }
}

/// Declares trait object types as requestable interfaces.
///
/// The trait must have `Send + Sync` as supertraits.
///
/// ```rust
/// use ferrous_inject::interface;
///
/// pub trait Logger: Send + Sync {
///     fn log(&self, message: &str);
/// }
///
/// pub trait Cache: Send + Sync {}
///
/// interface!(dyn Logger, dyn Cache);
/// ```
#[macro_export]
macro_rules! interface {
    ($($iface:ty),+ $(,)?) => {
        $(
            impl $crate::Service for $iface {
                #[inline]
                fn key() -> $crate::Key {
                    $crate::key_of_trait::<$iface>()
                }

                #[inline]
                fn into_any(this: ::std::sync::Arc<Self>) -> $crate::AnyArc {
                    ::std::sync::Arc::new(this)
                }

                #[inline]
                fn from_any(any: $crate::AnyArc) -> ::std::option::Option<::std::sync::Arc<Self>> {
                    any.downcast::<::std::sync::Arc<$iface>>()
                        .ok()
                        .map(|inner| ::std::sync::Arc::clone(&*inner))
                }
            }
        )+
    };
}

/// Declares that a concrete type satisfies one or more interfaces.
///
/// ```rust
/// use ferrous_inject::{implements, interface, Constructor, Injectable};
///
/// pub trait Logger: Send + Sync {
///     fn log(&self, message: &str);
/// }
/// interface!(dyn Logger);
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, message: &str) { println!("{}", message); }
/// }
/// impl Injectable for ConsoleLogger {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|_| Ok(ConsoleLogger))]
///     }
/// }
///
/// implements!(ConsoleLogger => dyn Logger);
/// ```
#[macro_export]
macro_rules! implements {
    ($concrete:ty => $($iface:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$iface> for $concrete {
                #[inline]
                fn upcast(this: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$iface> {
                    this
                }
            }
        )+
    };
}
