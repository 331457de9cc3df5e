//! Diagnostic observers for resolution events.
//!
//! Observers are the injector's logging seam: they see every resolution,
//! its timing, and every failure. [`LoggingObserver`] forwards the events to
//! `tracing`.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::key::Key;

/// Observer trait for resolution events.
///
/// Observer calls are made synchronously during resolution. Keep
/// implementations lightweight.
///
/// # Examples
///
/// ```
/// use ferrous_inject::{DiObserver, Injector, Key};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder {
///     events: Mutex<Vec<String>>,
/// }
///
/// impl DiObserver for Recorder {
///     fn resolving(&self, key: &Key, requested_from: Option<&Key>) {
///         let from = requested_from.map(|k| k.display_name()).unwrap_or("<root>");
///         self.events.lock().unwrap().push(format!("{} <- {}", key, from));
///     }
///
///     fn resolved(&self, key: &Key, _duration: Duration) {
///         self.events.lock().unwrap().push(format!("done {}", key));
///     }
/// }
///
/// let injector = Injector::new();
/// injector.add_observer(Arc::new(Recorder::default()));
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before a requested type is resolved.
    ///
    /// `requested_from` is the concrete type whose constructor needs this
    /// argument, or `None` for a top-level request.
    fn resolving(&self, key: &Key, requested_from: Option<&Key>);

    /// Called when a requested type was resolved successfully.
    fn resolved(&self, key: &Key, duration: Duration);

    /// Called when resolving a requested type failed.
    fn resolution_failed(&self, key: &Key, error: &DiError) {
        let _ = (key, error);
    }

    /// Called when a constructor's build function panicked. The panic is
    /// reported to the caller as [`DiError::ConstructionFailed`].
    fn factory_panic(&self, key: &Key, message: &str) {
        let _ = (key, message);
    }

    /// Called when a singleton instance is stored in the cache.
    fn singleton_cached(&self, concrete: &Key) {
        let _ = concrete;
    }
}

/// Collection of observers.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    /// Returns true if any observers are registered.
    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn resolving(&self, key: &Key, requested_from: Option<&Key>) {
        for observer in &self.observers {
            observer.resolving(key, requested_from);
        }
    }

    pub(crate) fn resolved(&self, key: &Key, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    pub(crate) fn resolution_failed(&self, key: &Key, error: &DiError) {
        for observer in &self.observers {
            observer.resolution_failed(key, error);
        }
    }

    pub(crate) fn factory_panic(&self, key: &Key, message: &str) {
        for observer in &self.observers {
            observer.factory_panic(key, message);
        }
    }

    pub(crate) fn singleton_cached(&self, concrete: &Key) {
        for observer in &self.observers {
            observer.singleton_cached(concrete);
        }
    }
}

/// Built-in observer that emits `tracing` events.
///
/// Resolutions are logged at `DEBUG`, failures at `WARN`, build panics at
/// `ERROR`, all under the `ferrous_inject` target.
///
/// # Examples
///
/// ```
/// use ferrous_inject::{Injector, LoggingObserver};
/// use std::sync::Arc;
///
/// let injector = Injector::new();
/// injector.add_observer(Arc::new(LoggingObserver::new()));
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a new logging observer with default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "[ferrous-inject]".to_string(),
        }
    }

    /// Creates a new logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, key: &Key, requested_from: Option<&Key>) {
        tracing::debug!(
            target: "ferrous_inject",
            prefix = %self.prefix,
            service = key.display_name(),
            requested_from = requested_from.map(Key::display_name),
            "resolving"
        );
    }

    fn resolved(&self, key: &Key, duration: Duration) {
        tracing::debug!(
            target: "ferrous_inject",
            prefix = %self.prefix,
            service = key.display_name(),
            elapsed_us = duration.as_micros() as u64,
            "resolved"
        );
    }

    fn resolution_failed(&self, key: &Key, error: &DiError) {
        tracing::warn!(
            target: "ferrous_inject",
            prefix = %self.prefix,
            service = key.display_name(),
            error = %error,
            "resolution failed"
        );
    }

    fn factory_panic(&self, key: &Key, message: &str) {
        tracing::error!(
            target: "ferrous_inject",
            prefix = %self.prefix,
            service = key.display_name(),
            panic = message,
            "constructor panicked"
        );
    }

    fn singleton_cached(&self, concrete: &Key) {
        tracing::trace!(
            target: "ferrous_inject",
            prefix = %self.prefix,
            concrete = concrete.display_name(),
            "singleton cached"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_of_type;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Counting {
        calls: Mutex<Vec<&'static str>>,
    }

    impl DiObserver for Counting {
        fn resolving(&self, _key: &Key, _from: Option<&Key>) {
            self.calls.lock().unwrap().push("resolving");
        }

        fn resolved(&self, _key: &Key, _duration: Duration) {
            self.calls.lock().unwrap().push("resolved");
        }
    }

    #[test]
    fn default_hooks_are_no_ops() {
        let counting = Arc::new(Counting::default());
        let mut observers = Observers::default();
        assert!(!observers.has_observers());
        observers.add(counting.clone());
        assert!(observers.has_observers());

        let key = key_of_type::<u8>();
        observers.resolving(&key, None);
        observers.resolution_failed(&key, &DiError::BindingNotFound("u8"));
        observers.factory_panic(&key, "boom");
        observers.singleton_cached(&key);
        observers.resolved(&key, Duration::from_millis(1));

        assert_eq!(*counting.calls.lock().unwrap(), vec!["resolving", "resolved"]);
    }
}
