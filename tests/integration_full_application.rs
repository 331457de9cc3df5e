/// Full application integration test
///
/// Wires a small service graph the way an application would: a transient
/// logger, a singleton cache and a service that takes both through its
/// marked constructor.

use ferrous_inject::{
    implements, interface, Constructor, Injectable, Injector, Lifetime, LoggingObserver,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ===== Interfaces =====

pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
    fn entries(&self) -> Vec<String>;
}

pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: String);
}

pub trait Service: Send + Sync {
    fn lookup(&self, key: &str) -> String;
    fn logger(&self) -> Arc<dyn Logger>;
    fn cache(&self) -> Arc<dyn Cache>;
}

interface!(dyn Logger, dyn Cache, dyn Service);

// ===== Implementations =====

static LOGGERS_BUILT: AtomicUsize = AtomicUsize::new(0);
static CACHES_BUILT: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct ConsoleLogger {
    entries: Mutex<Vec<String>>,
}

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        self.entries.lock().unwrap().push(message.to_string());
    }

    fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

impl Injectable for ConsoleLogger {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| {
            LOGGERS_BUILT.fetch_add(1, Ordering::SeqCst);
            Ok(ConsoleLogger::default())
        })]
    }
}

#[derive(Default)]
struct MemoryCache {
    data: Mutex<HashMap<String, String>>,
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.data.lock().unwrap().get(key).cloned()
    }

    fn put(&self, key: &str, value: String) {
        self.data.lock().unwrap().insert(key.to_string(), value);
    }
}

impl Injectable for MemoryCache {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| {
            CACHES_BUILT.fetch_add(1, Ordering::SeqCst);
            Ok(MemoryCache::default())
        })]
    }
}

struct ServiceImpl {
    logger: Arc<dyn Logger>,
    cache: Arc<dyn Cache>,
}

impl Service for ServiceImpl {
    fn lookup(&self, key: &str) -> String {
        if let Some(hit) = self.cache.get(key) {
            self.logger.log(&format!("hit {}", key));
            return hit;
        }
        self.logger.log(&format!("miss {}", key));
        let value = key.to_uppercase();
        self.cache.put(key, value.clone());
        value
    }

    fn logger(&self) -> Arc<dyn Logger> {
        self.logger.clone()
    }

    fn cache(&self) -> Arc<dyn Cache> {
        self.cache.clone()
    }
}

impl Injectable for ServiceImpl {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![
            // Used only when nothing is marked; here the marked one wins
            Constructor::new(|_| Err("ServiceImpl needs its dependencies".into())),
            Constructor::new(|args| {
                Ok(ServiceImpl {
                    logger: args.next::<dyn Logger>()?,
                    cache: args.next::<dyn Cache>()?,
                })
            })
            .param::<dyn Logger>()
            .param::<dyn Cache>()
            .inject(),
        ]
    }
}

implements!(ConsoleLogger => dyn Logger);
implements!(MemoryCache => dyn Cache);
implements!(ServiceImpl => dyn Service);

fn same_instance<A: ?Sized, B: ?Sized>(a: &Arc<A>, b: &Arc<B>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

#[test]
fn test_logger_cache_service_scenario() {
    let injector = Injector::new();
    injector.add_observer(Arc::new(LoggingObserver::with_prefix("[app]")));
    injector
        .bind::<dyn Logger, ConsoleLogger>()
        .bind_singleton::<dyn Cache, MemoryCache>()
        .bind::<dyn Service, ServiceImpl>();

    let provider = injector.get_provider::<dyn Service>().unwrap().unwrap();
    let first = provider.get().unwrap();
    let second = provider.get().unwrap();

    // Two services, two loggers, one cache
    assert!(!same_instance(&first, &second));
    assert!(!same_instance(&first.logger(), &second.logger()));
    assert!(same_instance(&first.cache(), &second.cache()));
    assert_eq!(LOGGERS_BUILT.load(Ordering::SeqCst), 2);
    assert_eq!(CACHES_BUILT.load(Ordering::SeqCst), 1);

    // The shared cache is visible through both services
    assert_eq!(first.lookup("alpha"), "ALPHA");
    assert_eq!(second.lookup("alpha"), "ALPHA");
    assert_eq!(first.logger().entries(), vec!["miss alpha".to_string()]);
    assert_eq!(second.logger().entries(), vec!["hit alpha".to_string()]);

    let descriptors = injector.binding_descriptors();
    assert_eq!(descriptors.len(), 3);
    let cache = descriptors.iter().find(|d| d.type_name().contains("Cache")).unwrap();
    assert_eq!(cache.lifetime, Lifetime::Singleton);
    assert!(cache.cached);
    assert!(cache.is_interface());
    assert!(cache.impl_type_name().ends_with("MemoryCache"));

    assert!(injector.validate().is_valid());
    assert!(format!("{:?}", injector).contains("cached_singletons: 1"));
}
