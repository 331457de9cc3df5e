use ferrous_inject::{
    implements, interface, Constructor, DiError, DiObserver, Injectable, Injector, Key, LoggingObserver,
};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

pub trait Clock: Send + Sync {}
interface!(dyn Clock);

struct SystemClock;
impl Clock for SystemClock {}
impl Injectable for SystemClock {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| Ok(SystemClock))]
    }
}
implements!(SystemClock => dyn Clock);

struct Job {
    _clock: Arc<dyn Clock>,
}

impl Injectable for Job {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| Ok(Job { _clock: args.next::<dyn Clock>()? })).param::<dyn Clock>()]
    }
}

struct Exploding;
impl Injectable for Exploding {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| panic!("observer test panic"))]
    }
}

fn short(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl DiObserver for Recorder {
    fn resolving(&self, key: &Key, requested_from: Option<&Key>) {
        let from = requested_from.map(|k| short(k.display_name())).unwrap_or("<root>");
        self.push(format!("resolving {} from {}", short(key.display_name()), from));
    }

    fn resolved(&self, key: &Key, _duration: Duration) {
        self.push(format!("resolved {}", short(key.display_name())));
    }

    fn resolution_failed(&self, key: &Key, _error: &DiError) {
        self.push(format!("failed {}", short(key.display_name())));
    }

    fn factory_panic(&self, key: &Key, message: &str) {
        self.push(format!("panic {}: {}", short(key.display_name()), message));
    }

    fn singleton_cached(&self, concrete: &Key) {
        self.push(format!("cached {}", short(concrete.display_name())));
    }
}

#[test]
fn test_observer_sees_nested_resolution_in_order() {
    let recorder = Arc::new(Recorder::default());
    let injector = Injector::new();
    injector.add_observer(recorder.clone());
    injector.bind_singleton::<dyn Clock, SystemClock>();

    injector.resolve::<Job>().unwrap();
    assert_eq!(
        recorder.events(),
        vec![
            "resolving Job from <root>",
            "resolving Clock from Job",
            "cached SystemClock",
            "resolved Clock",
            "resolved Job",
        ]
    );
}

#[test]
fn test_observer_sees_failures_at_every_level() {
    let recorder = Arc::new(Recorder::default());
    let injector = Injector::new();
    injector.add_observer(recorder.clone());

    assert!(injector.resolve::<Job>().is_err());
    assert_eq!(
        recorder.events(),
        vec![
            "resolving Job from <root>",
            "resolving Clock from Job",
            "failed Clock",
            "failed Job",
        ]
    );
}

#[test]
fn test_observer_sees_constructor_panics() {
    let recorder = Arc::new(Recorder::default());
    let injector = Injector::new();
    injector.add_observer(recorder.clone());

    assert!(injector.resolve::<Exploding>().is_err());
    let events = recorder.events();
    assert!(events.contains(&"panic Exploding: observer test panic".to_string()));
    assert_eq!(events.last().map(String::as_str), Some("failed Exploding"));
}

/// Registers another observer from inside its own callbacks.
#[derive(Default)]
struct SelfExtending {
    injector: Mutex<Option<Injector>>,
    added: AtomicUsize,
}

impl SelfExtending {
    fn extend(&self) {
        if let Some(injector) = self.injector.lock().unwrap().as_ref() {
            injector.add_observer(Arc::new(Recorder::default()));
            self.added.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl DiObserver for SelfExtending {
    fn resolving(&self, _key: &Key, _requested_from: Option<&Key>) {}

    fn resolved(&self, _key: &Key, _duration: Duration) {}

    fn factory_panic(&self, _key: &Key, _message: &str) {
        self.extend();
    }

    fn singleton_cached(&self, _concrete: &Key) {
        self.extend();
    }
}

#[test]
fn test_observer_may_add_observers_from_callbacks() {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let observer = Arc::new(SelfExtending::default());
        let injector = Injector::new();
        injector.add_observer(observer.clone());
        *observer.injector.lock().unwrap() = Some(injector.clone());
        injector.bind_singleton::<dyn Clock, SystemClock>();

        injector.resolve::<dyn Clock>().unwrap();
        assert!(injector.resolve::<Exploding>().is_err());

        // Break the injector <-> observer reference cycle
        observer.injector.lock().unwrap().take();
        tx.send(observer.added.load(Ordering::SeqCst)).unwrap();
    });

    let added = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("observer callback blocked on the observer list");
    assert_eq!(added, 2);
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[test]
fn test_logging_observer_emits_tracing_events() {
    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let injector = Injector::new();
        injector.add_observer(Arc::new(LoggingObserver::with_prefix("[test]")));
        injector.bind::<dyn Clock, SystemClock>();
        injector.resolve::<Job>().unwrap();
        assert!(injector.resolve::<Exploding>().is_err());
    });

    let output = buffer.contents();
    assert!(output.contains("binding registered"));
    assert!(output.contains("resolving"));
    assert!(output.contains("resolved"));
    assert!(output.contains("constructor selected"));
    assert!(output.contains("resolution failed"));
    assert!(output.contains("constructor panicked"));
    assert!(output.contains("[test]"));
    assert!(output.contains("ferrous_inject"));
}
