//! Debug dump of the binding tables (`diagnostics` feature)
#![cfg(feature = "diagnostics")]

use ferrous_inject::{implements, interface, Constructor, Injectable, Injector};

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

struct Report;
impl Injectable for Report {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| Ok(Report))]
    }
}

#[test]
fn test_debug_string_lists_bindings() {
    let injector = Injector::new();
    let empty = injector.to_debug_string();
    assert!(empty.starts_with("=== Injector Debug ===\n"));
    assert_eq!(empty.lines().count(), 2);

    injector
        .bind_singleton::<dyn Clock, SystemClock>()
        .bind::<Report, Report>();

    let dump = injector.to_debug_string();
    let lines: Vec<&str> = dump.lines().skip(2).collect();
    assert_eq!(lines.len(), 2);
    let clock = lines.iter().find(|l| l.contains("Clock ->")).unwrap();
    assert!(clock.contains("SystemClock (singleton)"));
    assert!(!clock.contains("[cached]"));
    let report = lines.iter().find(|l| l.contains("Report ->")).unwrap();
    assert!(report.ends_with("Report (transient)"));
}

#[test]
fn test_debug_string_marks_cached_singletons() {
    let injector = Injector::new();
    injector.bind_singleton::<dyn Clock, SystemClock>();
    injector.resolve::<dyn Clock>().unwrap();

    let dump = injector.to_debug_string();
    assert!(dump.contains("SystemClock (singleton) [cached]"));
}
