//! Integration tests for tracing and event monitoring.
//!
//! Registry events report construction attempts and lookups. Structured
//! logs go through `tracing`; a subscriber is installed here so the log
//! statements on the failure paths are exercised.

use lazy_singleton_registry::{
    define_registry, FailurePolicy, Registry, RegistryApi, RegistryEvent,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("lazy_singleton_registry=trace"))
        .with_test_writer()
        .try_init();
}

fn collect(registry: &Registry) -> Arc<Mutex<Vec<RegistryEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    registry.set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(event.clone());
    });
    events
}

#[test]
fn test_basic_tracing() {
    define_registry!(traced1);

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();

    traced1::set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(format!("{}", event));
    });

    traced1::get_or_init(|| 42i32).unwrap();
    let _: Arc<i32> = traced1::get().unwrap();
    let _ = traced1::contains::<i32>();

    let captured = events.lock().unwrap();
    assert_eq!(
        *captured,
        vec![
            "construct { type_name: i32 }",
            "constructed { type_name: i32 }",
            "get { type_name: i32, found: true }",
            "contains { type_name: i32, found: true }",
        ]
    );
}

#[test]
fn test_fast_path_emits_nothing() {
    let registry = Registry::new();
    registry.get_or_init(|| 1u32).unwrap();

    let events = collect(&registry);
    for _ in 0..10 {
        registry.get_or_init(|| 2u32).unwrap();
    }

    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn test_contended_construction_emits_one_construct() {
    let registry = Registry::new();
    let events = collect(&registry);

    std::thread::scope(|s| {
        for i in 0..16u64 {
            let registry = &registry;
            s.spawn(move || registry.get_or_init(|| i).unwrap());
        }
    });

    let captured = events.lock().unwrap();
    let type_name = std::any::type_name::<u64>();
    assert_eq!(
        *captured,
        vec![
            RegistryEvent::Construct { type_name },
            RegistryEvent::Constructed { type_name },
        ]
    );
}

#[test]
fn test_failed_construction_events() {
    init_logging();

    let registry = Registry::new();
    let events = collect(&registry);

    let _ = registry.get_or_try_init::<i64, _, _>(|| Err("offline"));
    registry.get_or_init(|| 64i64).unwrap();

    let type_name = std::any::type_name::<i64>();
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            RegistryEvent::Construct { type_name },
            RegistryEvent::ConstructFailed {
                type_name,
                poisoned: false
            },
            RegistryEvent::Construct { type_name },
            RegistryEvent::Constructed { type_name },
        ]
    );
}

#[test]
fn test_poisoned_construction_events() {
    init_logging();
    define_registry!(traced_poison, policy = Poison);

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    traced_poison::set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(event.to_string());
    });

    let _ = traced_poison::get_or_try_init::<f32, _, _>(|| Err("bad"));
    let _ = traced_poison::get_or_init(|| 1.0f32);

    // The poisoned call never reaches a constructor, so it emits nothing.
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            "construct { type_name: f32 }",
            "construct_failed { type_name: f32, poisoned: true }",
        ]
    );
}

#[test]
fn test_panicking_constructor_reports_poisoned_failure() {
    init_logging();

    let registry = Registry::with_policy(FailurePolicy::Poison);
    let events = collect(&registry);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        registry.get_or_init::<String, _>(|| panic!("constructor panicked"))
    }));
    assert!(outcome.is_err());
    assert!(registry.is_poisoned::<String>().unwrap());

    let type_name = std::any::type_name::<String>();
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            RegistryEvent::Construct { type_name },
            RegistryEvent::ConstructFailed {
                type_name,
                poisoned: true
            },
        ]
    );
}

#[test]
fn test_panicking_constructor_reports_retryable_failure() {
    let registry = Registry::new();
    let events = collect(&registry);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        registry.get_or_init::<u128, _>(|| panic!("constructor panicked"))
    }));
    assert!(outcome.is_err());
    registry.get_or_init(|| 128u128).unwrap();

    let type_name = std::any::type_name::<u128>();
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            RegistryEvent::Construct { type_name },
            RegistryEvent::ConstructFailed {
                type_name,
                poisoned: false
            },
            RegistryEvent::Construct { type_name },
            RegistryEvent::Constructed { type_name },
        ]
    );
}

#[test]
fn test_trace_get_found_and_not_found() {
    define_registry!(traced3);

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();

    traced3::set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(format!("{}", event));
    });

    traced3::get_or_init(|| 123i64).unwrap();
    let _: Arc<i64> = traced3::get().unwrap();
    let _: Result<Arc<f32>, _> = traced3::get();

    let captured = events.lock().unwrap();
    assert_eq!(captured.len(), 4);
    assert!(captured[2].contains("found: true"));
    assert!(captured[3].contains("found: false"));

    traced3::clear_trace_callback();
}

#[test]
fn test_replacing_trace_callback() {
    let registry = Registry::new();
    let first = collect(&registry);
    registry.get_or_init(|| 1u8).unwrap();

    let second = collect(&registry);
    registry.get_or_init(|| 1u16).unwrap();

    assert_eq!(first.lock().unwrap().len(), 2);
    assert_eq!(second.lock().unwrap().len(), 2);
}
