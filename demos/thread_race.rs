//! Thread race example for lazy-singleton-registry.
//!
//! Demonstrates:
//! - Many threads asking for the same singleton at the same moment
//! - Exactly one constructor run
//! - Every thread receiving the identical instance
//!
//! Run with: `RUST_LOG=lazy_singleton_registry=debug cargo run --example thread_race`

use lazy_singleton_registry::{LazySlot, Registry, RegistryApi};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const THREADS: usize = 8;

/// A service that is slow to start.
#[derive(Debug)]
struct ConnectionPool {
    opened_by: usize,
}

static CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

static LOGGER_NAME: LazySlot<String> = LazySlot::new();

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== lazy-singleton-registry: Thread Race ===\n");

    // -------------------------------------------------------------------------
    // 1. Race for a registry singleton
    // -------------------------------------------------------------------------
    println!("1. Starting {THREADS} threads...");

    let registry = Arc::new(Registry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|id| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.get_or_init(|| {
                    CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(50));
                    ConnectionPool { opened_by: id }
                })
            })
        })
        .collect();

    let pools: Vec<Arc<ConnectionPool>> = handles
        .into_iter()
        .filter_map(|h| h.join().ok())
        .filter_map(Result::ok)
        .collect();

    println!("   constructions: {}", CONSTRUCTIONS.load(Ordering::SeqCst));
    if let Some(first) = pools.first() {
        println!("   opened by thread: {}", first.opened_by);
        println!(
            "   all identical: {}",
            pools.iter().all(|p| Arc::ptr_eq(p, first))
        );
    }

    // -------------------------------------------------------------------------
    // 2. Race for a static slot
    // -------------------------------------------------------------------------
    println!("\n2. Racing for a static slot...");

    let handles: Vec<_> = (0..THREADS)
        .map(|id| thread::spawn(move || LOGGER_NAME.get_or_init(|| format!("logger-{id}"))))
        .collect();

    let names: Vec<Arc<String>> = handles
        .into_iter()
        .filter_map(|h| h.join().ok())
        .filter_map(Result::ok)
        .collect();

    if let Some(name) = names.first() {
        println!("   winner: {name}");
        println!(
            "   all identical: {}",
            names.iter().all(|n| Arc::ptr_eq(n, name))
        );
    }

    println!("\n=== Done ===");
}
