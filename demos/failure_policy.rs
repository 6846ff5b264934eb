//! Failure policy example for lazy-singleton-registry.
//!
//! Demonstrates:
//! - A failed construction under `Retry` leaving the slot empty
//! - The same failure under `Poison` making the slot unusable
//! - Choosing the policy from a configuration string
//!
//! Run with: `cargo run --example failure_policy -- poison`

use lazy_singleton_registry::{FailurePolicy, Registry, RegistryApi, Singleton};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
#[error("cannot reach {0}")]
struct Unreachable(String);

#[derive(Debug)]
struct Database {
    url: String,
}

impl Singleton for Database {
    type Args = &'static str;
    type Error = Unreachable;

    fn construct(url: &'static str) -> Result<Self, Self::Error> {
        if url.starts_with("offline://") {
            return Err(Unreachable(url.to_string()));
        }
        Ok(Database {
            url: url.to_string(),
        })
    }
}

fn run(policy: FailurePolicy) {
    println!("policy = {policy}");

    let registry = Registry::with_policy(policy);
    for url in ["offline://primary", "db://replica"] {
        match registry.instance::<Database>(url) {
            Ok(db) => println!("   {url}: connected to {}", db.url),
            Err(err) => println!("   {url}: {err}"),
        }
    }
    println!(
        "   poisoned: {}",
        registry.is_poisoned::<Database>().unwrap_or(false)
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== lazy-singleton-registry: Failure Policy ===\n");

    let configured = std::env::args().nth(1).unwrap_or_else(|| "retry".into());
    let policy = match configured.parse::<FailurePolicy>() {
        Ok(policy) => policy,
        Err(err) => {
            eprintln!("{err}, using default");
            FailurePolicy::default()
        }
    };

    run(policy);

    println!("\n=== Done ===");
}
