//! Greeting example for lazy-singleton-registry.
//!
//! Demonstrates:
//! - Asking for a singleton twice with different construction arguments
//! - The first arguments win; the second call gets the same instance
//! - Identity equality with `Arc::ptr_eq`
//!
//! Run with: `cargo run --example greeting`

use lazy_singleton_registry::{define_registry, Singleton};
use std::convert::Infallible;
use std::sync::Arc;

define_registry!(app);

#[derive(Debug)]
struct Greeting {
    text: String,
}

impl Singleton for Greeting {
    type Args = &'static str;
    type Error = Infallible;

    fn construct(text: &'static str) -> Result<Self, Self::Error> {
        println!("   (constructing Greeting from {text:?})");
        Ok(Greeting {
            text: text.to_string(),
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== lazy-singleton-registry: Greeting ===\n");

    // -------------------------------------------------------------------------
    // 1. First access constructs the instance
    // -------------------------------------------------------------------------
    println!("1. Requesting Greeting with \"hi\"...");
    let singleton1 = app::instance::<Greeting>("hi")?;

    // -------------------------------------------------------------------------
    // 2. Second access ignores its arguments
    // -------------------------------------------------------------------------
    println!("\n2. Requesting Greeting with \"hello\"...");
    let singleton2 = app::instance::<Greeting>("hello")?;

    // -------------------------------------------------------------------------
    // 3. Both handles point at the same instance
    // -------------------------------------------------------------------------
    println!("\n3. Comparing handles...");
    println!("   same instance: {}", Arc::ptr_eq(&singleton1, &singleton2));
    println!("   singleton1.text = {:?}", singleton1.text);
    println!("   singleton2.text = {:?}", singleton2.text);

    println!("\n=== Done ===");
    Ok(())
}
