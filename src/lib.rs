//! # Lazy Singleton Registry
//!
//! Lazily constructed, thread-safe singletons.
//!
//! A singleton is built the first time it is asked for, exactly once, no matter
//! how many threads ask at the same time, and every caller gets the same
//! `Arc<T>` back. Once built it is never replaced.
//!
//! ## Quick Start
//!
//! ```rust
//! use lazy_singleton_registry::{Registry, RegistryApi};
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//!
//! let first: Arc<String> = registry.get_or_init(|| "hi".to_string()).unwrap();
//! let second: Arc<String> = registry.get_or_init(|| "hello".to_string()).unwrap();
//!
//! assert_eq!(&*second, "hi");
//! assert!(Arc::ptr_eq(&first, &second));
//! ```
//!
//! ## Features
//!
//! - **Exactly-once construction**: double-checked initialization, with a lock-free
//!   read once the value exists
//! - **Fallible constructors**: a failed construction leaves the slot empty, or
//!   poisons it under [`FailurePolicy::Poison`]
//! - **Per-type registries**: one singleton per type, isolated per registry
//! - **Tracing support**: optional callback for registry events, plus `tracing` logs
//!
//! ## Main Items
//!
//! - [`LazySlot`] - a single write-once slot, usable as a `static`
//! - [`Registry`] - an owned per-type registry to inject where needed
//! - [`define_registry!`] - a process-wide registry module
//! - [`Singleton`] - types that construct themselves from `Args`
//! - [`get_or_init`], [`instance`], [`get`], [`contains`] - the default registry

mod macros;
mod policy;
mod registry;
mod registry_error;
mod registry_event;
mod registry_trait;
mod singleton;
mod slot;

pub use policy::{FailurePolicy, ParsePolicyError};
pub use registry::{
    clear_trace_callback, contains, get, get_cloned, get_or_init, get_or_try_init, global,
    instance, is_poisoned, set_trace_callback, Registry,
};
pub use registry_error::{InitError, RegistryError};
pub use registry_event::RegistryEvent;
pub use registry_trait::{RegistryApi, SlotStorage, TraceCallback, TraceHook};
pub use singleton::Singleton;
pub use slot::LazySlot;
