//! Owned registries and the crate-wide default registry.
//!
//! A [`Registry`] is a plain value: create one at startup, wrap it in an `Arc`
//! and hand it to whatever needs singletons. The free functions in this module
//! operate on a process-wide default registry for code that has no registry to
//! pass around.
//!
//! # Examples
//!
//! ```
//! use lazy_singleton_registry::{get_or_init, get};
//! use std::sync::Arc;
//!
//! let message: Arc<String> = get_or_init(|| "Hello, World!".to_string()).unwrap();
//! assert_eq!(&*message, "Hello, World!");
//!
//! let again: Arc<String> = get().unwrap();
//! assert!(Arc::ptr_eq(&message, &again));
//! ```

use std::convert::Infallible;
use std::sync::{Arc, LazyLock};

use crate::{
    FailurePolicy, InitError, RegistryApi, RegistryError, RegistryEvent, Singleton, SlotStorage,
    TraceHook,
};

/// A registry of lazily constructed singletons, one per type.
///
/// # Examples
///
/// ```
/// use lazy_singleton_registry::{FailurePolicy, Registry, RegistryApi};
/// use std::sync::Arc;
///
/// let registry = Arc::new(Registry::with_policy(FailurePolicy::Poison));
///
/// let worker = {
///     let registry = Arc::clone(&registry);
///     std::thread::spawn(move || registry.get_or_init(|| 42u32).unwrap())
/// };
/// let here = registry.get_or_init(|| 7u32).unwrap();
/// let there = worker.join().unwrap();
///
/// assert!(Arc::ptr_eq(&here, &there));
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    storage: SlotStorage,
    trace: TraceHook,
    policy: FailurePolicy,
}

impl Registry {
    /// Creates an empty registry with [`FailurePolicy::Retry`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry whose slots use `policy`.
    pub fn with_policy(policy: FailurePolicy) -> Self {
        Registry {
            policy,
            ..Self::default()
        }
    }
}

impl RegistryApi for Registry {
    fn storage(&self) -> &SlotStorage {
        &self.storage
    }

    fn trace(&self) -> &TraceHook {
        &self.trace
    }

    fn policy(&self) -> FailurePolicy {
        self.policy
    }
}

/// Process-wide default registry. Created empty on first use, never torn down.
static GLOBAL_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Returns the process-wide default registry.
pub fn global() -> &'static Registry {
    &GLOBAL_REGISTRY
}

/// Sets a tracing callback on the default registry.
///
/// # Example
/// ```rust
/// use lazy_singleton_registry::{set_trace_callback, clear_trace_callback};
///
/// set_trace_callback(|event| println!("[registry-trace] {}", event));
/// clear_trace_callback();
/// ```
pub fn set_trace_callback(callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
    GLOBAL_REGISTRY.set_trace_callback(callback);
}

/// Clears the default registry's tracing callback.
pub fn clear_trace_callback() {
    GLOBAL_REGISTRY.clear_trace_callback();
}

/// Returns the default registry's `T`, constructing it with `init` on first use.
///
/// See [`RegistryApi::get_or_try_init`].
pub fn get_or_try_init<T, E, F>(init: F) -> Result<Arc<T>, InitError<E>>
where
    T: Send + Sync + 'static,
    F: FnOnce() -> Result<T, E>,
{
    GLOBAL_REGISTRY.get_or_try_init(init)
}

/// Returns the default registry's `T`, constructing it with `init` on first use.
pub fn get_or_init<T, F>(init: F) -> Result<Arc<T>, InitError<Infallible>>
where
    T: Send + Sync + 'static,
    F: FnOnce() -> T,
{
    GLOBAL_REGISTRY.get_or_init(init)
}

/// Returns the default registry's `T`, constructing it from `args` on first use.
///
/// ```
/// use lazy_singleton_registry::{instance, Singleton};
///
/// struct Counter(u32);
///
/// impl Singleton for Counter {
///     type Args = u32;
///     type Error = std::convert::Infallible;
///
///     fn construct(start: u32) -> Result<Self, Self::Error> {
///         Ok(Counter(start))
///     }
/// }
///
/// assert_eq!(instance::<Counter>(10).unwrap().0, 10);
/// assert_eq!(instance::<Counter>(20).unwrap().0, 10);
/// ```
pub fn instance<T: Singleton>(args: T::Args) -> Result<Arc<T>, InitError<T::Error>> {
    GLOBAL_REGISTRY.instance::<T>(args)
}

/// Retrieves the default registry's `T` if it has been constructed.
pub fn get<T: Send + Sync + 'static>() -> Result<Arc<T>, RegistryError> {
    GLOBAL_REGISTRY.get::<T>()
}

/// Retrieves a clone of the default registry's `T`.
pub fn get_cloned<T: Send + Sync + Clone + 'static>() -> Result<T, RegistryError> {
    GLOBAL_REGISTRY.get_cloned::<T>()
}

/// Checks whether the default registry has constructed `T`.
pub fn contains<T: Send + Sync + 'static>() -> Result<bool, RegistryError> {
    GLOBAL_REGISTRY.contains::<T>()
}

/// Checks whether the default registry's slot for `T` is poisoned.
pub fn is_poisoned<T: Send + Sync + 'static>() -> Result<bool, RegistryError> {
    GLOBAL_REGISTRY.is_poisoned::<T>()
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_new_registry_is_empty() {
        let registry = Registry::new();
        assert!(registry.storage().is_empty());
        assert_eq!(registry.policy(), FailurePolicy::Retry);
    }

    #[test]
    fn test_with_policy() {
        let registry = Registry::with_policy(FailurePolicy::Poison);
        assert_eq!(registry.policy(), FailurePolicy::Poison);

        let _ = registry.get_or_try_init::<u8, _, _>(|| Err("down"));
        assert!(registry.is_poisoned::<u8>().unwrap());
    }

    #[test]
    fn test_registries_do_not_share_slots() {
        let a = Registry::new();
        let b = Registry::new();

        a.get_or_init(|| 1i32).unwrap();
        b.get_or_init(|| 2i32).unwrap();

        assert_eq!(*a.get::<i32>().unwrap(), 1);
        assert_eq!(*b.get::<i32>().unwrap(), 2);
    }

    #[test]
    fn test_global_is_one_registry() {
        assert!(std::ptr::eq(global(), global()));
    }

    #[test]
    #[serial]
    fn test_global_get_or_init_and_get() {
        #[derive(Debug)]
        struct GlobalMarker(&'static str);

        let first = get_or_init(|| GlobalMarker("first")).unwrap();
        let second = get_or_init(|| GlobalMarker("second")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let fetched: Arc<GlobalMarker> = get().unwrap();
        assert_eq!(fetched.0, "first");
        assert!(contains::<GlobalMarker>().unwrap());
    }

    #[test]
    #[serial]
    fn test_global_get_cloned() {
        #[derive(Clone, Debug, PartialEq)]
        struct Version(u32);

        get_or_try_init(|| Ok::<_, String>(Version(3))).unwrap();
        assert_eq!(get_cloned::<Version>().unwrap(), Version(3));
    }

    #[test]
    #[serial]
    fn test_global_is_poisoned() {
        struct NeverBuilt;
        struct Flaky;

        assert!(!is_poisoned::<NeverBuilt>().unwrap());

        // The default registry retries, so a failure never poisons it.
        let _ = get_or_try_init::<Flaky, _, _>(|| Err("unavailable"));
        assert!(!is_poisoned::<Flaky>().unwrap());
        assert!(!contains::<Flaky>().unwrap());
    }

    #[test]
    #[serial]
    fn test_global_trace_callback_invoked() {
        struct Traced;

        static COUNT: AtomicUsize = AtomicUsize::new(0);
        set_trace_callback(|_e| {
            COUNT.fetch_add(1, Ordering::SeqCst);
        });
        get_or_init(|| Traced).unwrap();
        clear_trace_callback();

        // construct + constructed
        assert_eq!(COUNT.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[serial]
    fn test_global_events_in_order() {
        struct Ordered;

        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        set_trace_callback(move |e| events_clone.lock().unwrap().push(e.clone()));

        let _ = contains::<Ordered>();
        get_or_init(|| Ordered).unwrap();
        let _ = get::<Ordered>();
        clear_trace_callback();

        let type_name = std::any::type_name::<Ordered>();
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                RegistryEvent::Contains {
                    type_name,
                    found: false
                },
                RegistryEvent::Construct { type_name },
                RegistryEvent::Constructed { type_name },
                RegistryEvent::Get {
                    type_name,
                    found: true
                },
            ]
        );
    }
}
