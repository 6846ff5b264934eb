//! Macros for creating process-wide singleton registries.

/// Creates an isolated, process-wide singleton registry with a single macro invocation.
///
/// The macro generates a module containing:
/// - Storage static (hidden)
/// - Trace hook static (hidden)
/// - An `Api` struct that implements `RegistryApi`, and an `API` constant
/// - Free functions delegating to `API`
///
/// An optional `policy = Retry | Poison` selects the [`FailurePolicy`](crate::FailurePolicy)
/// of the registry's slots; the default is `Retry`.
///
/// # Examples
///
/// ```rust
/// use lazy_singleton_registry::define_registry;
/// use std::sync::Arc;
///
/// define_registry!(global);
///
/// let num: Arc<i32> = global::get_or_init(|| 42).unwrap();
/// let same: Arc<i32> = global::get_or_init(|| 7).unwrap();
///
/// assert_eq!(*same, 42);
/// assert!(Arc::ptr_eq(&num, &same));
/// ```
///
/// # Multiple Registries
///
/// ```rust
/// use lazy_singleton_registry::define_registry;
///
/// define_registry!(database);
/// define_registry!(cache, policy = Poison);
///
/// database::get_or_init(|| "db_connection".to_string()).unwrap();
/// cache::get_or_init(|| "redis_connection".to_string()).unwrap();
///
/// assert_eq!(&*database::get::<String>().unwrap(), "db_connection");
/// assert_eq!(&*cache::get::<String>().unwrap(), "redis_connection");
/// ```
///
/// # Trait-Based Usage
///
/// ```rust
/// use lazy_singleton_registry::{define_registry, RegistryApi};
/// use std::sync::Arc;
///
/// define_registry!(app);
///
/// let value: Arc<i32> = app::API.get_or_init(|| 100).unwrap();
/// assert_eq!(*value, 100);
/// ```
#[macro_export]
macro_rules! define_registry {
    ($name:ident) => {
        $crate::define_registry!($name, policy = Retry);
    };
    ($name:ident, policy = $policy:ident) => {
        pub mod $name {
            #![allow(dead_code)]

            use std::sync::{Arc, LazyLock};

            static STORAGE: LazyLock<$crate::SlotStorage> = LazyLock::new($crate::SlotStorage::new);

            static TRACE: $crate::TraceHook = $crate::TraceHook::new();

            /// Zero-sized type that implements the registry API.
            pub struct Api;

            impl $crate::RegistryApi for Api {
                fn storage(&self) -> &$crate::SlotStorage {
                    &STORAGE
                }

                fn trace(&self) -> &$crate::TraceHook {
                    &TRACE
                }

                fn policy(&self) -> $crate::FailurePolicy {
                    $crate::FailurePolicy::$policy
                }
            }

            pub const API: Api = Api;

            /// Return the singleton of type `T`, constructing it on first use.
            pub fn get_or_try_init<T, E, F>(init: F) -> Result<Arc<T>, $crate::InitError<E>>
            where
                T: Send + Sync + 'static,
                F: FnOnce() -> Result<T, E>,
            {
                use $crate::RegistryApi;
                API.get_or_try_init(init)
            }

            /// Return the singleton of type `T`, constructing it on first use.
            pub fn get_or_init<T, F>(init: F) -> Result<Arc<T>, $crate::InitError<std::convert::Infallible>>
            where
                T: Send + Sync + 'static,
                F: FnOnce() -> T,
            {
                use $crate::RegistryApi;
                API.get_or_init(init)
            }

            /// Return the singleton of type `T`, constructing it from `args` on first use.
            pub fn instance<T: $crate::Singleton>(
                args: T::Args,
            ) -> Result<Arc<T>, $crate::InitError<T::Error>> {
                use $crate::RegistryApi;
                API.instance::<T>(args)
            }

            /// Retrieve an already constructed singleton.
            pub fn get<T: Send + Sync + 'static>() -> Result<Arc<T>, $crate::RegistryError> {
                use $crate::RegistryApi;
                API.get()
            }

            /// Retrieve a cloned value of an already constructed singleton.
            pub fn get_cloned<T: Send + Sync + Clone + 'static>() -> Result<T, $crate::RegistryError> {
                use $crate::RegistryApi;
                API.get_cloned()
            }

            /// Check whether `T` has been constructed.
            pub fn contains<T: Send + Sync + 'static>() -> Result<bool, $crate::RegistryError> {
                use $crate::RegistryApi;
                API.contains::<T>()
            }

            /// Check whether `T`'s slot is poisoned.
            pub fn is_poisoned<T: Send + Sync + 'static>() -> Result<bool, $crate::RegistryError> {
                use $crate::RegistryApi;
                API.is_poisoned::<T>()
            }

            /// Set a tracing callback for registry operations.
            pub fn set_trace_callback(callback: impl Fn(&$crate::RegistryEvent) + Send + Sync + 'static) {
                use $crate::RegistryApi;
                API.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                use $crate::RegistryApi;
                API.clear_trace_callback()
            }
        }
    };
}
