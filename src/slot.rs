//! The instance slot: a cell that holds at most one shared value.
//!
//! `LazySlot<T>` implements double-checked initialization:
//!
//! 1. A reader first looks at the published value through `OnceLock::get`
//!    (an acquire load). If it is there, it is returned without touching any
//!    lock.
//! 2. Otherwise the reader takes the slot's construction mutex, looks again,
//!    and only then runs the constructor. The new value is published through
//!    `OnceLock`, which pairs a release store with the acquire load above, so
//!    a reader that sees the value also sees every write the constructor made.
//!
//! The constructor may fail. What happens next is decided by the slot's
//! [`FailurePolicy`].

use std::convert::Infallible;
use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::{FailurePolicy, InitError};

/// A lazily filled, write-once slot for a shared `T`.
///
/// Every successful call returns an `Arc<T>` pointing at the same allocation,
/// so `Arc::ptr_eq` holds between any two handles obtained from one slot.
/// Once filled, the slot never changes and is never emptied.
///
/// # Examples
///
/// ```rust
/// use lazy_singleton_registry::LazySlot;
/// use std::sync::Arc;
///
/// static GREETING: LazySlot<String> = LazySlot::new();
///
/// let first = GREETING.get_or_init(|| "hi".to_string()).unwrap();
/// let second = GREETING.get_or_init(|| "hello".to_string()).unwrap();
///
/// assert_eq!(&*second, "hi");
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub struct LazySlot<T> {
    value: OnceLock<Arc<T>>,
    init_lock: Mutex<()>,
    poisoned: AtomicBool,
    policy: FailurePolicy,
}

impl<T> LazySlot<T> {
    /// Creates an empty slot with [`FailurePolicy::Retry`].
    pub const fn new() -> Self {
        Self::with_policy(FailurePolicy::Retry)
    }

    /// Creates an empty slot with the given failure policy.
    pub const fn with_policy(policy: FailurePolicy) -> Self {
        LazySlot {
            value: OnceLock::new(),
            init_lock: Mutex::new(()),
            poisoned: AtomicBool::new(false),
            policy,
        }
    }

    /// What this slot does after a failed construction.
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Returns the instance if it has been constructed. Never blocks.
    pub fn get(&self) -> Option<Arc<T>> {
        self.value.get().cloned()
    }

    /// Whether the instance has been constructed and published.
    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }

    /// Whether an earlier construction failed under [`FailurePolicy::Poison`].
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }

    /// Returns the instance, constructing it with `init` if the slot is empty.
    ///
    /// `init` runs at most once across all callers that find the slot
    /// empty at the same time; the others block on the construction lock and
    /// then receive the value it produced. If the slot is already filled,
    /// `init` is dropped without being called.
    ///
    /// # Errors
    ///
    /// - [`InitError::Construction`] if `init` returned an error. Only the
    ///   caller that ran `init` sees this. The slot stays empty.
    /// - [`InitError::Poisoned`] if the slot uses [`FailurePolicy::Poison`]
    ///   and an earlier construction failed or panicked.
    ///
    /// # Panics
    ///
    /// A panic in `init` propagates to the caller. The construction lock is
    /// released and the slot is left empty (or poisoned, under
    /// [`FailurePolicy::Poison`]).
    ///
    /// Calling this on the same slot from inside `init` deadlocks.
    pub fn get_or_try_init<E, F>(&self, init: F) -> Result<Arc<T>, InitError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.value.get() {
            return Ok(Arc::clone(value));
        }
        self.initialize(init)
    }

    /// Infallible form of [`get_or_try_init`](Self::get_or_try_init).
    ///
    /// Under [`FailurePolicy::Retry`] this only fails if the type map of an
    /// owning registry is unavailable, which a bare slot never is. Under
    /// [`FailurePolicy::Poison`] it fails after a constructor panicked.
    pub fn get_or_init<F>(&self, init: F) -> Result<Arc<T>, InitError<Infallible>>
    where
        F: FnOnce() -> T,
    {
        self.get_or_try_init(|| Ok::<T, Infallible>(init()))
    }

    #[cold]
    fn initialize<E, F>(&self, init: F) -> Result<Arc<T>, InitError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let type_name = std::any::type_name::<T>();

        // The mutex guards no data, so a poisoned lock is safe to reuse.
        let _lock = self
            .init_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(value) = self.value.get() {
            tracing::trace!(type_name, "singleton constructed by another caller");
            return Ok(Arc::clone(value));
        }

        if self.is_poisoned() {
            return Err(InitError::Poisoned { type_name });
        }

        tracing::debug!(type_name, policy = %self.policy, "constructing singleton");

        let attempt = Attempt {
            slot: self,
            type_name,
        };

        match init() {
            Ok(value) => {
                attempt.commit();
                let stored = self.value.get_or_init(|| Arc::new(value));
                tracing::debug!(type_name, "singleton constructed");
                Ok(Arc::clone(stored))
            }
            Err(source) => {
                drop(attempt);
                Err(InitError::Construction { type_name, source })
            }
        }
    }
}

impl<T> Default for LazySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for LazySlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySlot")
            .field("value", &self.value.get())
            .field("poisoned", &self.is_poisoned())
            .field("policy", &self.policy)
            .finish()
    }
}

/// An in-flight construction.
///
/// Dropped without [`commit`](Attempt::commit) means the constructor returned
/// an error or unwound.
struct Attempt<'a, T> {
    slot: &'a LazySlot<T>,
    type_name: &'static str,
}

impl<T> Attempt<'_, T> {
    fn commit(self) {
        mem::forget(self);
    }
}

impl<T> Drop for Attempt<'_, T> {
    fn drop(&mut self) {
        match self.slot.policy {
            FailurePolicy::Retry => {
                tracing::warn!(
                    type_name = self.type_name,
                    "singleton construction failed, slot left empty"
                );
            }
            FailurePolicy::Poison => {
                self.slot.poisoned.store(true, Ordering::Release);
                tracing::error!(
                    type_name = self.type_name,
                    "singleton construction failed, slot poisoned"
                );
            }
        }
    }
}
