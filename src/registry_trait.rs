//! Core trait defining registry behavior.
//!
//! This module provides the `RegistryApi` trait with default implementations for
//! type-safe, lazily constructed singletons, plus the two pieces of state every
//! registry owns: a [`SlotStorage`] and a [`TraceHook`].
//!
//! The registry is type-based: each type (`TypeId`) has its own [`LazySlot`], so
//! each type is constructed at most once per registry. A constructed instance is
//! never replaced.

use std::any::{Any, TypeId};
use std::cell::Cell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::{FailurePolicy, InitError, LazySlot, RegistryError, RegistryEvent, Singleton};

/// Type alias for the user-supplied tracing callback.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

type SlotMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Per-type slots of one registry.
///
/// Entries are only ever inserted. Readers share the lock; a writer only takes
/// it to insert the empty slot for a type seen for the first time, and never
/// while a constructor runs.
#[derive(Default)]
pub struct SlotStorage {
    slots: RwLock<SlotMap>,
}

impl SlotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of types that have a slot, filled or not.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up the slot for `T` without creating it.
    pub(crate) fn lookup<T: Send + Sync + 'static>(
        &self,
    ) -> Result<Option<Arc<LazySlot<T>>>, RegistryError> {
        let entry = self
            .slots
            .read()
            .map_err(|_| RegistryError::RegistryLock)?
            .get(&TypeId::of::<T>())
            .cloned();

        entry.map(downcast_slot::<T>).transpose()
    }

    /// Returns the slot for `T`, inserting an empty one with `policy` if needed.
    ///
    /// The policy of an existing slot is left untouched.
    pub(crate) fn slot<T: Send + Sync + 'static>(
        &self,
        policy: FailurePolicy,
    ) -> Result<Arc<LazySlot<T>>, RegistryError> {
        if let Some(slot) = self.lookup::<T>()? {
            return Ok(slot);
        }

        let entry = {
            // Insert-only map: a poisoned lock still holds a consistent map.
            let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
            let entry = slots.entry(TypeId::of::<T>()).or_insert_with(|| {
                let slot: Arc<dyn Any + Send + Sync> =
                    Arc::new(LazySlot::<T>::with_policy(policy));
                slot
            });
            Arc::clone(entry)
        };

        downcast_slot::<T>(entry)
    }
}

fn downcast_slot<T: Send + Sync + 'static>(
    entry: Arc<dyn Any + Send + Sync>,
) -> Result<Arc<LazySlot<T>>, RegistryError> {
    entry
        .downcast::<LazySlot<T>>()
        .map_err(|_| RegistryError::TypeMismatch {
            type_name: std::any::type_name::<T>(),
        })
}

impl fmt::Debug for SlotStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotStorage")
            .field("slots", &self.len())
            .finish()
    }
}

/// Holds an optional tracing callback for one registry.
#[derive(Default)]
pub struct TraceHook {
    callback: RwLock<Option<Arc<TraceCallback>>>,
}

impl TraceHook {
    pub const fn new() -> Self {
        TraceHook {
            callback: RwLock::new(None),
        }
    }

    pub fn set(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = self.callback.write().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    pub fn clear(&self) {
        let mut guard = self.callback.write().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    pub fn is_set(&self) -> bool {
        self.callback
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .is_some()
    }

    /// Invokes the callback, if any, after releasing the hook's lock.
    pub fn emit(&self, event: &RegistryEvent) {
        let callback = self
            .callback
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }
}

impl fmt::Debug for TraceHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceHook")
            .field("set", &self.is_set())
            .finish()
    }
}

/// Emits the closing event of a construction this caller started.
///
/// Runs on drop so a constructor that unwinds still reports `ConstructFailed`,
/// after the slot has applied its failure policy.
struct ConstructEvents<'a, R: RegistryApi + ?Sized, T> {
    registry: &'a R,
    slot: &'a LazySlot<T>,
    type_name: &'static str,
    started: Cell<bool>,
    succeeded: Cell<bool>,
}

impl<R: RegistryApi + ?Sized, T> Drop for ConstructEvents<'_, R, T> {
    fn drop(&mut self) {
        if !self.started.get() {
            return;
        }
        let type_name = self.type_name;
        if self.succeeded.get() {
            self.registry
                .emit_event(&RegistryEvent::Constructed { type_name });
        } else {
            self.registry.emit_event(&RegistryEvent::ConstructFailed {
                type_name,
                poisoned: self.slot.is_poisoned(),
            });
        }
    }
}

/// Core trait defining registry behavior.
///
/// Provides default implementations for all registry operations, requiring only
/// two accessor methods (`storage` and `trace`) to be implemented by the implementor.
/// `policy` may be overridden to change what happens after a failed construction;
/// it is read when a type's slot is first created.
pub trait RegistryApi {
    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Access the registry's trace hook.
    fn trace(&self) -> &TraceHook;

    /// Set a tracing callback for registry operations.
    ///
    /// The callback is invoked outside the hook's lock, so it may call back into
    /// the registry. It must not request the type whose `Construct` event it is
    /// handling: that event is emitted while the type's construction lock is held.
    fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        self.trace().set(callback);
    }

    /// Clear the tracing callback.
    ///
    /// After calling this, no tracing events will be emitted.
    /// Constructed singletons are unaffected.
    fn clear_trace_callback(&self) {
        self.trace().clear();
    }

    /// Convenience wrapper to emit a registry event using the current callback.
    ///
    /// # Panics
    ///
    /// If the callback itself panics, the panic will propagate to the caller.
    fn emit_event(&self, event: &RegistryEvent) {
        self.trace().emit(event);
    }

    // -------------------------------------------------------------------------------------------------
    // Registry
    // -------------------------------------------------------------------------------------------------

    /// Access the registry's per-type slots.
    fn storage(&self) -> &SlotStorage;

    /// Failure policy given to newly created slots.
    fn policy(&self) -> FailurePolicy {
        FailurePolicy::Retry
    }

    /// Returns the singleton of type `T`, constructing it with `init` on first use.
    ///
    /// `init` runs at most once per registry for a given `T`, even when many
    /// threads ask for `T` at the same time. Every caller receives the same
    /// `Arc<T>`. When the instance already exists `init` is dropped unused.
    ///
    /// # Errors
    ///
    /// - [`InitError::Construction`] if `init` failed (only for the caller that ran it)
    /// - [`InitError::Poisoned`] if an earlier construction failed under
    ///   [`FailurePolicy::Poison`]
    /// - [`InitError::Registry`] if the type map could not be read
    fn get_or_try_init<T, E, F>(&self, init: F) -> Result<Arc<T>, InitError<E>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<T, E>,
    {
        let type_name = std::any::type_name::<T>();
        let slot = self.storage().slot::<T>(self.policy())?;

        let events = ConstructEvents {
            registry: self,
            slot: &slot,
            type_name,
            started: Cell::new(false),
            succeeded: Cell::new(false),
        };
        let result = slot.get_or_try_init(|| {
            events.started.set(true);
            self.emit_event(&RegistryEvent::Construct { type_name });
            init()
        });
        events.succeeded.set(result.is_ok());
        drop(events);

        result
    }

    /// Infallible form of [`get_or_try_init`](Self::get_or_try_init).
    fn get_or_init<T, F>(&self, init: F) -> Result<Arc<T>, InitError<Infallible>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        self.get_or_try_init(|| Ok::<T, Infallible>(init()))
    }

    /// Returns the singleton of type `T`, constructing it from `args` on first use.
    ///
    /// `args` are consumed only by the call that constructs `T`; any later
    /// call's `args` are dropped unused.
    fn instance<T: Singleton>(&self, args: T::Args) -> Result<Arc<T>, InitError<T::Error>> {
        self.get_or_try_init(|| T::construct(args))
    }

    /// Retrieve an already constructed singleton.
    ///
    /// Never constructs.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::TypeNotFound`] if `T` has not been constructed yet
    /// - [`RegistryError::RegistryLock`] if the type map lock is poisoned
    fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, RegistryError> {
        let type_name = std::any::type_name::<T>();

        let result = self
            .storage()
            .lookup::<T>()?
            .and_then(|slot| slot.get())
            .ok_or(RegistryError::TypeNotFound { type_name });

        self.emit_event(&RegistryEvent::Get {
            type_name,
            found: result.is_ok(),
        });

        result
    }

    /// Retrieve a cloned value of an already constructed singleton.
    fn get_cloned<T: Send + Sync + Clone + 'static>(&self) -> Result<T, RegistryError> {
        let arc = self.get::<T>()?;
        Ok((*arc).clone())
    }

    /// Check whether `T` has been constructed in this registry.
    ///
    /// # Errors
    ///
    /// - Registry lock is poisoned
    fn contains<T: Send + Sync + 'static>(&self) -> Result<bool, RegistryError> {
        let found = self
            .storage()
            .lookup::<T>()?
            .is_some_and(|slot| slot.is_initialized());

        self.emit_event(&RegistryEvent::Contains {
            type_name: std::any::type_name::<T>(),
            found,
        });

        Ok(found)
    }

    /// Check whether `T`'s slot was poisoned by a failed construction.
    fn is_poisoned<T: Send + Sync + 'static>(&self) -> Result<bool, RegistryError> {
        Ok(self
            .storage()
            .lookup::<T>()?
            .is_some_and(|slot| slot.is_poisoned()))
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
