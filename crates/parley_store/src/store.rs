//! Versioned shared store.
//!
//! A [`Store`] wraps a value behind a [`RwLock`] and tells subscribers when it
//! changed. Change tracking is shallow: any mutable access through
//! [`Tracked`] counts as a change, and nothing inspects the value itself.
//!
//! # Invariants
//!
//! 1. The version increments exactly once per [`Store::update`] call that took
//!    mutable access, and never otherwise.
//! 2. Subscribers run after the write lock is released.
//! 3. Subscribers are notified in registration order.

use core::fmt;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::emitter::{Emitter, Subscription};

/// Notification payload delivered to store subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
    /// Store version after the change.
    pub version: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tracked
// ─────────────────────────────────────────────────────────────────────────────

/// Write view handed to [`Store::update`].
///
/// Reading through [`Deref`] leaves the store clean; the first [`DerefMut`]
/// access marks it dirty.
pub struct Tracked<'a, T> {
    value: &'a mut T,
    dirty: bool,
}

impl<T> Tracked<'_, T> {
    /// Returns `true` if the value has been mutably accessed.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forces a change notification even without mutable access.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Mutable access that does not count as a change.
    ///
    /// For bookkeeping that lives next to observed state but that subscribers
    /// never render.
    pub fn untracked(&mut self) -> &mut T {
        self.value
    }
}

impl<T> Deref for Tracked<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value
    }
}

impl<T> DerefMut for Tracked<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.dirty = true;
        self.value
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────────────────────────────────────

struct StoreInner<T> {
    value: RwLock<T>,
    version: AtomicU64,
    changes: Emitter<StoreChange>,
}

/// Shared value with change notification.
///
/// Cloning a `Store` yields another handle to the same value.
pub struct Store<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("version", &self.version())
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl<T> Store<T> {
    /// Creates a store holding `value` at version 0.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                value: RwLock::new(value),
                version: AtomicU64::new(0),
                changes: Emitter::default(),
            }),
        }
    }

    /// Runs `f` with shared access to the value.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.read())
    }

    /// Runs `f` with write access to the value.
    ///
    /// Subscribers are notified once, after the lock is released, if `f`
    /// mutably accessed the value.
    pub fn update<R>(&self, f: impl FnOnce(&mut Tracked<'_, T>) -> R) -> R {
        let (result, change) = {
            let mut guard = self.inner.value.write();
            let mut tracked = Tracked {
                value: &mut *guard,
                dirty: false,
            };
            let result = f(&mut tracked);
            let change = tracked.dirty.then(|| StoreChange {
                version: self.inner.version.fetch_add(1, Ordering::SeqCst) + 1,
            });
            (result, change)
        };

        if let Some(change) = change {
            self.inner.changes.emit(&change);
        }
        result
    }

    /// Returns the number of changes applied so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::SeqCst)
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.changes.len()
    }

    /// Returns `true` if both handles point at the same store.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: 'static> Store<T> {
    /// Registers `callback` to run after every change.
    pub fn subscribe(
        &self,
        callback: impl Fn(&StoreChange) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.changes.subscribe(callback)
    }
}
