//! Close guards and their per-modal registry.
//!
//! A close guard is an async callback that may veto a close. Guards are
//! grouped by the [`OwnerId`] of the sub-component that registered them, so a
//! torn-down sub-component can drop exactly its own guards.
//!
//! # Evaluation order
//!
//! Owner groups run in the order they were first registered against the
//! modal. Within a group, the most recently registered guard runs first.
//! Owner `A` registering `a1` then `a2`, followed by owner `B` registering
//! `b1`, evaluates as `a2, a1, b1`.

use core::fmt;
use core::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use indexmap::IndexMap;

use crate::error::GuardError;
use crate::id::OwnerId;

// ─────────────────────────────────────────────────────────────────────────────
// GuardVerdict
// ─────────────────────────────────────────────────────────────────────────────

/// A guard's answer to "may this modal close?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardVerdict {
    /// Let the close proceed to the next guard.
    #[default]
    Allow,
    /// Abort the close and keep the modal visible.
    Deny,
}

impl GuardVerdict {
    /// Returns `true` for [`Allow`](Self::Allow).
    #[must_use]
    pub fn is_allow(self) -> bool {
        self == GuardVerdict::Allow
    }
}

/// Conversion from whatever a guard returns into a verdict.
///
/// | Return type | Meaning |
/// |-------------|---------|
/// | `()` | allow |
/// | `bool` | `true` allows, `false` denies |
/// | `Option<bool>` | `None` allows |
/// | [`GuardVerdict`] | as is |
/// | `Result<T, E>` | `Ok` converts `T`; `Err` is a guard execution error |
pub trait IntoGuardVerdict {
    /// Performs the conversion.
    fn into_verdict(self) -> Result<GuardVerdict, GuardError>;
}

impl IntoGuardVerdict for () {
    fn into_verdict(self) -> Result<GuardVerdict, GuardError> {
        Ok(GuardVerdict::Allow)
    }
}

impl IntoGuardVerdict for bool {
    fn into_verdict(self) -> Result<GuardVerdict, GuardError> {
        Ok(if self {
            GuardVerdict::Allow
        } else {
            GuardVerdict::Deny
        })
    }
}

impl IntoGuardVerdict for Option<bool> {
    fn into_verdict(self) -> Result<GuardVerdict, GuardError> {
        self.unwrap_or(true).into_verdict()
    }
}

impl IntoGuardVerdict for GuardVerdict {
    fn into_verdict(self) -> Result<GuardVerdict, GuardError> {
        Ok(self)
    }
}

impl<T: IntoGuardVerdict, E: fmt::Display> IntoGuardVerdict for Result<T, E> {
    fn into_verdict(self) -> Result<GuardVerdict, GuardError> {
        match self {
            Ok(value) => value.into_verdict(),
            Err(err) => Err(GuardError::Failed(err.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CloseGuard
// ─────────────────────────────────────────────────────────────────────────────

type GuardFn = dyn Fn() -> BoxFuture<'static, Result<GuardVerdict, GuardError>> + Send + Sync;

/// Type-erased, shareable close guard.
///
/// Cloning is cheap; clones invoke the same callback.
#[derive(Clone)]
pub struct CloseGuard {
    callback: Arc<GuardFn>,
}

impl CloseGuard {
    /// Wraps an async callback.
    ///
    /// # Example
    ///
    /// ```
    /// use parley_modal::CloseGuard;
    ///
    /// let unsaved = true;
    /// let guard = CloseGuard::new(move || async move { !unsaved });
    /// # drop(guard);
    /// ```
    pub fn new<F, Fut>(callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoGuardVerdict,
    {
        Self {
            callback: Arc::new(move || {
                let future = callback();
                async move { future.await.into_verdict() }.boxed()
            }),
        }
    }

    /// Wraps a synchronous callback.
    pub fn from_fn<F, R>(callback: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoGuardVerdict,
    {
        Self {
            callback: Arc::new(move || {
                let verdict = callback().into_verdict();
                async move { verdict }.boxed()
            }),
        }
    }

    /// Starts one evaluation of the guard.
    ///
    /// The callback itself runs here; the returned future drives any async
    /// work it started.
    pub fn invoke(&self) -> BoxFuture<'static, Result<GuardVerdict, GuardError>> {
        (self.callback)()
    }

    /// Returns `true` if both handles wrap the same callback.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for CloseGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseGuard").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GuardMap
// ─────────────────────────────────────────────────────────────────────────────

/// Guards registered against one modal, grouped by owner.
#[derive(Debug, Clone, Default)]
pub struct GuardMap {
    /// Owner groups in first-registration order; each list most-recent-first.
    owners: IndexMap<OwnerId, Vec<CloseGuard>>,
}

impl GuardMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `guard` at the front of `owner`'s list.
    pub fn insert(&mut self, owner: OwnerId, guard: CloseGuard) {
        self.owners.entry(owner).or_default().insert(0, guard);
    }

    /// Drops every guard registered by `owner`, returning how many there were.
    ///
    /// Unknown owners are a no-op. Remaining owners keep their relative order.
    pub fn remove_owner(&mut self, owner: OwnerId) -> usize {
        self.owners
            .shift_remove(&owner)
            .map_or(0, |guards| guards.len())
    }

    /// Flattens the map into the order guards are evaluated in.
    #[must_use]
    pub fn evaluation_order(&self) -> Vec<CloseGuard> {
        self.owners.values().flatten().cloned().collect()
    }

    /// Returns the total number of guards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.values().map(Vec::len).sum()
    }

    /// Returns the number of owners with at least one guard.
    #[must_use]
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Returns `true` if no guards are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
