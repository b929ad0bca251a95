//! Sequential, cancellable close negotiation.
//!
//! A close runs in two halves. [`ModalContext::begin_close`] is synchronous:
//! under the registry lock it checks the record, flips it to closing, and
//! snapshots the guards. [`Negotiation::run`] then awaits each guard in turn
//! with no lock held.
//!
//! # Invariants
//!
//! 1. At most one negotiation per record is in flight; `is_closing` is the
//!    mutual-exclusion flag and is checked and set under one write lock.
//! 2. A guard never starts before the previous one resolved.
//! 3. A negotiation only mutates the record whose generation it captured.
//!    If that record was replaced (or already settled) the result is
//!    discarded and reported as [`CloseOutcome::Superseded`].
//! 4. A negotiation dropped before it settles (never run, timed out,
//!    cancelled by `select!`, aborted task) makes its record visible and
//!    closable again.

use core::any::Any;
use core::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::context::ModalContext;
use crate::error::GuardError;
use crate::events::ModalEvent;
use crate::guard::{CloseGuard, GuardVerdict};
use crate::id::{Generation, ModalId};
use crate::registry::ModalRegistry;

/// How a close attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Every guard allowed; the record is gone.
    Closed,
    /// A guard refused; the modal is visible again.
    Denied {
        /// Position of the refusing guard in evaluation order.
        guard_index: usize,
    },
    /// A guard failed; the close was aborted and the modal stays hidden.
    Failed {
        /// Position of the failing guard in evaluation order.
        guard_index: usize,
        /// What went wrong.
        error: GuardError,
    },
    /// The record was reopened while guards were running.
    Superseded,
    /// Another negotiation for this record is already in flight.
    AlreadyClosing,
    /// No record exists for the id.
    Unknown,
}

impl CloseOutcome {
    /// Returns `true` only for [`Closed`](Self::Closed).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, CloseOutcome::Closed)
    }
}

/// A close that has begun and is waiting to evaluate its guards.
///
/// Dropping a negotiation before it settles, whether it was never run or its
/// [`run`](Self::run) future was cancelled mid-guard, restores the record to
/// `visible` and not closing, and emits [`ModalEvent::CloseAbandoned`].
#[must_use = "a begun close stays pending until the negotiation is run"]
pub struct Negotiation {
    context: ModalContext,
    id: ModalId,
    generation: Generation,
    guards: Vec<CloseGuard>,
}

impl Negotiation {
    pub(crate) fn new(
        context: ModalContext,
        id: ModalId,
        generation: Generation,
        guards: Vec<CloseGuard>,
    ) -> Self {
        Self {
            context,
            id,
            generation,
            guards,
        }
    }

    /// The modal being closed.
    #[must_use]
    pub fn id(&self) -> &ModalId {
        &self.id
    }

    /// Number of guards this negotiation will consult.
    #[must_use]
    pub fn guard_count(&self) -> usize {
        self.guards.len()
    }

    /// Evaluates every guard in order and settles the record.
    pub async fn run(self) -> CloseOutcome {
        for (guard_index, guard) in self.guards.iter().enumerate() {
            let guard = guard.clone();
            let verdict = AssertUnwindSafe(async move { guard.invoke().await })
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(GuardError::Panicked(panic_message(&*payload))));

            match verdict {
                Ok(GuardVerdict::Allow) => {
                    if !self.is_current() {
                        return self.superseded();
                    }
                }
                Ok(GuardVerdict::Deny) => return self.deny(guard_index),
                Err(error) => return self.fail(guard_index, error),
            }
        }

        let settled = self.settle(|registry| {
            registry.remove(&self.id);
        });
        if !settled {
            return self.superseded();
        }
        self.context.emit(ModalEvent::Closed {
            id: self.id.clone(),
        });
        CloseOutcome::Closed
    }

    fn deny(&self, guard_index: usize) -> CloseOutcome {
        let settled = self.settle(|registry| {
            if let Some(record) = registry.get_mut(&self.id) {
                record.visible = true;
                record.meta.is_closing = false;
            }
        });
        if !settled {
            return self.superseded();
        }
        self.context.emit(ModalEvent::GuardDenied {
            id: self.id.clone(),
            guard_index,
        });
        CloseOutcome::Denied { guard_index }
    }

    fn fail(&self, guard_index: usize, error: GuardError) -> CloseOutcome {
        // Visibility stays false so the failure is noticed.
        let settled = self.settle(|registry| {
            if let Some(record) = registry.get_mut(&self.id) {
                record.meta.is_closing = false;
            }
        });
        if !settled {
            return self.superseded();
        }
        self.context.emit(ModalEvent::GuardFailed {
            id: self.id.clone(),
            guard_index,
            error: error.clone(),
        });
        CloseOutcome::Failed { guard_index, error }
    }

    fn superseded(&self) -> CloseOutcome {
        self.context.emit(ModalEvent::CloseSuperseded {
            id: self.id.clone(),
        });
        CloseOutcome::Superseded
    }

    fn is_current(&self) -> bool {
        self.context.read_registry(|registry| self.matches(registry))
    }

    fn matches(&self, registry: &ModalRegistry) -> bool {
        registry
            .get(&self.id)
            .is_some_and(|record| record.generation == self.generation && record.meta.is_closing)
    }

    /// Applies `apply` if the captured record is still the one closing.
    fn settle(&self, apply: impl FnOnce(&mut ModalRegistry)) -> bool {
        self.context.update_registry(|registry| {
            if !self.matches(registry) {
                return false;
            }
            apply(&mut **registry);
            true
        })
    }
}

impl Drop for Negotiation {
    fn drop(&mut self) {
        // Settled negotiations no longer match: the record is gone, replaced,
        // or no longer closing.
        let restored = self.settle(|registry| {
            if let Some(record) = registry.get_mut(&self.id) {
                record.visible = true;
                record.meta.is_closing = false;
            }
        });
        if restored {
            self.context.emit(ModalEvent::CloseAbandoned {
                id: self.id.clone(),
            });
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "close guard panicked".to_owned()
    }
}
