//! Diagnostic events for the modal lifecycle.
//!
//! Observers registered with [`ModalContext::observe`](crate::ModalContext::observe)
//! receive `&ModalEvent` and can match on variants for typed access.
//!
//! # Example
//!
//! ```
//! use parley_modal::{ModalContext, ModalEvent, ModalOptions};
//!
//! let context = ModalContext::new(ModalOptions::default());
//! let _subscription = context.observe(|event| match event {
//!     ModalEvent::GuardDenied { id, guard_index } => {
//!         println!("{id} refused to close (guard #{guard_index})");
//!     }
//!     ModalEvent::UsageError { message } => eprintln!("{message}"),
//!     _ => {}
//! });
//! ```

use core::fmt;

use crate::error::GuardError;
use crate::id::{Generation, ModalId};

/// Lifecycle and diagnostic events emitted by a [`ModalContext`](crate::ModalContext).
///
/// Events are emitted after the registry lock is released, so an observer may
/// query the context it is observing.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalEvent {
    // ─────────────────────────────────────────────────────────────────────────
    // Open Events
    // ─────────────────────────────────────────────────────────────────────────
    /// A new record was created and appended to the open queue.
    Opened {
        /// The modal that opened.
        id: ModalId,
        /// Generation stamped on the new record.
        generation: Generation,
    },

    /// An open record received merged props.
    Updated {
        /// The modal that was updated.
        id: ModalId,
    },

    /// An open cancelled an in-flight close and recreated the record.
    Reopened {
        /// The modal that reopened.
        id: ModalId,
        /// Generation stamped on the replacement record.
        generation: Generation,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Close Events
    // ─────────────────────────────────────────────────────────────────────────
    /// A close negotiation started.
    CloseStarted {
        /// The modal being closed.
        id: ModalId,
        /// Number of guards that will be evaluated.
        guard_count: usize,
    },

    /// A guard refused the close.
    GuardDenied {
        /// The modal that stays open.
        id: ModalId,
        /// Position of the refusing guard in evaluation order.
        guard_index: usize,
    },

    /// A guard failed or panicked; the close was aborted.
    GuardFailed {
        /// The modal whose close aborted.
        id: ModalId,
        /// Position of the failing guard in evaluation order.
        guard_index: usize,
        /// What went wrong.
        error: GuardError,
    },

    /// Every guard allowed; the record was removed.
    Closed {
        /// The modal that closed.
        id: ModalId,
    },

    /// A negotiation finished against a record that had been replaced.
    CloseSuperseded {
        /// The modal whose stale negotiation was discarded.
        id: ModalId,
    },

    /// A negotiation was dropped before it settled; the modal is visible
    /// again and can be closed anew.
    CloseAbandoned {
        /// The modal whose close was abandoned.
        id: ModalId,
    },

    /// The single-modal policy is closing `id` to make room for `by`.
    Evicting {
        /// The modal being evicted.
        id: ModalId,
        /// The modal being opened.
        by: ModalId,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Diagnostics
    // ─────────────────────────────────────────────────────────────────────────
    /// An API was misused; the operation was a no-op.
    UsageError {
        /// Human-readable description.
        message: String,
    },
}

impl ModalEvent {
    /// Returns a stable name for the event variant.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ModalEvent::Opened { .. } => "Opened",
            ModalEvent::Updated { .. } => "Updated",
            ModalEvent::Reopened { .. } => "Reopened",
            ModalEvent::CloseStarted { .. } => "CloseStarted",
            ModalEvent::GuardDenied { .. } => "GuardDenied",
            ModalEvent::GuardFailed { .. } => "GuardFailed",
            ModalEvent::Closed { .. } => "Closed",
            ModalEvent::CloseSuperseded { .. } => "CloseSuperseded",
            ModalEvent::CloseAbandoned { .. } => "CloseAbandoned",
            ModalEvent::Evicting { .. } => "Evicting",
            ModalEvent::UsageError { .. } => "UsageError",
        }
    }

    /// Returns the modal the event is about, if any.
    ///
    /// Usage errors are not tied to a modal and return `None`.
    #[must_use]
    pub fn modal_id(&self) -> Option<&ModalId> {
        match self {
            ModalEvent::Opened { id, .. }
            | ModalEvent::Updated { id }
            | ModalEvent::Reopened { id, .. }
            | ModalEvent::CloseStarted { id, .. }
            | ModalEvent::GuardDenied { id, .. }
            | ModalEvent::GuardFailed { id, .. }
            | ModalEvent::Closed { id }
            | ModalEvent::CloseSuperseded { id }
            | ModalEvent::CloseAbandoned { id }
            | ModalEvent::Evicting { id, .. } => Some(id),
            ModalEvent::UsageError { .. } => None,
        }
    }
}

impl fmt::Display for ModalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModalEvent::Opened { id, generation } => write!(f, "Opened({id} @ {generation})"),
            ModalEvent::Updated { id } => write!(f, "Updated({id})"),
            ModalEvent::Reopened { id, generation } => {
                write!(f, "Reopened({id} @ {generation})")
            }
            ModalEvent::CloseStarted { id, guard_count } => {
                write!(f, "CloseStarted({id}, guards: {guard_count})")
            }
            ModalEvent::GuardDenied { id, guard_index } => {
                write!(f, "GuardDenied({id}, guard: {guard_index})")
            }
            ModalEvent::GuardFailed {
                id,
                guard_index,
                error,
            } => write!(f, "GuardFailed({id}, guard: {guard_index}, error: {error})"),
            ModalEvent::Closed { id } => write!(f, "Closed({id})"),
            ModalEvent::CloseSuperseded { id } => write!(f, "CloseSuperseded({id})"),
            ModalEvent::CloseAbandoned { id } => write!(f, "CloseAbandoned({id})"),
            ModalEvent::Evicting { id, by } => write!(f, "Evicting({id}, by: {by})"),
            ModalEvent::UsageError { message } => write!(f, "UsageError({message})"),
        }
    }
}
