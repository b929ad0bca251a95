//! Error types for modal operations and close guards.

use crate::id::ModalId;

/// Usage errors reported by registry operations.
///
/// These never corrupt state: the operation that produced one is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModalError {
    /// The modal has no record (never opened, or already closed).
    #[error("unknown modal: {0}")]
    UnknownModal(ModalId),

    /// A close guard was registered with no enclosing modal scope.
    #[error("close guards can only be registered from inside a mounted modal")]
    OutsideModalScope,
}

/// Errors raised while executing a close guard.
///
/// A guard error aborts the close without counting as a denial.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    /// The guard returned an error.
    #[error("close guard failed: {0}")]
    Failed(String),

    /// The guard panicked while running.
    #[error("close guard panicked: {0}")]
    Panicked(String),
}

impl GuardError {
    /// Creates a [`Failed`](Self::Failed) error.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}
