//! Ambient modal scope for content nested inside a mounted modal.
//!
//! While a [`ModalRenderer`](crate::ModalRenderer) mounts a modal's content it
//! enters that modal's [`ModalScope`]. Code running inside can then register
//! close guards with [`on_before_close`] without being handed the context or
//! the modal id explicitly.
//!
//! # Example
//!
//! ```
//! use parley_modal::{ContentRef, ModalContext, ModalScope, Props, on_before_close};
//!
//! let context = ModalContext::default();
//! let editor = context.make_modal(ContentRef::new("editor"));
//! editor.open_now(Props::new());
//!
//! let scope = ModalScope::new(context.clone(), editor.id().clone());
//! let owner = scope.enter(|| on_before_close(|| async { false })).unwrap();
//! assert_eq!(context.guard_count(editor.id()), 1);
//!
//! // Tearing the owner down removes its guards.
//! drop(owner);
//! assert_eq!(context.guard_count(editor.id()), 0);
//! ```

use core::cell::RefCell;
use core::future::Future;

use crate::context::ModalContext;
use crate::error::ModalError;
use crate::guard::IntoGuardVerdict;
use crate::id::{ModalId, OwnerId};

thread_local! {
    static SCOPES: RefCell<Vec<ModalScope>> = const { RefCell::new(Vec::new()) };
}

/// Pops the scope pushed by [`ModalScope::enter`], even on unwind.
struct ScopeReset;

impl Drop for ScopeReset {
    fn drop(&mut self) {
        SCOPES.with(|scopes| {
            scopes.borrow_mut().pop();
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ModalScope
// ─────────────────────────────────────────────────────────────────────────────

/// The modal a piece of content lives in, and the context that owns it.
#[derive(Debug, Clone)]
pub struct ModalScope {
    context: ModalContext,
    modal: ModalId,
}

impl ModalScope {
    /// Creates a scope for `modal` in `context`.
    #[must_use]
    pub fn new(context: ModalContext, modal: ModalId) -> Self {
        Self { context, modal }
    }

    /// Returns the enclosing context.
    #[must_use]
    pub fn context(&self) -> &ModalContext {
        &self.context
    }

    /// Returns the enclosing modal.
    #[must_use]
    pub fn modal(&self) -> &ModalId {
        &self.modal
    }

    /// Runs `f` with this scope installed as the current one on this thread.
    ///
    /// Scopes nest; the innermost one wins.
    pub fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        SCOPES.with(|scopes| scopes.borrow_mut().push(self.clone()));
        let _reset = ScopeReset;
        f()
    }

    /// Returns the innermost scope entered on this thread.
    #[must_use]
    pub fn current() -> Option<ModalScope> {
        SCOPES.with(|scopes| scopes.borrow().last().cloned())
    }

    /// Mints a guard owner bound to this scope's modal.
    #[must_use]
    pub fn owner(&self) -> GuardOwner {
        GuardOwner {
            scope: self.clone(),
            id: OwnerId::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GuardOwner
// ─────────────────────────────────────────────────────────────────────────────

/// Owner identity for the guards of one sub-component.
///
/// Dropping the owner removes every guard it registered, exactly once.
/// Keep it alive for as long as the sub-component is mounted.
#[must_use = "dropping a GuardOwner removes its close guards"]
#[derive(Debug)]
pub struct GuardOwner {
    scope: ModalScope,
    id: OwnerId,
}

impl GuardOwner {
    /// Returns the owner identity.
    #[must_use]
    pub fn id(&self) -> OwnerId {
        self.id
    }

    /// Returns the modal the owner's guards apply to.
    #[must_use]
    pub fn modal(&self) -> &ModalId {
        &self.scope.modal
    }

    /// Registers a close guard under this owner.
    pub fn on_before_close<F, Fut>(&self, guard: F) -> Result<(), ModalError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoGuardVerdict,
    {
        self.scope
            .context
            .add_close_guard(&self.scope.modal, self.id, guard)
    }
}

impl Drop for GuardOwner {
    fn drop(&mut self) {
        self.scope
            .context
            .remove_close_guards(&self.scope.modal, self.id);
    }
}

/// Registers a close guard for the modal enclosing the current scope.
///
/// The returned [`GuardOwner`] keeps the guard registered; drop it when the
/// registering component is torn down.
///
/// Outside any [`ModalScope`] this logs a warning and returns
/// [`ModalError::OutsideModalScope`] without touching any context.
pub fn on_before_close<F, Fut>(guard: F) -> Result<GuardOwner, ModalError>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoGuardVerdict,
{
    let Some(scope) = ModalScope::current() else {
        let error = ModalError::OutsideModalScope;
        tracing::warn!(%error, "modal usage error");
        return Err(error);
    };

    let owner = scope.owner();
    owner.on_before_close(guard)?;
    Ok(owner)
}
