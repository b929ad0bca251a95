//! Modal lifecycle management for Parley (Layer 2).
//!
//! `parley_modal` tracks which modals are open, stacks them, and negotiates
//! every close with the close guards registered by the modal's content.
//! A close is a sequence of awaited guards, any of which may refuse; an
//! `open` on the same modal while guards are pending cancels the close.
//!
//! # Core Concepts
//!
//! - [`ModalContext`] - One registry, open queue, and diagnostic channel
//! - [`ModalHandle`] - `open` / `close` / `is_visible` bound to one modal
//! - [`CloseGuard`] - Async callback that may veto a close
//! - [`ModalScope`] / [`on_before_close`] - Ambient guard registration from mounted content
//! - [`ModalRenderer`] - Keeps host-rendered instances in step with the registry
//!
//! # Example
//!
//! ```
//! use parley_modal::{ContentRef, ModalContext, ModalOptions, OwnerId, Props};
//! # futures::executor::block_on(async {
//!
//! let context = ModalContext::new(ModalOptions::default());
//! let editor = context.make_modal(ContentRef::new("editor"));
//! editor.open(Props::new().with("file", "notes.md")).await;
//!
//! // The editor has unsaved changes and refuses to close.
//! let owner = OwnerId::new();
//! context
//!     .add_close_guard(editor.id(), owner, || async { false })
//!     .unwrap();
//! assert!(!editor.close().await);
//! assert!(editor.is_visible());
//!
//! // Once the guard is gone the close goes through.
//! context.remove_close_guards(editor.id(), owner);
//! assert!(editor.close().await);
//! # });
//! ```
//!
//! # Architecture
//!
//! - **Layer 1** (`parley_store`): observable primitives
//! - **Layer 2** (`parley_modal`): modal registry, close negotiation, rendering contract (this crate)

/// Modal context façade.
pub mod context;

/// Error types.
pub mod error;

/// Lifecycle and diagnostic events.
pub mod events;

/// Close guards and the per-modal guard map.
pub mod guard;

/// Per-modal handles.
pub mod handle;

/// Identity tokens.
pub mod id;

/// Sequential close negotiation.
pub mod negotiation;

/// Context configuration.
pub mod options;

/// Content references and props.
pub mod props;

/// Records and the open queue.
pub mod registry;

/// The rendering contract.
pub mod renderer;

/// Ambient scope and guard owners.
pub mod scope;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::context::ModalContext;
    pub use crate::error::{GuardError, ModalError};
    pub use crate::events::ModalEvent;
    pub use crate::guard::{CloseGuard, GuardVerdict, IntoGuardVerdict};
    pub use crate::handle::{Eviction, ModalHandle, OpenOutcome};
    pub use crate::id::{ModalId, OwnerId};
    pub use crate::negotiation::CloseOutcome;
    pub use crate::options::ModalOptions;
    pub use crate::props::{ContentRef, Props};
    pub use crate::registry::OpenKind;
    pub use crate::renderer::{ContentRenderer, ModalRenderer, ModalView, RenderPass};
    pub use crate::scope::{GuardOwner, ModalScope, on_before_close};
}

// Re-export key types at crate root for convenience
pub use context::ModalContext;
pub use error::{GuardError, ModalError};
pub use events::ModalEvent;
pub use guard::{CloseGuard, GuardMap, GuardVerdict, IntoGuardVerdict};
pub use handle::{Eviction, ModalHandle, OpenOutcome};
pub use id::{Generation, ModalId, OwnerId};
pub use negotiation::{CloseOutcome, Negotiation};
pub use options::ModalOptions;
pub use parley_store::{StoreChange, Subscription};
pub use props::{ContentRef, Props};
pub use registry::{ModalMeta, ModalRecord, ModalRegistry, OpenKind, OpenQueue};
pub use renderer::{ContentRenderer, ModalRenderer, ModalView, RenderPass};
pub use scope::{GuardOwner, ModalScope, on_before_close};
