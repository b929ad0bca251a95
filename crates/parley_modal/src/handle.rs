//! Per-modal handles produced by [`ModalContext::make_modal`].

use crate::context::ModalContext;
use crate::events::ModalEvent;
use crate::id::ModalId;
use crate::negotiation::{CloseOutcome, Negotiation};
use crate::props::{ContentRef, Props};
use crate::registry::OpenKind;

/// Result of closing another modal to honour the single-modal policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eviction {
    /// The modal that was asked to close.
    pub id: ModalId,
    /// How its negotiation ended. A refusal leaves both modals open.
    pub outcome: CloseOutcome,
}

/// Result of [`ModalHandle::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOutcome {
    /// What happened to this modal's record.
    pub kind: OpenKind,
    /// This modal's stacking value once the open (and any eviction) settled.
    pub z_index: Option<u32>,
    /// Present when another modal had to be closed first.
    pub eviction: Option<Eviction>,
}

/// Operations bound to one modal slot.
///
/// Cloning is cheap; clones operate on the same slot.
#[derive(Debug, Clone)]
pub struct ModalHandle {
    id: ModalId,
    content: ContentRef,
    context: ModalContext,
}

impl ModalHandle {
    pub(crate) fn new(context: ModalContext, id: ModalId, content: ContentRef) -> Self {
        Self {
            id,
            content,
            context,
        }
    }

    /// Opens (or updates) this modal with `props`.
    ///
    /// When the context forbids multiple modals, the most recently opened
    /// other modal starts closing first, this modal opens immediately, and
    /// the returned future resolves once that eviction has settled. The
    /// eviction can be refused by the other modal's guards; this modal
    /// still opens.
    pub async fn open(&self, props: Props) -> OpenOutcome {
        let pending = if self.context.options().allow_multiple {
            None
        } else {
            self.begin_eviction()
        };

        let kind = self.open_now(props);

        let eviction = match pending {
            Some((id, Ok(negotiation))) => Some(Eviction {
                id,
                outcome: negotiation.run().await,
            }),
            Some((id, Err(outcome))) => Some(Eviction { id, outcome }),
            None => None,
        };

        OpenOutcome {
            kind,
            z_index: self.context.z_index(&self.id),
            eviction,
        }
    }

    /// Opens (or updates) this modal without applying any eviction policy.
    pub fn open_now(&self, props: Props) -> OpenKind {
        self.context.open(&self.id, self.content.clone(), props)
    }

    /// Attempts to close this modal, returning whether it closed.
    pub async fn close(&self) -> bool {
        self.close_detailed().await.is_closed()
    }

    /// Attempts to close this modal, reporting exactly how it ended.
    pub async fn close_detailed(&self) -> CloseOutcome {
        self.context.negotiate_close(&self.id).await
    }

    /// Returns whether this modal should be shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.context.is_visible(&self.id)
    }

    /// Returns whether a close negotiation for this modal is in flight.
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.context.is_closing(&self.id)
    }

    /// Returns this modal's id.
    #[must_use]
    pub fn id(&self) -> &ModalId {
        &self.id
    }

    /// Returns this modal's content.
    #[must_use]
    pub fn content(&self) -> &ContentRef {
        &self.content
    }

    /// Returns the context this modal lives in.
    #[must_use]
    pub fn context(&self) -> &ModalContext {
        &self.context
    }

    fn begin_eviction(&self) -> Option<(ModalId, Result<Negotiation, CloseOutcome>)> {
        let target = self
            .context
            .read_registry(|registry| registry.queue().last_except(&self.id).cloned())?;

        self.context.emit(ModalEvent::Evicting {
            id: target.clone(),
            by: self.id.clone(),
        });
        let negotiation = self.context.begin_close(&target);
        Some((target, negotiation))
    }
}
