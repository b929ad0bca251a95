//! The modal context façade.
//!
//! A [`ModalContext`] owns one registry, one open queue, and one diagnostic
//! channel. Contexts are cheap to clone and fully independent of each other.
//!
//! # Example
//!
//! ```
//! use parley_modal::{ContentRef, ModalContext, ModalOptions, Props};
//! # futures::executor::block_on(async {
//!
//! let context = ModalContext::new(ModalOptions::default());
//! let confirm = context.make_modal(ContentRef::new("confirm"));
//!
//! confirm.open(Props::new().with("title", "Discard changes?")).await;
//! assert!(confirm.is_visible());
//!
//! assert!(confirm.close().await);
//! assert!(!confirm.is_visible());
//! # });
//! ```

use core::fmt;
use core::future::Future;
use std::sync::Arc;

use parley_store::{Emitter, Store, StoreChange, Subscription, Tracked};

use crate::error::ModalError;
use crate::events::ModalEvent;
use crate::guard::{CloseGuard, IntoGuardVerdict};
use crate::handle::ModalHandle;
use crate::id::{ModalId, OwnerId};
use crate::negotiation::{CloseOutcome, Negotiation};
use crate::options::ModalOptions;
use crate::props::{ContentRef, Props};
use crate::registry::{ModalRegistry, OpenKind};
use crate::renderer::ModalView;

struct ContextInner {
    options: ModalOptions,
    store: Store<ModalRegistry>,
    events: Emitter<ModalEvent>,
}

/// Shared handle to one modal registry.
///
/// # Thread Safety
///
/// The registry lives behind a lock that is never held across an `.await`,
/// so handles may be used from any task. Negotiations for different modals
/// interleave freely; a second close of the same modal while one is in flight
/// reports [`CloseOutcome::AlreadyClosing`].
#[derive(Clone)]
pub struct ModalContext {
    inner: Arc<ContextInner>,
}

impl fmt::Debug for ModalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalContext")
            .field("options", &self.inner.options)
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

impl Default for ModalContext {
    fn default() -> Self {
        Self::new(ModalOptions::default())
    }
}

impl ModalContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new(options: ModalOptions) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                options,
                store: Store::default(),
                events: Emitter::new(),
            }),
        }
    }

    /// Returns the options the context was created with.
    #[must_use]
    pub fn options(&self) -> &ModalOptions {
        &self.inner.options
    }

    /// Returns `true` if both handles refer to the same context.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Factory
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a handle for a new modal slot showing `content`.
    #[must_use]
    pub fn make_modal(&self, content: ContentRef) -> ModalHandle {
        self.make_modal_with_id(content, ModalId::new())
    }

    /// Creates a handle bound to a caller-chosen id.
    ///
    /// Handles sharing an id operate on the same record.
    #[must_use]
    pub fn make_modal_with_id(&self, content: ContentRef, id: ModalId) -> ModalHandle {
        ModalHandle::new(self.clone(), id, content)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Open / Close
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates, updates, or reopens the record for `id`.
    ///
    /// This applies no eviction policy; see [`ModalHandle::open`] for that.
    pub fn open(&self, id: &ModalId, content: ContentRef, props: Props) -> OpenKind {
        let (kind, generation) = self
            .inner
            .store
            .update(|registry| registry.open(id, content, props));

        let id = id.clone();
        self.emit(match kind {
            OpenKind::Created => ModalEvent::Opened { id, generation },
            OpenKind::Updated => ModalEvent::Updated { id },
            OpenKind::Reopened => ModalEvent::Reopened { id, generation },
        });
        kind
    }

    /// Attempts to close `id`, returning whether it closed.
    pub async fn close_by_id(&self, id: &ModalId) -> bool {
        self.negotiate_close(id).await.is_closed()
    }

    /// Attempts to close `id`, reporting exactly how the attempt ended.
    pub async fn negotiate_close(&self, id: &ModalId) -> CloseOutcome {
        match self.begin_close(id) {
            Ok(negotiation) => negotiation.run().await,
            Err(outcome) => outcome,
        }
    }

    /// Starts closing `id` without evaluating guards yet.
    ///
    /// On success the record is already hidden and marked closing; the
    /// returned [`Negotiation`] must be run to settle it. Fails with
    /// [`CloseOutcome::Unknown`] or [`CloseOutcome::AlreadyClosing`].
    pub fn begin_close(&self, id: &ModalId) -> Result<Negotiation, CloseOutcome> {
        let (generation, guards) = self.inner.store.update(|registry| {
            match registry.get(id) {
                None => return Err(CloseOutcome::Unknown),
                Some(record) if record.meta.is_closing => return Err(CloseOutcome::AlreadyClosing),
                Some(_) => {}
            }
            let record = registry.get_mut(id).ok_or(CloseOutcome::Unknown)?;
            record.visible = false;
            record.meta.is_closing = true;
            Ok((
                record.generation,
                record.meta.close_guards.evaluation_order(),
            ))
        })?;

        self.emit(ModalEvent::CloseStarted {
            id: id.clone(),
            guard_count: guards.len(),
        });
        Ok(Negotiation::new(self.clone(), id.clone(), generation, guards))
    }

    /// Closes the most recently opened modal.
    pub async fn close_top(&self) -> CloseOutcome {
        match self.top() {
            Some(id) => self.negotiate_close(&id).await,
            None => CloseOutcome::Unknown,
        }
    }

    /// Closes every open modal from the top down, returning how many closed.
    ///
    /// Each close runs the full negotiation; a refusal does not stop the sweep.
    pub async fn close_all(&self) -> usize {
        let mut closed = 0;
        for id in self.open_queue().into_iter().rev() {
            if self.negotiate_close(&id).await.is_closed() {
                closed += 1;
            }
        }
        closed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns whether `id` should be shown; `false` if it has no record.
    #[must_use]
    pub fn is_visible(&self, id: &ModalId) -> bool {
        self.read_registry(|registry| registry.get(id).is_some_and(|record| record.visible))
    }

    /// Returns whether a negotiation for `id` is in flight.
    #[must_use]
    pub fn is_closing(&self, id: &ModalId) -> bool {
        self.read_registry(|registry| {
            registry
                .get(id)
                .is_some_and(|record| record.meta.is_closing)
        })
    }

    /// Returns whether `id` has a record.
    #[must_use]
    pub fn contains(&self, id: &ModalId) -> bool {
        self.read_registry(|registry| registry.get(id).is_some())
    }

    /// Returns the merged props of `id`.
    #[must_use]
    pub fn props(&self, id: &ModalId) -> Option<Props> {
        self.read_registry(|registry| registry.get(id).map(|record| record.props.clone()))
    }

    /// Returns the content of `id`.
    #[must_use]
    pub fn content(&self, id: &ModalId) -> Option<ContentRef> {
        self.read_registry(|registry| registry.get(id).map(|record| record.content.clone()))
    }

    /// Returns the stacking value of `id`.
    #[must_use]
    pub fn z_index(&self, id: &ModalId) -> Option<u32> {
        let base = self.inner.options.base_z_index;
        self.read_registry(|registry| registry.get(id).map(|record| record.z_index(base)))
    }

    /// Returns open modal ids, oldest first.
    #[must_use]
    pub fn open_queue(&self) -> Vec<ModalId> {
        self.read_registry(|registry| registry.queue().iter().cloned().collect())
    }

    /// Returns the number of open (or closing) modals.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.read_registry(ModalRegistry::len)
    }

    /// Returns the most recently opened modal.
    #[must_use]
    pub fn top(&self) -> Option<ModalId> {
        self.read_registry(|registry| registry.queue().last().cloned())
    }

    /// Returns a view of every record in stacking order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ModalView> {
        let base = self.inner.options.base_z_index;
        self.read_registry(|registry| {
            registry
                .iter()
                .map(|(id, record)| ModalView::from_record(id, record, base))
                .collect()
        })
    }

    /// Returns the registry version; it changes whenever a renderer should
    /// re-render.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.store.version()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Close Guards
    // ─────────────────────────────────────────────────────────────────────────

    /// Registers an async close guard for `id` on behalf of `owner`.
    ///
    /// Fails with [`ModalError::UnknownModal`] (and a usage event) if `id`
    /// has no record. Guards added while a negotiation is running take part
    /// in the next one.
    pub fn add_close_guard<F, Fut>(
        &self,
        id: &ModalId,
        owner: OwnerId,
        guard: F,
    ) -> Result<(), ModalError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoGuardVerdict,
    {
        self.add_boxed_close_guard(id, owner, CloseGuard::new(guard))
    }

    /// Registers an already type-erased close guard.
    pub fn add_boxed_close_guard(
        &self,
        id: &ModalId,
        owner: OwnerId,
        guard: CloseGuard,
    ) -> Result<(), ModalError> {
        let added = self.inner.store.update(|registry| {
            let Some(record) = registry.untracked().get_mut(id) else {
                return false;
            };
            record.meta.close_guards.insert(owner, guard);
            true
        });

        if !added {
            let error = ModalError::UnknownModal(id.clone());
            self.report_usage(&error);
            return Err(error);
        }
        if self.inner.options.debug {
            tracing::debug!(modal = %id, %owner, "close guard registered");
        }
        Ok(())
    }

    /// Drops every guard `owner` registered for `id`, returning how many.
    ///
    /// Idempotent; unknown ids and owners are a no-op.
    pub fn remove_close_guards(&self, id: &ModalId, owner: OwnerId) -> usize {
        let removed = self.inner.store.update(|registry| {
            registry
                .untracked()
                .get_mut(id)
                .map_or(0, |record| record.meta.close_guards.remove_owner(owner))
        });
        if removed > 0 && self.inner.options.debug {
            tracing::debug!(modal = %id, %owner, removed, "close guards removed");
        }
        removed
    }

    /// Returns the number of guards registered for `id`.
    #[must_use]
    pub fn guard_count(&self, id: &ModalId) -> usize {
        self.read_registry(|registry| {
            registry
                .get(id)
                .map_or(0, |record| record.meta.close_guards.len())
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Observation
    // ─────────────────────────────────────────────────────────────────────────

    /// Runs `callback` after every registry change a renderer must reflect.
    pub fn subscribe(
        &self,
        callback: impl Fn(&StoreChange) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.store.subscribe(callback)
    }

    /// Runs `callback` for every lifecycle and diagnostic event.
    pub fn observe(&self, callback: impl Fn(&ModalEvent) + Send + Sync + 'static) -> Subscription {
        self.inner.events.subscribe(callback)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) fn read_registry<R>(&self, f: impl FnOnce(&ModalRegistry) -> R) -> R {
        self.inner.store.read(f)
    }

    pub(crate) fn update_registry<R>(
        &self,
        f: impl FnOnce(&mut Tracked<'_, ModalRegistry>) -> R,
    ) -> R {
        self.inner.store.update(f)
    }

    /// Publishes `event` and logs it. Never called with the registry locked.
    pub(crate) fn emit(&self, event: ModalEvent) {
        match &event {
            ModalEvent::GuardFailed {
                id,
                guard_index,
                error,
            } => {
                tracing::error!(modal = %id, guard_index, %error, "close guard failed");
            }
            ModalEvent::UsageError { message } => {
                tracing::warn!(message = %message, "modal usage error");
            }
            _ if self.inner.options.debug => {
                tracing::debug!(event = event.name(), modal = ?event.modal_id(), "{event}");
            }
            _ => {}
        }
        self.inner.events.emit(&event);
    }

    pub(crate) fn report_usage(&self, error: &ModalError) {
        self.emit(ModalEvent::UsageError {
            message: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> ContentRef {
        ContentRef::new("body")
    }

    #[test]
    fn open_reports_created_then_updated() {
        let context = ModalContext::default();
        let id = ModalId::new();

        assert_eq!(context.open(&id, content(), Props::new()), OpenKind::Created);
        assert_eq!(
            context.open(&id, content(), Props::new().with("title", "Hi")),
            OpenKind::Updated
        );
        assert_eq!(context.depth(), 1);
        assert_eq!(
            context.props(&id).unwrap().get_as::<String>("title").as_deref(),
            Some("Hi")
        );
    }

    #[test]
    fn z_index_starts_at_base() {
        let context = ModalContext::new(ModalOptions::default().with_base_z_index(500));
        let first = ModalId::new();
        let second = ModalId::new();
        context.open(&first, content(), Props::new());
        context.open(&second, content(), Props::new());

        assert_eq!(context.z_index(&first), Some(500));
        assert_eq!(context.z_index(&second), Some(501));
        assert_eq!(context.top(), Some(second));
    }

    #[test]
    fn begin_close_is_exclusive() {
        let context = ModalContext::default();
        let id = ModalId::new();
        context.open(&id, content(), Props::new());

        let negotiation = context.begin_close(&id).ok().unwrap();
        assert!(!context.is_visible(&id));
        assert!(context.is_closing(&id));
        assert_eq!(
            context.begin_close(&id).err(),
            Some(CloseOutcome::AlreadyClosing)
        );
        assert_eq!(
            context.begin_close(&ModalId::new()).err(),
            Some(CloseOutcome::Unknown)
        );
        drop(negotiation);
    }

    #[test]
    fn guard_registration_does_not_bump_version() {
        let context = ModalContext::default();
        let id = ModalId::new();
        context.open(&id, content(), Props::new());
        let version = context.version();

        let owner = OwnerId::new();
        context.add_close_guard(&id, owner, || async {}).unwrap();
        assert_eq!(context.guard_count(&id), 1);
        assert_eq!(context.remove_close_guards(&id, owner), 1);
        assert_eq!(context.remove_close_guards(&id, owner), 0);

        assert_eq!(context.version(), version);
    }

    #[test]
    fn guard_on_unknown_modal_is_reported() {
        let context = ModalContext::default();
        let reported = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let reported_clone = Arc::clone(&reported);
        let _subscription = context.observe(move |event| {
            if let ModalEvent::UsageError { message } = event {
                reported_clone.lock().push(message.clone());
            }
        });

        let id = ModalId::from_string("ghost");
        let result = context.add_close_guard(&id, OwnerId::new(), || async { true });

        assert_eq!(result, Err(ModalError::UnknownModal(id)));
        assert_eq!(*reported.lock(), vec!["unknown modal: modal_ghost".to_owned()]);
    }

    #[test]
    fn contexts_are_independent() {
        let first = ModalContext::default();
        let second = ModalContext::default();
        let id = ModalId::from_string("shared");

        first.open(&id, content(), Props::new());

        assert!(first.contains(&id));
        assert!(!second.contains(&id));
        assert!(!first.ptr_eq(&second));
        assert!(first.ptr_eq(&first.clone()));
    }
}
