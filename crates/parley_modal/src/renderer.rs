//! The rendering contract.
//!
//! Parley never draws anything. A host implements [`ContentRenderer`] for its
//! own widget system, and a [`ModalRenderer`] keeps one host instance mounted
//! per registry record, diffing on every [`render`](ModalRenderer::render).
//!
//! Instances are keyed by `(id, generation)`: a modal reopened mid-close gets
//! a fresh mount, so guards registered by the old instance's components never
//! leak into the new one.
//!
//! # Example
//!
//! ```
//! use parley_modal::{
//!     ContentRef, ContentRenderer, ModalContext, ModalRenderer, ModalScope, ModalView, Props,
//! };
//!
//! struct Titles;
//!
//! impl ContentRenderer for Titles {
//!     type Instance = String;
//!
//!     fn mount(&mut self, view: &ModalView, _scope: &ModalScope) -> String {
//!         view.props.get_as("title").unwrap_or_default()
//!     }
//!
//!     fn update(&mut self, instance: &mut String, view: &ModalView) {
//!         *instance = view.props.get_as("title").unwrap_or_default();
//!     }
//!
//!     fn unmount(&mut self, _instance: String) {}
//! }
//!
//! let context = ModalContext::default();
//! let mut renderer = ModalRenderer::new(context.clone(), Titles);
//!
//! let about = context.make_modal(ContentRef::new("about"));
//! about.open_now(Props::new().with("title", "About"));
//!
//! let pass = renderer.render();
//! assert_eq!(pass.mounted, 1);
//! assert_eq!(renderer.instances().next().map(|(_, title)| title.as_str()), Some("About"));
//! ```

use core::fmt;
use core::future::Future;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;
use parley_store::Subscription;

use crate::context::ModalContext;
use crate::id::{Generation, ModalId};
use crate::props::{ContentRef, Props};
use crate::registry::ModalRecord;
use crate::scope::ModalScope;

/// What a renderer needs to know about one record.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalView {
    /// The modal.
    pub id: ModalId,
    /// Stamp of the record this view was taken from.
    pub generation: Generation,
    /// What to show.
    pub content: ContentRef,
    /// Merged props.
    pub props: Props,
    /// Whether to show it.
    pub visible: bool,
    /// Stacking value; later modals are higher.
    pub z_index: u32,
}

impl ModalView {
    pub(crate) fn from_record(id: &ModalId, record: &ModalRecord, base_z_index: u32) -> Self {
        Self {
            id: id.clone(),
            generation: record.generation,
            content: record.content.clone(),
            props: record.props.clone(),
            visible: record.visible,
            z_index: record.z_index(base_z_index),
        }
    }
}

/// Host-side materialization of modal content.
pub trait ContentRenderer {
    /// Whatever the host keeps per mounted modal.
    type Instance;

    /// Builds an instance for a newly rendered record.
    ///
    /// Runs inside `scope`, so components built here may call
    /// [`on_before_close`](crate::on_before_close).
    fn mount(&mut self, view: &ModalView, scope: &ModalScope) -> Self::Instance;

    /// Brings an existing instance up to date with `view`.
    fn update(&mut self, instance: &mut Self::Instance, view: &ModalView);

    /// Tears an instance down. Dropping its guard owners here removes their
    /// guards.
    fn unmount(&mut self, instance: Self::Instance);
}

/// Counts of what one [`ModalRenderer::render`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderPass {
    /// Instances created.
    pub mounted: usize,
    /// Instances whose view changed.
    pub updated: usize,
    /// Instances torn down.
    pub unmounted: usize,
}

impl RenderPass {
    /// Returns `true` if the pass changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

struct Mounted<I> {
    view: ModalView,
    instance: I,
}

/// Keeps host instances in step with a context's registry.
pub struct ModalRenderer<R: ContentRenderer> {
    context: ModalContext,
    content: R,
    mounted: Vec<Mounted<R::Instance>>,
    dirty: Arc<AtomicBool>,
    _subscription: Subscription,
}

impl<R: ContentRenderer> ModalRenderer<R> {
    /// Creates a renderer over `context`. The first [`render`](Self::render)
    /// mounts whatever is already open.
    pub fn new(context: ModalContext, content: R) -> Self {
        let dirty = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&dirty);
        let subscription = context.subscribe(move |_| flag.store(true, Ordering::Release));

        Self {
            context,
            content,
            mounted: Vec::new(),
            dirty,
            _subscription: subscription,
        }
    }

    /// Returns `true` if the registry changed since the last render.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Reconciles mounted instances with the registry.
    pub fn render(&mut self) -> RenderPass {
        self.dirty.store(false, Ordering::Release);
        let views = self.context.snapshot();
        let mut pass = RenderPass::default();

        let mut previous: HashMap<(ModalId, Generation), Mounted<R::Instance>> = self
            .mounted
            .drain(..)
            .map(|mounted| ((mounted.view.id.clone(), mounted.view.generation), mounted))
            .collect();

        let live: Vec<(ModalId, Generation)> = views
            .iter()
            .map(|view| (view.id.clone(), view.generation))
            .collect();
        let stale: Vec<_> = previous
            .keys()
            .filter(|key| !live.contains(key))
            .cloned()
            .collect();
        for key in stale {
            if let Some(mounted) = previous.remove(&key) {
                self.content.unmount(mounted.instance);
                pass.unmounted += 1;
            }
        }

        for view in views {
            let key = (view.id.clone(), view.generation);
            let entry = match previous.remove(&key) {
                Some(mut mounted) => {
                    if mounted.view != view {
                        self.content.update(&mut mounted.instance, &view);
                        mounted.view = view;
                        pass.updated += 1;
                    }
                    mounted
                }
                None => {
                    let scope = ModalScope::new(self.context.clone(), view.id.clone());
                    let instance = scope.enter(|| self.content.mount(&view, &scope));
                    pass.mounted += 1;
                    Mounted { view, instance }
                }
            };
            self.mounted.push(entry);
        }

        if self.context.options().debug && !pass.is_empty() {
            tracing::debug!(
                mounted = pass.mounted,
                updated = pass.updated,
                unmounted = pass.unmounted,
                "modal render pass"
            );
        }
        pass
    }

    /// Requests a visibility change from the UI side.
    ///
    /// Hiding runs the full close negotiation, so a refusal leaves the modal
    /// visible. Showing reopens the record with its current props and fails
    /// only if the modal has no record. Resolves to whether the request took
    /// effect.
    pub fn set_visible(
        &self,
        id: &ModalId,
        visible: bool,
    ) -> impl Future<Output = bool> + Send + 'static {
        let context = self.context.clone();
        let id = id.clone();
        async move {
            if !visible {
                return context.close_by_id(&id).await;
            }
            let Some(content) = context.content(&id) else {
                return false;
            };
            // A reopen rebuilds the record from these props.
            let props = context.props(&id).unwrap_or_default();
            context.open(&id, content, props);
            true
        }
    }

    /// Iterates mounted instances in stacking order.
    pub fn instances(&self) -> impl Iterator<Item = (&ModalView, &R::Instance)> {
        self.mounted
            .iter()
            .map(|mounted| (&mounted.view, &mounted.instance))
    }

    /// Returns the number of mounted instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mounted.len()
    }

    /// Returns `true` if nothing is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty()
    }

    /// Returns the host renderer.
    #[must_use]
    pub fn content_renderer(&self) -> &R {
        &self.content
    }

    /// Returns the host renderer mutably.
    pub fn content_renderer_mut(&mut self) -> &mut R {
        &mut self.content
    }

    /// Returns the context being rendered.
    #[must_use]
    pub fn context(&self) -> &ModalContext {
        &self.context
    }
}

impl<R: ContentRenderer> Drop for ModalRenderer<R> {
    fn drop(&mut self) {
        for mounted in self.mounted.drain(..) {
            self.content.unmount(mounted.instance);
        }
    }
}

impl<R: ContentRenderer> fmt::Debug for ModalRenderer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalRenderer")
            .field("mounted", &self.mounted.len())
            .field("dirty", &self.is_dirty())
            .finish_non_exhaustive()
    }
}
