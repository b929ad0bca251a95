//! Modal records and the open queue.
//!
//! [`ModalRegistry`] is the single source of truth for which modals exist.
//! It lives inside the context's [`Store`](parley_store::Store) and is only
//! mutated through [`ModalContext`](crate::ModalContext) operations.
//!
//! # Invariants
//!
//! 1. An id is in the queue exactly when it has a record.
//! 2. Every record's `order` equals its position in the queue.
//! 3. Generations are unique within a context and strictly increase.

use hashbrown::HashMap;

use crate::guard::GuardMap;
use crate::id::{Generation, ModalId};
use crate::props::{ContentRef, Props};

/// What [`ModalContext::open`](crate::ModalContext::open) did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenKind {
    /// No record existed; a new one was created on top of the stack.
    Created,
    /// An open record received merged props.
    Updated,
    /// A record mid-close was discarded and recreated on top of the stack.
    Reopened,
}

// ─────────────────────────────────────────────────────────────────────────────
// ModalRecord
// ─────────────────────────────────────────────────────────────────────────────

/// Close bookkeeping attached to a record.
#[derive(Debug, Clone, Default)]
pub struct ModalMeta {
    /// A negotiation is in flight.
    pub is_closing: bool,
    /// Guards consulted by the next negotiation.
    pub close_guards: GuardMap,
}

/// State of one open (or closing) modal.
#[derive(Debug, Clone)]
pub struct ModalRecord {
    /// Stamp of this particular record.
    pub generation: Generation,
    /// What the renderer should show.
    pub content: ContentRef,
    /// Props merged from every open call since creation.
    pub props: Props,
    /// Whether the renderer should show the modal.
    pub visible: bool,
    /// Position in the open queue.
    pub order: usize,
    /// Close bookkeeping.
    pub meta: ModalMeta,
}

impl ModalRecord {
    /// Stacking value for this record under `base`.
    #[must_use]
    pub fn z_index(&self, base: u32) -> u32 {
        let order = u32::try_from(self.order).unwrap_or(u32::MAX);
        base.saturating_add(order)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OpenQueue
// ─────────────────────────────────────────────────────────────────────────────

/// Ids of existing records, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenQueue {
    ids: Vec<ModalId>,
}

impl OpenQueue {
    /// Appends `id` on top.
    pub fn push(&mut self, id: ModalId) {
        self.ids.push(id);
    }

    /// Removes `id`, returning whether it was present.
    pub fn remove(&mut self, id: &ModalId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns the stacking position of `id`.
    #[must_use]
    pub fn position(&self, id: &ModalId) -> Option<usize> {
        self.ids.iter().position(|queued| queued == id)
    }

    /// Returns the most recently opened id.
    #[must_use]
    pub fn last(&self) -> Option<&ModalId> {
        self.ids.last()
    }

    /// Returns the most recently opened id other than `id`.
    #[must_use]
    pub fn last_except(&self, id: &ModalId) -> Option<&ModalId> {
        self.ids.iter().rev().find(|queued| *queued != id)
    }

    /// Iterates from bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ModalId> {
        self.ids.iter()
    }

    /// Returns the number of queued ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns `true` if `id` is queued.
    #[must_use]
    pub fn contains(&self, id: &ModalId) -> bool {
        self.ids.contains(id)
    }

    /// Returns the ids as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[ModalId] {
        &self.ids
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ModalRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Records keyed by id plus the queue that orders them.
#[derive(Debug, Clone)]
pub struct ModalRegistry {
    records: HashMap<ModalId, ModalRecord>,
    queue: OpenQueue,
    next_generation: Generation,
}

impl Default for ModalRegistry {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            queue: OpenQueue::default(),
            next_generation: Generation::FIRST,
        }
    }
}

impl ModalRegistry {
    /// Returns the record for `id`.
    #[must_use]
    pub fn get(&self, id: &ModalId) -> Option<&ModalRecord> {
        self.records.get(id)
    }

    /// Returns the open queue.
    #[must_use]
    pub fn queue(&self) -> &OpenQueue {
        &self.queue
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no modal is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in stacking order.
    pub fn iter(&self) -> impl Iterator<Item = (&ModalId, &ModalRecord)> {
        self.queue
            .iter()
            .filter_map(|id| self.records.get_key_value(id))
    }

    pub(crate) fn get_mut(&mut self, id: &ModalId) -> Option<&mut ModalRecord> {
        self.records.get_mut(id)
    }

    /// Creates, updates, or reopens the record for `id`.
    ///
    /// Returns what happened and the generation of the resulting record.
    pub(crate) fn open(
        &mut self,
        id: &ModalId,
        content: ContentRef,
        props: Props,
    ) -> (OpenKind, Generation) {
        match self.records.get_mut(id) {
            None => (OpenKind::Created, self.insert_fresh(id, content, props)),
            Some(record) if !record.meta.is_closing => {
                record.content = content;
                record.props.merge(props);
                record.visible = true;
                (OpenKind::Updated, record.generation)
            }
            Some(_) => {
                self.remove(id);
                (OpenKind::Reopened, self.insert_fresh(id, content, props))
            }
        }
    }

    /// Deletes the record for `id` and its queue entry.
    pub(crate) fn remove(&mut self, id: &ModalId) -> Option<ModalRecord> {
        let record = self.records.remove(id)?;
        if self.queue.remove(id) {
            self.renumber();
        }
        Some(record)
    }

    fn insert_fresh(&mut self, id: &ModalId, content: ContentRef, props: Props) -> Generation {
        let generation = self.next_generation;
        self.next_generation = generation.next();

        self.records.insert(
            id.clone(),
            ModalRecord {
                generation,
                content,
                props,
                visible: true,
                order: self.queue.len(),
                meta: ModalMeta::default(),
            },
        );
        self.queue.push(id.clone());
        generation
    }

    fn renumber(&mut self) {
        for (position, id) in self.queue.ids.iter().enumerate() {
            if let Some(record) = self.records.get_mut(id) {
                record.order = position;
            }
        }
    }

    /// Checks the structural invariants listed in the module docs.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        self.queue.len() == self.records.len()
            && self
                .queue
                .iter()
                .enumerate()
                .all(|(position, id)| self.records.get(id).is_some_and(|r| r.order == position))
    }
}
