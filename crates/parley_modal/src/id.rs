//! Identity tokens for modals, guard owners, and record generations.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Unique identifier for one logical modal slot.
///
/// Modal IDs are generated using nanoid, so contexts can mint them without
/// coordinating with each other. Equality is token equality: two distinct
/// calls to [`ModalId::new`] never compare equal.
///
/// Internally uses `Arc<str>` for cheap cloning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalId(Arc<str>);

impl ModalId {
    /// Creates a new modal ID with a unique nanoid.
    #[must_use]
    pub fn new() -> Self {
        Self(nanoid::nanoid!().into())
    }

    /// Creates a modal ID from a specific string value.
    ///
    /// Useful for tests and for hosts that restore modal slots by name.
    #[must_use]
    pub fn from_string(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ModalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "modal_{}", self.0)
    }
}

static NEXT_OWNER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a sub-component that owns close guards.
///
/// All guards registered under one owner are removed together when that owner
/// is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Mints a fresh owner identity.
    #[must_use]
    pub fn new() -> Self {
        Self(NEXT_OWNER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn index(&self) -> u64 {
        self.0
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner_{}", self.0)
    }
}

/// Stamp distinguishing successive records created for the same [`ModalId`].
///
/// A negotiation remembers the generation it started against and never
/// mutates a record carrying a different one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub(crate) const FIRST: Self = Self(1);

    #[must_use]
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw generation number.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen_{}", self.0)
    }
}
