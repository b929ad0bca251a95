//! Observable state primitives for Parley (Layer 1).
//!
//! `parley_store` replaces a UI framework's implicit reactivity with explicit
//! subscription. Renderers subscribe to a [`Store`] and re-render when it
//! reports a change; diagnostics consumers subscribe to an [`Emitter`].
//!
//! # Core Concepts
//!
//! - [`Store`] - Shared value with shallow change tracking and a version counter
//! - [`Tracked`] - Write view that marks the store dirty on mutable access
//! - [`Emitter`] - Ordered fan-out of events to subscriber callbacks
//! - [`Subscription`] - RAII handle that unsubscribes on drop
//!
//! # Example
//!
//! ```
//! use parley_store::Store;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! let store = Store::new(Vec::<u32>::new());
//! let seen = Arc::new(AtomicU64::new(0));
//! let seen_clone = Arc::clone(&seen);
//!
//! let _subscription = store.subscribe(move |change| {
//!     seen_clone.store(change.version, Ordering::SeqCst);
//! });
//!
//! store.update(|items| items.push(7));
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//!
//! // Read-only access through `update` is not a change.
//! store.update(|items| items.len());
//! assert_eq!(store.version(), 1);
//! ```
//!
//! # Architecture
//!
//! - **Layer 1** (`parley_store`): observable primitives (this crate)
//! - **Layer 2** (`parley_modal`): modal registry, close negotiation, rendering contract

/// Event fan-out and subscription handles.
pub mod emitter;

/// Versioned shared store with change notification.
pub mod store;

pub use emitter::{Emitter, Subscription};
pub use store::{Store, StoreChange, Tracked};
