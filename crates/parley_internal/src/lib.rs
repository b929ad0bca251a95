//! # Parley Internal Library
//!
//! Re-exports the core Parley crates for convenience.

/// Layer 1: Observable store and event emitter.
pub use parley_store;

/// Layer 2: Modal registry, close negotiation, rendering contract.
pub use parley_modal;

/// Tracing subscriber setup.
pub use parley_diagnostics;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use parley_diagnostics::{TracingConfig, TracingFormat, TracingSetup};
    pub use parley_modal::prelude::*;
    pub use parley_store::{Store, StoreChange, Subscription};
}
