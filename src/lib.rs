//! Modal lifecycle management with ordered, cancellable, asynchronous close
//! negotiation.
//!

pub use parley_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use parley_internal::prelude::*;
}
