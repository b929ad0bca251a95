//! Example console session built with Parley.
//!
//! Dialogs are mounted by a [`ConsoleRenderer`] that draws each open modal as
//! one line. Editor dialogs register a close guard from inside their mount,
//! through the ambient modal scope, and refuse to close while their document
//! has unsaved edits.
//!
//! # Flow
//!
//! ```text
//! open About ──▶ open Editor ──▶ edit ──▶ close (denied)
//!                                            │
//!                    dismiss all ◀── close ◀─ save
//! ```

mod console;
mod dialog;
pub mod session;

pub use console::{ConsoleRenderer, Pane};
pub use dialog::{Dialog, Document};
pub use session::{Frame, Transcript};
