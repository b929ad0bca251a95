//! Dialog content shown by the demo.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A document an editor dialog works on.
///
/// Cloning shares the same unsaved flag.
#[derive(Debug, Clone, Default)]
pub struct Document {
    unsaved: Arc<AtomicBool>,
}

impl Document {
    /// Marks the document as edited.
    pub fn edit(&self) {
        self.unsaved.store(true, Ordering::SeqCst);
    }

    /// Marks the document as saved.
    pub fn save(&self) {
        self.unsaved.store(false, Ordering::SeqCst);
    }

    /// Returns `true` if there are edits that would be lost on close.
    #[must_use]
    pub fn is_unsaved(&self) -> bool {
        self.unsaved.load(Ordering::SeqCst)
    }
}

/// What a dialog shows.
#[derive(Debug, Clone)]
pub enum Dialog {
    /// A read-only message.
    Notice {
        /// Heading.
        title: String,
    },
    /// An editor that refuses to close while its document is unsaved.
    Editor {
        /// Heading.
        title: String,
        /// The document being edited.
        document: Document,
    },
}

impl Dialog {
    /// Creates a notice.
    pub fn notice(title: impl Into<String>) -> Self {
        Dialog::Notice {
            title: title.into(),
        }
    }

    /// Creates an editor over `document`.
    pub fn editor(title: impl Into<String>, document: Document) -> Self {
        Dialog::Editor {
            title: title.into(),
            document,
        }
    }

    /// Returns the heading.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Dialog::Notice { title } | Dialog::Editor { title, .. } => title,
        }
    }
}
