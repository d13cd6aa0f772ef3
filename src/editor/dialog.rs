//! Link and image URL prompts.
//!
//! At most one prompt is visible at a time. Opening one replaces the other.

use super::{EditError, Editor, Format};

/// Which prompt is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertKind {
    Link,
    Image,
}

impl InsertKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Link => "Link URL",
            Self::Image => "Image URL",
        }
    }
}

/// A visible prompt and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInput {
    pub kind: InsertKind,
    pub url: String,
    /// Validation message from the last rejected confirm.
    pub error: Option<String>,
}

/// Result of confirming a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    /// The URL was accepted and the prompt closed.
    Applied,
    /// The input was empty; the prompt stays open.
    Empty,
    /// The URL was rejected; the prompt stays open with a message.
    Rejected(EditError),
    /// No prompt was open.
    NotOpen,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertionDialogs {
    pending: Option<PendingInput>,
}

impl InsertionDialogs {
    pub const fn pending(&self) -> Option<&PendingInput> {
        self.pending.as_ref()
    }

    pub fn visible(&self) -> Option<InsertKind> {
        self.pending.as_ref().map(|pending| pending.kind)
    }

    pub fn is_visible(&self, kind: InsertKind) -> bool {
        self.visible() == Some(kind)
    }

    /// Show a fresh prompt, closing any other one.
    pub fn open(&mut self, kind: InsertKind) {
        self.pending = Some(PendingInput {
            kind,
            url: String::new(),
            error: None,
        });
    }

    /// Show the prompt, or hide it if it is already showing.
    pub fn toggle(&mut self, kind: InsertKind) {
        if self.is_visible(kind) {
            self.cancel();
        } else {
            self.open(kind);
        }
    }

    /// Link toolbar button: removes an active link, otherwise opens the prompt.
    pub fn press_link(&mut self, editor: &mut Editor) {
        if editor.is_active(Format::Link) {
            editor.unset_link();
        } else {
            self.open(InsertKind::Link);
        }
    }

    /// Image toolbar button.
    pub fn press_image(&mut self) {
        self.toggle(InsertKind::Image);
    }

    pub fn push_char(&mut self, ch: char) {
        if let Some(pending) = self.pending.as_mut() {
            pending.url.push(ch);
            pending.error = None;
        }
    }

    pub fn backspace(&mut self) {
        if let Some(pending) = self.pending.as_mut() {
            pending.url.pop();
            pending.error = None;
        }
    }

    /// Hide the prompt and discard its text.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Apply the prompt's URL to the editor.
    pub fn confirm(&mut self, editor: &mut Editor) -> DialogOutcome {
        let Some(pending) = self.pending.as_mut() else {
            return DialogOutcome::NotOpen;
        };
        if pending.url.trim().is_empty() {
            return DialogOutcome::Empty;
        }
        let result = match pending.kind {
            InsertKind::Link => editor.set_link(&pending.url),
            InsertKind::Image => editor.set_image(&pending.url),
        };
        match result {
            Ok(()) => {
                self.pending = None;
                DialogOutcome::Applied
            }
            Err(err) => {
                pending.error = Some(err.to_string());
                DialogOutcome::Rejected(err)
            }
        }
    }
}
