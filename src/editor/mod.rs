//! Rich-text editor engine.
//!
//! [`EditorState`] is a value with a pure transition function. [`Editor`]
//! owns one, validates commands, and tells its owner when the document
//! changes.

mod dialog;
mod history;
mod ops;
mod state;

use thiserror::Error;

use crate::document::{Document, Mark, Selection, UrlKind, validate_url};

pub use dialog::{DialogOutcome, InsertKind, InsertionDialogs, PendingInput};
pub use history::{DEFAULT_HISTORY_LIMIT, History, Snapshot};
pub use ops::Direction;
pub use state::EditorState;

/// Errors raised by editor commands. None of them change the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("URL is empty")]
    EmptyUrl,
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("URL scheme {scheme:?} is not allowed")]
    DisallowedScheme { scheme: String },
}

/// Toolbar toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    Bold,
    Italic,
    Code,
    BulletList,
    OrderedList,
    Blockquote,
    CodeBlock,
}

impl Toggle {
    /// The inline mark this toggle flips, if it is a mark toggle.
    pub const fn mark(self) -> Option<Mark> {
        match self {
            Self::Bold => Some(Mark::Bold),
            Self::Italic => Some(Mark::Italic),
            Self::Code => Some(Mark::Code),
            Self::BulletList | Self::OrderedList | Self::Blockquote | Self::CodeBlock => None,
        }
    }
}

/// Formats the toolbar can show as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Bold,
    Italic,
    Code,
    BulletList,
    OrderedList,
    Blockquote,
    CodeBlock,
    Link,
}

impl From<Toggle> for Format {
    fn from(toggle: Toggle) -> Self {
        match toggle {
            Toggle::Bold => Self::Bold,
            Toggle::Italic => Self::Italic,
            Toggle::Code => Self::Code,
            Toggle::BulletList => Self::BulletList,
            Toggle::OrderedList => Self::OrderedList,
            Toggle::Blockquote => Self::Blockquote,
            Toggle::CodeBlock => Self::CodeBlock,
        }
    }
}

/// Editor commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Toggle(Toggle),
    SetLink(String),
    UnsetLink,
    SetImage(String),
    Undo,
    Redo,
    InsertText(String),
    DeleteBack,
    SplitBlock,
    MoveCursor { direction: Direction, extend: bool },
    SelectAll,
    SetSelection(Selection),
    Reset,
    LoadHtml(String),
}

impl Command {
    /// Check URL arguments, replacing them with their validated form.
    ///
    /// # Errors
    ///
    /// Returns an [`EditError`] when a link or image URL is empty, malformed,
    /// or uses a disallowed scheme.
    pub fn validated(self) -> Result<Self, EditError> {
        match self {
            Self::SetLink(url) => Ok(Self::SetLink(validate_url(&url, UrlKind::Link)?)),
            Self::SetImage(url) => Ok(Self::SetImage(validate_url(&url, UrlKind::Image)?)),
            other => Ok(other),
        }
    }
}

type ChangeListener = Box<dyn FnMut(&str)>;

/// An editor instance with a change listener.
#[derive(Default)]
pub struct Editor {
    state: EditorState,
    listener: Option<ChangeListener>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            state: EditorState::new(limit),
            listener: None,
        }
    }

    /// Register the callback invoked with the serialized document after each
    /// change. Replaces any earlier listener.
    pub fn on_change(&mut self, listener: impl FnMut(&str) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub const fn state(&self) -> &EditorState {
        &self.state
    }

    pub const fn document(&self) -> &Document {
        self.state.document()
    }

    pub const fn selection(&self) -> Selection {
        self.state.selection()
    }

    pub fn html(&self) -> String {
        self.state.html()
    }

    pub const fn can_undo(&self) -> bool {
        self.state.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.can_redo()
    }

    pub fn is_active(&self, format: Format) -> bool {
        self.state.is_active(format)
    }

    /// Validate and apply a command, notifying the listener if the document
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns an [`EditError`] for rejected URL input; the state is left
    /// untouched.
    pub fn dispatch(&mut self, command: Command) -> Result<(), EditError> {
        let command = command.validated()?;
        let before = self.state.revision();
        self.state = std::mem::take(&mut self.state).apply(command);
        if self.state.revision() != before {
            let html = self.state.html();
            if let Some(listener) = self.listener.as_mut() {
                listener(&html);
            }
        }
        Ok(())
    }

    /// Dispatch a command that carries no URL and so cannot fail.
    fn run(&mut self, command: Command) {
        if let Err(err) = self.dispatch(command) {
            tracing::warn!(%err, "editor command rejected");
        }
    }

    pub fn toggle(&mut self, toggle: Toggle) {
        self.run(Command::Toggle(toggle));
    }

    pub fn toggle_bold(&mut self) {
        self.toggle(Toggle::Bold);
    }

    pub fn toggle_italic(&mut self) {
        self.toggle(Toggle::Italic);
    }

    pub fn toggle_code(&mut self) {
        self.toggle(Toggle::Code);
    }

    pub fn toggle_bullet_list(&mut self) {
        self.toggle(Toggle::BulletList);
    }

    pub fn toggle_ordered_list(&mut self) {
        self.toggle(Toggle::OrderedList);
    }

    pub fn toggle_blockquote(&mut self) {
        self.toggle(Toggle::Blockquote);
    }

    pub fn toggle_code_block(&mut self) {
        self.toggle(Toggle::CodeBlock);
    }

    /// Link the current selection. A no-op for an empty selection.
    ///
    /// # Errors
    ///
    /// Returns an [`EditError`] if the URL is rejected.
    pub fn set_link(&mut self, url: &str) -> Result<(), EditError> {
        self.dispatch(Command::SetLink(url.to_string()))
    }

    pub fn unset_link(&mut self) {
        self.run(Command::UnsetLink);
    }

    /// Insert an image at the cursor.
    ///
    /// # Errors
    ///
    /// Returns an [`EditError`] if the URL is rejected.
    pub fn set_image(&mut self, url: &str) -> Result<(), EditError> {
        self.dispatch(Command::SetImage(url.to_string()))
    }

    pub fn undo(&mut self) {
        self.run(Command::Undo);
    }

    pub fn redo(&mut self) {
        self.run(Command::Redo);
    }

    pub fn insert_text(&mut self, text: &str) {
        self.run(Command::InsertText(text.to_string()));
    }

    pub fn delete_back(&mut self) {
        self.run(Command::DeleteBack);
    }

    pub fn split_block(&mut self) {
        self.run(Command::SplitBlock);
    }

    pub fn move_cursor(&mut self, direction: Direction, extend: bool) {
        self.run(Command::MoveCursor { direction, extend });
    }

    pub fn select_all(&mut self) {
        self.run(Command::SelectAll);
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.run(Command::SetSelection(selection));
    }

    /// Clear the document and the history.
    pub fn reset(&mut self) {
        self.run(Command::Reset);
    }

    /// Replace the content with the sanitized form of `html`.
    pub fn load_html(&mut self, html: &str) {
        self.run(Command::LoadHtml(html.to_string()));
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("state", &self.state)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Position;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_editor() -> (Editor, Rc<RefCell<Vec<String>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut editor = Editor::new();
        let sink = Rc::clone(&seen);
        editor.on_change(move |html| sink.borrow_mut().push(html.to_string()));
        (editor, seen)
    }

    #[test]
    fn test_fresh_editor_cannot_undo_or_redo() {
        let editor = Editor::new();
        assert!(!editor.can_undo());
        assert!(!editor.can_redo());
        assert_eq!(editor.html(), "<p></p>");
    }

    #[test]
    fn test_listener_sees_each_change() {
        let (mut editor, seen) = recording_editor();
        editor.insert_text("Hi");
        editor.select_all();
        editor.toggle_bold();
        assert_eq!(
            *seen.borrow(),
            vec!["<p>Hi</p>".to_string(), "<p><strong>Hi</strong></p>".to_string()]
        );
    }

    #[test]
    fn test_empty_set_link_is_rejected_without_change() {
        let (mut editor, seen) = recording_editor();
        editor.insert_text("abc");
        editor.select_all();
        let before = editor.html();
        assert_eq!(editor.set_link(""), Err(EditError::EmptyUrl));
        assert_eq!(editor.html(), before);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_javascript_link_rejected() {
        let mut editor = Editor::new();
        editor.insert_text("abc");
        editor.select_all();
        assert!(matches!(
            editor.set_link("javascript:alert(1)"),
            Err(EditError::DisallowedScheme { .. })
        ));
        assert!(!editor.is_active(Format::Link));
    }

    #[test]
    fn test_set_image_inserts_at_cursor() {
        let mut editor = Editor::new();
        editor.insert_text("ab");
        editor.set_selection(Selection::collapsed(Position::new(0, 1)));
        editor.set_image("https://i.io/x.png").unwrap();
        assert_eq!(editor.html(), "<p>a<img src=\"https://i.io/x.png\">b</p>");
    }

    #[test]
    fn test_undo_restores_prior_and_redo_reapplies() {
        let mut editor = Editor::new();
        editor.insert_text("text");
        editor.select_all();
        editor.toggle_italic();
        editor.undo();
        assert_eq!(editor.html(), "<p>text</p>");
        editor.redo();
        assert_eq!(editor.html(), "<p><em>text</em></p>");
    }

    #[test]
    fn test_reset_notifies_empty_document() {
        let (mut editor, seen) = recording_editor();
        editor.insert_text("x");
        editor.reset();
        assert_eq!(seen.borrow().last().map(String::as_str), Some("<p></p>"));
        assert!(!editor.can_undo());
    }

    fn toggle_strategy() -> impl Strategy<Value = Toggle> {
        prop_oneof![
            Just(Toggle::Bold),
            Just(Toggle::Italic),
            Just(Toggle::Code),
            Just(Toggle::BulletList),
            Just(Toggle::OrderedList),
            Just(Toggle::Blockquote),
            Just(Toggle::CodeBlock),
        ]
    }

    const SAMPLES: &[&str] = &[
        "<p>plain text</p>",
        "<p><strong>bold</strong> and <em>it</em></p><p>second</p>",
        "<ul><li><p>one</p></li><li><p>two</p></li></ul><p>after</p>",
        "<blockquote><p>quoted <code>x</code></p></blockquote>",
        "<pre><code>let x = 1;</code></pre><p>tail</p>",
        "<p>see <a href=\"https://a.io\">link</a> <img src=\"https://i.io/a.png\"></p>",
    ];

    fn editor_with(sample: usize, anchor: (usize, usize), head: (usize, usize)) -> Editor {
        let mut editor = Editor::new();
        editor.load_html(SAMPLES[sample % SAMPLES.len()]);
        editor.set_selection(Selection::new(
            Position::new(anchor.0, anchor.1),
            Position::new(head.0, head.1),
        ));
        editor
    }

    proptest! {
        #[test]
        fn prop_toggle_twice_restores_document(
            sample in 0..SAMPLES.len(),
            anchor in (0usize..3, 0usize..12),
            head in (0usize..3, 0usize..12),
            prefix in prop::collection::vec(toggle_strategy(), 0..4),
            toggle in toggle_strategy(),
        ) {
            let mut editor = editor_with(sample, anchor, head);
            for t in prefix {
                editor.toggle(t);
            }
            let before = editor.html();
            editor.toggle(toggle);
            editor.toggle(toggle);
            prop_assert_eq!(editor.html(), before);
        }

        #[test]
        fn prop_undo_restores_prior_then_redo_reapplies(
            sample in 0..SAMPLES.len(),
            anchor in (0usize..3, 0usize..12),
            head in (0usize..3, 0usize..12),
            toggle in toggle_strategy(),
            text in "[a-z ]{1,5}",
        ) {
            for command in [Command::Toggle(toggle), Command::InsertText(text.clone()), Command::DeleteBack, Command::SplitBlock] {
                let mut editor = editor_with(sample, anchor, head);
                let before = editor.html();
                let revision = editor.state().revision();
                editor.dispatch(command).unwrap();
                if editor.state().revision() == revision {
                    continue;
                }
                let after = editor.html();
                editor.undo();
                prop_assert_eq!(editor.html(), before);
                editor.redo();
                prop_assert_eq!(editor.html(), after);
            }
        }
    }
}
