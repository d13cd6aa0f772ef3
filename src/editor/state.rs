use crate::document::{BlockKind, Document, Mark, Marks, Selection, sanitize};

use super::history::{DEFAULT_HISTORY_LIMIT, History, Snapshot};
use super::ops;
use super::{Command, Format, Toggle};

/// The last toggle applied, so that repeating it restores the prior document.
#[derive(Debug, Clone)]
struct ToggleMemo {
    toggle: Toggle,
    revision: u64,
    selection_after: Selection,
    before: Snapshot,
}

/// Editor state: document, selection, marks for the next typed text, and
/// undo history.
///
/// Transitions go through [`EditorState::apply`], which consumes the state
/// and returns the next one.
#[derive(Debug, Clone)]
pub struct EditorState {
    document: Document,
    selection: Selection,
    stored_marks: Option<Marks>,
    history: History,
    toggle_memo: Option<ToggleMemo>,
    revision: u64,
}

impl EditorState {
    /// Create an empty editor state keeping up to `history_limit` undo steps.
    pub fn new(history_limit: usize) -> Self {
        Self {
            document: Document::empty(),
            selection: Selection::default(),
            stored_marks: None,
            history: History::new(empty_snapshot(), history_limit),
            toggle_memo: None,
            revision: 0,
        }
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    pub const fn selection(&self) -> Selection {
        self.selection
    }

    /// Incremented every time the document changes.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub const fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub const fn history_limit(&self) -> usize {
        self.history.limit()
    }

    pub fn html(&self) -> String {
        self.document.to_html()
    }

    /// Whether a toolbar format is active at the current selection.
    pub fn is_active(&self, format: Format) -> bool {
        let sel = self.selection;
        match format {
            Format::Bold | Format::Italic | Format::Code => {
                let mark = match format {
                    Format::Bold => Mark::Bold,
                    Format::Italic => Mark::Italic,
                    _ => Mark::Code,
                };
                if sel.is_collapsed() {
                    self.cursor_marks().has(mark)
                } else {
                    ops::all_chars(&self.document, sel, |marks| marks.has(mark))
                }
            }
            Format::Link => {
                if sel.is_collapsed() {
                    ops::link_range_at(&self.document, sel.head).is_some()
                } else {
                    ops::all_chars(&self.document, sel, |marks| marks.link.is_some())
                }
            }
            Format::BulletList => self.all_blocks_are(BlockKind::BulletItem),
            Format::OrderedList => self.all_blocks_are(BlockKind::OrderedItem),
            Format::CodeBlock => self.all_blocks_are(BlockKind::CodeBlock),
            Format::Blockquote => ops::all_blocks(&self.document, sel, |block| block.quoted),
        }
    }

    fn all_blocks_are(&self, kind: BlockKind) -> bool {
        ops::all_blocks(&self.document, self.selection, |block| block.kind == kind)
    }

    fn cursor_marks(&self) -> Marks {
        self.stored_marks
            .clone()
            .unwrap_or_else(|| ops::marks_at(&self.document, self.selection.head))
    }

    /// Apply a validated command and return the next state.
    #[must_use]
    pub fn apply(mut self, command: Command) -> Self {
        let memo = self.toggle_memo.take();
        let sel = self.selection;
        match command {
            Command::Toggle(toggle) => self.toggle(toggle, memo),
            Command::SetLink(href) => {
                if !sel.is_collapsed() && ops::set_link(&mut self.document, sel, &href) {
                    self.commit();
                }
            }
            Command::UnsetLink => {
                let range = if sel.is_collapsed() {
                    ops::link_range_at(&self.document, sel.head)
                } else {
                    Some(sel)
                };
                if let Some(range) = range
                    && ops::unset_link(&mut self.document, range)
                {
                    self.commit();
                }
            }
            Command::SetImage(src) => {
                let at = ops::insert_image(&mut self.document, sel.head, &src);
                self.selection = Selection::collapsed(at);
                self.commit();
            }
            Command::Undo => {
                if let Some(snapshot) = self.history.undo().cloned() {
                    self.restore(snapshot);
                }
            }
            Command::Redo => {
                if let Some(snapshot) = self.history.redo().cloned() {
                    self.restore(snapshot);
                }
            }
            Command::InsertText(text) => {
                if !text.is_empty() {
                    let marks = self
                        .stored_marks
                        .take()
                        .unwrap_or_else(|| ops::marks_at(&self.document, sel.start()));
                    let at = ops::insert_text(&mut self.document, sel, &text, &marks);
                    self.selection = Selection::collapsed(at);
                    self.commit();
                }
            }
            Command::DeleteBack => {
                if let Some(at) = ops::delete_back(&mut self.document, sel) {
                    self.selection = Selection::collapsed(at);
                    self.commit();
                }
            }
            Command::SplitBlock => {
                let at = ops::split_block(&mut self.document, sel);
                self.selection = Selection::collapsed(at);
                self.commit();
            }
            Command::MoveCursor { direction, extend } => {
                let head = ops::move_position(&self.document, sel.head, direction);
                self.selection = if extend {
                    Selection::new(sel.anchor, head)
                } else if !sel.is_collapsed() && direction == ops::Direction::Left {
                    Selection::collapsed(sel.start())
                } else if !sel.is_collapsed() && direction == ops::Direction::Right {
                    Selection::collapsed(sel.end())
                } else {
                    Selection::collapsed(head)
                };
                self.stored_marks = None;
            }
            Command::SelectAll => {
                self.selection = ops::select_all(&self.document);
                self.stored_marks = None;
            }
            Command::SetSelection(selection) => {
                self.selection = Selection::new(
                    self.document.clamp(selection.anchor),
                    self.document.clamp(selection.head),
                );
                self.stored_marks = None;
            }
            Command::Reset => {
                self.document = Document::empty();
                self.selection = Selection::default();
                self.stored_marks = None;
                self.history.reset(empty_snapshot());
                self.revision += 1;
            }
            Command::LoadHtml(html) => {
                self.document = sanitize(&html);
                self.selection = Selection::collapsed(self.document.end_position());
                self.stored_marks = None;
                self.commit();
            }
        }
        self
    }

    fn toggle(&mut self, toggle: Toggle, memo: Option<ToggleMemo>) {
        if let Some(memo) = memo
            && memo.toggle == toggle
            && memo.revision == self.revision
            && memo.selection_after == self.selection
        {
            let current = self.snapshot();
            self.document = memo.before.document;
            self.selection = memo.before.selection;
            self.stored_marks = None;
            self.commit();
            self.remember(toggle, current);
            return;
        }

        let sel = self.selection;
        let before = self.snapshot();
        let changed = match toggle.mark() {
            Some(mark) if sel.is_collapsed() => {
                let mut marks = self.cursor_marks();
                marks.set(mark, !marks.has(mark));
                self.stored_marks = Some(marks);
                false
            }
            Some(mark) => ops::toggle_mark(&mut self.document, sel, mark),
            None => match toggle {
                Toggle::BulletList => {
                    ops::toggle_block(&mut self.document, sel, BlockKind::BulletItem)
                }
                Toggle::OrderedList => {
                    ops::toggle_block(&mut self.document, sel, BlockKind::OrderedItem)
                }
                Toggle::CodeBlock => {
                    ops::toggle_block(&mut self.document, sel, BlockKind::CodeBlock)
                }
                Toggle::Blockquote => ops::toggle_quote(&mut self.document, sel),
                Toggle::Bold | Toggle::Italic | Toggle::Code => false,
            },
        };
        if changed {
            self.commit();
            self.remember(toggle, before);
        }
    }

    fn remember(&mut self, toggle: Toggle, before: Snapshot) {
        self.toggle_memo = Some(ToggleMemo {
            toggle,
            revision: self.revision,
            selection_after: self.selection,
            before,
        });
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            document: self.document.clone(),
            selection: self.selection,
        }
    }

    /// Record the current document as a new history entry.
    fn commit(&mut self) {
        self.selection = Selection::new(
            self.document.clamp(self.selection.anchor),
            self.document.clamp(self.selection.head),
        );
        self.revision += 1;
        self.history.record(Snapshot {
            document: self.document.clone(),
            selection: self.selection,
        });
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.document = snapshot.document;
        self.selection = snapshot.selection;
        self.stored_marks = None;
        self.revision += 1;
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

fn empty_snapshot() -> Snapshot {
    Snapshot {
        document: Document::empty(),
        selection: Selection::default(),
    }
}
