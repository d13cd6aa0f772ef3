use std::collections::VecDeque;

use crate::document::{Document, Selection};

/// Default number of undo steps kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// A recorded editor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub document: Document,
    pub selection: Selection,
}

/// Bounded undo/redo history.
///
/// Holds the current snapshot plus up to `limit` earlier ones, with `limit`
/// never below one. The cursor
/// points at the snapshot matching the live document; entries after it are
/// redo candidates and are discarded by the next [`History::record`].
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Snapshot>,
    cursor: usize,
    limit: usize,
}

impl History {
    pub fn new(initial: Snapshot, limit: usize) -> Self {
        let limit = limit.max(1);
        let mut entries = VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT) + 1);
        entries.push_back(initial);
        Self {
            entries,
            cursor: 0,
            limit,
        }
    }

    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Record a new current snapshot, truncating any redo entries.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(snapshot);
        while self.entries.len() > self.limit.saturating_add(1) {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    pub const fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Step back and return the snapshot that is now current.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward and return the snapshot that is now current.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// Drop everything and start over from `initial`.
    pub fn reset(&mut self, initial: Snapshot) {
        self.entries.clear();
        self.entries.push_back(initial);
        self.cursor = 0;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(
            Snapshot {
                document: Document::empty(),
                selection: Selection::default(),
            },
            DEFAULT_HISTORY_LIMIT,
        )
    }
}
