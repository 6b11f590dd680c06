//! Text storage with linear undo history

use std::sync::Arc;

use crate::domain::TextSnapshot;

/// Where the document text lives; every change yields a new snapshot version
pub trait TextStore {
    fn snapshot(&self) -> TextSnapshot;
    fn replace(&mut self, text: String) -> TextSnapshot;
    fn undo(&mut self) -> Option<TextSnapshot>;
    fn redo(&mut self) -> Option<TextSnapshot>;
}

/// Default number of texts a [`MemoryStore`] keeps, current one included
pub const HISTORY_LIMIT: usize = 200;

/// In-memory store: history entries up to `index` are live, the rest is redo
///
/// The oldest entries are dropped once `limit` is exceeded.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    history: Vec<Arc<str>>,
    index: usize,
    version: u64,
    limit: usize,
}

impl MemoryStore {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self::with_limit(text, HISTORY_LIMIT)
    }

    /// Store keeping at most `limit` texts (at least one)
    pub fn with_limit(text: impl Into<Arc<str>>, limit: usize) -> Self {
        Self {
            history: vec![text.into()],
            index: 0,
            version: 1,
            limit: limit.max(1),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.history.len()
    }

    fn current(&self) -> TextSnapshot {
        TextSnapshot::new(self.version, Arc::clone(&self.history[self.index]))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("")
    }
}

impl TextStore for MemoryStore {
    fn snapshot(&self) -> TextSnapshot {
        self.current()
    }

    fn replace(&mut self, text: String) -> TextSnapshot {
        // Truncate any redo history
        self.history.truncate(self.index + 1);
        self.history.push(text.into());
        if self.history.len() > self.limit {
            let excess = self.history.len() - self.limit;
            self.history.drain(..excess);
        }
        self.index = self.history.len() - 1;
        self.version += 1;
        self.current()
    }

    fn undo(&mut self) -> Option<TextSnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.version += 1;
        Some(self.current())
    }

    fn redo(&mut self) -> Option<TextSnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.version += 1;
        Some(self.current())
    }
}
