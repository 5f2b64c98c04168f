//! # Undo/Redo History
//!
//! Snapshot-based history of the block list.
//!
//! ## Design
//!
//! - Before each mutation the editor records a snapshot of the whole list
//! - Undo swaps the current list for the most recent snapshot and keeps the
//!   current one on the redo stack
//! - Redo reverses this
//! - New mutations clear the redo stack
//! - Depth is bounded; the oldest entries are dropped first
//! - Batches group several mutations into one undo step
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new();
//! history.record(tree.snapshot(), Some("Insert block"));
//! tree.insert(...)?;
//!
//! if let Some(entry) = history.undo(tree.snapshot()) {
//!     tree.restore(entry.blocks);
//! }
//! ```

use crate::block::Block;
use std::collections::VecDeque;

/// Default number of undo levels
pub const DEFAULT_MAX_LEVELS: usize = 100;

/// Full copy of the block list at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub blocks: Vec<Block>,

    /// Description of the change that follows this snapshot
    pub description: Option<String>,
}

/// Undo/redo stacks for one editor
#[derive(Debug)]
pub struct History {
    /// Most recent last
    undo_stack: VecDeque<HistoryEntry>,

    /// Most recent last
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Open batch depth; only the outermost batch records
    batch_depth: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_MAX_LEVELS)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_levels,
            batch_depth: 0,
        }
    }

    /// Record the state before a mutation. Ignored while a batch is open.
    pub fn record(&mut self, snapshot: Vec<Block>, description: Option<&str>) {
        if self.batch_depth > 0 {
            return;
        }
        self.push(HistoryEntry {
            blocks: snapshot,
            description: description.map(str::to_string),
        });
    }

    /// Start a batch: `snapshot` becomes the single undo step for
    /// everything applied until the matching [`History::end_batch`]
    pub fn begin_batch(&mut self, snapshot: Vec<Block>, description: Option<&str>) {
        if self.batch_depth == 0 {
            self.push(HistoryEntry {
                blocks: snapshot,
                description: description.map(str::to_string),
            });
        }
        self.batch_depth += 1;
    }

    pub fn end_batch(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// Drop the most recent undo entry (used when the batch it opened
    /// turned out to change nothing)
    pub fn discard_last(&mut self) -> Option<HistoryEntry> {
        self.undo_stack.pop_back()
    }

    pub fn peek_undo(&self) -> Option<&HistoryEntry> {
        self.undo_stack.back()
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.undo_stack.push_back(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }

        self.redo_stack.clear();
    }

    /// Step back. `current` is the live list, kept for redo.
    /// Returns the entry to restore, or `None` when there is nothing to undo.
    pub fn undo(&mut self, current: Vec<Block>) -> Option<HistoryEntry> {
        let entry = self.undo_stack.pop_back()?;
        self.redo_stack.push(HistoryEntry {
            blocks: current,
            description: entry.description.clone(),
        });
        Some(entry)
    }

    /// Step forward again after an undo
    pub fn redo(&mut self, current: Vec<Block>) -> Option<HistoryEntry> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push_back(HistoryEntry {
            blocks: current,
            description: entry.description.clone(),
        });
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_depth = 0;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().and_then(|e| e.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().and_then(|e| e.description.as_deref())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(ids: &[&str]) -> Vec<Block> {
        ids.iter().map(|id| Block::new("Text").with_id(*id)).collect()
    }

    #[test]
    fn test_history_creation() {
        let history = History::new();
        assert_eq!(history.undo_levels(), 0);
        assert_eq!(history.redo_levels(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.max_levels(), DEFAULT_MAX_LEVELS);
    }

    #[test]
    fn test_undo_then_redo() {
        let mut history = History::new();
        history.record(list(&["a"]), Some("Insert block"));

        let undone = history.undo(list(&["a", "b"])).unwrap();
        assert_eq!(undone.blocks, list(&["a"]));
        assert_eq!(history.redo_description(), Some("Insert block"));

        let redone = history.redo(list(&["a"])).unwrap();
        assert_eq!(redone.blocks, list(&["a", "b"]));
        assert_eq!(history.undo_levels(), 1);
        assert_eq!(history.redo_levels(), 0);
    }

    #[test]
    fn test_nothing_to_undo() {
        let mut history = History::new();
        assert!(history.undo(list(&[])).is_none());
        assert!(history.redo(list(&[])).is_none());
    }

    #[test]
    fn test_new_record_clears_redo() {
        let mut history = History::new();
        history.record(list(&[]), None);
        history.undo(list(&["a"]));
        assert_eq!(history.redo_levels(), 1);

        history.record(list(&[]), None);
        assert_eq!(history.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut history = History::with_max_levels(2);
        for id in ["a", "b", "c"] {
            history.record(list(&[id]), Some(id));
        }

        assert_eq!(history.undo_levels(), 2);
        let oldest_kept = {
            history.undo(list(&[]));
            history.undo(list(&[])).unwrap()
        };
        assert_eq!(oldest_kept.blocks, list(&["b"]));
    }

    #[test]
    fn test_batch_records_once() {
        let mut history = History::new();
        history.begin_batch(list(&[]), Some("Paste"));
        history.record(list(&["a"]), None);
        history.begin_batch(list(&["a"]), None);
        history.record(list(&["a", "b"]), None);
        history.end_batch();
        history.end_batch();

        assert!(!history.in_batch());
        assert_eq!(history.undo_levels(), 1);
        assert_eq!(history.undo_description(), Some("Paste"));
    }
}
