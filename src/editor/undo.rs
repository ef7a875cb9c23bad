//! Linear undo/redo history of document changes.
//!
//! Each [`UndoEntry`] is one user action: the line replacements it made, in
//! order, plus the cursor before and after. Undo applies the inverses in
//! reverse order; redo applies the changes again.
//!
//! # Example
//!
//! ```
//! use jsonvim::document::{Change, Position};
//! use jsonvim::editor::undo::{UndoEntry, UndoHistory};
//!
//! let mut history = UndoHistory::new(10);
//! history.record(UndoEntry {
//!     changes: vec![Change {
//!         start: 0,
//!         removed: vec!["a".to_string()],
//!         inserted: vec!["b".to_string()],
//!     }],
//!     cursor_before: Position::new(0, 0),
//!     cursor_after: Position::new(0, 0),
//! });
//!
//! assert!(history.undo().is_ok());
//! assert!(history.undo().is_err());
//! assert!(history.redo().is_ok());
//! ```

use crate::document::{Change, Position};
use crate::error::{EditorError, EditorResult};

/// One reversible user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoEntry {
    pub changes: Vec<Change>,
    pub cursor_before: Position,
    pub cursor_after: Position,
}

impl UndoEntry {
    /// The changes that revert this entry, in the order to apply them.
    pub fn inverse_changes(&self) -> Vec<Change> {
        self.changes.iter().rev().map(Change::inverse).collect()
    }
}

/// Ordered history with a pointer separating applied and undone entries.
///
/// Every recorded entry gets a fresh id. [`UndoHistory::state_id`] names the
/// document state the pointer sits at, so a session can tell whether it is
/// back at the state it last saved.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    entries: Vec<(u64, UndoEntry)>,
    pointer: usize,
    limit: usize,
    next_id: u64,
    /// State id below the oldest kept entry.
    base_id: u64,
}

impl UndoHistory {
    /// Creates an empty history keeping at most `limit` entries.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            pointer: 0,
            limit: limit.max(1),
            next_id: 1,
            base_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of applied entries.
    pub fn position(&self) -> usize {
        self.pointer
    }

    /// Id of the state after the last applied entry, 0 for the initial
    /// state.
    pub fn state_id(&self) -> u64 {
        match self.pointer {
            0 => self.base_id,
            n => self.entries[n - 1].0,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    pub fn can_redo(&self) -> bool {
        self.pointer < self.entries.len()
    }

    /// Appends `entry` at the pointer, dropping any redo tail. The oldest
    /// entry is discarded once the limit is exceeded.
    pub fn record(&mut self, entry: UndoEntry) {
        self.entries.truncate(self.pointer);
        self.entries.push((self.next_id, entry));
        self.next_id += 1;
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            if let Some((id, _)) = self.entries.drain(..excess).last() {
                self.base_id = id;
            }
        }
        self.pointer = self.entries.len();
    }

    /// Steps back over the last applied entry and returns it.
    pub fn undo(&mut self) -> EditorResult<&UndoEntry> {
        if self.pointer == 0 {
            return Err(EditorError::NothingToUndo);
        }
        self.pointer -= 1;
        Ok(&self.entries[self.pointer].1)
    }

    /// Steps forward over the next undone entry and returns it.
    pub fn redo(&mut self) -> EditorResult<&UndoEntry> {
        if self.pointer >= self.entries.len() {
            return Err(EditorError::NothingToRedo);
        }
        self.pointer += 1;
        Ok(&self.entries[self.pointer - 1].1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(from: &str, to: &str) -> UndoEntry {
        UndoEntry {
            changes: vec![Change {
                start: 0,
                removed: vec![from.to_string()],
                inserted: vec![to.to_string()],
            }],
            cursor_before: Position::new(0, 0),
            cursor_after: Position::new(0, 1),
        }
    }

    #[test]
    fn test_record_truncates_redo_tail() {
        let mut history = UndoHistory::new(10);
        history.record(entry("a", "b"));
        history.record(entry("b", "c"));
        history.undo().unwrap();
        assert!(history.can_redo());

        history.record(entry("b", "d"));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_boundaries() {
        let mut history = UndoHistory::new(10);
        assert_eq!(history.undo().unwrap_err(), EditorError::NothingToUndo);
        assert_eq!(history.redo().unwrap_err(), EditorError::NothingToRedo);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = UndoHistory::new(2);
        history.record(entry("a", "b"));
        history.record(entry("b", "c"));
        history.record(entry("c", "d"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.undo().unwrap().changes[0].removed, vec!["c"]);
        assert_eq!(history.undo().unwrap().changes[0].removed, vec!["b"]);
        assert!(history.undo().is_err());
    }

    #[test]
    fn test_state_id_tracks_pointer() {
        let mut history = UndoHistory::new(10);
        assert_eq!(history.state_id(), 0);
        history.record(entry("a", "b"));
        let after_first = history.state_id();
        history.record(entry("b", "c"));
        assert_ne!(history.state_id(), after_first);
        history.undo().unwrap();
        assert_eq!(history.state_id(), after_first);
        history.undo().unwrap();
        assert_eq!(history.state_id(), 0);
    }

    #[test]
    fn test_state_id_after_limit_is_not_initial() {
        let mut history = UndoHistory::new(1);
        history.record(entry("a", "b"));
        history.record(entry("b", "c"));
        history.undo().unwrap();
        assert_ne!(history.state_id(), 0);
    }

    #[test]
    fn test_inverse_changes_are_reversed() {
        let e = UndoEntry {
            changes: vec![
                Change {
                    start: 0,
                    removed: vec![],
                    inserted: vec!["x".to_string()],
                },
                Change {
                    start: 1,
                    removed: vec!["y".to_string()],
                    inserted: vec![],
                },
            ],
            cursor_before: Position::default(),
            cursor_after: Position::default(),
        };
        let inverse = e.inverse_changes();
        assert_eq!(inverse[0].start, 1);
        assert_eq!(inverse[0].inserted, vec!["y"]);
        assert_eq!(inverse[1].removed, vec!["x"]);
    }
}
