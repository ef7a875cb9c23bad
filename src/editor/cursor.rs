//! Cursor position and visual selection.
//!
//! The cursor is a (line, column) [`Position`] plus an optional selection
//! anchor. The anchor is set on entering a visual mode and cleared on leaving
//! it.
//!
//! # Example
//!
//! ```
//! use jsonvim::document::Position;
//! use jsonvim::editor::cursor::{Cursor, Selection};
//!
//! let mut cursor = Cursor::new();
//! cursor.set(Position::new(2, 4));
//! cursor.anchor_here();
//! cursor.set(Position::new(0, 1));
//!
//! assert_eq!(
//!     cursor.selection(false),
//!     Some(Selection::Chars(Position::new(0, 1), Position::new(2, 4)))
//! );
//! assert_eq!(cursor.selection(true), Some(Selection::Lines(0, 2)));
//! ```

use crate::document::Position;

/// A normalized selection. Character selections are inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Chars(Position, Position),
    Lines(usize, usize),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pos: Position,
    anchor: Option<Position>,
}

impl Cursor {
    /// Creates a cursor at the start of the document with no selection.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn line(&self) -> usize {
        self.pos.line
    }

    pub fn col(&self) -> usize {
        self.pos.col
    }

    pub fn set(&mut self, pos: Position) {
        self.pos = pos;
    }

    pub fn set_col(&mut self, col: usize) {
        self.pos.col = col;
    }

    pub fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    /// Starts a selection at the current position.
    pub fn anchor_here(&mut self) {
        self.anchor = Some(self.pos);
    }

    pub fn clear_anchor(&mut self) {
        self.anchor = None;
    }

    /// Moves to the other end of the selection (visual `o`).
    pub fn swap_anchor(&mut self) {
        if let Some(anchor) = self.anchor {
            self.anchor = Some(self.pos);
            self.pos = anchor;
        }
    }

    /// The selection between anchor and cursor, ordered start to end.
    pub fn selection(&self, linewise: bool) -> Option<Selection> {
        let anchor = self.anchor?;
        let (start, end) = if anchor <= self.pos {
            (anchor, self.pos)
        } else {
            (self.pos, anchor)
        };
        Some(if linewise {
            Selection::Lines(start.line, end.line)
        } else {
            Selection::Chars(start, end)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_selection_without_anchor() {
        let cursor = Cursor::new();
        assert_eq!(cursor.selection(false), None);
    }

    #[test]
    fn test_swap_anchor() {
        let mut cursor = Cursor::new();
        cursor.anchor_here();
        cursor.set(Position::new(3, 2));
        cursor.swap_anchor();
        assert_eq!(cursor.position(), Position::new(0, 0));
        assert_eq!(cursor.anchor(), Some(Position::new(3, 2)));
    }
}
