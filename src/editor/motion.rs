//! Cursor motions.
//!
//! A motion maps a starting position and an optional count to a target
//! position. Its [`MotionKind`] decides how an operator treats the span:
//! exclusive and inclusive spans are character-wise, linewise spans cover
//! whole lines.

use crate::document::{Document, Position};
use crate::input::keys::Key;
use crate::structure::{Analysis, FoldSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Exclusive,
    Inclusive,
    Linewise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    WordForward,
    WordBackward,
    /// End of the current word; only reachable through `cw`.
    WordEnd,
    LineStart,
    FirstNonBlank,
    LineEnd,
    FirstLine,
    LastLine,
    MatchingBracket,
}

impl Motion {
    /// Motions bound to a single key. `gg` goes through the `g` prefix.
    pub fn from_key(key: Key) -> Option<Motion> {
        Some(match key {
            Key::Char('h') | Key::Left => Motion::Left,
            Key::Char('l') | Key::Right => Motion::Right,
            Key::Char('j') | Key::Down => Motion::Down,
            Key::Char('k') | Key::Up => Motion::Up,
            Key::Char('w') => Motion::WordForward,
            Key::Char('b') => Motion::WordBackward,
            Key::Char('0') | Key::Home => Motion::LineStart,
            Key::Char('^') => Motion::FirstNonBlank,
            Key::Char('$') | Key::End => Motion::LineEnd,
            Key::Char('G') => Motion::LastLine,
            Key::Char('%') => Motion::MatchingBracket,
            _ => return None,
        })
    }

    pub fn kind(&self) -> MotionKind {
        match self {
            Motion::Up | Motion::Down | Motion::FirstLine | Motion::LastLine => {
                MotionKind::Linewise
            }
            Motion::WordEnd | Motion::LineEnd | Motion::MatchingBracket => MotionKind::Inclusive,
            _ => MotionKind::Exclusive,
        }
    }
}

/// Everything a motion may look at.
pub struct MotionContext<'a> {
    pub doc: &'a Document,
    pub folds: &'a FoldSet,
    pub analysis: &'a Analysis,
}

/// Resolves `motion` from `from`. `count` is `None` when no count was typed.
/// Returns `None` when the motion cannot move (no bracket to match).
pub fn resolve(
    motion: Motion,
    ctx: &MotionContext<'_>,
    from: Position,
    count: Option<usize>,
) -> Option<Position> {
    let doc = ctx.doc;
    let n = count.unwrap_or(1).max(1);
    let last_line = doc.line_count().saturating_sub(1);
    Some(match motion {
        Motion::Left => Position::new(from.line, from.col.saturating_sub(n)),
        Motion::Right => Position::new(from.line, (from.col + n).min(doc.line_len(from.line))),
        Motion::Down => {
            let mut line = from.line;
            for _ in 0..n {
                match next_visible(ctx.folds, line, last_line) {
                    Some(next) => line = next,
                    None => break,
                }
            }
            Position::new(line, from.col)
        }
        Motion::Up => {
            let mut line = from.line;
            for _ in 0..n {
                match prev_visible(ctx.folds, line) {
                    Some(prev) => line = prev,
                    None => break,
                }
            }
            Position::new(line, from.col)
        }
        Motion::WordForward => (0..n).fold(from, |pos, _| next_word_start(doc, pos)),
        Motion::WordBackward => (0..n).fold(from, |pos, _| prev_word_start(doc, pos)),
        Motion::WordEnd => {
            let mut pos = end_of_run(doc, from);
            for _ in 1..n {
                pos = end_of_run(doc, next_word_start(doc, pos));
            }
            pos
        }
        Motion::LineStart => Position::new(from.line, 0),
        Motion::FirstNonBlank => Position::new(from.line, first_non_blank(doc.line(from.line))),
        Motion::LineEnd => {
            let line = (from.line + n - 1).min(last_line);
            Position::new(line, doc.line_len(line).saturating_sub(1))
        }
        Motion::FirstLine => {
            let line = count.map_or(0, |c| c.saturating_sub(1)).min(last_line);
            Position::new(line, first_non_blank(doc.line(line)))
        }
        Motion::LastLine => {
            let line = count.map_or(last_line, |c| c.saturating_sub(1)).min(last_line);
            Position::new(line, first_non_blank(doc.line(line)))
        }
        Motion::MatchingBracket => {
            let len = doc.line_len(from.line);
            return (from.col..len.max(from.col + 1)).find_map(|col| {
                ctx.analysis.match_bracket(Position::new(from.line, col))
            });
        }
    })
}

fn next_visible(folds: &FoldSet, line: usize, last_line: usize) -> Option<usize> {
    ((line + 1)..=last_line).find(|&l| !folds.is_hidden(l))
}

fn prev_visible(folds: &FoldSet, line: usize) -> Option<usize> {
    (0..line).rev().find(|&l| !folds.is_hidden(l))
}

/// Column of the first non-blank character, or 0 for a blank line.
pub fn first_non_blank(line: &str) -> usize {
    line.chars().position(|c| !c.is_whitespace()).unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Blank,
    Word,
    Punct,
}

fn class(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Blank
    } else if c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

fn chars_of(doc: &Document, line: usize) -> Vec<char> {
    doc.line(line).chars().collect()
}

/// True when the character under `pos` is whitespace or past the end.
pub fn is_blank_at(doc: &Document, pos: Position) -> bool {
    chars_of(doc, pos.line)
        .get(pos.col)
        .map_or(true, |&c| class(c) == CharClass::Blank)
}

/// `w`: start of the next word, crossing lines. An empty line counts as a
/// word. On the last word of the document it stops past the last char.
pub fn next_word_start(doc: &Document, pos: Position) -> Position {
    let mut line = pos.line;
    let mut chars = chars_of(doc, line);
    let mut col = pos.col;
    if let Some(&c) = chars.get(col) {
        let cls = class(c);
        if cls != CharClass::Blank {
            while col < chars.len() && class(chars[col]) == cls {
                col += 1;
            }
        }
    }
    loop {
        while col < chars.len() && class(chars[col]) == CharClass::Blank {
            col += 1;
        }
        if col < chars.len() {
            return Position::new(line, col);
        }
        if line + 1 >= doc.line_count() {
            return Position::new(line, chars.len());
        }
        line += 1;
        col = 0;
        chars = chars_of(doc, line);
        if chars.is_empty() {
            return Position::new(line, 0);
        }
    }
}

/// `b`: start of the previous word, crossing lines.
pub fn prev_word_start(doc: &Document, pos: Position) -> Position {
    let mut line = pos.line;
    let mut chars = chars_of(doc, line);
    let mut col = pos.col.min(chars.len());
    loop {
        if col == 0 {
            if line == 0 {
                return Position::new(0, 0);
            }
            line -= 1;
            chars = chars_of(doc, line);
            if chars.is_empty() {
                return Position::new(line, 0);
            }
            col = chars.len();
        }
        col -= 1;
        if class(chars[col]) != CharClass::Blank {
            break;
        }
    }
    let cls = class(chars[col]);
    while col > 0 && class(chars[col - 1]) == cls {
        col -= 1;
    }
    Position::new(line, col)
}

/// Last character of the run that starts at or contains `pos`.
fn end_of_run(doc: &Document, pos: Position) -> Position {
    let chars = chars_of(doc, pos.line);
    let Some(&c) = chars.get(pos.col) else {
        return pos;
    };
    let cls = class(c);
    let mut col = pos.col;
    while col + 1 < chars.len() && class(chars[col + 1]) == cls {
        col += 1;
    }
    Position::new(pos.line, col)
}
