//! One editing session.
//!
//! A [`Session`] owns a document and everything needed to edit it: cursor,
//! mode, pending keys, undo history, the unnamed register, folds, search
//! state and the status message. The bottom session of an editor edits the
//! real file; every session above it edits the JSON held in one string value
//! of its parent (see [`crate::stack`]).
//!
//! Key handling lives in [`crate::input::handler`]; this module holds the
//! state and the editing primitives the handler is built from.
//!
//! # Example
//!
//! ```
//! use jsonvim::config::Config;
//! use jsonvim::document::DocumentFormat;
//! use jsonvim::editor::mode::Mode;
//! use jsonvim::editor::session::Session;
//!
//! let session = Session::load(
//!     "{\"name\":\"Alice\",\"age\":30}\n{\"name\":\"Bob\",\"age\":25}\n",
//!     DocumentFormat::Jsonl,
//!     false,
//!     &Config::default(),
//! );
//!
//! assert_eq!(session.mode(), Mode::Normal);
//! assert_eq!(session.document().records().len(), 2);
//! assert!(!session.is_dirty());
//! assert_eq!(
//!     session.serialize(),
//!     "{\"name\":\"Alice\",\"age\":30}\n{\"name\":\"Bob\",\"age\":25}"
//! );
//! ```

use super::cursor::{Cursor, Selection};
use super::mode::Mode;
use super::motion::{self, first_non_blank, Motion, MotionContext, MotionKind};
use super::operator::{self, Operator};
use super::registers::Register;
use super::repeat::RepeatRecorder;
use super::search::SearchState;
use super::undo::{UndoEntry, UndoHistory};
use crate::config::Config;
use crate::document::{char_len, char_to_byte, format, Document, DocumentFormat, Position};
use crate::error::{EditorError, EditorResult};
use crate::input::keys::Key;
use crate::query::{self, MatchList};
use crate::structure::{Analysis, FoldKind, FoldSet, NodePath, StructureCache};
use regex::Regex;
use tracing::debug;

/// Represents a message to display to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub level: MessageLevel,
}

/// Message severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// Keys typed in Normal or Visual mode that do not form a command yet.
#[derive(Debug, Clone, Default)]
pub(crate) struct Pending {
    pub count: Option<usize>,
    pub operator: Option<Operator>,
    pub op_count: Option<usize>,
    /// `g`, `z`, `r` or `e`, waiting for the second key.
    pub prefix: Option<char>,
    pub keys: Vec<Key>,
}

impl Pending {
    pub fn is_clean(&self) -> bool {
        self.count.is_none()
            && self.operator.is_none()
            && self.op_count.is_none()
            && self.prefix.is_none()
    }

    pub fn push_digit(&mut self, digit: usize) {
        let slot = if self.operator.is_some() {
            &mut self.op_count
        } else {
            &mut self.count
        };
        *slot = Some(slot.unwrap_or(0).saturating_mul(10).saturating_add(digit));
    }

    /// Effective count: the product of the counts typed before and after the
    /// operator, or `None` when neither was typed.
    pub fn count(&self) -> Option<usize> {
        match (self.count, self.op_count) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or(1).saturating_mul(b.unwrap_or(1))),
        }
    }
}

/// Where an embedded session writes back to: a string node of the session
/// one level down, identified by its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    pub level: usize,
    pub path: NodePath,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct EditGroup {
    pub cursor_before: Position,
}

/// The one-line buffer of Command-line and Search modes.
#[derive(Debug, Clone, Default)]
pub(crate) struct Prompt {
    pub buffer: String,
    pub history_index: Option<usize>,
}

pub struct Session {
    pub(crate) doc: Document,
    pub(crate) cursor: Cursor,
    pub(crate) mode: Mode,
    pub(crate) pending: Pending,
    pub(crate) undo: UndoHistory,
    /// Undo state id of the last load or save.
    pub(crate) saved_state: u64,
    pub(crate) register: Register,
    pub(crate) folds: FoldSet,
    pub(crate) structure: StructureCache,
    pub(crate) search: SearchState,
    pub(crate) prompt: Prompt,
    pub(crate) repeat: RepeatRecorder,
    pub(crate) group: Option<EditGroup>,
    pub(crate) read_only: bool,
    pub(crate) level: usize,
    pub(crate) parent: Option<ParentLink>,
    pub(crate) filename: Option<String>,
    pub(crate) message: Option<Message>,
    pub(crate) viewport_height: usize,
    pub(crate) config: Config,
}

impl Session {
    /// Creates a session from file text. JSON Lines text is laid out for
    /// editing: each record pretty-printed, records separated by a blank
    /// line.
    pub fn load(text: &str, format: DocumentFormat, read_only: bool, config: &Config) -> Self {
        let text = match format {
            DocumentFormat::Jsonl => format::jsonl_to_pretty(text, config.indent_size),
            DocumentFormat::Json => text.to_string(),
        };
        Self::from_document(Document::from_text(&text, format), read_only, config)
    }

    pub fn from_document(doc: Document, read_only: bool, config: &Config) -> Self {
        let mut session = Self {
            doc,
            cursor: Cursor::new(),
            mode: Mode::Normal,
            pending: Pending::default(),
            undo: UndoHistory::new(config.undo_limit),
            saved_state: 0,
            register: Register::default(),
            folds: FoldSet::new(),
            structure: StructureCache::new(),
            search: SearchState::default(),
            prompt: Prompt::default(),
            repeat: RepeatRecorder::new(),
            group: None,
            read_only,
            level: 0,
            parent: None,
            filename: None,
            message: None,
            viewport_height: 20,
            config: config.clone(),
        };
        session.sync_folds();
        session
    }

    /// The text to write out. JSON Lines records are minified one per line.
    pub fn serialize(&self) -> String {
        match self.doc.format() {
            DocumentFormat::Jsonl => format::pretty_to_jsonl(self.doc.lines()),
            DocumentFormat::Json => self.doc.text(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn cursor(&self) -> Position {
        self.cursor.position()
    }

    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor.set(pos);
        self.clamp_cursor();
    }

    /// The active visual selection, if any.
    pub fn selection(&self) -> Option<Selection> {
        if !self.mode.is_visual() {
            return None;
        }
        self.cursor.selection(self.mode == Mode::VisualLine)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switches mode. Leaving a visual mode drops the selection; entering a
    /// prompt mode starts with an empty prompt.
    pub(crate) fn set_mode(&mut self, mode: Mode) {
        if !mode.is_visual() {
            self.cursor.clear_anchor();
        }
        if mode.is_prompt() {
            self.prompt = Prompt::default();
        }
        self.mode = mode;
    }

    /// True when the document differs from its last loaded or saved state.
    pub fn is_dirty(&self) -> bool {
        self.undo.state_id() != self.saved_state
    }

    /// Records the current state as saved.
    pub fn mark_clean(&mut self) {
        self.saved_state = self.undo.state_id();
    }

    /// Marks the session dirty until the next save, e.g. after a failed
    /// write.
    pub fn mark_dirty(&mut self) {
        self.saved_state = u64::MAX;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Nesting level: 0 for the bottom session.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, filename: String) {
        self.filename = Some(filename);
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn set_message(&mut self, text: String, level: MessageLevel) {
        self.message = Some(Message { text, level });
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    pub fn register(&self) -> &Register {
        &self.register
    }

    /// Text typed so far in Command-line or Search mode.
    pub fn prompt(&self) -> &str {
        &self.prompt.buffer
    }

    /// `(current, total)` of the last search, 1-based.
    pub fn search_info(&self) -> Option<(usize, usize)> {
        self.search.info()
    }

    pub fn undo_history(&self) -> &UndoHistory {
        &self.undo
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Lines moved by Ctrl-f/Ctrl-b; Ctrl-d/Ctrl-u move half of it.
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height.max(1);
    }

    /// Analysis of the current document version, rebuilt if stale.
    pub fn analysis(&mut self) -> &Analysis {
        self.structure.get(&self.doc)
    }

    pub fn folds(&self) -> &FoldSet {
        &self.folds
    }

    /// Document lines not hidden by a collapsed fold.
    pub fn visible_lines(&self) -> Vec<usize> {
        self.folds.visible_lines(self.doc.line_count())
    }

    /// Re-resolves folds against the current analysis.
    pub(crate) fn sync_folds(&mut self) {
        let analysis = self.structure.get(&self.doc);
        self.folds.sync(analysis, self.config.fold_string_threshold);
    }

    /// Checks that the document parses.
    pub fn validate(&mut self) -> EditorResult<()> {
        self.analysis().require_tree().map(|_| ())
    }

    /// Shows an error as the status message and drops pending keys.
    pub(crate) fn report(&mut self, err: EditorError) {
        let level = if err.is_informational() {
            MessageLevel::Warning
        } else {
            MessageLevel::Error
        };
        debug!(level = self.level, error = %err, "reported");
        self.pending = Pending::default();
        self.set_message(err.to_string(), level);
    }

    /// Returns false, with a `[readonly]` message, in a read-only session.
    pub(crate) fn check_writable(&mut self) -> bool {
        if self.read_only {
            self.report(EditorError::ReadOnlyViolation);
            false
        } else {
            true
        }
    }

    // -- undo grouping -----------------------------------------------------

    /// Opens an undo group unless one is already open.
    pub(crate) fn begin_group(&mut self) {
        if self.group.is_none() {
            self.group = Some(EditGroup {
                cursor_before: self.cursor.position(),
            });
        }
    }

    /// Closes the open group, recording its changes as one undo entry.
    /// Returns true when something was recorded.
    pub(crate) fn commit_group(&mut self) -> bool {
        let Some(group) = self.group.take() else {
            return false;
        };
        let changes = self.doc.take_changes();
        if changes.is_empty() {
            return false;
        }
        self.undo.record(UndoEntry {
            changes,
            cursor_before: group.cursor_before,
            cursor_after: self.cursor.position(),
        });
        self.repeat.note_change();
        true
    }

    /// Runs `edit` as one undo entry. Inside an already open group the
    /// changes join that group instead.
    pub fn edit_as_group<R>(&mut self, edit: impl FnOnce(&mut Session) -> R) -> R {
        let nested = self.group.is_some();
        self.begin_group();
        let result = edit(self);
        if !nested {
            self.sync_folds();
            self.clamp_cursor();
            self.commit_group();
        }
        result
    }

    pub fn undo(&mut self, count: usize) -> EditorResult<()> {
        for step in 0..count.max(1) {
            let entry = match self.undo.undo() {
                Ok(entry) => entry.clone(),
                Err(e) if step == 0 => return Err(e),
                Err(_) => break,
            };
            for change in entry.inverse_changes() {
                self.doc.apply(&change);
            }
            self.doc.take_changes();
            self.cursor.set(entry.cursor_before);
        }
        debug!(level = self.level, position = self.undo.position(), "undo");
        self.sync_folds();
        self.clamp_cursor();
        Ok(())
    }

    pub fn redo(&mut self, count: usize) -> EditorResult<()> {
        for step in 0..count.max(1) {
            let entry = match self.undo.redo() {
                Ok(entry) => entry.clone(),
                Err(e) if step == 0 => return Err(e),
                Err(_) => break,
            };
            for change in &entry.changes {
                self.doc.apply(change);
            }
            self.doc.take_changes();
            self.cursor.set(entry.cursor_after);
        }
        debug!(level = self.level, position = self.undo.position(), "redo");
        self.sync_folds();
        self.clamp_cursor();
        Ok(())
    }

    // -- cursor ------------------------------------------------------------

    /// Keeps the cursor on a visible line and inside the line's text. In
    /// Insert mode the cursor may sit one past the last character.
    pub(crate) fn clamp_cursor(&mut self) {
        let last = self.doc.line_count().saturating_sub(1);
        let mut line = self.cursor.line().min(last);
        if self.folds.is_hidden(line) {
            line = self.folds.header_of(line);
        }
        let len = self.doc.line_len(line);
        let max_col = if self.mode == Mode::Insert {
            len
        } else {
            len.saturating_sub(1)
        };
        self.cursor
            .set(Position::new(line, self.cursor.col().min(max_col)));
    }

    /// Last line of a collapsed block starting at `line`, or `line`.
    pub(crate) fn fold_end(&self, line: usize) -> usize {
        self.folds
            .active()
            .iter()
            .filter(|r| r.kind == FoldKind::Block && r.start == line)
            .map(|r| r.end)
            .max()
            .unwrap_or(line)
    }

    pub(crate) fn resolve_motion(&mut self, motion: Motion, count: Option<usize>) -> Option<Position> {
        let from = self.cursor.position();
        let analysis = self.structure.get(&self.doc);
        let ctx = MotionContext {
            doc: &self.doc,
            folds: &self.folds,
            analysis,
        };
        motion::resolve(motion, &ctx, from, count)
    }

    /// Moves by half (`half`) or a full viewport over visible lines.
    pub(crate) fn scroll(&mut self, down: bool, half: bool, count: Option<usize>) {
        let step = if half {
            (self.viewport_height / 2).max(1)
        } else {
            self.viewport_height.saturating_sub(2).max(1)
        };
        let motion = if down { Motion::Down } else { Motion::Up };
        let lines = step.saturating_mul(count.unwrap_or(1));
        if let Some(target) = self.resolve_motion(motion, Some(lines)) {
            let col = first_non_blank(self.doc.line(target.line));
            self.cursor.set(Position::new(target.line, col));
        }
    }

    pub fn goto_line(&mut self, line: usize) {
        let line = line.min(self.doc.line_count().saturating_sub(1));
        self.folds.reveal(line);
        self.cursor.set(Position::new(line, 0));
        self.clamp_cursor();
    }

    /// Jumps to the first line of JSON Lines record `number` (1-based).
    pub fn goto_record(&mut self, number: usize) -> bool {
        match number
            .checked_sub(1)
            .and_then(|i| self.doc.records().get(i))
            .map(|r| r.start)
        {
            Some(line) => {
                self.goto_line(line);
                true
            }
            None => false,
        }
    }

    // -- operators ---------------------------------------------------------

    /// Applies `op` over the span from the cursor to `target`.
    pub(crate) fn apply_operator(&mut self, op: Operator, target: Position, kind: MotionKind) {
        let from = self.cursor.position();
        let (start, end) = if target < from {
            (target, from)
        } else {
            (from, target)
        };
        match kind {
            MotionKind::Linewise => {
                let last = self.fold_end(end.line);
                self.operate_lines(op, start.line, last);
            }
            MotionKind::Inclusive => {
                let end = Position::new(end.line, end.col + 1);
                self.operate_chars(op, start, end);
            }
            MotionKind::Exclusive => self.operate_chars(op, start, end),
        }
    }

    pub(crate) fn operate_lines(&mut self, op: Operator, first: usize, last: usize) {
        let last = last.min(self.doc.line_count().saturating_sub(1));
        self.register = Register::new(operator::extract_lines(&self.doc, first, last), true);
        match op {
            Operator::Yank => {
                if first < self.cursor.line() {
                    self.cursor.set(Position::new(first, self.cursor.col()));
                }
            }
            Operator::Delete => {
                operator::delete_lines(&mut self.doc, first, last);
                let line = first.min(self.doc.line_count().saturating_sub(1));
                self.cursor
                    .set(Position::new(line, first_non_blank(self.doc.line(line))));
            }
            Operator::Change => {
                let indent = leading_whitespace(self.doc.line(first)).to_string();
                let col = char_len(&indent);
                self.doc.replace(first..last + 1, vec![indent]);
                self.cursor.set(Position::new(first, col));
                self.set_mode(Mode::Insert);
            }
        }
    }

    /// `end` is exclusive.
    pub(crate) fn operate_chars(&mut self, op: Operator, start: Position, end: Position) {
        if end <= start {
            if op == Operator::Change {
                self.cursor.set(start);
                self.set_mode(Mode::Insert);
            }
            return;
        }
        self.register = Register::new(operator::extract_chars(&self.doc, start, end), false);
        match op {
            Operator::Yank => {}
            Operator::Delete => operator::delete_chars(&mut self.doc, start, end),
            Operator::Change => {
                operator::delete_chars(&mut self.doc, start, end);
                self.set_mode(Mode::Insert);
            }
        }
        self.cursor.set(start);
    }

    /// Applies `op` to the visual selection and leaves Visual mode.
    pub(crate) fn apply_visual(&mut self, op: Operator) {
        let selection = self.selection();
        self.set_mode(Mode::Normal);
        match selection {
            Some(Selection::Lines(first, last)) => {
                let last = self.fold_end(last);
                self.operate_lines(op, first, last);
            }
            Some(Selection::Chars(start, end)) => {
                let end = Position::new(end.line, end.col + 1);
                self.operate_chars(op, start, end);
            }
            None => {}
        }
    }

    // -- Normal mode commands ----------------------------------------------

    /// `p` / `P`.
    pub(crate) fn paste(&mut self, before: bool, count: usize) {
        if self.register.is_empty() {
            self.set_message("Nothing in register".to_string(), MessageLevel::Warning);
            return;
        }
        let count = count.max(1);
        if self.register.linewise {
            let lines: Vec<String> = (0..count)
                .flat_map(|_| self.register.text.iter().cloned())
                .collect();
            let at = if before {
                self.cursor.line()
            } else {
                self.fold_end(self.cursor.line()) + 1
            };
            operator::insert_lines(&mut self.doc, at, lines);
            self.cursor
                .set(Position::new(at, first_non_blank(self.doc.line(at))));
        } else {
            let text: Vec<String> = self
                .register
                .joined()
                .repeat(count)
                .split('\n')
                .map(str::to_string)
                .collect();
            let pos = self.cursor.position();
            let len = self.doc.line_len(pos.line);
            let at = if before || len == 0 {
                pos
            } else {
                Position::new(pos.line, (pos.col + 1).min(len))
            };
            let end = operator::insert_chars(&mut self.doc, at, &text);
            self.cursor.set(if text.len() == 1 { end } else { at });
        }
    }

    /// `J`: joins `count` lines (at least two).
    pub(crate) fn join_lines(&mut self, count: usize) {
        for _ in 1..count.max(2) {
            let line = self.cursor.line();
            if line + 1 >= self.doc.line_count() {
                break;
            }
            let current = self.doc.line(line).trim_end().to_string();
            let next = self.doc.line(line + 1).trim_start().to_string();
            let sep = if current.is_empty() || next.is_empty() {
                ""
            } else {
                " "
            };
            let col = char_len(&current);
            self.doc
                .replace(line..line + 2, vec![format!("{}{}{}", current, sep, next)]);
            self.cursor.set(Position::new(line, col));
        }
    }

    /// `r<c>`: replaces `count` characters under the cursor.
    pub(crate) fn replace_chars(&mut self, c: char, count: usize) {
        let pos = self.cursor.position();
        let count = count.max(1);
        let line = self.doc.line(pos.line).to_string();
        if pos.col + count > char_len(&line) {
            return;
        }
        let from = char_to_byte(&line, pos.col);
        let to = char_to_byte(&line, pos.col + count);
        let replaced = format!(
            "{}{}{}",
            &line[..from],
            c.to_string().repeat(count),
            &line[to..]
        );
        self.doc.set_line(pos.line, replaced);
        self.cursor.set_col(pos.col + count - 1);
    }

    /// `o` / `O`: opens an indented line and enters Insert mode.
    pub(crate) fn open_line(&mut self, below: bool) {
        let line_no = self.cursor.line();
        let line = self.doc.line(line_no);
        let base = leading_whitespace(line).to_string();
        let unit = " ".repeat(self.config.indent_size);
        let indent = if below && line.trim_end().ends_with(['{', '[']) {
            base + &unit
        } else if !below && line.trim_start().starts_with(['}', ']']) {
            base + &unit
        } else {
            base
        };
        let at = if below {
            self.fold_end(line_no) + 1
        } else {
            line_no
        };
        let col = char_len(&indent);
        operator::insert_lines(&mut self.doc, at, vec![indent]);
        self.cursor.set(Position::new(at, col));
        self.set_mode(Mode::Insert);
    }

    /// `za`, `zo`, `zc`, `zM`, `zR`.
    pub(crate) fn fold_command(&mut self, key: char) {
        self.sync_folds();
        let invalid = self.analysis().require_tree().err();
        if let Some(err) = invalid {
            self.report(err);
            return;
        }
        let line = self.cursor.line();
        let found = match key {
            'a' => self.folds.toggle(line),
            'o' => self.folds.open(line),
            'c' => self.folds.close(line),
            'M' => {
                self.folds.close_all();
                true
            }
            'R' => {
                self.folds.open_all();
                true
            }
            _ => false,
        };
        if !found {
            self.set_message("No fold found".to_string(), MessageLevel::Warning);
        }
    }

    // -- Insert mode editing -----------------------------------------------

    /// Types `c` at the cursor. A closing bracket typed on a blank prefix is
    /// dedented by one level first.
    pub(crate) fn insert_char(&mut self, c: char) {
        let pos = self.cursor.position();
        let line = self.doc.line(pos.line).to_string();
        let split = char_to_byte(&line, pos.col);
        let (mut prefix, suffix) = (line[..split].to_string(), &line[split..]);
        if matches!(c, '}' | ']') && !prefix.is_empty() && prefix.chars().all(|ch| ch == ' ') {
            let keep = prefix.len().saturating_sub(self.config.indent_size);
            prefix.truncate(keep);
        }
        let col = char_len(&prefix) + 1;
        self.doc
            .set_line(pos.line, format!("{}{}{}", prefix, c, suffix));
        self.cursor.set(Position::new(pos.line, col));
    }

    /// Tab: one indentation unit of spaces.
    pub(crate) fn insert_indent(&mut self) {
        for _ in 0..self.config.indent_size {
            self.insert_char(' ');
        }
    }

    /// Enter: splits the line with auto-indent. After an opening bracket the
    /// new line is indented one level deeper; between a bracket pair the
    /// closing bracket moves to its own line.
    pub(crate) fn insert_newline(&mut self) {
        let pos = self.cursor.position();
        let line = self.doc.line(pos.line).to_string();
        let split = char_to_byte(&line, pos.col);
        let (before, after) = line.split_at(split);
        let base = leading_whitespace(&line).to_string();
        let after = after.trim_start();
        let opens = before.trim_end().ends_with(['{', '[']);

        let (lines, cursor) = if opens {
            let inner = format!("{}{}", base, " ".repeat(self.config.indent_size));
            let col = char_len(&inner);
            if after.starts_with(['}', ']']) {
                (
                    vec![before.to_string(), inner, format!("{}{}", base, after)],
                    Position::new(pos.line + 1, col),
                )
            } else {
                (
                    vec![before.to_string(), format!("{}{}", inner, after)],
                    Position::new(pos.line + 1, col),
                )
            }
        } else {
            let col = char_len(&base);
            (
                vec![before.to_string(), format!("{}{}", base, after)],
                Position::new(pos.line + 1, col),
            )
        };
        self.doc.replace(pos.line..pos.line + 1, lines);
        self.cursor.set(cursor);
    }

    /// Backspace: deletes the previous character, joining with the previous
    /// line at column 0.
    pub(crate) fn backspace(&mut self) {
        let pos = self.cursor.position();
        if pos.col > 0 {
            let start = Position::new(pos.line, pos.col - 1);
            operator::delete_chars(&mut self.doc, start, pos);
            self.cursor.set(start);
        } else if pos.line > 0 {
            let prev_len = self.doc.line_len(pos.line - 1);
            let start = Position::new(pos.line - 1, prev_len);
            operator::delete_chars(&mut self.doc, start, pos);
            self.cursor.set(start);
        }
    }

    /// Delete: removes the character under the cursor, joining with the next
    /// line at the end of a line.
    pub(crate) fn delete_forward(&mut self) {
        let pos = self.cursor.position();
        let len = self.doc.line_len(pos.line);
        if pos.col < len {
            operator::delete_chars(&mut self.doc, pos, Position::new(pos.line, pos.col + 1));
        } else if pos.line + 1 < self.doc.line_count() {
            operator::delete_chars(&mut self.doc, pos, Position::new(pos.line + 1, 0));
        }
    }

    // -- search --------------------------------------------------------------

    /// Runs a text or structural search against the current document.
    pub fn query(&mut self, pattern: &str) -> EditorResult<MatchList> {
        let smart_case = self.config.smart_case;
        let analysis = self.structure.get(&self.doc);
        query::run(pattern, analysis, &self.doc, smart_case)
    }

    /// Starts a search from `/` (forward) or `?`. An empty pattern repeats
    /// the last one.
    pub fn search(&mut self, pattern: &str, forward: bool) {
        if !pattern.is_empty() {
            self.search.pattern = Some(pattern.to_string());
        }
        self.search.forward = forward;
        self.search_next(false, 1);
    }

    /// `n` (same direction) and `N` (`reverse`).
    pub fn search_next(&mut self, reverse: bool, count: usize) {
        let Some(pattern) = self.search.pattern.clone() else {
            self.set_message("No previous search pattern".to_string(), MessageLevel::Error);
            return;
        };
        let matches = match self.query(&pattern) {
            Ok(matches) => matches,
            Err(e) => {
                self.search.clear_results();
                self.report(e);
                return;
            }
        };
        if matches.is_empty() {
            self.search.clear_results();
            self.report(EditorError::NoMatch(pattern));
            return;
        }

        let forward = self.search.forward != reverse;
        let mut pos = self.cursor.position();
        let mut index = 0;
        let mut wrapped = false;
        for _ in 0..count.max(1) {
            if let Some((i, w)) = matches.next_from(pos, forward) {
                index = i;
                wrapped |= w;
                if let Some(m) = matches.get(i) {
                    pos = m.position();
                }
            }
        }
        self.folds.reveal(pos.line);
        self.cursor.set(pos);

        let total = matches.len();
        self.search.matches = matches;
        self.search.index = Some(index);
        if wrapped {
            let text = if forward {
                "search hit BOTTOM, continuing at TOP"
            } else {
                "search hit TOP, continuing at BOTTOM"
            };
            self.set_message(text.to_string(), MessageLevel::Warning);
        } else {
            let prefix = if forward { '/' } else { '?' };
            self.set_message(
                format!("{}{} [{}/{}]", prefix, pattern, index + 1, total),
                MessageLevel::Info,
            );
        }
    }

    // -- whole-document commands -------------------------------------------

    /// `:fmt`: pretty-prints the document (every record, for JSON Lines).
    pub fn format_document(&mut self) -> EditorResult<()> {
        let jsonl = self.doc.format() == DocumentFormat::Jsonl;
        let lines = format::format_lines(self.doc.lines(), jsonl, self.config.indent_size)
            .map_err(|e| EditorError::InvalidJson {
                line: e.line(),
                column: e.column(),
                message: e.to_string(),
            })?;
        self.edit_as_group(|s| {
            let count = s.doc.line_count();
            s.doc.replace(0..count, lines);
            s.cursor.set(Position::default());
        });
        self.folds.open_all();
        Ok(())
    }

    /// `:expand` and `:collapse`: pretty-prints or minifies the JSON Lines
    /// record under the cursor as one undo entry. Returns the record's
    /// 1-based number.
    pub fn reshape_record(&mut self, expand: bool) -> EditorResult<usize> {
        if self.doc.format() != DocumentFormat::Jsonl {
            return Err(EditorError::NotJsonl);
        }
        let index = self
            .doc
            .record_at(self.cursor.line())
            .ok_or(EditorError::NoRecord)?;
        let record = self.doc.records()[index];
        let text = self.doc.read(record.start..record.end + 1).join("\n");
        if let Err(e) = serde_json::from_str::<serde_json::Value>(&text) {
            return Err(EditorError::InvalidJson {
                line: record.start + e.line(),
                column: e.column(),
                message: e.to_string(),
            });
        }
        let indent = self.config.indent_size;
        self.edit_as_group(|s| {
            if expand {
                s.doc.expand_record(index, indent);
            } else {
                s.doc.collapse_record(index);
            }
            s.cursor.set(Position::new(record.start, 0));
        });
        debug!(level = self.level, record = index + 1, expand, "reshaped record");
        Ok(index + 1)
    }

    /// `:s`: replaces `regex` matches on lines `first..=last`. Returns the
    /// number of replacements.
    pub fn substitute(
        &mut self,
        first: usize,
        last: usize,
        regex: &Regex,
        replacement: &str,
        global: bool,
    ) -> usize {
        let last = last.min(self.doc.line_count().saturating_sub(1));
        self.edit_as_group(|s| {
            let mut total = 0;
            for line_no in first..=last {
                let line = s.doc.line(line_no).to_string();
                let hits = regex.find_iter(&line).count();
                if hits == 0 {
                    continue;
                }
                let replaced = if global {
                    total += hits;
                    regex.replace_all(&line, replacement)
                } else {
                    total += 1;
                    regex.replace(&line, replacement)
                };
                s.doc.set_line(line_no, replaced.into_owned());
            }
            total
        })
    }

    // -- embedded editing support ------------------------------------------

    /// Finds the string value to open for embedded editing: the string under
    /// the cursor (a key selects its value), otherwise the first string value
    /// starting on the cursor's line. Returns its path and decoded content.
    pub fn embedded_target(&mut self) -> EditorResult<(NodePath, String)> {
        let pos = self.cursor.position();
        let tree = self.structure.get(&self.doc).require_tree()?;
        let id = tree
            .node_at(pos)
            .filter(|&id| tree.node(id).as_str().is_some())
            .or_else(|| {
                tree.walk().into_iter().find(|&id| {
                    let node = tree.node(id);
                    node.as_str().is_some() && node.span.start.line == pos.line
                })
            })
            .ok_or(EditorError::NotAString)?;
        let content = tree.node(id).as_str().unwrap_or_default().to_string();
        Ok((tree.path_of(id), content))
    }

    /// Replaces the string value at `path` with `literal`, a JSON string
    /// literal, as one undo entry. Fails with `StaleParent` when the path no
    /// longer holds a string.
    pub fn write_back(&mut self, path: &NodePath, literal: &str) -> EditorResult<()> {
        let span = {
            let tree = self
                .structure
                .get(&self.doc)
                .tree()
                .ok_or(EditorError::StaleParent)?;
            let id = tree.resolve(path).ok_or(EditorError::StaleParent)?;
            let node = tree.node(id);
            if node.as_str().is_none() {
                return Err(EditorError::StaleParent);
            }
            node.span
        };
        let line = self.doc.line(span.start.line).to_string();
        let from = char_to_byte(&line, span.start.col);
        let to = char_to_byte(&line, span.end.col + 1);
        let updated = format!("{}{}{}", &line[..from], literal, &line[to..]);
        self.edit_as_group(|s| {
            s.doc.set_line(span.start.line, updated);
        });
        debug!(level = self.level, path = %path, "wrote back embedded value");
        Ok(())
    }
}

fn leading_whitespace(line: &str) -> &str {
    let end = line.len() - line.trim_start().len();
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(text: &str) -> Session {
        Session::load(text, DocumentFormat::Json, false, &Config::default())
    }

    #[test]
    fn test_pending_count_product() {
        let mut pending = Pending::default();
        assert_eq!(pending.count(), None);
        pending.push_digit(2);
        pending.operator = Some(Operator::Delete);
        pending.push_digit(3);
        assert_eq!(pending.count(), Some(6));
    }

    #[test]
    fn test_edit_as_group_is_one_undo_entry() {
        let mut s = session("a\nb\nc");
        s.edit_as_group(|s| {
            s.doc.set_line(0, "x".to_string());
            s.doc.set_line(1, "y".to_string());
        });
        assert_eq!(s.undo_history().len(), 1);
        assert!(s.is_dirty());
        s.undo(1).unwrap();
        assert_eq!(s.document().text(), "a\nb\nc");
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_embedded_target_prefers_string_on_line() {
        let mut s = session("{\n    \"config\": \"{}\",\n    \"n\": 1\n}");
        s.set_cursor(Position::new(1, 0));
        let (path, content) = s.embedded_target().unwrap();
        assert_eq!(path.to_string(), "$.config");
        assert_eq!(content, "{}");

        s.set_cursor(Position::new(2, 9));
        assert_eq!(s.embedded_target().unwrap_err(), EditorError::NotAString);
    }

    #[test]
    fn test_write_back_replaces_string_literal() {
        let mut s = session("{\"config\": \"old\"}");
        let (path, _) = s.embedded_target().unwrap();
        s.write_back(&path, "\"new\"").unwrap();
        assert_eq!(s.document().text(), "{\"config\": \"new\"}");
        assert_eq!(s.undo_history().len(), 1);
    }

    #[test]
    fn test_write_back_to_non_string_is_stale() {
        let mut s = session("{\"config\": 1}");
        let path = NodePath(vec![crate::structure::PathStep::Key("config".to_string())]);
        assert_eq!(s.write_back(&path, "\"x\"").unwrap_err(), EditorError::StaleParent);
    }

    #[test]
    fn test_insert_newline_between_braces() {
        let mut s = session("{}");
        s.set_mode(Mode::Insert);
        s.cursor.set(Position::new(0, 1));
        s.insert_newline();
        assert_eq!(s.document().lines(), &["{", "    ", "}"]);
        assert_eq!(s.cursor(), Position::new(1, 4));
    }

    #[test]
    fn test_closing_bracket_dedents() {
        let mut s = session("{\n        ");
        s.set_mode(Mode::Insert);
        s.cursor.set(Position::new(1, 8));
        s.insert_char('}');
        assert_eq!(s.document().line(1), "    }");
    }

    #[test]
    fn test_substitute_counts() {
        let mut s = session("a a\na");
        let re = Regex::new("a").unwrap();
        assert_eq!(s.substitute(0, 1, &re, "b", true), 3);
        assert_eq!(s.document().text(), "b b\nb");
        assert_eq!(s.undo_history().len(), 1);
    }
}
