//! Key dispatch for a single session.
//!
//! Every key goes through [`Session::dispatch_key`]. It opens an undo group,
//! records the key for dot-repeat, runs the mode's handler and, once the
//! session is back out of Insert mode, commits the group as one undo entry.
//!
//! Commands that reach beyond the session (`:` commands and opening an
//! embedded editor) are returned as [`Deferred`] work for the session stack.

use super::keys::{format_keys, Key};
use crate::editor::history::History;
use crate::editor::mode::Mode;
use crate::editor::motion::{first_non_blank, is_blank_at, Motion, MotionKind};
use crate::editor::operator::Operator;
use crate::editor::session::{MessageLevel, Pending, Session};
use crate::document::Position;
use tracing::trace;

/// Work a key asks the owner of the session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    None,
    /// A `:` command line, without the colon.
    Command(String),
    /// `ej`: open the string under the cursor in an embedded session.
    OpenEmbedded,
}

impl Session {
    /// Handles one key. `history` is shared by all sessions of an editor.
    pub fn dispatch_key(&mut self, key: Key, history: &mut History) -> Deferred {
        self.begin_group();
        let clean = self.mode == Mode::Normal && self.pending.is_clean();
        self.repeat.begin_or_continue(key, clean);

        let deferred = self.handle_key(key, history);

        self.sync_folds();
        self.clamp_cursor();
        if self.mode != Mode::Insert {
            self.commit_group();
        }
        if self.mode == Mode::Normal && self.pending.is_clean() {
            self.repeat.finish();
        }
        trace!(key = %key, mode = %self.mode, level = self.level, "key handled");
        deferred
    }

    fn handle_key(&mut self, key: Key, history: &mut History) -> Deferred {
        match self.mode {
            Mode::Insert => {
                self.handle_insert(key);
                Deferred::None
            }
            Mode::CommandLine | Mode::Search { .. } => self.handle_prompt(key, history),
            Mode::Normal | Mode::VisualChar | Mode::VisualLine => self.handle_normal(key, history),
        }
    }

    fn handle_insert(&mut self, key: Key) {
        match key {
            Key::Char(c) => self.insert_char(c),
            Key::Enter => self.insert_newline(),
            Key::Backspace => self.backspace(),
            Key::Delete => self.delete_forward(),
            Key::Tab => self.insert_indent(),
            Key::Esc => {
                self.set_mode(Mode::Normal);
                let col = self.cursor.col().saturating_sub(1);
                self.cursor.set_col(col);
            }
            Key::Left | Key::Right | Key::Up | Key::Down | Key::Home | Key::End => {
                if let Some(motion) = Motion::from_key(key) {
                    if let Some(target) = self.resolve_motion(motion, None) {
                        self.cursor.set(target);
                    }
                }
                if key == Key::End {
                    let len = self.doc.line_len(self.cursor.line());
                    self.cursor.set_col(len);
                }
            }
            _ => {}
        }
    }

    fn handle_prompt(&mut self, key: Key, history: &mut History) -> Deferred {
        match key {
            Key::Esc => self.set_mode(Mode::Normal),
            Key::Enter => {
                let text = std::mem::take(&mut self.prompt.buffer);
                let mode = self.mode;
                self.set_mode(Mode::Normal);
                match mode {
                    Mode::CommandLine => {
                        history.push_command(&text);
                        if !text.trim().is_empty() {
                            return Deferred::Command(text);
                        }
                    }
                    Mode::Search { backward } => {
                        history.push_search(&text);
                        self.search(&text, !backward);
                    }
                    _ => {}
                }
            }
            Key::Backspace => {
                if self.prompt.buffer.pop().is_none() {
                    self.set_mode(Mode::Normal);
                }
            }
            Key::Up | Key::Down => {
                let entries = if self.mode == Mode::CommandLine {
                    &history.command
                } else {
                    &history.search
                };
                let index = match (key, self.prompt.history_index) {
                    (Key::Up, None) if !entries.is_empty() => Some(0),
                    (Key::Up, Some(i)) => Some((i + 1).min(entries.len().saturating_sub(1))),
                    (Key::Down, Some(i)) if i > 0 => Some(i - 1),
                    _ => None,
                };
                self.prompt.history_index = index;
                self.prompt.buffer = index
                    .and_then(|i| entries.get(i))
                    .cloned()
                    .unwrap_or_default();
            }
            Key::Char(c) => self.prompt.buffer.push(c),
            Key::Tab => self.prompt.buffer.push('\t'),
            _ => {}
        }
        Deferred::None
    }

    fn handle_normal(&mut self, key: Key, history: &mut History) -> Deferred {
        self.pending.keys.push(key);

        if let Some(prefix) = self.pending.prefix.take() {
            return self.handle_prefixed(prefix, key);
        }

        let counting = if self.pending.operator.is_some() {
            self.pending.op_count.is_some()
        } else {
            self.pending.count.is_some()
        };
        match key {
            Key::Esc => {
                if self.mode.is_visual() {
                    self.set_mode(Mode::Normal);
                }
                self.pending = Pending::default();
                return Deferred::None;
            }
            Key::Char(c @ '1'..='9') => {
                self.pending.push_digit(c as usize - '0' as usize);
                return Deferred::None;
            }
            Key::Char('0') if counting => {
                self.pending.push_digit(0);
                return Deferred::None;
            }
            _ => {}
        }

        let count = self.pending.count();
        if let Some(op) = self.pending.operator {
            return self.handle_operator_target(op, key, count);
        }

        if self.mode.is_visual() {
            if let Some(deferred) = self.handle_visual(key) {
                self.pending = Pending::default();
                return deferred;
            }
        }

        if let Some(motion) = Motion::from_key(key) {
            if let Some(target) = self.resolve_motion(motion, count) {
                self.cursor.set(target);
            }
            self.pending = Pending::default();
            return Deferred::None;
        }

        let n = count.unwrap_or(1);
        match key {
            Key::Char(c @ ('g' | 'z' | 'r' | 'e')) => {
                self.pending.prefix = Some(c);
                return Deferred::None;
            }
            Key::Char(c @ ('d' | 'c' | 'y')) if !self.mode.is_visual() => {
                if let Some(op) = Operator::from_char(c) {
                    self.pending.operator = Some(op);
                }
                return Deferred::None;
            }
            Key::Char('i') => self.enter_insert(None),
            Key::Char('I') => {
                let col = first_non_blank(self.doc.line(self.cursor.line()));
                self.enter_insert(Some(col));
            }
            Key::Char('a') => {
                let len = self.doc.line_len(self.cursor.line());
                self.enter_insert(Some((self.cursor.col() + 1).min(len)));
            }
            Key::Char('A') => {
                let len = self.doc.line_len(self.cursor.line());
                self.enter_insert(Some(len));
            }
            Key::Char(c @ ('o' | 'O')) => {
                if self.check_writable() {
                    self.open_line(c == 'o');
                }
            }
            Key::Char('x') | Key::Delete => {
                if self.check_writable() {
                    let pos = self.cursor.position();
                    let len = self.doc.line_len(pos.line);
                    let end = Position::new(pos.line, (pos.col + n).min(len));
                    self.operate_chars(Operator::Delete, pos, end);
                }
            }
            Key::Char(c @ ('D' | 'C')) => {
                let op = if c == 'D' {
                    Operator::Delete
                } else {
                    Operator::Change
                };
                if self.check_writable() {
                    if let Some(target) = self.resolve_motion(Motion::LineEnd, count) {
                        let len = self.doc.line_len(target.line);
                        if len == 0 && target.line == self.cursor.line() {
                            self.operate_chars(op, self.cursor.position(), target);
                        } else {
                            self.apply_operator(op, target, MotionKind::Inclusive);
                        }
                    }
                }
            }
            Key::Char('J') => {
                if self.check_writable() {
                    self.join_lines(n);
                }
            }
            Key::Char(c @ ('p' | 'P')) => {
                if self.check_writable() {
                    self.paste(c == 'P', n);
                }
            }
            Key::Char('u') => {
                self.repeat.exclude();
                if let Err(e) = self.undo(n) {
                    self.report(e);
                }
            }
            Key::Ctrl('r') => {
                self.repeat.exclude();
                if let Err(e) = self.redo(n) {
                    self.report(e);
                }
            }
            Key::Char('.') => {
                self.pending = Pending::default();
                self.repeat_last_change(count, history);
                return Deferred::None;
            }
            Key::Char(c @ ('n' | 'N')) => self.search_next(c == 'N', n),
            Key::Char(':') => {
                self.repeat.exclude();
                self.set_mode(Mode::CommandLine);
            }
            Key::Char(c @ ('/' | '?')) => {
                self.repeat.exclude();
                self.set_mode(Mode::Search {
                    backward: c == '?',
                });
            }
            Key::Char('v') => {
                self.repeat.exclude();
                self.cursor.anchor_here();
                self.mode = Mode::VisualChar;
            }
            Key::Char('V') => {
                self.repeat.exclude();
                self.cursor.anchor_here();
                self.mode = Mode::VisualLine;
            }
            Key::Ctrl('d') => self.scroll(true, true, count),
            Key::Ctrl('u') => self.scroll(false, true, count),
            Key::Ctrl('f') | Key::PageDown => self.scroll(true, false, count),
            Key::Ctrl('b') | Key::PageUp => self.scroll(false, false, count),
            _ => self.unknown_sequence(),
        }
        self.pending = Pending::default();
        Deferred::None
    }

    /// Keys with a meaning of their own in Visual mode. Returns `None` for
    /// keys handled like in Normal mode.
    fn handle_visual(&mut self, key: Key) -> Option<Deferred> {
        match key {
            Key::Char('v') | Key::Char('V') => {
                let target = if key == Key::Char('v') {
                    Mode::VisualChar
                } else {
                    Mode::VisualLine
                };
                if self.mode == target {
                    self.set_mode(Mode::Normal);
                } else {
                    self.mode = target;
                }
            }
            Key::Char('o') => self.cursor.swap_anchor(),
            Key::Char(c @ ('d' | 'x' | 'c' | 'y')) => {
                let op = Operator::from_char(c).unwrap_or(Operator::Delete);
                self.repeat.exclude();
                if !op.modifies() || self.check_writable() {
                    self.apply_visual(op);
                } else {
                    self.set_mode(Mode::Normal);
                }
            }
            Key::Char(':') => {
                self.set_mode(Mode::CommandLine);
            }
            _ => return None,
        }
        Some(Deferred::None)
    }

    /// Second key of `g`, `z`, `r` and `e` sequences.
    fn handle_prefixed(&mut self, prefix: char, key: Key) -> Deferred {
        let count = self.pending.count();
        let mut deferred = Deferred::None;
        match (prefix, key) {
            ('g', Key::Char('g')) => {
                if let Some(target) = self.resolve_motion(Motion::FirstLine, count) {
                    match self.pending.operator {
                        Some(op) => {
                            if !op.modifies() || self.check_writable() {
                                self.apply_operator(op, target, MotionKind::Linewise);
                            }
                        }
                        None => self.cursor.set(target),
                    }
                }
            }
            ('z', Key::Char(c @ ('a' | 'o' | 'c' | 'M' | 'R'))) => self.fold_command(c),
            ('r', Key::Char(c)) => {
                if self.check_writable() {
                    self.replace_chars(c, count.unwrap_or(1));
                }
            }
            ('r', Key::Esc) => {}
            ('e', Key::Char('j')) => {
                self.repeat.exclude();
                deferred = Deferred::OpenEmbedded;
            }
            _ => self.unknown_sequence(),
        }
        self.pending = Pending::default();
        deferred
    }

    /// The key after `d`, `c` or `y`.
    fn handle_operator_target(&mut self, op: Operator, key: Key, count: Option<usize>) -> Deferred {
        if key == Key::Char('g') {
            self.pending.prefix = Some('g');
            return Deferred::None;
        }
        if op.modifies() && !self.check_writable() {
            self.pending = Pending::default();
            return Deferred::None;
        }

        let from = self.cursor.position();
        let doubled = matches!((op, key),
            (Operator::Delete, Key::Char('d'))
            | (Operator::Change, Key::Char('c'))
            | (Operator::Yank, Key::Char('y')));

        if doubled {
            let extra = count.unwrap_or(1).saturating_sub(1);
            let last = if extra == 0 {
                from.line
            } else {
                self.resolve_motion(Motion::Down, Some(extra))
                    .map_or(from.line, |p| p.line)
            };
            let last = self.fold_end(last);
            self.operate_lines(op, from.line, last);
        } else if let Some(mut motion) = Motion::from_key(key) {
            // cw on a word changes to the end of the word
            if op == Operator::Change
                && motion == Motion::WordForward
                && !is_blank_at(&self.doc, from)
            {
                motion = Motion::WordEnd;
            }
            if let Some(mut target) = self.resolve_motion(motion, count) {
                if motion == Motion::WordForward && target.line > from.line {
                    let line = target.line - 1;
                    target = Position::new(line, self.doc.line_len(line));
                }
                self.apply_operator(op, target, motion.kind());
            }
        } else {
            self.unknown_sequence();
        }
        self.pending = Pending::default();
        Deferred::None
    }

    fn enter_insert(&mut self, col: Option<usize>) {
        if !self.check_writable() {
            return;
        }
        self.set_mode(Mode::Insert);
        if let Some(col) = col {
            self.cursor.set_col(col);
        }
    }

    /// `.`: replays the keys of the last change. A count replaces the count
    /// the change was typed with.
    fn repeat_last_change(&mut self, count: Option<usize>, history: &mut History) {
        self.repeat.exclude();
        let mut keys = self.repeat.last().to_vec();
        if keys.is_empty() {
            return;
        }
        if let Some(count) = count {
            let typed = match keys.first() {
                Some(Key::Char('0')) => 0,
                _ => keys
                    .iter()
                    .take_while(|k| matches!(k, Key::Char(c) if c.is_ascii_digit()))
                    .count(),
            };
            keys.splice(..typed, count.to_string().chars().map(Key::Char));
        }
        self.repeat.set_replaying(true);
        for key in keys {
            self.handle_key(key, history);
        }
        self.repeat.set_replaying(false);
    }

    fn unknown_sequence(&mut self) {
        let keys = format_keys(&self.pending.keys);
        self.set_message(format!("unknown: {}", keys), MessageLevel::Warning);
    }
}
