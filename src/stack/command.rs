//! `:` command dispatch.
//!
//! Commands run against the top session of an [`Editor`]. Anything that
//! needs the filesystem comes back as a [`HostRequest`] for the host to
//! carry out; the core never reads or writes files.

use super::Editor;
use crate::document::{format, DocumentFormat};
use crate::editor::session::MessageLevel;
use crate::error::EditorError;
use regex::RegexBuilder;
use tracing::{debug, warn};

/// Work only the host can do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRequest {
    /// Write `content` to `path`.
    Write { path: String, content: String },
    /// Load `path` and hand it to [`Editor::open_text`].
    Open { path: String, force: bool },
    ToggleHelp,
}

/// Outcome of one command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub ok: bool,
    pub message: Option<String>,
    pub quit: bool,
    pub force_quit: bool,
    pub request: Option<HostRequest>,
}

impl CommandResult {
    fn ok() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    fn info(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

impl From<EditorError> for CommandResult {
    fn from(err: EditorError) -> Self {
        CommandResult::error(err.to_string())
    }
}

const NOT_SAVED: &str = "No write since last change (use :q! to force)";

impl Editor {
    /// Runs one command line (without the leading `:`). The result message is
    /// also shown as the top session's status message.
    pub fn dispatch_command(&mut self, line: &str) -> CommandResult {
        let line = line.trim();
        let line = line.strip_prefix(':').unwrap_or(line).trim();
        debug!(command = line, level = self.depth(), "dispatching command");

        let result = self.run_command(line);
        if let Some(message) = &result.message {
            let level = if result.ok {
                MessageLevel::Info
            } else {
                MessageLevel::Error
            };
            let message = message.clone();
            self.session_mut().set_message(message, level);
        }
        if result.quit {
            self.quit = true;
        }
        result
    }

    fn run_command(&mut self, line: &str) -> CommandResult {
        if line.is_empty() {
            return CommandResult::ok();
        }
        if let Some((range, delimiter, body)) = parse_substitute(line) {
            return self.substitute(range, delimiter, body);
        }

        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (line, None),
        };

        if name == "$" {
            let last = self.session().document().line_count().saturating_sub(1);
            self.session_mut().goto_line(last);
            return CommandResult::ok();
        }
        if let Some(n) = parse_jump(name, "l") {
            self.session_mut().goto_line(n.saturating_sub(1));
            return CommandResult::ok();
        }
        if let Some(n) = parse_jump(name, "").or_else(|| parse_jump(name, "p")) {
            let session = self.session_mut();
            if session.document().format() == DocumentFormat::Jsonl {
                if !session.goto_record(n) {
                    return CommandResult::error(format!("record {} not found", n));
                }
            } else {
                session.goto_line(n.saturating_sub(1));
            }
            return CommandResult::ok();
        }

        match name {
            "w" => self.write(arg, false),
            "w!" => self.write(arg, true),
            "q" => self.close(false),
            "q!" => self.close(true),
            "wq" | "x" | "wq!" | "x!" => self.write_and_close(arg, name.ends_with('!')),
            "e" | "e!" => match arg {
                None => CommandResult::error("Usage: :e <file>"),
                Some(path) => {
                    let force = name == "e!";
                    if !force && self.any_dirty() {
                        return CommandResult::error(
                            "No write since last change (add ! to override)",
                        );
                    }
                    CommandResult {
                        request: Some(HostRequest::Open {
                            path: path.to_string(),
                            force,
                        }),
                        ..CommandResult::ok()
                    }
                }
            },
            "fmt" | "format" => {
                let session = self.session_mut();
                if session.is_read_only() {
                    return EditorError::ReadOnlyViolation.into();
                }
                match session.format_document() {
                    Ok(()) => CommandResult::info("formatted"),
                    Err(e) => e.into(),
                }
            }
            "expand" | "collapse" => {
                let session = self.session_mut();
                if session.is_read_only() {
                    return EditorError::ReadOnlyViolation.into();
                }
                let expand = name == "expand";
                match session.reshape_record(expand) {
                    Ok(n) => {
                        let done = if expand { "expanded" } else { "collapsed" };
                        CommandResult::info(format!("record {} {}", n, done))
                    }
                    Err(e) => e.into(),
                }
            }
            "help" => CommandResult {
                request: Some(HostRequest::ToggleHelp),
                ..CommandResult::ok()
            },
            "path" | "jp" => match arg {
                None => CommandResult::error(format!("Usage: :{} <query>", name)),
                Some(query) => {
                    let pattern = if query.starts_with('$') {
                        query.to_string()
                    } else {
                        format!("$.{}", query)
                    };
                    self.history.push_search(&pattern);
                    let session = self.session_mut();
                    session.search(&pattern, true);
                    CommandResult {
                        ok: session.search_info().is_some(),
                        ..CommandResult::default()
                    }
                }
            },
            "ej" => match self.open_embedded() {
                Ok(()) => CommandResult::ok(),
                Err(e) => e.into(),
            },
            "u" | "undo" => match self.session_mut().undo(1) {
                Ok(()) => CommandResult::ok(),
                Err(e) => e.into(),
            },
            "red" | "redo" => match self.session_mut().redo(1) {
                Ok(()) => CommandResult::ok(),
                Err(e) => e.into(),
            },
            _ => EditorError::UnrecognizedCommand(line.to_string()).into(),
        }
    }

    fn any_dirty(&self) -> bool {
        self.root.is_dirty() || self.children.iter().any(|s| s.is_dirty())
    }

    /// First parse error of the bottom document, formatted for the status
    /// line.
    fn validation_error(&self) -> Option<String> {
        let doc = self.root.document();
        match doc.format() {
            DocumentFormat::Jsonl => format::split_blocks(doc.lines())
                .iter()
                .enumerate()
                .find_map(|(i, block)| {
                    serde_json::from_str::<serde_json::Value>(&block.join("\n"))
                        .err()
                        .map(|e| format!("JSONL error: record {}: {}", i + 1, e))
                }),
            DocumentFormat::Json => serde_json::from_str::<serde_json::Value>(&doc.text())
                .err()
                .map(|e| format!("JSON error: {}", e)),
        }
    }

    /// `:w`. In an embedded session this saves into the parent and keeps the
    /// session open. `force` skips validation of the bottom document.
    fn write(&mut self, arg: Option<&str>, force: bool) -> CommandResult {
        if self.session().is_read_only() {
            warn!("write refused: read-only session");
            return EditorError::ReadOnlyViolation.into();
        }
        if self.depth() > 0 {
            return match self.save_embedded() {
                Ok(()) => CommandResult::info("Saved to parent"),
                Err(e) => {
                    warn!(error = %e, "embedded save refused");
                    e.into()
                }
            };
        }

        if !force {
            if let Some(error) = self.validation_error() {
                warn!(%error, "write refused: document does not parse");
                return CommandResult::error(error);
            }
        }
        let path = match arg.map(str::to_string).or_else(|| self.root.filename().map(str::to_string)) {
            Some(path) => path,
            None => return CommandResult::error("No file name (use :w <filename>)"),
        };
        if self.root.filename().is_none() {
            self.root.set_filename(path.clone());
        }
        let content = self.root.serialize();
        self.root.mark_clean();
        CommandResult {
            request: Some(HostRequest::Write {
                path: path.clone(),
                content,
            }),
            ..CommandResult::info(format!("\"{}\" written", path))
        }
    }

    /// `:q` and `:q!`. Closes the top session; closing the bottom one quits.
    fn close(&mut self, force: bool) -> CommandResult {
        if !force && self.session().is_dirty() {
            warn!(level = self.depth(), "close refused: unsaved changes");
            return CommandResult::error(NOT_SAVED);
        }
        if self.depth() > 0 {
            self.discard();
            return CommandResult::ok();
        }
        CommandResult {
            quit: true,
            force_quit: force,
            ..CommandResult::ok()
        }
    }

    /// `:wq` and `:x`.
    fn write_and_close(&mut self, arg: Option<&str>, force: bool) -> CommandResult {
        if self.session().is_read_only() {
            return self.close(true);
        }
        let written = self.write(arg, force);
        if !written.ok {
            return written;
        }
        if self.depth() > 0 {
            self.discard();
            return CommandResult {
                message: Some("Saved to parent".to_string()),
                ..CommandResult::ok()
            };
        }
        CommandResult {
            quit: true,
            ..written
        }
    }

    /// `:[range]s/pattern/replacement/[flags]`.
    fn substitute(&mut self, range: SubstituteRange, delimiter: char, body: &str) -> CommandResult {
        let parts = split_unescaped(body, delimiter);
        let pattern = parts.first().cloned().unwrap_or_default();
        let replacement = parts.get(1).cloned().unwrap_or_default();
        let flags = parts.get(2).cloned().unwrap_or_default();
        if pattern.is_empty() {
            return EditorError::InvalidPattern("empty pattern".to_string()).into();
        }

        let session = self.session_mut();
        if session.is_read_only() {
            return EditorError::ReadOnlyViolation.into();
        }
        let last_line = session.document().line_count().saturating_sub(1);
        let (first, last) = match range {
            SubstituteRange::Current => (session.cursor().line, session.cursor().line),
            SubstituteRange::All => (0, last_line),
            SubstituteRange::Lines(a, b) => (a.saturating_sub(1), b.saturating_sub(1)),
        };
        if first > last || first > last_line {
            return CommandResult::error("invalid range");
        }

        let regex = match RegexBuilder::new(&pattern)
            .case_insensitive(flags.contains('i'))
            .build()
        {
            Ok(regex) => regex,
            Err(e) => return EditorError::InvalidPattern(e.to_string()).into(),
        };
        let count = session.substitute(
            first,
            last,
            &regex,
            &translate_replacement(&replacement),
            flags.contains('g'),
        );
        match count {
            0 => EditorError::NoMatch(pattern).into(),
            1 => CommandResult::info("1 substitution"),
            n => CommandResult::info(format!("{} substitutions", n)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SubstituteRange {
    Current,
    All,
    /// 1-based, inclusive.
    Lines(usize, usize),
}

/// Recognizes `[%|N,M]s<delim>...`. The delimiter may be any character
/// that is neither alphanumeric nor whitespace.
fn parse_substitute(line: &str) -> Option<(SubstituteRange, char, &str)> {
    let (range, rest) = if let Some(rest) = line.strip_prefix('%') {
        (SubstituteRange::All, rest)
    } else {
        let digits = line.chars().take_while(char::is_ascii_digit).count();
        match line[digits..].strip_prefix(',') {
            Some(after) if digits > 0 => {
                let end = after.chars().take_while(char::is_ascii_digit).count();
                if end == 0 {
                    return None;
                }
                let first = line[..digits].parse().ok()?;
                let last = after[..end].parse().ok()?;
                (SubstituteRange::Lines(first, last), &after[end..])
            }
            _ if digits > 0 => return None,
            _ => (SubstituteRange::Current, line),
        }
    };
    let rest = rest.strip_prefix('s')?;
    let delimiter = rest.chars().next()?;
    if delimiter.is_alphanumeric() || delimiter.is_whitespace() {
        return None;
    }
    Some((range, delimiter, &rest[delimiter.len_utf8()..]))
}

/// `name` as `<prefix><digits>`.
fn parse_jump(name: &str, prefix: &str) -> Option<usize> {
    let digits = name.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Splits on `delimiter`; `\<delimiter>` stands for the delimiter itself.
fn split_unescaped(body: &str, delimiter: char) -> Vec<String> {
    let mut parts = vec![String::new()];
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&delimiter) {
            chars.next();
            if let Some(part) = parts.last_mut() {
                part.push(delimiter);
            }
        } else if c == delimiter {
            parts.push(String::new());
        } else if let Some(part) = parts.last_mut() {
            part.push(c);
        }
    }
    parts
}

/// Converts a vim-style replacement to `regex` syntax: `\1` becomes `${1}`,
/// `&` the whole match, and `$` is literal.
fn translate_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '&' => out.push_str("${0}"),
            '\\' => match chars.next() {
                Some(d) if d.is_ascii_digit() => {
                    out.push_str("${");
                    out.push(d);
                    out.push('}');
                }
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            _ => out.push(c),
        }
    }
    out
}
