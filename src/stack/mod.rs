//! The editor: a stack of sessions.
//!
//! The bottom session edits the document the editor was created with. `ej`
//! pushes a session editing the JSON held in one string value of the session
//! below; saving it encodes the result back into that string. Keys and
//! commands always go to the top session.
//!
//! # Example
//!
//! ```
//! use jsonvim::document::DocumentFormat;
//! use jsonvim::input::keys::parse_keys;
//! use jsonvim::stack::Editor;
//!
//! let mut editor = Editor::create(
//!     r#"{"config":"{\"port\":8080}"}"#,
//!     DocumentFormat::Json,
//!     false,
//! );
//! for key in parse_keys("ej") {
//!     editor.dispatch_key(key);
//! }
//! assert_eq!(editor.depth(), 1);
//! assert_eq!(editor.session().document().text(), "{\n    \"port\": 8080\n}");
//! ```

pub mod command;

pub use command::{CommandResult, HostRequest};

use crate::config::Config;
use crate::document::{format, DocumentFormat, Position, Version};
use crate::editor::history::History;
use crate::editor::mode::Mode;
use crate::editor::session::{MessageLevel, ParentLink, Session};
use crate::error::{EditorError, EditorResult};
use crate::input::handler::Deferred;
use crate::input::keys::Key;
use crate::query::MatchList;
use crate::structure::parse_value;
use tracing::debug;

/// What a key did, for the host to decide what to redraw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effect {
    pub cursor_moved: bool,
    pub mode_changed: bool,
    pub document_changed: bool,
    pub session_pushed: bool,
    pub session_popped: bool,
    pub quit: bool,
}

impl Effect {
    pub fn is_none(&self) -> bool {
        *self == Effect::default()
    }
}

struct Snapshot {
    depth: usize,
    cursor: Position,
    mode: Mode,
    versions: Vec<Version>,
}

pub struct Editor {
    root: Session,
    /// Embedded sessions, innermost last.
    children: Vec<Session>,
    history: History,
    config: Config,
    quit: bool,
    requests: Vec<HostRequest>,
}

impl Editor {
    /// Creates an editor over `text` with the default configuration.
    pub fn create(text: &str, format: DocumentFormat, read_only: bool) -> Self {
        Self::with_config(text, format, read_only, Config::default())
    }

    pub fn with_config(text: &str, format: DocumentFormat, read_only: bool, config: Config) -> Self {
        Self {
            root: Session::load(text, format, read_only, &config),
            children: Vec::new(),
            history: History::default(),
            config,
            quit: false,
            requests: Vec::new(),
        }
    }

    /// The session receiving keys.
    pub fn session(&self) -> &Session {
        self.children.last().unwrap_or(&self.root)
    }

    pub fn session_mut(&mut self) -> &mut Session {
        self.children.last_mut().unwrap_or(&mut self.root)
    }

    /// The bottom session.
    pub fn root(&self) -> &Session {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Session {
        &mut self.root
    }

    /// Number of embedded sessions above the bottom one.
    pub fn depth(&self) -> usize {
        self.children.len()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn set_history(&mut self, history: History) {
        self.history = history;
    }

    /// Requests raised by commands typed as keys, oldest first.
    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Serializes the bottom session.
    pub fn serialize(&self) -> String {
        self.root.serialize()
    }

    pub fn query(&mut self, pattern: &str) -> EditorResult<MatchList> {
        self.session_mut().query(pattern)
    }

    /// Replaces the whole stack with a fresh session over `text`, completing
    /// a [`HostRequest::Open`].
    pub fn open_text(&mut self, text: &str, format: DocumentFormat) {
        let read_only = self.root.is_read_only();
        self.children.clear();
        self.root = Session::load(text, format, read_only, &self.config);
        debug!(lines = self.root.document().line_count(), "opened new document");
    }

    /// Tells the editor a requested write failed.
    pub fn report_write_failure(&mut self, error: &str) {
        tracing::warn!(%error, "write failed");
        self.root.mark_dirty();
        self.session_mut()
            .set_message(format!("Write failed: {}", error), MessageLevel::Error);
    }

    fn snapshot(&self) -> Snapshot {
        let session = self.session();
        Snapshot {
            depth: self.depth(),
            cursor: session.cursor(),
            mode: session.mode(),
            versions: std::iter::once(&self.root)
                .chain(self.children.iter())
                .map(|s| s.document().version())
                .collect(),
        }
    }

    /// Handles one key in the top session, running any command or embedded
    /// open it completes.
    pub fn dispatch_key(&mut self, key: Key) -> Effect {
        let before = self.snapshot();

        let deferred = {
            let Editor {
                root,
                children,
                history,
                ..
            } = self;
            let session = children.last_mut().unwrap_or(root);
            session.dispatch_key(key, history)
        };

        match deferred {
            Deferred::None => {}
            Deferred::Command(line) => {
                let result = self.dispatch_command(&line);
                if let Some(request) = result.request {
                    self.requests.push(request);
                }
            }
            Deferred::OpenEmbedded => {
                if let Err(e) = self.open_embedded() {
                    self.report(e);
                }
            }
        }

        self.effect_since(&before)
    }

    fn effect_since(&self, before: &Snapshot) -> Effect {
        let after = self.snapshot();
        let level = after.depth.min(before.depth);
        Effect {
            cursor_moved: after.depth != before.depth || after.cursor != before.cursor,
            mode_changed: after.depth != before.depth || after.mode != before.mode,
            document_changed: before.versions[..=level] != after.versions[..=level],
            session_pushed: after.depth > before.depth,
            session_popped: after.depth < before.depth,
            quit: self.quit,
        }
    }

    pub(crate) fn report(&mut self, err: EditorError) {
        self.session_mut().report(err);
    }

    /// Opens the string value under the cursor of the top session as a new
    /// embedded session.
    pub fn open_embedded(&mut self) -> EditorResult<()> {
        let indent = self.config.indent_size;
        let parent = self.session_mut();
        let level = parent.level();
        let read_only = parent.is_read_only();
        let (path, content) = parent.embedded_target()?;
        let value = parse_value(&content).map_err(|e| {
            EditorError::NotValidJson(format!(
                "{} at line {} column {}",
                e.message,
                e.line + 1,
                e.col + 1
            ))
        })?;

        let text = format::pretty(&value, indent);
        let mut child = Session::load(&text, DocumentFormat::Json, read_only, &self.config);
        child.level = level + 1;
        child.set_message(
            format!("Editing {} (level {})", path, level + 1),
            MessageLevel::Info,
        );
        debug!(level = level + 1, path = %path, "pushed embedded session");
        child.parent = Some(ParentLink { level, path });
        self.children.push(child);
        Ok(())
    }

    /// Writes the top session back into its parent's string value. The child
    /// stays open and becomes clean.
    pub fn save_embedded(&mut self) -> EditorResult<()> {
        let depth = self.children.len();
        let child = self.children.last_mut().ok_or(EditorError::NotEmbedded)?;
        let link = child.parent().cloned().ok_or(EditorError::NotEmbedded)?;
        child.validate()?;
        let value = parse_value(&child.document().text()).map_err(|e| EditorError::from(&e))?;
        let literal = format::to_string_literal(&value.to_string());

        let parent = if depth >= 2 {
            &mut self.children[depth - 2]
        } else {
            &mut self.root
        };
        parent.write_back(&link.path, &literal)?;
        debug!(level = depth, path = %link.path, "saved embedded session");

        if let Some(child) = self.children.last_mut() {
            child.mark_clean();
        }
        Ok(())
    }

    /// Pops the top session without writing back. Discarding the bottom
    /// session quits the editor.
    pub fn discard(&mut self) {
        match self.children.pop() {
            Some(child) => {
                debug!(level = child.level(), "popped embedded session");
                let session = self.session_mut();
                session.clear_message();
                session.clamp_cursor();
            }
            None => self.quit = true,
        }
    }
}
