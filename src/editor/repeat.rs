//! Recording the last change for the `.` key.
//!
//! Keys are captured verbatim from the first key typed in a clean Normal
//! state until the state is clean again. The capture becomes the repeatable
//! change only if it modified the document and nothing excluded it (undo,
//! redo, visual operators, prompts, `.` itself).

use crate::input::keys::Key;

#[derive(Debug, Clone, Default)]
pub struct RepeatRecorder {
    keys: Vec<Key>,
    changed: bool,
    excluded: bool,
    last: Vec<Key>,
    replaying: bool,
}

impl RepeatRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key`. `clean` says the session had no pending input before
    /// it, which starts a new capture.
    pub fn begin_or_continue(&mut self, key: Key, clean: bool) {
        if self.replaying {
            return;
        }
        if clean {
            self.keys.clear();
            self.changed = false;
            self.excluded = false;
        }
        self.keys.push(key);
    }

    pub fn note_change(&mut self) {
        self.changed = true;
    }

    pub fn exclude(&mut self) {
        self.excluded = true;
    }

    /// Ends the current capture, keeping it when it was a change.
    pub fn finish(&mut self) {
        if self.replaying {
            return;
        }
        if self.changed && !self.excluded && !self.keys.is_empty() {
            self.last = std::mem::take(&mut self.keys);
        } else {
            self.keys.clear();
        }
        self.changed = false;
        self.excluded = false;
    }

    /// The keys of the last completed change.
    pub fn last(&self) -> &[Key] {
        &self.last
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    pub fn set_replaying(&mut self, replaying: bool) {
        self.replaying = replaying;
    }
}
