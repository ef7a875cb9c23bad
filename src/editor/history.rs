//! Search and command-line history.
//!
//! Newest entries come first. Re-entering an existing entry moves it to the
//! front instead of duplicating it. The core enforces no size limit; the
//! host decides what to persist.
//!
//! # Example
//!
//! ```
//! use jsonvim::editor::history::History;
//!
//! let mut history = History::default();
//! history.push_command("w");
//! history.push_command("fmt");
//! history.push_command("w");
//! assert_eq!(history.command, vec!["w", "fmt"]);
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub search: Vec<String>,
    #[serde(default)]
    pub command: Vec<String>,
}

impl History {
    pub fn push_search(&mut self, pattern: &str) {
        push_front(&mut self.search, pattern);
    }

    pub fn push_command(&mut self, line: &str) {
        push_front(&mut self.command, line);
    }
}

fn push_front(list: &mut Vec<String>, entry: &str) {
    if entry.is_empty() {
        return;
    }
    list.retain(|e| e != entry);
    list.insert(0, entry.to_string());
}
