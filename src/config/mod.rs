//! Configuration system for jsonvim.
//!
//! Settings are read from `~/.config/jsonvim/config.toml`. Every field has a
//! default, so a partial file (or none at all) is fine.
//!
//! # Example
//!
//! ```
//! use jsonvim::config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.indent_size, 4);
//! assert_eq!(config.fold_string_threshold, 60);
//!
//! let custom = Config {
//!     indent_size: 2,
//!     ..Config::default()
//! };
//! assert!(custom.smart_case);
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the editor core and the host binary.
///
/// * `indent_size` - Spaces per indentation level when pretty-printing and
///   auto-indenting (default: 4)
/// * `fold_string_threshold` - Minimum string length, in characters, for a
///   string value to become foldable (default: 60)
/// * `undo_limit` - Maximum number of undo entries per session (default: 200)
/// * `smart_case` - Lowercase search patterns ignore case (default: true)
/// * `create_backup` - Copy the file to `.bak` before saving (default: false)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,

    #[serde(default = "default_fold_string_threshold")]
    pub fold_string_threshold: usize,

    #[serde(default = "default_undo_limit")]
    pub undo_limit: usize,

    #[serde(default = "default_smart_case")]
    pub smart_case: bool,

    #[serde(default)]
    pub create_backup: bool,
}

fn default_indent_size() -> usize {
    4
}

fn default_fold_string_threshold() -> usize {
    60
}

fn default_undo_limit() -> usize {
    200
}

fn default_smart_case() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_size: default_indent_size(),
            fold_string_threshold: default_fold_string_threshold(),
            undo_limit: default_undo_limit(),
            smart_case: default_smart_case(),
            create_backup: false,
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/jsonvim/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("jsonvim");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Loads configuration from `path`, falling back to defaults when the
    /// file is missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Saves configuration to the default config file.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("indent_size = 2").unwrap();
        assert_eq!(config.indent_size, 2);
        assert_eq!(config.undo_limit, 200);
        assert!(config.smart_case);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/jsonvim/config.toml"));
        assert_eq!(config, Config::default());
    }
}
