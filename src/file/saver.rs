//! Writing documents to disk.
//!
//! Writes are atomic: the content goes to a temporary file that is then
//! renamed over the target, so the target is never left half written.
//! Targets ending in `.gz` are gzip-compressed.

use crate::config::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Saves serialized document text to `path`.
///
/// A trailing newline is added when missing. When `config.create_backup` is
/// set and the file exists, it is first copied to `<name>.bak`.
///
/// # Examples
///
/// ```no_run
/// use jsonvim::config::Config;
/// use jsonvim::file::saver::save_text;
///
/// save_text("output.json", "{\"a\": 1}", &Config::default()).unwrap();
/// ```
///
/// # Errors
///
/// Returns an error if creating the backup, writing the temp file or
/// renaming it fails.
pub fn save_text<P: AsRef<Path>>(path: P, content: &str, config: &Config) -> Result<()> {
    let path = path.as_ref();
    let should_compress = path.to_string_lossy().ends_with(".gz");

    if config.create_backup && path.exists() {
        create_backup(path)?;
    }

    let mut data = content.to_string();
    if !data.ends_with('\n') {
        data.push('\n');
    }

    write_file_atomic(path, data.as_bytes(), should_compress)?;
    debug!(path = %path.display(), bytes = data.len(), "saved");
    Ok(())
}

/// Creates a backup of a file by copying it with a .bak extension.
fn create_backup<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let mut backup_path = path.to_path_buf();
    let original_name = backup_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid file name"))?;
    backup_path.set_file_name(format!("{}.bak", original_name));
    fs::copy(path, backup_path).context("Failed to create backup")?;
    Ok(())
}

fn write_file_atomic<P: AsRef<Path>>(path: P, data: &[u8], compress: bool) -> Result<()> {
    let path = path.as_ref();
    let temp_path = path.with_extension("tmp");

    let written = write_temp(&temp_path, data, compress)
        .and_then(|()| fs::rename(&temp_path, path).context("Failed to rename temp file"));
    if written.is_err() && temp_path.exists() {
        if let Err(e) = fs::remove_file(&temp_path) {
            debug!(path = %temp_path.display(), error = %e, "could not remove temp file");
        }
    }
    written
}

fn write_temp(temp_path: &Path, data: &[u8], compress: bool) -> Result<()> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    if compress {
        let file = fs::File::create(temp_path).context("Failed to create temp file")?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(data)
            .context("Failed to write compressed data")?;
        encoder.finish().context("Failed to finish compression")?;
    } else {
        fs::write(temp_path, data).context("Failed to write temp file")?;
    }
    Ok(())
}
