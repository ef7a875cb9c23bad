//! Reading documents from disk or stdin.
//!
//! The editing core takes plain text, so loading only reads bytes, inflates
//! gzip input and picks the document format from the file name.

use crate::document::DocumentFormat;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Reads a file as text. Files ending in `.gz` are decompressed.
///
/// # Examples
///
/// ```no_run
/// use jsonvim::file::loader::load_text;
///
/// let text = load_text("config.json").unwrap();
/// ```
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid gzip despite a
/// `.gz` name, or is not valid UTF-8.
pub fn load_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let is_gzipped = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    if is_gzipped {
        read_gzipped_file(path)
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read file {}", path.display()))
    }
}

/// Reads all of stdin as text, decompressing gzip input (detected by its
/// magic bytes).
pub fn load_from_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read from stdin")?;

    if buffer.starts_with(&[0x1f, 0x8b]) {
        decompress_gzip_bytes(&buffer)
    } else {
        String::from_utf8(buffer).context("Invalid UTF-8 in stdin")
    }
}

/// Picks the document format from a file name: `.jsonl` and `.ndjson`
/// (optionally followed by `.gz`) are JSON Lines, anything else is JSON.
///
/// ```
/// use jsonvim::document::DocumentFormat;
/// use jsonvim::file::loader::detect_format;
///
/// assert_eq!(detect_format("data.jsonl.gz"), DocumentFormat::Jsonl);
/// assert_eq!(detect_format("data.json"), DocumentFormat::Json);
/// ```
pub fn detect_format<P: AsRef<Path>>(path: P) -> DocumentFormat {
    let path_str = path.as_ref().to_string_lossy();
    let base = path_str.strip_suffix(".gz").unwrap_or(&path_str);

    if base.ends_with(".jsonl") || base.ends_with(".ndjson") {
        DocumentFormat::Jsonl
    } else {
        DocumentFormat::Json
    }
}

/// Guesses the format of unnamed input: JSON when the whole text parses,
/// JSON Lines when every non-blank line parses on its own.
pub fn sniff_format(text: &str) -> DocumentFormat {
    if serde_json::from_str::<serde_json::Value>(text).is_ok() {
        return DocumentFormat::Json;
    }
    let mut lines = text.lines().filter(|l| !l.trim().is_empty()).peekable();
    if lines.peek().is_some()
        && lines.all(|l| serde_json::from_str::<serde_json::Value>(l).is_ok())
    {
        DocumentFormat::Jsonl
    } else {
        DocumentFormat::Json
    }
}

fn read_gzipped_file<P: AsRef<Path>>(path: P) -> Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let file = fs::File::open(path).context("Failed to open gzipped file")?;
    let mut decoder = GzDecoder::new(file);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzipped file - file may be corrupted")?;
    Ok(content)
}

fn decompress_gzip_bytes(bytes: &[u8]) -> Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let mut decoder = GzDecoder::new(bytes);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzipped stdin")?;
    Ok(content)
}
