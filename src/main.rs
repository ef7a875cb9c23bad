use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use jsonvim::config::Config;
use jsonvim::document::DocumentFormat;
use jsonvim::file::loader::{detect_format, load_from_stdin, load_text, sniff_format};
use jsonvim::file::saver::save_text;
use jsonvim::input::keys::parse_keys;
use jsonvim::stack::{Editor, HostRequest};

/// jsonvim - A headless, vim-style editor for JSON and JSON Lines
#[derive(Parser)]
#[command(name = "jsonvim")]
#[command(version)]
#[command(about = "A modal, vim-style editor for JSON and JSON Lines", long_about = None)]
struct Cli {
    /// File to edit (omit to read from stdin)
    file: Option<String>,

    /// Keys to replay, in vim notation (e.g. "dd:wq<CR>")
    #[arg(short, long)]
    keys: Option<String>,

    /// Print the locations matching a search pattern after replaying keys
    #[arg(short, long)]
    query: Option<String>,

    /// Treat the input as JSON Lines regardless of its name
    #[arg(long)]
    jsonl: bool,

    /// Open the document read-only
    #[arg(short = 'R', long)]
    read_only: bool,

    /// Write the final document here instead of printing it
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    let (text, format) = match &cli.file {
        Some(path) if std::path::Path::new(path).exists() => (load_text(path)?, detect_format(path)),
        Some(path) => (String::new(), detect_format(path)),
        None if !io::stdin().is_terminal() => {
            let text = load_from_stdin()?;
            let format = sniff_format(&text);
            (text, format)
        }
        None => (String::new(), DocumentFormat::Json),
    };
    let format = if cli.jsonl {
        DocumentFormat::Jsonl
    } else {
        format
    };

    let mut editor = Editor::with_config(&text, format, cli.read_only, config.clone());
    if let Some(path) = &cli.file {
        editor.root_mut().set_filename(path.clone());
    }
    if let Ok(history) = load_history() {
        editor.set_history(history);
    }

    if let Some(script) = &cli.keys {
        for key in parse_keys(script) {
            editor.dispatch_key(key);
            for request in editor.take_requests() {
                serve_request(&mut editor, request, &config);
            }
            if editor.should_quit() {
                break;
            }
        }
    }

    if let Some(message) = editor.session().message() {
        eprintln!("{}", message.text);
    }

    if let Some(pattern) = &cli.query {
        let matches = editor.query(pattern)?;
        for m in matches.iter() {
            match &m.path {
                Some(path) => println!("{}:{}: {}", m.line + 1, m.col_start + 1, path),
                None => println!("{}:{}", m.line + 1, m.col_start + 1),
            }
        }
        if matches.is_empty() {
            eprintln!("Pattern not found: {}", pattern);
        }
    } else if let Some(output) = &cli.output {
        save_text(output, &editor.serialize(), &config)
            .with_context(|| format!("Failed to write {}", output))?;
    } else if cli.keys.is_none() || !editor.should_quit() {
        println!("{}", editor.serialize());
    }

    if let Err(e) = save_history(editor.history()) {
        warn!(error = %e, "could not save history");
    }
    Ok(())
}

fn serve_request(editor: &mut Editor, request: HostRequest, config: &Config) {
    match request {
        HostRequest::Write { path, content } => {
            if let Err(e) = save_text(&path, &content, config) {
                editor.report_write_failure(&format!("{:#}", e));
            } else {
                info!(%path, "written");
            }
        }
        HostRequest::Open { path, .. } => match load_text(&path) {
            Ok(text) => {
                editor.open_text(&text, detect_format(&path));
                editor.root_mut().set_filename(path);
            }
            Err(e) => {
                warn!(%path, error = %e, "open failed");
            }
        },
        HostRequest::ToggleHelp => {}
    }
}

fn history_path() -> Option<std::path::PathBuf> {
    Config::config_path().map(|p| p.with_file_name("history.toml"))
}

fn load_history() -> Result<jsonvim::editor::history::History> {
    let path = history_path().context("No config directory")?;
    let text = std::fs::read_to_string(&path).context("Failed to read history")?;
    toml::from_str(&text).context("Failed to parse history")
}

fn save_history(history: &jsonvim::editor::history::History) -> Result<()> {
    let path = history_path().context("No config directory")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    let text = toml::to_string(history).context("Failed to serialize history")?;
    std::fs::write(&path, text).context("Failed to write history")
}
