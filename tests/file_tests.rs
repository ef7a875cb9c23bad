use jsonvim::config::Config;
use jsonvim::file::loader::{detect_format, load_text};
use jsonvim::file::saver::save_text;
use jsonvim::{parse_keys, DocumentFormat, Editor, HostRequest};
use std::fs;
use tempfile::TempDir;

fn serve_writes(editor: &mut Editor, config: &Config) {
    for request in editor.take_requests() {
        if let HostRequest::Write { path, content } = request {
            if let Err(e) = save_text(&path, &content, config) {
                editor.report_write_failure(&format!("{:#}", e));
            }
        }
    }
}

#[test]
fn test_edit_and_write_jsonl_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.jsonl");
    fs::write(&path, "{\"a\":1}\n{\"b\":2}\n").unwrap();

    let path_str = path.to_string_lossy().to_string();
    let text = load_text(&path).unwrap();
    let config = Config::default();
    let mut editor = Editor::with_config(&text, detect_format(&path), false, config.clone());
    editor.root_mut().set_filename(path_str.clone());

    for key in parse_keys("3dd:w<CR>") {
        editor.dispatch_key(key);
        serve_writes(&mut editor, &config);
    }

    assert_eq!(fs::read_to_string(&path).unwrap(), "{\"b\":2}\n");
    assert!(!editor.root().is_dirty());
}

#[test]
fn test_gzip_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json.gz");

    save_text(&path, "{\"a\": [1, 2]}", &Config::default()).unwrap();
    let raw = fs::read(&path).unwrap();
    assert_eq!(&raw[..2], &[0x1f, 0x8b]);

    assert_eq!(load_text(&path).unwrap(), "{\"a\": [1, 2]}\n");
    assert_eq!(detect_format(&path), DocumentFormat::Json);
}

#[test]
fn test_failed_write_keeps_document_dirty() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("missing").join("out.json");
    let config = Config::default();

    let mut editor = Editor::create("{}", DocumentFormat::Json, false);
    let script = format!(":w {}<CR>", target.display());
    for key in parse_keys(&script) {
        editor.dispatch_key(key);
        serve_writes(&mut editor, &config);
    }

    assert!(editor.root().is_dirty());
    let message = editor.session().message().unwrap();
    assert!(message.text.starts_with("Write failed"));
}

#[test]
fn test_backup_on_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.json");
    fs::write(&path, "{\"old\": true}\n").unwrap();

    let config = Config {
        create_backup: true,
        ..Config::default()
    };
    save_text(&path, "{\"new\": true}", &config).unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("doc.json.bak")).unwrap(),
        "{\"old\": true}\n"
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), "{\"new\": true}\n");
}
