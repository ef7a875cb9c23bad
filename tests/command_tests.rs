use jsonvim::{parse_keys, DocumentFormat, Editor, HostRequest, Position};

fn editor(text: &str) -> Editor {
    Editor::create(text, DocumentFormat::Json, false)
}

fn feed(editor: &mut Editor, script: &str) {
    for key in parse_keys(script) {
        editor.dispatch_key(key);
    }
}

fn message(editor: &Editor) -> String {
    editor
        .session()
        .message()
        .map(|m| m.text.clone())
        .unwrap_or_default()
}

#[test]
fn test_format_pretty_prints_and_resets_cursor() {
    let mut e = editor(r#"{"b":1,"a":[1,2]}"#);
    feed(&mut e, "$:fmt<CR>");
    assert_eq!(
        e.serialize(),
        "{\n    \"b\": 1,\n    \"a\": [\n        1,\n        2\n    ]\n}"
    );
    assert_eq!(message(&e), "formatted");
    assert_eq!(e.session().cursor(), Position::new(0, 0));

    feed(&mut e, "u");
    assert_eq!(e.serialize(), r#"{"b":1,"a":[1,2]}"#);
}

#[test]
fn test_format_respects_indent_size() {
    let config = jsonvim::config::Config {
        indent_size: 2,
        ..Default::default()
    };
    let mut e = Editor::with_config(r#"{"a":[1]}"#, DocumentFormat::Json, false, config);
    feed(&mut e, ":format<CR>");
    assert_eq!(e.serialize(), "{\n  \"a\": [\n    1\n  ]\n}");
}

#[test]
fn test_format_invalid_document_reports_error() {
    let mut e = editor(r#"{"a": }"#);
    feed(&mut e, ":fmt<CR>");
    assert!(message(&e).starts_with("Invalid JSON at line 1"));
    assert_eq!(e.serialize(), r#"{"a": }"#);
}

#[test]
fn test_format_read_only() {
    let mut e = Editor::create(r#"{"a":1}"#, DocumentFormat::Json, true);
    feed(&mut e, ":fmt<CR>");
    assert_eq!(message(&e), "[readonly]");
    assert_eq!(e.serialize(), r#"{"a":1}"#);
}

#[test]
fn test_substitute_with_groups() {
    let mut e = editor("foo bar");
    feed(&mut e, r":s/(\w+) (\w+)/\2 \1/<CR>");
    assert_eq!(e.serialize(), "bar foo");
    assert_eq!(message(&e), "1 substitution");
}

#[test]
fn test_substitute_alternate_delimiter_and_ampersand() {
    let mut e = editor("a/b");
    feed(&mut e, ":s#a/b#[&]#<CR>");
    assert_eq!(e.serialize(), "[a/b]");
}

#[test]
fn test_substitute_whole_document_is_one_undo_step() {
    let mut e = editor("x1\nx2\nx3");
    feed(&mut e, ":%s/x/y/<CR>");
    assert_eq!(e.serialize(), "y1\ny2\ny3");
    assert_eq!(message(&e), "3 substitutions");
    assert_eq!(e.session().undo_history().len(), 1);

    feed(&mut e, "u");
    assert_eq!(e.serialize(), "x1\nx2\nx3");
}

#[test]
fn test_substitute_line_range() {
    let mut e = editor("a\na\na\na");
    feed(&mut e, ":2,3s/a/b/<CR>");
    assert_eq!(e.serialize(), "a\nb\nb\na");
}

#[test]
fn test_line_jumps() {
    let mut e = editor("a\n  b\nc");
    feed(&mut e, ":$<CR>");
    assert_eq!(e.session().cursor().line, 2);
    feed(&mut e, ":l2<CR>");
    assert_eq!(e.session().cursor(), Position::new(1, 0));
    feed(&mut e, ":1<CR>");
    assert_eq!(e.session().cursor().line, 0);
}

#[test]
fn test_unknown_command() {
    let mut e = editor("{}");
    feed(&mut e, ":frobnicate<CR>");
    assert_eq!(message(&e), "Not an editor command: frobnicate");
}

#[test]
fn test_write_named_file_clears_dirty() {
    let mut e = editor(r#"{"a": 12}"#);
    feed(&mut e, "$hx");
    assert!(e.root().is_dirty());
    feed(&mut e, ":w out.json<CR>");

    assert!(!e.root().is_dirty());
    assert_eq!(e.root().filename(), Some("out.json"));
    assert_eq!(message(&e), "\"out.json\" written");
    match e.take_requests().as_slice() {
        [HostRequest::Write { path, content }] => {
            assert_eq!(path, "out.json");
            assert_eq!(content, &e.serialize());
        }
        other => panic!("unexpected requests: {:?}", other),
    }
}

#[test]
fn test_quit_and_force_quit() {
    let mut e = editor("{}");
    feed(&mut e, ":q<CR>");
    assert!(e.should_quit());

    let mut e = editor("{}");
    feed(&mut e, "x:q<CR>");
    assert!(!e.should_quit());
    feed(&mut e, ":q!<CR>");
    assert!(e.should_quit());
}

#[test]
fn test_write_quit_validates_first() {
    let mut e = editor("{}");
    e.root_mut().set_filename("doc.json".to_string());
    feed(&mut e, "x:wq<CR>");
    assert!(!e.should_quit());
    assert!(message(&e).starts_with("JSON error:"));

    feed(&mut e, ":x!<CR>");
    assert!(e.should_quit());
}

#[test]
fn test_edit_requests_open() {
    let mut e = editor("{}");
    feed(&mut e, ":e other.json<CR>");
    assert_eq!(
        e.take_requests(),
        vec![HostRequest::Open {
            path: "other.json".to_string(),
            force: false
        }]
    );

    feed(&mut e, "x:e other.json<CR>");
    assert!(e.take_requests().is_empty());
    assert_eq!(message(&e), "No write since last change (add ! to override)");
}

#[test]
fn test_open_text_replaces_stack() {
    let mut e = editor(r#"{"s":"[1]"}"#);
    feed(&mut e, "ej");
    assert_eq!(e.depth(), 1);
    e.open_text("[2]", DocumentFormat::Json);
    assert_eq!(e.depth(), 0);
    assert_eq!(e.serialize(), "[2]");
}

#[test]
fn test_help_and_undo_commands() {
    let mut e = editor("abc");
    feed(&mut e, ":help<CR>");
    assert_eq!(e.take_requests(), vec![HostRequest::ToggleHelp]);

    feed(&mut e, "x:undo<CR>");
    assert_eq!(e.serialize(), "abc");
    feed(&mut e, ":redo<CR>");
    assert_eq!(e.serialize(), "bc");
}

#[test]
fn test_command_history_recall() {
    let mut e = editor("a\nb\nc");
    feed(&mut e, ":3<CR>:1<CR>:<Up><Up><CR>");
    assert_eq!(e.session().cursor().line, 2);
    assert_eq!(e.history().command, vec!["3", "1"]);
}

#[test]
fn test_write_failure_marks_dirty() {
    let mut e = editor("{}");
    feed(&mut e, ":w /x.json<CR>");
    assert!(!e.root().is_dirty());
    e.report_write_failure("permission denied");
    assert!(e.root().is_dirty());
    assert_eq!(message(&e), "Write failed: permission denied");
}
