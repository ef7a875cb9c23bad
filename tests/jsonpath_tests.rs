use jsonvim::{parse_keys, DocumentFormat, Editor, EditorError, Position};

const USERS: &str = r#"{"users":[{"name":"Alice","age":20},{"name":"Bob","age":40},{"name":"Cy","age":31}]}"#;

fn editor(text: &str) -> Editor {
    Editor::create(text, DocumentFormat::Json, false)
}

fn feed(editor: &mut Editor, script: &str) {
    for key in parse_keys(script) {
        editor.dispatch_key(key);
    }
}

fn paths(editor: &mut Editor, pattern: &str) -> Vec<String> {
    editor
        .query(pattern)
        .unwrap()
        .iter()
        .map(|m| m.path.as_ref().unwrap().to_string())
        .collect()
}

#[test]
fn test_filter_selects_matching_values_in_order() {
    let mut e = editor(USERS);
    assert_eq!(
        paths(&mut e, "$.users[*].age>30"),
        vec!["$.users[1].age", "$.users[2].age"]
    );
}

#[test]
fn test_filter_over_empty_array_matches_nothing() {
    let mut e = editor(r#"{"users":[]}"#);
    let matches = e.query("$.users[*].age>30").unwrap();
    assert!(matches.is_empty());
}

#[test]
fn test_query_is_deterministic() {
    let mut e = editor(USERS);
    let first = e.query("$..age").unwrap();
    let second = e.query("$..age").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_string_equality_and_regex_filters() {
    let mut e = editor(USERS);
    assert_eq!(paths(&mut e, "$.users[*].name=\"Bob\""), vec!["$.users[1].name"]);
    assert_eq!(paths(&mut e, "$.users[*].name~^A"), vec!["$.users[0].name"]);
    assert_eq!(paths(&mut e, "$.users[*].name!='Cy'").len(), 2);
}

#[test]
fn test_container_equality_compares_values() {
    let mut e = editor(r#"{"o":{"a":2,"b":1},"l":[1,{"x":true}]}"#);
    assert_eq!(paths(&mut e, r#"$.o={"a":2,"b":1}"#), vec!["$.o"]);
    assert_eq!(paths(&mut e, r#"$.o={"b":1,"a":2}"#), vec!["$.o"]);
    assert_eq!(paths(&mut e, r#"$.o={"a":2.0,"b":1}"#), vec!["$.o"]);
    assert_eq!(paths(&mut e, r#"$.l=[1.0,{"x":true}]"#), vec!["$.l"]);
    assert!(paths(&mut e, r#"$.o={"a":2}"#).is_empty());
    assert!(paths(&mut e, r#"$.l=[{"x":true},1]"#).is_empty());
    assert_eq!(paths(&mut e, r#"$.o!={"b":1,"a":2}"#).len(), 0);
}

#[test]
fn test_matches_point_at_the_value() {
    let mut e = editor("{\n    \"a\": {\n        \"b\": true\n    }\n}");
    let matches = e.query("$.a.b").unwrap();
    let m = matches.get(0).unwrap();
    assert_eq!(m.position(), Position::new(2, 13));
    assert_eq!(m.col_end, 17);
}

#[test]
fn test_structural_query_needs_valid_json() {
    let mut e = editor("{\"a\": ");
    assert!(matches!(
        e.query("$.a"),
        Err(EditorError::InvalidJson { .. })
    ));
}

#[test]
fn test_malformed_query_is_invalid_pattern() {
    let mut e = editor(USERS);
    assert!(matches!(
        e.query("$.users[?"),
        Err(EditorError::InvalidPattern(_))
    ));
}

#[test]
fn test_text_search_smart_case() {
    let mut e = editor(USERS);
    assert_eq!(e.query("alice").unwrap().len(), 1);
    assert_eq!(e.query("ALICE").unwrap().len(), 0);
}

#[test]
fn test_search_key_cycles_and_wraps() {
    let mut e = editor(USERS);
    feed(&mut e, "/age<CR>");
    assert_eq!(e.session().message().unwrap().text, "/age [1/3]");
    assert_eq!(e.session().search_info(), Some((1, 3)));

    feed(&mut e, "n");
    assert_eq!(e.session().message().unwrap().text, "/age [2/3]");
    feed(&mut e, "n");
    feed(&mut e, "n");
    assert_eq!(
        e.session().message().unwrap().text,
        "search hit BOTTOM, continuing at TOP"
    );

    feed(&mut e, "N");
    assert_eq!(
        e.session().message().unwrap().text,
        "search hit TOP, continuing at BOTTOM"
    );
}

#[test]
fn test_structural_search_moves_cursor() {
    let mut e = editor("{\n    \"a\": 1,\n    \"b\": [\n        2\n    ]\n}");
    feed(&mut e, "/$.b[0]<CR>");
    assert_eq!(e.session().cursor(), Position::new(3, 8));
}

#[test]
fn test_search_not_found_keeps_cursor() {
    let mut e = editor(USERS);
    feed(&mut e, "/zzz<CR>");
    assert_eq!(e.session().cursor(), Position::new(0, 0));
    assert_eq!(e.session().message().unwrap().text, "Pattern not found: zzz");
}

#[test]
fn test_invalid_regex_is_reported() {
    let mut e = editor(USERS);
    feed(&mut e, "/(<CR>");
    assert!(e
        .session()
        .message()
        .unwrap()
        .text
        .starts_with("Invalid pattern"));
}

#[test]
fn test_path_command_runs_structural_search() {
    let mut e = editor("{\n    \"a\": 1,\n    \"b\": 2\n}");
    feed(&mut e, ":jp b<CR>");
    assert_eq!(e.session().cursor(), Position::new(2, 9));
}
