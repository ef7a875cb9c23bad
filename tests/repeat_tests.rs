use jsonvim::config::Config;
use jsonvim::editor::history::History;
use jsonvim::editor::session::Session;
use jsonvim::{parse_keys, DocumentFormat};

fn edited(text: &str, script: &str) -> Session {
    let mut session = Session::load(text, DocumentFormat::Json, false, &Config::default());
    let mut history = History::default();
    for key in parse_keys(script) {
        session.dispatch_key(key, &mut history);
    }
    session
}

#[test]
fn test_repeat_line_delete() {
    assert_eq!(edited("a\nb\nc\nd", "dd.").serialize(), "c\nd");
}

#[test]
fn test_repeat_with_new_count_replaces_old_one() {
    assert_eq!(edited("a\nb\nc\nd\ne", "dd2.").serialize(), "d\ne");
    assert_eq!(edited("a\nb\nc\nd\ne\nf", "2dd3.").serialize(), "f");
}

#[test]
fn test_repeat_change_word() {
    assert_eq!(
        edited("a b c", "cwfoo<Esc>w.").serialize(),
        "foo foo c"
    );
}

#[test]
fn test_repeat_append() {
    assert_eq!(edited("a\nb", "A!<Esc>j.").serialize(), "a!\nb!");
}

#[test]
fn test_repeat_replace() {
    assert_eq!(edited("abcd", "rxl.l.").serialize(), "xxxd");
}

#[test]
fn test_motions_do_not_replace_last_change() {
    assert_eq!(edited("abc\ndef", "xjl.").serialize(), "bc\ndf");
}

#[test]
fn test_undo_and_search_do_not_replace_last_change() {
    assert_eq!(edited("abcd", "xxu.").serialize(), "cd");
    assert_eq!(edited("ab ab ab", "x/ab<CR>.").serialize(), "b b ab");
}

#[test]
fn test_repeat_is_one_undo_step() {
    let mut s = edited("a\nb\nc", "dd.");
    assert_eq!(s.undo_history().len(), 2);
    let mut history = History::default();
    for key in parse_keys("u") {
        s.dispatch_key(key, &mut history);
    }
    assert_eq!(s.serialize(), "b\nc");
}

#[test]
fn test_repeat_without_change_does_nothing() {
    let s = edited("abc", "l.");
    assert_eq!(s.serialize(), "abc");
    assert!(s.undo_history().is_empty());
}
