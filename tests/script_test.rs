//! Integration tests for TOML script parsing and replay.

use std::fs;

use rstest::rstest;
use tempfile::TempDir;

use hierarchy::application::{ApplicationError, Script, ScriptRunner, Step};
use hierarchy::domain::{DiffAction, DomainError};
use hierarchy::util::testing;

const OUTLINE: &str = r#"
[[setup]]
op = "insert"
keys = ["inbox", "work", "home"]

[[setup]]
op = "insert"
keys = ["mail", "review", "deploy"]
parent = "work"

[[batch]]
op = "remove"
keys = ["review"]

[[batch]]
op = "insert"
keys = ["errands"]
parent = "home"
"#;

#[test]
fn given_script_file_when_loading_then_steps_are_parsed() {
    testing::init_test_setup();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("outline.toml");
    fs::write(&path, OUTLINE).unwrap();

    let script = Script::load(&path).expect("load script");

    assert_eq!(script.setup.len(), 2);
    assert_eq!(script.batch.len(), 2);
    assert_eq!(
        script.batch[0],
        Step::Remove {
            keys: vec!["review".into()]
        }
    );
}

#[test]
fn given_missing_file_when_loading_then_io_error() {
    let dir = TempDir::new().unwrap();

    let result = Script::load(&dir.path().join("absent.toml"));

    assert!(matches!(result, Err(ApplicationError::Io { .. })));
}

#[test]
fn given_unknown_op_when_parsing_then_script_error() {
    let result = Script::parse("[[batch]]\nop = \"explode\"\nkeys = []\n");

    assert!(matches!(result, Err(ApplicationError::Script { .. })));
}

#[test]
fn given_outline_when_running_then_batch_actions_are_collected() {
    testing::init_test_setup();
    let script = Script::parse(OUTLINE).unwrap();

    let outcome = ScriptRunner::run(&script).expect("run script");

    let work = outcome.keys["work"];
    let home = outcome.keys["home"];
    assert_eq!(
        outcome.actions,
        vec![
            DiffAction::update(Some(work)),
            DiffAction::remove([1], Some(work)),
            DiffAction::update(Some(home)),
            DiffAction::insert([0], Some(home)),
        ]
    );
    assert!(!outcome.keys.contains_key("review"));
    assert_eq!(outcome.document.store().len(), 6);
    assert!(outcome.document.store().validate().is_ok());
    assert_eq!(outcome.document.subscriber_count(), 0);
}

#[test]
fn given_insert_when_running_then_text_defaults_to_key() {
    let script = Script::parse(OUTLINE).unwrap();
    let outcome = ScriptRunner::run(&script).unwrap();

    let errands = outcome.keys["errands"];
    let item = outcome.document.store().item(errands).unwrap();
    assert_eq!(item.content.text, "errands");
}

#[test]
fn given_removed_parent_when_running_then_descendant_keys_are_dropped() {
    let script = Script::parse(
        r#"
[[setup]]
op = "insert"
keys = ["a"]

[[setup]]
op = "insert"
keys = ["b"]
parent = "a"

[[batch]]
op = "remove"
keys = ["a"]
"#,
    )
    .unwrap();

    let outcome = ScriptRunner::run(&script).unwrap();

    assert!(outcome.keys.is_empty());
    assert!(outcome.document.store().is_empty());
}

#[test]
fn given_move_and_set_when_running_then_applied_in_order() {
    let script = Script::parse(
        r#"
[[setup]]
op = "insert"
keys = ["a", "b", "c"]

[[batch]]
op = "move"
keys = ["a"]
parent = "c"

[[batch]]
op = "set"
keys = ["c"]
done = true
text = "C"
downstream = true
"#,
    )
    .unwrap();

    let outcome = ScriptRunner::run(&script).unwrap();
    let store = outcome.document.store();
    let (a, c) = (outcome.keys["a"], outcome.keys["c"]);

    assert_eq!(store.parent(a), Some(c));
    assert_eq!(store.item(c).unwrap().content.text, "C");
    assert!(store.item(a).unwrap().content.is_done);
    // the set step only touches payloads
    assert_eq!(
        outcome.actions,
        vec![
            DiffAction::update(None),
            DiffAction::remove([0], None),
            DiffAction::update(Some(c)),
            DiffAction::insert([0], Some(c)),
        ]
    );
}

#[rstest]
#[case(
    "[[setup]]\nop = \"insert\"\nkeys = [\"a\", \"a\"]\n",
    "a"
)]
#[case(
    "[[setup]]\nop = \"insert\"\nkeys = [\"a\"]\n[[batch]]\nop = \"insert\"\nkeys = [\"a\"]\n",
    "a"
)]
fn given_reused_key_when_running_then_duplicate_key(#[case] source: &str, #[case] key: &str) {
    let script = Script::parse(source).unwrap();

    let result = ScriptRunner::run(&script);

    assert!(matches!(result, Err(ApplicationError::DuplicateKey(k)) if k == key));
}

#[test]
fn given_unknown_parent_key_when_running_then_unknown_key() {
    let script =
        Script::parse("[[setup]]\nop = \"insert\"\nkeys = [\"a\"]\nparent = \"nope\"\n").unwrap();

    let result = ScriptRunner::run(&script);

    assert!(matches!(result, Err(ApplicationError::UnknownKey(k)) if k == "nope"));
}

#[test]
fn given_set_without_fields_when_running_then_script_error() {
    let script = Script::parse(
        "[[setup]]\nop = \"insert\"\nkeys = [\"a\"]\n[[batch]]\nop = \"set\"\nkeys = [\"a\"]\n",
    )
    .unwrap();

    let result = ScriptRunner::run(&script);

    assert!(matches!(result, Err(ApplicationError::Script { .. })));
}

#[test]
fn given_cyclic_move_when_running_then_domain_error_and_batch_still_closed() {
    let script = Script::parse(
        r#"
[[setup]]
op = "insert"
keys = ["a"]

[[setup]]
op = "insert"
keys = ["b"]
parent = "a"
"#,
    )
    .unwrap();
    let mut runner = ScriptRunner::new();
    runner.setup(&script.setup).unwrap();
    let b = runner.id("b").unwrap();

    let result = runner.run_batch(&[Step::Move {
        keys: vec!["a".into()],
        parent: Some("b".into()),
        index: None,
    }]);

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::InvalidMove { target })) if target == b
    ));
    assert!(!runner.document().store().is_updating());
    assert_eq!(runner.document().subscriber_count(), 0);
}

#[test]
fn given_unknown_keys_in_list_when_removing_then_skipped() {
    let script = Script::parse(
        "[[setup]]\nop = \"insert\"\nkeys = [\"a\", \"b\"]\n[[batch]]\nop = \"remove\"\nkeys = [\"ghost\", \"b\"]\n",
    )
    .unwrap();

    let outcome = ScriptRunner::run(&script).unwrap();

    assert_eq!(outcome.document.store().len(), 1);
    assert_eq!(outcome.actions.len(), 2);
}
