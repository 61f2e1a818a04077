//! Concrete input/output scenarios and the user-visible error behavior.

use pretty_assertions::assert_eq;
use yamltree::{
    deserialize, deserialize_docs, serialize, Node, NodeKind, ParseError, ScanError, INT_TAG,
};

#[test]
fn typed_mapping_in_order() {
    let doc = deserialize("foo: true\nbar: 123\nbaz: 3.14").unwrap();
    let entries: Vec<(String, NodeKind)> = doc
        .map_entries()
        .unwrap()
        .map(|(key, value)| (key.as_str().unwrap().to_owned(), value.kind()))
        .collect();
    assert_eq!(
        entries,
        [
            (String::from("foo"), NodeKind::Boolean),
            (String::from("bar"), NodeKind::Integer),
            (String::from("baz"), NodeKind::Float),
        ]
    );
}

#[test]
fn block_sequence_of_integers() {
    let doc = deserialize("- 1\n- 2\n- 3").unwrap();
    assert_eq!(doc.get_value::<Vec<i64>>().unwrap(), vec![1, 2, 3]);
}

#[test]
fn two_documents_with_directive() {
    let docs = deserialize_docs("%YAML 1.2\n---\nfoo: bar\n...\n---\nbaz: qux\n").unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["foo"].as_str().unwrap(), "bar");
    assert_eq!(docs[1]["baz"].as_str().unwrap(), "qux");
}

#[test]
fn anchor_and_alias_deep_resolution() {
    let doc = deserialize("a: &x 1\nb: *x").unwrap();
    assert_eq!(doc["a"].as_int().unwrap(), 1);
    assert_eq!(doc["b"].as_int().unwrap(), 1);
    assert!(doc["b"].is_alias());
}

#[test]
fn double_quoted_newline_escape() {
    let doc = deserialize("key: \"line1\\nline2\"").unwrap();
    assert_eq!(doc["key"].as_str().unwrap(), "line1\nline2");
}

#[test]
fn tagged_integer_scalar() {
    let doc = deserialize("!!int 42").unwrap();
    assert_eq!(doc.as_int().unwrap(), 42);
    assert_eq!(doc.tag_name(), Some(INT_TAG));
}

#[test]
fn flow_substructure_is_emitted_in_flow() {
    let doc = deserialize("a: {x: 1, y: 2}").unwrap();
    assert_eq!(serialize(&doc).unwrap(), "a: {x: 1, y: 2}\n");
}

#[test]
fn parse_errors_carry_positions() {
    let err = deserialize("key: \"unterminated").unwrap_err();
    let ParseError::Scan(ScanError::UnterminatedString {
        context_mark,
        problem_mark,
    }) = err
    else {
        panic!("expected an unterminated string error, got {err:?}");
    };
    assert_eq!(context_mark.column, 5);
    assert_eq!(problem_mark.line, 0);

    let err = deserialize("a: 1\nb: *ghost\n").unwrap_err();
    let ParseError::InvalidAlias { name, mark } = err else {
        panic!("expected an alias error, got {err:?}");
    };
    assert_eq!(name, "ghost");
    assert_eq!(mark.line, 1);
    assert_eq!(mark.column, 3);
}

#[test]
fn duplicate_keys_are_rejected() {
    assert!(matches!(
        deserialize("x: 1\ny: 2\nx: 3\n"),
        Err(ParseError::DuplicateKey { mark }) if mark.line == 2
    ));
}

#[test]
fn accessor_errors_name_both_kinds() {
    let doc = deserialize("n: 42").unwrap();
    let err = doc["n"].as_str().unwrap_err();
    assert_eq!(
        err.to_string(),
        "node is a integer, but the operation requires a string"
    );
}

#[test]
fn error_display_includes_line_and_column() {
    let err = deserialize("a: *nope\n").unwrap_err();
    assert_eq!(err.to_string(), "0:3: found alias to undefined anchor \"nope\"");
}

#[test]
fn no_partial_tree_on_failure() {
    // The failure happens deep into the stream; the call yields only the
    // error, never the documents before it.
    let result = deserialize_docs("---\nok: 1\n---\nbad: *missing\n");
    assert!(result.is_err());
}

#[test]
fn round_trip_preserves_value_types() {
    let input = "flag: true\ncount: 10\nscale: 0.5\nlabel: '10'\nnothing: null\n";
    let doc = deserialize(input).unwrap();
    let text = serialize(&doc).unwrap();
    assert_eq!(text, input);
    assert_eq!(doc["label"].kind(), NodeKind::String);
    assert_eq!(doc["count"].kind(), NodeKind::Integer);
}

#[test]
fn mutation_through_subscripts() {
    let mut doc = deserialize("servers:\n- name: alpha\n- name: beta\n").unwrap();
    doc["servers"][0]["name"] = Node::from("gamma");
    doc["servers"]
        .as_sequence_mut()
        .unwrap()
        .push(Node::from("extra"));
    let text = serialize(&doc).unwrap();
    assert_eq!(
        text,
        "servers:\n- name: gamma\n- name: beta\n- extra\n"
    );
}
