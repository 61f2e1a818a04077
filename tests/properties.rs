//! The engine-wide guarantees: round-trip behavior, ordering, aliases,
//! encodings, and the documented boundary cases.

use pretty_assertions::assert_eq;
use yamltree::{deserialize, deserialize_docs, serialize, serialize_docs, Node, ParseError};

fn mapping_of(pairs: &[(&str, Node)]) -> Node {
    pairs
        .iter()
        .map(|(key, value)| (Node::from(*key), value.clone()))
        .collect()
}

#[test]
fn round_trip_idempotence() {
    let mut anchored = Node::from(vec![Node::from(true), Node::from(false)]);
    anchored.set_anchor_name("shared");
    let alias = Node::alias_of(&anchored).unwrap();

    let mut tagged = Node::from("payload");
    tagged.set_tag_name("!custom");

    let mut flow = mapping_of(&[("x", Node::from(1)), ("y", Node::from(2))]);
    flow.set_style(yamltree::ContainerStyle::Flow);

    let tree = mapping_of(&[
        ("name", Node::from("demo")),
        ("count", Node::from(-42)),
        ("ratio", Node::from(0.125)),
        ("missing", Node::null()),
        (
            "list",
            Node::from(vec![Node::from(1), Node::from("two"), Node::from(3.5)]),
        ),
        ("flow", flow),
        ("anchored", anchored),
        ("alias", alias),
        ("tagged", tagged),
        ("tricky", Node::from("123")),
    ]);

    let text = serialize(&tree).unwrap();
    let reparsed = deserialize(text.as_str()).unwrap();
    assert_eq!(reparsed, tree);
}

#[test]
fn serialize_then_parse_stability() {
    for input in [
        "foo: true\nbar: 123\nbaz: 3.14\n",
        "- 1\n- [a, b]\n- {k: v}\n",
        "lit: |\n  line 1\n\n  line 2\nfold: >\n  folded text\n",
        "quoted: \"a\\tb\\u00e9\"\nsingle: 'it''s'\n",
        "a: &x\n- 1\n- 2\nb: *x\n",
        "plain value that spans\n",
        "? [complex, key]\n: value\n",
    ] {
        let first = serialize(&deserialize(input).unwrap()).unwrap();
        let second = serialize(&deserialize(first.as_str()).unwrap()).unwrap();
        assert_eq!(second, first, "unstable for {input:?}");
    }
}

#[test]
fn mapping_order_survives_round_trips() {
    let input = "zebra: 1\napple: 2\nmango: 3\nberry: 4\n";
    let doc = deserialize(input).unwrap();
    let keys: Vec<String> = doc
        .map_entries()
        .unwrap()
        .map(|(key, _)| key.as_str().unwrap().to_owned())
        .collect();
    assert_eq!(keys, ["zebra", "apple", "mango", "berry"]);

    let text = serialize(&doc).unwrap();
    assert_eq!(text, input);

    let again = deserialize(text.as_str()).unwrap();
    let keys: Vec<String> = again
        .map_entries()
        .unwrap()
        .map(|(key, _)| key.as_str().unwrap().to_owned())
        .collect();
    assert_eq!(keys, ["zebra", "apple", "mango", "berry"]);
}

#[test]
fn alias_transparency() {
    let original = deserialize("base: &b\n  k: v\ncopy: *b\n").unwrap();
    let text = serialize(&original).unwrap();
    assert!(text.contains("&b"));
    assert!(text.contains("*b"));
    let reparsed = deserialize(text.as_str()).unwrap();
    assert_eq!(reparsed, original);
    assert_eq!(reparsed["copy"], reparsed["base"]);
}

fn utf16_bytes(text: &str, big_endian: bool, bom: bool) -> Vec<u8> {
    let mut bytes = Vec::new();
    let units = if bom {
        Some('\u{feff}' as u16)
    } else {
        None
    }
    .into_iter()
    .chain(text.encode_utf16());
    for unit in units {
        bytes.extend(if big_endian {
            unit.to_be_bytes()
        } else {
            unit.to_le_bytes()
        });
    }
    bytes
}

fn utf32_bytes(text: &str, big_endian: bool, bom: bool) -> Vec<u8> {
    let mut bytes = Vec::new();
    let chars = if bom { Some('\u{feff}') } else { None }
        .into_iter()
        .chain(text.chars());
    for ch in chars {
        bytes.extend(if big_endian {
            (ch as u32).to_be_bytes()
        } else {
            (ch as u32).to_le_bytes()
        });
    }
    bytes
}

#[test]
fn encoding_transparency() {
    let tree = mapping_of(&[("text", Node::from("h\u{e9}llo w\u{f6}rld \u{2713}"))]);
    let yaml = serialize(&tree).unwrap();

    let mut encodings: Vec<Vec<u8>> = vec![
        yaml.as_bytes().to_vec(),
        [b"\xEF\xBB\xBF".as_slice(), yaml.as_bytes()].concat(),
    ];
    for big_endian in [false, true] {
        for bom in [false, true] {
            encodings.push(utf16_bytes(&yaml, big_endian, bom));
            encodings.push(utf32_bytes(&yaml, big_endian, bom));
        }
    }
    for bytes in encodings {
        assert_eq!(deserialize(bytes).unwrap(), tree);
    }
}

#[test]
fn non_ascii_content_in_utf16_source() {
    let bytes = utf16_bytes("title: \u{65e5}\u{672c}\u{8a9e}\n", true, true);
    let doc = deserialize(bytes).unwrap();
    assert_eq!(doc["title"].as_str().unwrap(), "\u{65e5}\u{672c}\u{8a9e}");
}

#[test]
fn multi_document_order() {
    let docs = vec![
        mapping_of(&[("first", Node::from(1))]),
        Node::from(vec![Node::from("a"), Node::from("b")]),
        Node::from("just a scalar"),
        Node::null(),
    ];
    let text = serialize_docs(&docs).unwrap();
    let reparsed = deserialize_docs(text.as_str()).unwrap();
    assert_eq!(reparsed, docs);
}

#[test]
fn empty_input_boundaries() {
    assert_eq!(deserialize_docs("").unwrap(), Vec::<Node>::new());
    assert!(matches!(deserialize(""), Err(ParseError::NoDocument)));
}

#[test]
fn lone_document_marker_is_null() {
    let doc = deserialize("---\n").unwrap();
    assert!(doc.is_null());
}

#[test]
fn integer_range_boundaries() {
    let doc = deserialize("max: 9223372036854775807\nmin: -9223372036854775808\n").unwrap();
    assert_eq!(doc["max"].as_int().unwrap(), i64::MAX);
    assert_eq!(doc["min"].as_int().unwrap(), i64::MIN);
    assert!(matches!(
        deserialize("over: 9223372036854775808\n"),
        Err(ParseError::InvalidNumber { .. })
    ));
    assert!(matches!(
        deserialize("under: -9223372036854775809\n"),
        Err(ParseError::InvalidNumber { .. })
    ));
}

#[test]
fn float_overflow_serializes_as_infinity() {
    let doc = deserialize("big: 1e999\nsmall: -1e999\n").unwrap();
    assert_eq!(serialize(&doc).unwrap(), "big: .inf\nsmall: -.inf\n");
}

#[test]
fn special_floats_round_trip() {
    let tree = mapping_of(&[
        ("pos", Node::from(f64::INFINITY)),
        ("neg", Node::from(f64::NEG_INFINITY)),
        ("nan", Node::from(f64::NAN)),
    ]);
    let text = serialize(&tree).unwrap();
    assert_eq!(text, "pos: .inf\nneg: -.inf\nnan: .nan\n");
    let reparsed = deserialize(text.as_str()).unwrap();
    assert!(reparsed["nan"].as_float().unwrap().is_nan());
    assert_eq!(reparsed["pos"].as_float().unwrap(), f64::INFINITY);
    assert_eq!(reparsed["neg"].as_float().unwrap(), f64::NEG_INFINITY);
}
