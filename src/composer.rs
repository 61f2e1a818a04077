use crate::error::ParseError;
use crate::event::{Event, EventData};
use crate::mapping::Mapping;
use crate::node::{AnchorState, Node, NodeData};
use crate::parser::Parser;
use crate::source::Source;
use crate::{resolver, Mark, ScalarStyle, YamlVersion, BOOL_TAG, FLOAT_TAG, INT_TAG, NULL_TAG, STR_TAG};

/// Parse a single document from `src`.
///
/// Fails with [`ParseError::NoDocument`] on an empty stream and with
/// [`ParseError::MoreThanOneDocument`] when content follows the first
/// document's end.
pub fn deserialize(src: impl Into<Source>) -> Result<Node, ParseError> {
    let mut composer = Composer::new(src.into())?;
    let Some((root, _)) = composer.next_document()? else {
        return Err(ParseError::NoDocument);
    };
    if let Some((_, mark)) = composer.next_document()? {
        return Err(ParseError::MoreThanOneDocument { mark });
    }
    Ok(root)
}

/// Parse every document in `src`, in source order.
///
/// An empty input produces an empty vector.
pub fn deserialize_docs(src: impl Into<Source>) -> Result<Vec<Node>, ParseError> {
    let mut composer = Composer::new(src.into())?;
    let mut documents = Vec::new();
    while let Some((root, _)) = composer.next_document()? {
        documents.push(root);
    }
    Ok(documents)
}

/// Builds node trees from parse events: registers anchors, resolves aliases
/// to deep copies, applies tag overrides, classifies plain scalars, and
/// enforces key uniqueness.
struct Composer {
    parser: Parser,
    /// Anchor table for the current document; the latest registration of a
    /// name wins for subsequent aliases.
    anchors: Vec<(String, Node)>,
    /// The version selected by the current document's `%YAML` directive.
    version: YamlVersion,
    stream_started: bool,
}

impl Composer {
    fn new(source: Source) -> Result<Composer, ParseError> {
        Ok(Composer {
            parser: Parser::new(source)?,
            anchors: Vec::new(),
            version: YamlVersion::default(),
            stream_started: false,
        })
    }

    /// Compose the next document, returning its root node and start mark,
    /// or `None` at the end of the stream.
    ///
    /// The anchor table is scoped to the document and dropped at its end,
    /// whether composition succeeds or fails.
    fn next_document(&mut self) -> Result<Option<(Node, Mark)>, ParseError> {
        if !self.stream_started {
            let event = self.parser.parse()?;
            if !matches!(event.data, EventData::StreamStart) {
                return Err(ParseError::Problem {
                    problem: "expected the start of the stream",
                    mark: event.start_mark,
                });
            }
            self.stream_started = true;
        }
        let event = self.parser.parse()?;
        let start_mark = event.start_mark;
        match event.data {
            EventData::StreamEnd => Ok(None),
            EventData::DocumentStart {
                version_directive, ..
            } => {
                self.version = match version_directive {
                    Some(directive) if directive.minor == 1 => YamlVersion::V1_1,
                    _ => YamlVersion::V1_2,
                };
                let result = self.compose_document();
                self.anchors.clear();
                result.map(|root| Some((root, start_mark)))
            }
            _ => Err(ParseError::Problem {
                problem: "expected the start of a document",
                mark: event.start_mark,
            }),
        }
    }

    fn compose_document(&mut self) -> Result<Node, ParseError> {
        let event = self.parser.parse()?;
        let root = self.compose_node(event)?;
        let event = self.parser.parse()?;
        if !matches!(event.data, EventData::DocumentEnd { .. }) {
            return Err(ParseError::Problem {
                problem: "expected the end of a document",
                mark: event.start_mark,
            });
        }
        Ok(root)
    }

    fn compose_node(&mut self, event: Event) -> Result<Node, ParseError> {
        match event.data {
            EventData::Alias { .. } => self.compose_alias(event),
            EventData::Scalar { .. } => self.compose_scalar(event),
            EventData::SequenceStart { .. } => self.compose_sequence(event),
            EventData::MappingStart { .. } => self.compose_mapping(event),
            _ => Err(ParseError::Problem {
                problem: "did not find expected node content",
                mark: event.start_mark,
            }),
        }
    }

    /// Aliases resolve eagerly to a deep copy of the most recently anchored
    /// node, so the finished tree owns all of its values and stays acyclic.
    fn compose_alias(&mut self, event: Event) -> Result<Node, ParseError> {
        let EventData::Alias { anchor } = event.data else {
            unreachable!()
        };
        for (name, node) in self.anchors.iter().rev() {
            if *name == anchor {
                let mut copy = node.clone();
                copy.anchor = AnchorState::Alias(anchor);
                return Ok(copy);
            }
        }
        Err(ParseError::InvalidAlias {
            name: anchor,
            mark: event.start_mark,
        })
    }

    fn compose_scalar(&mut self, event: Event) -> Result<Node, ParseError> {
        let EventData::Scalar {
            anchor,
            tag,
            value,
            style,
        } = event.data
        else {
            unreachable!()
        };
        let mark = event.start_mark;

        // A non-specific "!" forces the string interpretation and is not
        // retained as a tag name.
        let tag = tag.filter(|tag| tag != "!");
        let data = match tag.as_deref() {
            Some(STR_TAG) => NodeData::String(value),
            Some(INT_TAG) => match resolver::parse_int(&value) {
                Some(int) => NodeData::Int(int),
                None => return Err(ParseError::InvalidNumber { value, mark }),
            },
            Some(FLOAT_TAG) => match resolver::parse_float(&value) {
                Some(float) => NodeData::Float(float),
                None => return Err(ParseError::InvalidNumber { value, mark }),
            },
            Some(BOOL_TAG) => match resolver::as_bool(&value, self.version) {
                Some(flag) => NodeData::Bool(flag),
                None => {
                    return Err(ParseError::Problem {
                        problem: "cannot parse scalar as a boolean",
                        mark,
                    })
                }
            },
            Some(NULL_TAG) => {
                if resolver::is_null(&value) {
                    NodeData::Null
                } else {
                    return Err(ParseError::Problem {
                        problem: "cannot parse scalar as null",
                        mark,
                    });
                }
            }
            // User tags and unrecognized standard tags keep the raw string.
            Some(_) => NodeData::String(value),
            None if style == ScalarStyle::Plain => {
                match resolver::resolve(&value, self.version) {
                    Ok(resolver::Resolved::Null) => NodeData::Null,
                    Ok(resolver::Resolved::Bool(flag)) => NodeData::Bool(flag),
                    Ok(resolver::Resolved::Int(int)) => NodeData::Int(int),
                    Ok(resolver::Resolved::Float(float)) => NodeData::Float(float),
                    Ok(resolver::Resolved::Str) => NodeData::String(value),
                    Err(resolver::Unrepresentable) => {
                        return Err(ParseError::InvalidNumber { value, mark })
                    }
                }
            }
            // Quoted and block scalars are strings unless a tag overrides.
            None => NodeData::String(value),
        };

        let mut node = Node::from_data(data);
        node.tag = tag;
        node.version = self.version;
        self.register_anchor(anchor, &mut node);
        Ok(node)
    }

    fn compose_sequence(&mut self, event: Event) -> Result<Node, ParseError> {
        let EventData::SequenceStart { anchor, tag, style } = event.data else {
            unreachable!()
        };
        let mut items = Vec::new();
        loop {
            let event = self.parser.parse()?;
            if matches!(event.data, EventData::SequenceEnd) {
                break;
            }
            items.push(self.compose_node(event)?);
        }
        let mut node = Node::from_data(NodeData::Sequence(items));
        node.tag = tag.filter(|tag| tag != "!");
        node.style = style;
        node.version = self.version;
        self.register_anchor(anchor, &mut node);
        Ok(node)
    }

    fn compose_mapping(&mut self, event: Event) -> Result<Node, ParseError> {
        let EventData::MappingStart { anchor, tag, style } = event.data else {
            unreachable!()
        };
        let mut mapping = Mapping::new();
        loop {
            let event = self.parser.parse()?;
            if matches!(event.data, EventData::MappingEnd) {
                break;
            }
            let key_mark = event.start_mark;
            let key = self.compose_node(event)?;
            let event = self.parser.parse()?;
            let value = self.compose_node(event)?;
            if mapping.insert(key, value).is_some() {
                return Err(ParseError::DuplicateKey { mark: key_mark });
            }
        }
        let mut node = Node::from_data(NodeData::Mapping(mapping));
        node.tag = tag.filter(|tag| tag != "!");
        node.style = style;
        node.version = self.version;
        self.register_anchor(anchor, &mut node);
        Ok(node)
    }

    /// Anchors become visible once the anchored node is complete; an alias
    /// inside the anchored subtree therefore fails as undefined, which is
    /// what keeps recursive structures out of the tree.
    fn register_anchor(&mut self, anchor: Option<String>, node: &mut Node) {
        if let Some(name) = anchor {
            node.anchor = AnchorState::Anchor(name.clone());
            self.anchors.push((name, node.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    #[test]
    fn mapping_preserves_order() {
        let doc = deserialize("foo: true\nbar: 123\nbaz: 3.14\n").unwrap();
        let keys: Vec<_> = doc
            .map_entries()
            .unwrap()
            .map(|(key, _)| key.as_str().unwrap().to_owned())
            .collect();
        assert_eq!(keys, ["foo", "bar", "baz"]);
        assert_eq!(doc["foo"].as_bool().unwrap(), true);
        assert_eq!(doc["bar"].as_int().unwrap(), 123);
        assert_eq!(doc["baz"].as_float().unwrap(), 3.14);
    }

    #[test]
    fn sequence_of_integers() {
        let doc = deserialize("- 1\n- 2\n- 3\n").unwrap();
        assert_eq!(doc.get_value::<Vec<i64>>().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn multi_document_stream() {
        let docs =
            deserialize_docs("%YAML 1.2\n---\nfoo: bar\n...\n---\nbaz: qux\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["foo"].as_str().unwrap(), "bar");
        assert_eq!(docs[1]["baz"].as_str().unwrap(), "qux");
    }

    #[test]
    fn alias_resolves_to_deep_copy() {
        let doc = deserialize("a: &x 1\nb: *x\n").unwrap();
        assert_eq!(doc["a"].as_int().unwrap(), 1);
        assert_eq!(doc["b"].as_int().unwrap(), 1);
        assert!(doc["a"].has_anchor());
        assert!(doc["b"].is_alias());
        assert_eq!(doc["b"].anchor_name(), Some("x"));
    }

    #[test]
    fn alias_deep_copy_of_container() {
        let doc = deserialize("a: &seq [1, 2]\nb: *seq\n").unwrap();
        assert_eq!(doc["a"], doc["b"]);
        assert_eq!(doc["b"].get_value::<Vec<i64>>().unwrap(), vec![1, 2]);
    }

    #[test]
    fn latest_anchor_registration_wins() {
        let doc = deserialize("a: &x 1\nb: &x 2\nc: *x\n").unwrap();
        assert_eq!(doc["c"].as_int().unwrap(), 2);
    }

    #[test]
    fn undefined_alias_fails() {
        assert!(matches!(
            deserialize("a: *nowhere\n"),
            Err(ParseError::InvalidAlias { name, .. }) if name == "nowhere"
        ));
    }

    #[test]
    fn alias_inside_its_own_anchor_fails() {
        assert!(matches!(
            deserialize("&a\nx: *a\n"),
            Err(ParseError::InvalidAlias { .. })
        ));
    }

    #[test]
    fn escaped_newline_in_double_quoted() {
        let doc = deserialize("key: \"line1\\nline2\"\n").unwrap();
        assert_eq!(doc["key"].as_str().unwrap(), "line1\nline2");
    }

    #[test]
    fn explicit_int_tag() {
        let doc = deserialize("!!int 42\n").unwrap();
        assert_eq!(doc.as_int().unwrap(), 42);
        assert_eq!(doc.tag_name(), Some(INT_TAG));
    }

    #[test]
    fn tag_overrides_quoted_scalar() {
        let doc = deserialize("!!int \"42\"\n").unwrap();
        assert_eq!(doc.as_int().unwrap(), 42);
    }

    #[test]
    fn verbatim_tag() {
        let doc = deserialize("!<tag:yaml.org,2002:bool> true\n").unwrap();
        assert_eq!(doc.as_bool().unwrap(), true);
        assert_eq!(doc.tag_name(), Some(BOOL_TAG));
    }

    #[test]
    fn non_specific_tag_forces_string() {
        let doc = deserialize("! 123\n").unwrap();
        assert_eq!(doc.as_str().unwrap(), "123");
        assert!(!doc.has_tag());
    }

    #[test]
    fn invalid_tagged_number_fails() {
        assert!(matches!(
            deserialize("!!int not-a-number\n"),
            Err(ParseError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn integer_overflow_fails() {
        assert!(matches!(
            deserialize("9223372036854775808\n"),
            Err(ParseError::InvalidNumber { .. })
        ));
        let doc = deserialize("9223372036854775807\n").unwrap();
        assert_eq!(doc.as_int().unwrap(), i64::MAX);
    }

    #[test]
    fn quoted_scalars_stay_strings() {
        let doc = deserialize("a: \"123\"\nb: 'true'\nc: 123\n").unwrap();
        assert_eq!(doc["a"].kind(), NodeKind::String);
        assert_eq!(doc["b"].kind(), NodeKind::String);
        assert_eq!(doc["c"].kind(), NodeKind::Integer);
    }

    #[test]
    fn duplicate_key_fails() {
        assert!(matches!(
            deserialize("a: 1\na: 2\n"),
            Err(ParseError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn duplicate_key_by_value_across_styles() {
        // `'a'` and `a` are the same string value.
        assert!(matches!(
            deserialize("a: 1\n'a': 2\n"),
            Err(ParseError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn flow_styles_are_recorded() {
        let doc = deserialize("a: {x: 1, y: 2}\nb: [1, 2]\n").unwrap();
        assert_eq!(doc.style(), crate::ContainerStyle::Block);
        assert_eq!(doc["a"].style(), crate::ContainerStyle::Flow);
        assert_eq!(doc["b"].style(), crate::ContainerStyle::Flow);
    }

    #[test]
    fn empty_input_yields_no_documents() {
        assert!(deserialize_docs("").unwrap().is_empty());
        assert!(matches!(deserialize(""), Err(ParseError::NoDocument)));
    }

    #[test]
    fn second_document_rejected_by_deserialize() {
        assert!(matches!(
            deserialize("a: 1\n---\nb: 2\n"),
            Err(ParseError::MoreThanOneDocument { .. })
        ));
    }

    #[test]
    fn bare_document_marker_is_null() {
        let docs = deserialize_docs("---\n").unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].is_null());
    }

    #[test]
    fn version_directive_switches_resolution() {
        let doc = deserialize("%YAML 1.1\n---\na: yes\nb: 0b101\n").unwrap();
        assert_eq!(doc["a"].as_bool().unwrap(), true);
        assert_eq!(doc["b"].as_int().unwrap(), 5);
        assert_eq!(doc["a"].version(), YamlVersion::V1_1);

        let doc = deserialize("a: yes\n").unwrap();
        assert_eq!(doc["a"].as_str().unwrap(), "yes");
    }

    #[test]
    fn version_is_scoped_to_its_document() {
        let docs = deserialize_docs("%YAML 1.1\n---\nyes\n---\nyes\n").unwrap();
        assert_eq!(docs[0].kind(), NodeKind::Boolean);
        assert_eq!(docs[1].kind(), NodeKind::String);
    }

    #[test]
    fn complex_keys_with_explicit_marker() {
        let doc = deserialize("? [1, 2]\n: value\n").unwrap();
        let key = Node::from(vec![Node::from(1), Node::from(2)]);
        assert_eq!(doc.get_key(&key).unwrap().as_str().unwrap(), "value");
    }

    #[test]
    fn omitted_value_is_null() {
        let doc = deserialize("a:\nb: 1\n").unwrap();
        assert!(doc["a"].is_null());
    }

    #[test]
    fn block_scalars_compose_to_strings() {
        let doc = deserialize("lit: |\n  a\n  b\nfold: >\n  a\n  b\n").unwrap();
        assert_eq!(doc["lit"].as_str().unwrap(), "a\nb\n");
        assert_eq!(doc["fold"].as_str().unwrap(), "a b\n");
    }

    #[test]
    fn nested_block_structures() {
        let doc = deserialize(
            "servers:\n  - name: alpha\n    port: 8080\n  - name: beta\n    port: 9090\n",
        )
        .unwrap();
        let servers = doc["servers"].as_sequence().unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0]["name"].as_str().unwrap(), "alpha");
        assert_eq!(servers[1]["port"].as_int().unwrap(), 9090);
    }

    #[test]
    fn utf16_input_composes() {
        let bytes: Vec<u8> = "\u{feff}key: value\n"
            .encode_utf16()
            .flat_map(u16::to_be_bytes)
            .collect();
        let doc = deserialize(bytes).unwrap();
        assert_eq!(doc["key"].as_str().unwrap(), "value");
    }
}
