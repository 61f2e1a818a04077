use crate::error::{EncodingError, ParseError};
use crate::event::{Event, EventData};
use crate::scanner::Scanner;
use crate::source::Source;
use crate::token::{Token, TokenData};
use crate::{ContainerStyle, Mark, ScalarStyle, TagDirective, VersionDirective};

/// What the state machine is waiting for next.
///
/// Every variant names the production whose first token decides the next
/// event; the `First` variants additionally consume the opening token that
/// [`Parser::node_event`] left in the queue.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
enum ParserState {
    /// Nothing has been consumed yet.
    #[default]
    StreamOpen,
    /// Content may begin without an explicit `---`.
    BareDocument,
    /// Only directives, `---`, or the end of the stream may follow.
    NextDocument,
    /// The root node of the current document.
    DocumentRoot,
    /// The current document is finished; an optional `...` follows.
    DocumentTail,
    /// A node in block context.
    BlockValue,
    /// The opening token of a block sequence.
    BlockSeqFirst,
    /// A `- ` entry or the end of the block sequence.
    BlockSeqNext,
    /// A `- ` entry of a sequence that sits at its parent key's indent.
    IndentlessEntry,
    /// The opening token of a block mapping.
    BlockMapFirstKey,
    /// A key or the end of the block mapping.
    BlockMapKey,
    /// The `:` of the pair whose key was just produced.
    BlockMapValue,
    /// The opening `[` of a flow sequence.
    FlowSeqFirst,
    /// An entry, `,`, or the closing `]`.
    FlowSeqNext,
    /// The key of a single-pair mapping written inside a flow sequence.
    FlowSeqPairKey,
    /// The value of that single-pair mapping.
    FlowSeqPairValue,
    /// The synthetic end of that single-pair mapping.
    FlowSeqPairClose,
    /// The opening `{` of a flow mapping.
    FlowMapFirstKey,
    /// A key, `,`, or the closing `}`.
    FlowMapKey,
    /// The `:` and value of the current flow pair.
    FlowMapValue,
    /// A flow entry that turned out to be a lone key; produce its null value.
    FlowMapMissingValue,
    /// The stream is exhausted.
    Finished,
}

/// Anchor and tag prefixes collected ahead of a node's content.
struct NodeProperties {
    anchor: Option<String>,
    /// The fully resolved tag; `Some("!")` is the non-specific tag.
    tag: Option<String>,
    start_mark: Mark,
    end_mark: Mark,
}

/// The token→event state machine.
///
/// Pulls tokens from the scanner and turns them into one event per
/// [`Parser::parse`] call. Document framing, the block/flow grammar and
/// `%TAG` handle resolution live here; everything value-shaped is left to
/// the composer.
pub(crate) struct Parser {
    scanner: Scanner,
    states: Vec<ParserState>,
    state: ParserState,
    /// Start positions of the collections still open, for error context.
    marks: Vec<Mark>,
    /// Handles declared for the current document, defaults included.
    tag_directives: Vec<TagDirective>,
}

impl Parser {
    pub(crate) fn new(source: Source) -> Result<Parser, EncodingError> {
        Ok(Parser {
            scanner: Scanner::new(source)?,
            states: Vec::with_capacity(16),
            state: ParserState::default(),
            marks: Vec::with_capacity(16),
            tag_directives: Vec::with_capacity(16),
        })
    }

    fn peek_token(&mut self) -> Result<&Token, ParseError> {
        if !self.scanner.token_available {
            self.scanner.fetch_more_tokens()?;
        }
        Ok(self
            .scanner
            .tokens
            .front()
            .expect("token_available is true, but token queue is empty"))
    }

    fn peek_token_mut(&mut self) -> Result<&mut Token, ParseError> {
        if !self.scanner.token_available {
            self.scanner.fetch_more_tokens()?;
        }
        Ok(self
            .scanner
            .tokens
            .front_mut()
            .expect("token_available is true, but token queue is empty"))
    }

    fn skip_token(&mut self) {
        self.scanner.token_available = false;
        self.scanner.tokens_parsed += 1;
        let skipped = self
            .scanner
            .tokens
            .pop_front()
            .expect("skipped token past the end of the stream");
        self.scanner.stream_end_produced = matches!(skipped.data, TokenData::StreamEnd);
    }

    /// Produce the next parsing event.
    pub(crate) fn parse(&mut self) -> Result<Event, ParseError> {
        if self.scanner.stream_end_produced || self.state == ParserState::Finished {
            return Ok(Event {
                data: EventData::StreamEnd,
                ..Default::default()
            });
        }
        self.state_machine()
    }

    fn fail<T>(problem: &'static str, mark: Mark) -> Result<T, ParseError> {
        Err(ParseError::Problem { problem, mark })
    }

    fn fail_in<T>(
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        mark: Mark,
    ) -> Result<T, ParseError> {
        Err(ParseError::ProblemWithContext {
            context,
            context_mark,
            problem,
            mark,
        })
    }

    fn state_machine(&mut self) -> Result<Event, ParseError> {
        match self.state {
            ParserState::StreamOpen => self.stream_open_event(),
            ParserState::BareDocument => self.document_open_event(true),
            ParserState::NextDocument => self.document_open_event(false),
            ParserState::DocumentRoot => self.document_root_event(),
            ParserState::DocumentTail => self.document_close_event(),
            ParserState::BlockValue => self.node_event(true, false),
            ParserState::BlockSeqFirst => self.block_seq_event(true),
            ParserState::BlockSeqNext => self.block_seq_event(false),
            ParserState::IndentlessEntry => self.indentless_entry_event(),
            ParserState::BlockMapFirstKey => self.block_map_key_event(true),
            ParserState::BlockMapKey => self.block_map_key_event(false),
            ParserState::BlockMapValue => self.block_map_value_event(),
            ParserState::FlowSeqFirst => self.flow_seq_event(true),
            ParserState::FlowSeqNext => self.flow_seq_event(false),
            ParserState::FlowSeqPairKey => self.flow_seq_pair_key_event(),
            ParserState::FlowSeqPairValue => self.flow_seq_pair_value_event(),
            ParserState::FlowSeqPairClose => self.flow_seq_pair_close_event(),
            ParserState::FlowMapFirstKey => self.flow_map_key_event(true),
            ParserState::FlowMapKey => self.flow_map_key_event(false),
            ParserState::FlowMapValue => self.flow_map_value_event(false),
            ParserState::FlowMapMissingValue => self.flow_map_value_event(true),
            ParserState::Finished => panic!("no states left after the end of the stream"),
        }
    }

    fn stream_open_event(&mut self) -> Result<Event, ParseError> {
        let token = self.peek_token()?;
        if let TokenData::StreamStart = &token.data {
            let event = Event {
                data: EventData::StreamStart,
                start_mark: token.start_mark,
                end_mark: token.end_mark,
            };
            self.state = ParserState::BareDocument;
            self.skip_token();
            Ok(event)
        } else {
            let mark = token.start_mark;
            Self::fail("the input did not begin with the start of a stream", mark)
        }
    }

    fn document_open_event(&mut self, allow_bare: bool) -> Result<Event, ParseError> {
        let mut version_directive: Option<VersionDirective> = None;
        let mut tag_directives = Vec::new();
        let mut token = self.peek_token()?;
        if !allow_bare {
            // Any number of `...` terminators may sit between documents.
            while let TokenData::DocumentEnd = &token.data {
                self.skip_token();
                token = self.peek_token()?;
            }
        }
        if allow_bare
            && !matches!(
                token.data,
                TokenData::VersionDirective { .. }
                    | TokenData::TagDirective { .. }
                    | TokenData::DocumentStart
                    | TokenData::StreamEnd
            )
        {
            let event = Event {
                data: EventData::DocumentStart {
                    version_directive: None,
                    tag_directives: Vec::new(),
                    implicit: true,
                },
                start_mark: token.start_mark,
                end_mark: token.end_mark,
            };
            self.collect_directives(None, None)?;
            self.states.push(ParserState::DocumentTail);
            self.state = ParserState::BlockValue;
            Ok(event)
        } else if !matches!(token.data, TokenData::StreamEnd) {
            let start_mark = token.start_mark;
            self.collect_directives(Some(&mut version_directive), Some(&mut tag_directives))?;
            let token = self.peek_token()?;
            if let TokenData::DocumentStart = token.data {
                let end_mark = token.end_mark;
                let event = Event {
                    data: EventData::DocumentStart {
                        version_directive,
                        tag_directives,
                        implicit: false,
                    },
                    start_mark,
                    end_mark,
                };
                self.states.push(ParserState::DocumentTail);
                self.state = ParserState::DocumentRoot;
                self.skip_token();
                Ok(event)
            } else {
                Self::fail(
                    "another document must open with '---'",
                    token.start_mark,
                )
            }
        } else {
            let event = Event {
                data: EventData::StreamEnd,
                start_mark: token.start_mark,
                end_mark: token.end_mark,
            };
            self.state = ParserState::Finished;
            self.skip_token();
            Ok(event)
        }
    }

    fn document_root_event(&mut self) -> Result<Event, ParseError> {
        let token = self.peek_token()?;
        if let TokenData::VersionDirective { .. }
        | TokenData::TagDirective { .. }
        | TokenData::DocumentStart
        | TokenData::DocumentEnd
        | TokenData::StreamEnd = &token.data
        {
            // `---` with no content at all: the document holds one null.
            let mark = token.start_mark;
            self.state = self.states.pop().unwrap();
            Ok(Self::null_event(mark))
        } else {
            self.node_event(true, false)
        }
    }

    fn document_close_event(&mut self) -> Result<Event, ParseError> {
        let mut implicit = true;
        let token = self.peek_token()?;
        let start_mark = token.start_mark;
        let mut end_mark = token.start_mark;
        if let TokenData::DocumentEnd = &token.data {
            end_mark = token.end_mark;
            self.skip_token();
            implicit = false;
        }
        // Directive scope closes with the document.
        self.tag_directives.clear();
        self.state = ParserState::NextDocument;
        Ok(Event {
            data: EventData::DocumentEnd { implicit },
            start_mark,
            end_mark,
        })
    }

    /// Collect the optional anchor and tag ahead of a node, in either order,
    /// resolving the tag handle against the document's declarations.
    fn node_properties(&mut self) -> Result<NodeProperties, ParseError> {
        let mut anchor: Option<String> = None;
        let mut tag_handle: Option<String> = None;
        let mut tag_suffix: Option<String> = None;
        let mut tag_mark = Mark::default();

        let mut token = self.peek_token_mut()?;
        // Both marks point at the first property token, or at the content
        // itself when no properties precede it.
        let start_mark = token.start_mark;
        let mut end_mark = token.start_mark;

        if let TokenData::Anchor { value } = &mut token.data {
            anchor = Some(std::mem::take(value));
            end_mark = token.end_mark;
            self.skip_token();
            token = self.peek_token_mut()?;
            if let TokenData::Tag { handle, suffix } = &mut token.data {
                tag_handle = Some(std::mem::take(handle));
                tag_suffix = Some(std::mem::take(suffix));
                tag_mark = token.start_mark;
                end_mark = token.end_mark;
                self.skip_token();
            }
        } else if let TokenData::Tag { handle, suffix } = &mut token.data {
            tag_handle = Some(std::mem::take(handle));
            tag_suffix = Some(std::mem::take(suffix));
            tag_mark = token.start_mark;
            end_mark = token.end_mark;
            self.skip_token();
            token = self.peek_token_mut()?;
            if let TokenData::Anchor { value } = &mut token.data {
                anchor = Some(std::mem::take(value));
                end_mark = token.end_mark;
                self.skip_token();
            }
        }

        let tag = self.resolve_tag_handle(tag_handle, tag_suffix, start_mark, tag_mark)?;
        Ok(NodeProperties {
            anchor,
            tag,
            start_mark,
            end_mark,
        })
    }

    /// Expand `handle` + `suffix` into a full tag. A verbatim tag arrives
    /// with an empty handle and passes through as its suffix.
    fn resolve_tag_handle(
        &self,
        handle: Option<String>,
        suffix: Option<String>,
        start_mark: Mark,
        tag_mark: Mark,
    ) -> Result<Option<String>, ParseError> {
        let Some(handle) = handle else {
            return Ok(None);
        };
        if handle.is_empty() {
            return Ok(suffix);
        }
        for declared in &self.tag_directives {
            if declared.handle == handle {
                let suffix = suffix.as_deref().unwrap_or("");
                return Ok(Some(format!("{}{}", declared.prefix, suffix)));
            }
        }
        Self::fail_in(
            "while reading node properties",
            start_mark,
            "the tag handle was never declared by a %TAG directive",
            tag_mark,
        )
    }

    fn node_event(&mut self, block: bool, allow_entry_seq: bool) -> Result<Event, ParseError> {
        let token = self.peek_token_mut()?;
        if let TokenData::Alias { value } = &mut token.data {
            let event = Event {
                data: EventData::Alias {
                    anchor: std::mem::take(value),
                },
                start_mark: token.start_mark,
                end_mark: token.end_mark,
            };
            self.state = self.states.pop().unwrap();
            self.skip_token();
            return Ok(event);
        }

        let NodeProperties {
            anchor,
            tag,
            start_mark,
            mut end_mark,
        } = self.node_properties()?;

        let token = self.peek_token_mut()?;

        if allow_entry_seq && matches!(token.data, TokenData::BlockEntry) {
            // A `- ` at the parent's own indent: the value is a sequence
            // that opens without a deeper block.
            end_mark = token.end_mark;
            self.state = ParserState::IndentlessEntry;
            return Ok(Event {
                data: EventData::SequenceStart {
                    anchor,
                    tag,
                    style: ContainerStyle::Block,
                },
                start_mark,
                end_mark,
            });
        }
        if let TokenData::Scalar { value, style } = &mut token.data {
            end_mark = token.end_mark;
            let event = Event {
                data: EventData::Scalar {
                    anchor,
                    tag,
                    value: std::mem::take(value),
                    style: *style,
                },
                start_mark,
                end_mark,
            };
            self.state = self.states.pop().unwrap();
            self.skip_token();
            return Ok(event);
        }
        if let TokenData::FlowSequenceStart = &token.data {
            end_mark = token.end_mark;
            self.state = ParserState::FlowSeqFirst;
            return Ok(Event {
                data: EventData::SequenceStart {
                    anchor,
                    tag,
                    style: ContainerStyle::Flow,
                },
                start_mark,
                end_mark,
            });
        }
        if let TokenData::FlowMappingStart = &token.data {
            end_mark = token.end_mark;
            self.state = ParserState::FlowMapFirstKey;
            return Ok(Event {
                data: EventData::MappingStart {
                    anchor,
                    tag,
                    style: ContainerStyle::Flow,
                },
                start_mark,
                end_mark,
            });
        }
        if block && matches!(token.data, TokenData::BlockSequenceStart) {
            end_mark = token.end_mark;
            self.state = ParserState::BlockSeqFirst;
            return Ok(Event {
                data: EventData::SequenceStart {
                    anchor,
                    tag,
                    style: ContainerStyle::Block,
                },
                start_mark,
                end_mark,
            });
        }
        if block && matches!(token.data, TokenData::BlockMappingStart) {
            end_mark = token.end_mark;
            self.state = ParserState::BlockMapFirstKey;
            return Ok(Event {
                data: EventData::MappingStart {
                    anchor,
                    tag,
                    style: ContainerStyle::Block,
                },
                start_mark,
                end_mark,
            });
        }
        if anchor.is_some() || tag.is_some() {
            // Properties with nothing after them decorate a null scalar.
            self.state = self.states.pop().unwrap();
            return Ok(Event {
                data: EventData::Scalar {
                    anchor,
                    tag,
                    value: String::new(),
                    style: ScalarStyle::Plain,
                },
                start_mark,
                end_mark,
            });
        }
        Self::fail_in(
            if block {
                "while reading a block node"
            } else {
                "while reading a flow node"
            },
            start_mark,
            "no scalar, collection or alias starts here",
            token.start_mark,
        )
    }

    fn block_seq_event(&mut self, first: bool) -> Result<Event, ParseError> {
        if first {
            let token = self.peek_token()?;
            let mark = token.start_mark;
            self.marks.push(mark);
            self.skip_token();
        }

        let token = self.peek_token()?;
        if let TokenData::BlockEntry = &token.data {
            let mark = token.end_mark;
            self.skip_token();
            let token = self.peek_token()?;
            if matches!(token.data, TokenData::BlockEntry | TokenData::BlockEnd) {
                // `- ` with nothing behind it is a null entry.
                self.state = ParserState::BlockSeqNext;
                Ok(Self::null_event(mark))
            } else {
                self.states.push(ParserState::BlockSeqNext);
                self.node_event(true, false)
            }
        } else if let TokenData::BlockEnd = token.data {
            let event = Event {
                data: EventData::SequenceEnd,
                start_mark: token.start_mark,
                end_mark: token.end_mark,
            };
            self.state = self.states.pop().unwrap();
            let _ = self.marks.pop();
            self.skip_token();
            Ok(event)
        } else {
            let token_mark = token.start_mark;
            let mark = self.marks.pop().unwrap();
            Self::fail_in(
                "while reading a block sequence",
                mark,
                "every entry must open with '- ' at the sequence's indent",
                token_mark,
            )
        }
    }

    fn indentless_entry_event(&mut self) -> Result<Event, ParseError> {
        let token = self.peek_token()?;
        if let TokenData::BlockEntry = token.data {
            let mark = token.end_mark;
            self.skip_token();
            let token = self.peek_token()?;
            if matches!(
                token.data,
                TokenData::BlockEntry | TokenData::Key | TokenData::Value | TokenData::BlockEnd
            ) {
                self.state = ParserState::IndentlessEntry;
                Ok(Self::null_event(mark))
            } else {
                self.states.push(ParserState::IndentlessEntry);
                self.node_event(true, false)
            }
        } else {
            // No entry token: the enclosing mapping resumes, so the
            // sequence closes without a block-end of its own.
            let event = Event {
                data: EventData::SequenceEnd,
                start_mark: token.start_mark,
                end_mark: token.end_mark,
            };
            self.state = self.states.pop().unwrap();
            Ok(event)
        }
    }

    fn block_map_key_event(&mut self, first: bool) -> Result<Event, ParseError> {
        if first {
            let token = self.peek_token()?;
            let mark = token.start_mark;
            self.marks.push(mark);
            self.skip_token();
        }

        let token = self.peek_token()?;
        if let TokenData::Key = token.data {
            let mark = token.end_mark;
            self.skip_token();
            let token = self.peek_token()?;
            if matches!(
                token.data,
                TokenData::Key | TokenData::Value | TokenData::BlockEnd
            ) {
                // An explicit `?` with no content would produce an empty
                // key, which is deliberately unsupported.
                Err(ParseError::EmptyKey { mark })
            } else {
                self.states.push(ParserState::BlockMapValue);
                self.node_event(true, true)
            }
        } else if let TokenData::BlockEnd = token.data {
            let event = Event {
                data: EventData::MappingEnd,
                start_mark: token.start_mark,
                end_mark: token.end_mark,
            };
            self.state = self.states.pop().unwrap();
            let _ = self.marks.pop();
            self.skip_token();
            Ok(event)
        } else if let TokenData::Value = token.data {
            // A `:` with no key ahead of it.
            Err(ParseError::EmptyKey {
                mark: token.start_mark,
            })
        } else {
            let token_mark = token.start_mark;
            let mark = self.marks.pop().unwrap();
            Self::fail_in(
                "while reading a block mapping",
                mark,
                "every pair must open with a key at the mapping's indent",
                token_mark,
            )
        }
    }

    fn block_map_value_event(&mut self) -> Result<Event, ParseError> {
        let token = self.peek_token()?;
        if let TokenData::Value = token.data {
            let mark = token.end_mark;
            self.skip_token();
            let token = self.peek_token()?;
            if matches!(
                token.data,
                TokenData::Key | TokenData::Value | TokenData::BlockEnd
            ) {
                self.state = ParserState::BlockMapKey;
                Ok(Self::null_event(mark))
            } else {
                self.states.push(ParserState::BlockMapKey);
                self.node_event(true, true)
            }
        } else {
            // The pair ends at the next key: its value is null.
            let mark = token.start_mark;
            self.state = ParserState::BlockMapKey;
            Ok(Self::null_event(mark))
        }
    }

    fn flow_seq_event(&mut self, first: bool) -> Result<Event, ParseError> {
        if first {
            let token = self.peek_token()?;
            let mark = token.start_mark;
            self.marks.push(mark);
            self.skip_token();
        }

        let mut token = self.peek_token()?;
        if !matches!(token.data, TokenData::FlowSequenceEnd) {
            if !first {
                if let TokenData::FlowEntry = token.data {
                    self.skip_token();
                    token = self.peek_token()?;
                } else {
                    let token_mark = token.start_mark;
                    let mark = self.marks.pop().unwrap();
                    return Self::fail_in(
                        "while reading a flow sequence",
                        mark,
                        "entries are separated by ',' and the sequence closes with ']'",
                        token_mark,
                    );
                }
            }
            if let TokenData::Key = token.data {
                // `key: value` directly inside `[...]` is a single-pair
                // mapping.
                let event = Event {
                    data: EventData::MappingStart {
                        anchor: None,
                        tag: None,
                        style: ContainerStyle::Flow,
                    },
                    start_mark: token.start_mark,
                    end_mark: token.end_mark,
                };
                self.state = ParserState::FlowSeqPairKey;
                self.skip_token();
                return Ok(event);
            } else if !matches!(token.data, TokenData::FlowSequenceEnd) {
                self.states.push(ParserState::FlowSeqNext);
                return self.node_event(false, false);
            }
        }
        let event = Event {
            data: EventData::SequenceEnd,
            start_mark: token.start_mark,
            end_mark: token.end_mark,
        };
        self.state = self.states.pop().unwrap();
        let _ = self.marks.pop();
        self.skip_token();
        Ok(event)
    }

    fn flow_seq_pair_key_event(&mut self) -> Result<Event, ParseError> {
        let token = self.peek_token()?;
        if matches!(
            token.data,
            TokenData::Value | TokenData::FlowEntry | TokenData::FlowSequenceEnd
        ) {
            Err(ParseError::EmptyKey {
                mark: token.start_mark,
            })
        } else {
            self.states.push(ParserState::FlowSeqPairValue);
            self.node_event(false, false)
        }
    }

    fn flow_seq_pair_value_event(&mut self) -> Result<Event, ParseError> {
        let token = self.peek_token()?;
        if let TokenData::Value = token.data {
            self.skip_token();
            let token = self.peek_token()?;
            if !matches!(
                token.data,
                TokenData::FlowEntry | TokenData::FlowSequenceEnd
            ) {
                self.states.push(ParserState::FlowSeqPairClose);
                return self.node_event(false, false);
            }
        }
        let token = self.peek_token()?;
        let mark = token.start_mark;
        self.state = ParserState::FlowSeqPairClose;
        Ok(Self::null_event(mark))
    }

    fn flow_seq_pair_close_event(&mut self) -> Result<Event, ParseError> {
        let token = self.peek_token()?;
        let start_mark = token.start_mark;
        let end_mark = token.end_mark;
        self.state = ParserState::FlowSeqNext;
        Ok(Event {
            data: EventData::MappingEnd,
            start_mark,
            end_mark,
        })
    }

    fn flow_map_key_event(&mut self, first: bool) -> Result<Event, ParseError> {
        if first {
            let token = self.peek_token()?;
            let mark = token.start_mark;
            self.marks.push(mark);
            self.skip_token();
        }

        let mut token = self.peek_token()?;
        if !matches!(token.data, TokenData::FlowMappingEnd) {
            if !first {
                if let TokenData::FlowEntry = token.data {
                    self.skip_token();
                    token = self.peek_token()?;
                } else {
                    let token_mark = token.start_mark;
                    let mark = self.marks.pop().unwrap();
                    return Self::fail_in(
                        "while reading a flow mapping",
                        mark,
                        "pairs are separated by ',' and the mapping closes with '}'",
                        token_mark,
                    );
                }
            }
            if let TokenData::Key = token.data {
                let mark = token.end_mark;
                self.skip_token();
                let token = self.peek_token()?;
                if !matches!(
                    token.data,
                    TokenData::Value | TokenData::FlowEntry | TokenData::FlowMappingEnd
                ) {
                    self.states.push(ParserState::FlowMapValue);
                    return self.node_event(false, false);
                }
                return Err(ParseError::EmptyKey { mark });
            } else if !matches!(token.data, TokenData::FlowMappingEnd) {
                // A bare entry is a key whose value was left out.
                self.states.push(ParserState::FlowMapMissingValue);
                return self.node_event(false, false);
            }
        }
        let event = Event {
            data: EventData::MappingEnd,
            start_mark: token.start_mark,
            end_mark: token.end_mark,
        };
        self.state = self.states.pop().unwrap();
        let _ = self.marks.pop();
        self.skip_token();
        Ok(event)
    }

    fn flow_map_value_event(&mut self, missing: bool) -> Result<Event, ParseError> {
        let token = self.peek_token()?;
        if missing {
            let mark = token.start_mark;
            self.state = ParserState::FlowMapKey;
            return Ok(Self::null_event(mark));
        }
        if let TokenData::Value = token.data {
            self.skip_token();
            let token = self.peek_token()?;
            if !matches!(token.data, TokenData::FlowEntry | TokenData::FlowMappingEnd) {
                self.states.push(ParserState::FlowMapKey);
                return self.node_event(false, false);
            }
        }
        let token = self.peek_token()?;
        let mark = token.start_mark;
        self.state = ParserState::FlowMapKey;
        Ok(Self::null_event(mark))
    }

    /// The stand-in for an omitted node: a plain empty scalar, which the
    /// composer resolves to null.
    fn null_event(mark: Mark) -> Event {
        Event {
            data: EventData::Scalar {
                anchor: None,
                tag: None,
                value: String::new(),
                style: ScalarStyle::Plain,
            },
            start_mark: mark,
            end_mark: mark,
        }
    }

    /// Consume the directives ahead of a document and install the handle
    /// table for it, with `!` and `!!` always present.
    fn collect_directives(
        &mut self,
        version_directive_ref: Option<&mut Option<VersionDirective>>,
        tag_directives_ref: Option<&mut Vec<TagDirective>>,
    ) -> Result<(), ParseError> {
        let default_tag_directives: [TagDirective; 2] = [
            TagDirective {
                handle: String::from("!"),
                prefix: String::from("!"),
            },
            TagDirective {
                handle: String::from("!!"),
                prefix: String::from("tag:yaml.org,2002:"),
            },
        ];
        let mut version_directive: Option<VersionDirective> = None;
        let mut tag_directives = Vec::new();

        let mut token = self.peek_token_mut()?;
        loop {
            if !matches!(
                token.data,
                TokenData::VersionDirective { .. } | TokenData::TagDirective { .. }
            ) {
                break;
            }
            if let TokenData::VersionDirective { major, minor } = &token.data {
                let mark = token.start_mark;
                if version_directive.is_some() {
                    return Self::fail("a document may carry only one %YAML directive", mark);
                } else if *major != 1 || *minor != 1 && *minor != 2 {
                    return Self::fail("only YAML 1.1 and 1.2 are supported", mark);
                }
                version_directive = Some(VersionDirective {
                    major: *major,
                    minor: *minor,
                });
            } else if let TokenData::TagDirective { handle, prefix } = &mut token.data {
                let value = TagDirective {
                    handle: std::mem::take(handle),
                    prefix: std::mem::take(prefix),
                };
                let mark = token.start_mark;
                self.declare_tag_handle(value.clone(), false, mark)?;
                tag_directives.push(value);
            }
            self.skip_token();
            token = self.peek_token_mut()?;
        }

        let start_mark = token.start_mark;
        for default_tag_directive in default_tag_directives {
            self.declare_tag_handle(default_tag_directive, true, start_mark)?;
        }

        if let Some(version_directive_ref) = version_directive_ref {
            *version_directive_ref = version_directive;
        }
        if let Some(tag_directives_ref) = tag_directives_ref {
            *tag_directives_ref = tag_directives;
        }
        Ok(())
    }

    fn declare_tag_handle(
        &mut self,
        value: TagDirective,
        allow_duplicates: bool,
        mark: Mark,
    ) -> Result<(), ParseError> {
        for tag_directive in &self.tag_directives {
            if value.handle == tag_directive.handle {
                if allow_duplicates {
                    return Ok(());
                }
                return Self::fail("the %TAG handle is already declared for this document", mark);
            }
        }
        self.tag_directives.push(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(input: &str) -> Result<Vec<EventData>, ParseError> {
        let mut parser = Parser::new(Source::from(input))?;
        let mut out = Vec::new();
        loop {
            let event = parser.parse()?;
            let is_end = matches!(event.data, EventData::StreamEnd);
            out.push(event.data);
            if is_end {
                return Ok(out);
            }
        }
    }

    fn scalar(value: &str, style: ScalarStyle) -> EventData {
        EventData::Scalar {
            anchor: None,
            tag: None,
            value: String::from(value),
            style,
        }
    }

    #[test]
    fn implicit_document_with_mapping() {
        let events = events("a: 1\n").unwrap();
        assert_eq!(
            events,
            vec![
                EventData::StreamStart,
                EventData::DocumentStart {
                    version_directive: None,
                    tag_directives: Vec::new(),
                    implicit: true,
                },
                EventData::MappingStart {
                    anchor: None,
                    tag: None,
                    style: ContainerStyle::Block,
                },
                scalar("a", ScalarStyle::Plain),
                scalar("1", ScalarStyle::Plain),
                EventData::MappingEnd,
                EventData::DocumentEnd { implicit: true },
                EventData::StreamEnd,
            ]
        );
    }

    #[test]
    fn tag_handle_resolution() {
        let events = events("%TAG !e! tag:example.com,2024:\n---\n!e!foo bar\n").unwrap();
        assert!(events.iter().any(|event| matches!(
            event,
            EventData::Scalar { tag: Some(tag), .. } if tag == "tag:example.com,2024:foo"
        )));
    }

    #[test]
    fn undeclared_tag_handle_fails() {
        assert!(matches!(
            events("!e!foo bar\n"),
            Err(ParseError::ProblemWithContext { .. })
        ));
    }

    #[test]
    fn flow_single_pair_mapping_inside_sequence() {
        let events = events("[a: b]\n").unwrap();
        assert_eq!(
            events,
            vec![
                EventData::StreamStart,
                EventData::DocumentStart {
                    version_directive: None,
                    tag_directives: Vec::new(),
                    implicit: true,
                },
                EventData::SequenceStart {
                    anchor: None,
                    tag: None,
                    style: ContainerStyle::Flow,
                },
                EventData::MappingStart {
                    anchor: None,
                    tag: None,
                    style: ContainerStyle::Flow,
                },
                scalar("a", ScalarStyle::Plain),
                scalar("b", ScalarStyle::Plain),
                EventData::MappingEnd,
                EventData::SequenceEnd,
                EventData::DocumentEnd { implicit: true },
                EventData::StreamEnd,
            ]
        );
    }

    #[test]
    fn explicit_key_without_content_fails() {
        assert!(matches!(
            events("?\n: v\n"),
            Err(ParseError::EmptyKey { .. })
        ));
    }

    #[test]
    fn duplicate_version_directive_fails() {
        assert!(matches!(
            events("%YAML 1.2\n%YAML 1.2\n---\nx\n"),
            Err(ParseError::Problem { .. })
        ));
    }

    #[test]
    fn omitted_block_mapping_value_is_empty_scalar() {
        let events = events("a:\nb: 1\n").unwrap();
        assert_eq!(events[4], scalar("", ScalarStyle::Plain));
    }
}
