use std::collections::VecDeque;

use crate::error::{EncodingError, ScanError};
use crate::macros::{is_blankz, is_break, is_uri_char, vecdeque_starts_with};
use crate::source::Source;
use crate::token::{Token, TokenData};
use crate::{encoding, Mark, ScalarStyle};

/// Block scalar chomping: what happens to trailing line breaks.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Chomping {
    /// `-`: drop the final break and any trailing empty lines.
    Strip,
    /// The default: keep exactly one trailing break.
    Clip,
    /// `+`: keep every trailing break.
    Keep,
}

/// A potential simple key, remembered so the `:` that confirms it can insert
/// the KEY token retroactively.
#[derive(Copy, Clone)]
struct SimpleKey {
    possible: bool,
    required: bool,
    token_number: usize,
    mark: Mark,
}

impl SimpleKey {
    fn empty() -> SimpleKey {
        SimpleKey {
            possible: false,
            required: false,
            token_number: 0,
            mark: Mark::default(),
        }
    }
}

/// The pull lexer. Each fetch produces one or more tokens into the queue and
/// advances the position tracker.
pub(crate) struct Scanner {
    /// The decoded content, consumed from the front.
    buffer: VecDeque<char>,
    /// The current position.
    pub(crate) mark: Mark,
    stream_start_produced: bool,
    pub(crate) stream_end_produced: bool,
    /// The number of unclosed `[` and `{` indicators.
    flow_level: i32,
    pub(crate) tokens: VecDeque<Token>,
    pub(crate) tokens_parsed: usize,
    pub(crate) token_available: bool,
    /// The indentation column of the innermost open block collection, or -1.
    indent: i64,
    indents: Vec<i64>,
    simple_key_allowed: bool,
    simple_keys: Vec<SimpleKey>,
}

impl Scanner {
    pub(crate) fn new(source: Source) -> Result<Scanner, EncodingError> {
        let (decoded, _encoding) = encoding::decode(&source.into_bytes())?;
        Ok(Scanner {
            buffer: decoded.chars().collect(),
            mark: Mark::default(),
            stream_start_produced: false,
            stream_end_produced: false,
            flow_level: 0,
            tokens: VecDeque::with_capacity(16),
            tokens_parsed: 0,
            token_available: false,
            indent: -1,
            indents: Vec::with_capacity(16),
            simple_key_allowed: false,
            simple_keys: Vec::with_capacity(16),
        })
    }

    /// Pop one character, advancing the byte offset and column.
    fn skip(&mut self) {
        let popped = self.buffer.pop_front().expect("unexpected end of input");
        self.mark.index += popped.len_utf8() as u64;
        self.mark.column += 1;
    }

    /// Pop one line break, normalizing CR LF, advancing the line counter.
    fn skip_line(&mut self) {
        if vecdeque_starts_with(&self.buffer, &['\r', '\n']) {
            self.mark.index += 2;
            self.mark.column = 0;
            self.mark.line += 1;
            self.buffer.drain(0..2);
        } else if let Some(front) = self.buffer.front().copied() {
            if is_break(front) {
                self.mark.index += front.len_utf8() as u64;
                self.mark.column = 0;
                self.mark.line += 1;
                self.buffer.pop_front();
            }
        }
    }

    /// Pop one character into `string`.
    fn read_into(&mut self, string: &mut String) {
        let popped = self.buffer.pop_front().expect("unexpected end of input");
        string.push(popped);
        self.mark.index += popped.len_utf8() as u64;
        self.mark.column += 1;
    }

    /// Pop one line break into `string` as `\n` (Unicode breaks are kept
    /// verbatim), advancing the line counter.
    fn read_break_into(&mut self, string: &mut String) {
        if vecdeque_starts_with(&self.buffer, &['\r', '\n']) {
            string.push('\n');
            self.buffer.drain(0..2);
            self.mark.index += 2;
            self.mark.column = 0;
            self.mark.line += 1;
        } else {
            let Some(front) = self.buffer.front().copied() else {
                panic!("unexpected end of input");
            };
            if is_break(front) {
                self.buffer.pop_front();
                if front.len_utf8() == 3 {
                    string.push(front);
                } else {
                    string.push('\n');
                }
                self.mark.index += front.len_utf8() as u64;
                self.mark.column = 0;
                self.mark.line += 1;
            }
        }
    }

    fn error<T>(
        &self,
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
    ) -> Result<T, ScanError> {
        Err(ScanError::Problem {
            context,
            context_mark,
            problem,
            problem_mark: self.mark,
        })
    }

    fn indentation_error<T>(
        &self,
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
    ) -> Result<T, ScanError> {
        Err(ScanError::InvalidIndentation {
            context,
            context_mark,
            problem,
            problem_mark: self.mark,
        })
    }

    /// Produce the next token from the queue, fetching more if needed.
    #[cfg(test)]
    pub(crate) fn next(&mut self) -> Result<Token, ScanError> {
        if self.stream_end_produced {
            return Ok(Token {
                data: TokenData::StreamEnd,
                start_mark: self.mark,
                end_mark: self.mark,
            });
        }
        if !self.token_available {
            self.fetch_more_tokens()?;
        }
        let token = self
            .tokens
            .pop_front()
            .expect("no more tokens, but stream-end was not produced");
        self.token_available = false;
        self.tokens_parsed += 1;
        if let TokenData::StreamEnd = &token.data {
            self.stream_end_produced = true;
        }
        Ok(token)
    }

    /// Fetch tokens until one can be consumed without breaking a pending
    /// simple key.
    pub(crate) fn fetch_more_tokens(&mut self) -> Result<(), ScanError> {
        loop {
            let mut need_more_tokens = self.tokens.is_empty();
            if !need_more_tokens {
                self.stale_simple_keys()?;
                for simple_key in &self.simple_keys {
                    if simple_key.possible && simple_key.token_number == self.tokens_parsed {
                        need_more_tokens = true;
                        break;
                    }
                }
            }
            if !need_more_tokens {
                break;
            }
            self.fetch_next_token()?;
        }
        self.token_available = true;
        Ok(())
    }

    fn fetch_next_token(&mut self) -> Result<(), ScanError> {
        if !self.stream_start_produced {
            self.fetch_stream_start();
            return Ok(());
        }
        self.scan_to_next_token()?;
        self.stale_simple_keys()?;
        self.unroll_indent(self.mark.column as i64);
        if IS_Z!(self.buffer) {
            return self.fetch_stream_end();
        }
        if self.mark.column == 0 && CHECK!(self.buffer, '%') {
            return self.fetch_directive();
        }
        if self.mark.column == 0
            && CHECK_AT!(self.buffer, '-', 0)
            && CHECK_AT!(self.buffer, '-', 1)
            && CHECK_AT!(self.buffer, '-', 2)
            && is_blankz(self.buffer.get(3).copied())
        {
            return self.fetch_document_indicator(TokenData::DocumentStart);
        }
        if self.mark.column == 0
            && CHECK_AT!(self.buffer, '.', 0)
            && CHECK_AT!(self.buffer, '.', 1)
            && CHECK_AT!(self.buffer, '.', 2)
            && is_blankz(self.buffer.get(3).copied())
        {
            return self.fetch_document_indicator(TokenData::DocumentEnd);
        }
        if CHECK!(self.buffer, '[') {
            return self.fetch_flow_collection_start(TokenData::FlowSequenceStart);
        }
        if CHECK!(self.buffer, '{') {
            return self.fetch_flow_collection_start(TokenData::FlowMappingStart);
        }
        if CHECK!(self.buffer, ']') {
            return self.fetch_flow_collection_end(TokenData::FlowSequenceEnd);
        }
        if CHECK!(self.buffer, '}') {
            return self.fetch_flow_collection_end(TokenData::FlowMappingEnd);
        }
        if CHECK!(self.buffer, ',') {
            return self.fetch_flow_entry();
        }
        if CHECK!(self.buffer, '-') && IS_BLANKZ_AT!(self.buffer, 1) {
            return self.fetch_block_entry();
        }
        if CHECK!(self.buffer, '?') && (self.flow_level != 0 || IS_BLANKZ_AT!(self.buffer, 1)) {
            return self.fetch_key();
        }
        if CHECK!(self.buffer, ':') && (self.flow_level != 0 || IS_BLANKZ_AT!(self.buffer, 1)) {
            return self.fetch_value();
        }
        if CHECK!(self.buffer, '*') {
            return self.fetch_anchor(true);
        }
        if CHECK!(self.buffer, '&') {
            return self.fetch_anchor(false);
        }
        if CHECK!(self.buffer, '!') {
            return self.fetch_tag();
        }
        if CHECK!(self.buffer, '|') && self.flow_level == 0 {
            return self.fetch_block_scalar(true);
        }
        if CHECK!(self.buffer, '>') && self.flow_level == 0 {
            return self.fetch_block_scalar(false);
        }
        if CHECK!(self.buffer, '\'') {
            return self.fetch_flow_scalar(true);
        }
        if CHECK!(self.buffer, '"') {
            return self.fetch_flow_scalar(false);
        }
        if !(IS_BLANKZ!(self.buffer)
            || CHECK!(self.buffer, '-')
            || CHECK!(self.buffer, '?')
            || CHECK!(self.buffer, ':')
            || CHECK!(self.buffer, ',')
            || CHECK!(self.buffer, '[')
            || CHECK!(self.buffer, ']')
            || CHECK!(self.buffer, '{')
            || CHECK!(self.buffer, '}')
            || CHECK!(self.buffer, '#')
            || CHECK!(self.buffer, '&')
            || CHECK!(self.buffer, '*')
            || CHECK!(self.buffer, '!')
            || CHECK!(self.buffer, '|')
            || CHECK!(self.buffer, '>')
            || CHECK!(self.buffer, '\'')
            || CHECK!(self.buffer, '"')
            || CHECK!(self.buffer, '%')
            || CHECK!(self.buffer, '@')
            || CHECK!(self.buffer, '`'))
            || CHECK!(self.buffer, '-') && !IS_BLANK_AT!(self.buffer, 1)
            || self.flow_level == 0
                && (CHECK!(self.buffer, '?') || CHECK!(self.buffer, ':'))
                && !IS_BLANKZ_AT!(self.buffer, 1)
        {
            return self.fetch_plain_scalar();
        }
        self.error(
            "while scanning for the next token",
            self.mark,
            "found character that cannot start any token",
        )
    }

    /// Expire simple keys whose line ended or that grew too long.
    fn stale_simple_keys(&mut self) -> Result<(), ScanError> {
        for simple_key in &mut self.simple_keys {
            let mark = simple_key.mark;
            if simple_key.possible
                && (mark.line < self.mark.line || mark.index + 1024 < self.mark.index)
            {
                if simple_key.required {
                    return Err(ScanError::InvalidIndentation {
                        context: "while scanning a simple key",
                        context_mark: mark,
                        problem: "could not find expected ':'",
                        problem_mark: self.mark,
                    });
                }
                simple_key.possible = false;
            }
        }
        Ok(())
    }

    fn save_simple_key(&mut self) -> Result<(), ScanError> {
        let required = self.flow_level == 0 && self.indent == self.mark.column as i64;
        if self.simple_key_allowed {
            let simple_key = SimpleKey {
                possible: true,
                required,
                token_number: self.tokens_parsed + self.tokens.len(),
                mark: self.mark,
            };
            self.remove_simple_key()?;
            *self.simple_keys.last_mut().unwrap() = simple_key;
        }
        Ok(())
    }

    fn remove_simple_key(&mut self) -> Result<(), ScanError> {
        let simple_key = self.simple_keys.last_mut().unwrap();
        if simple_key.possible && simple_key.required {
            let mark = simple_key.mark;
            return Err(ScanError::InvalidIndentation {
                context: "while scanning a simple key",
                context_mark: mark,
                problem: "could not find expected ':'",
                problem_mark: self.mark,
            });
        }
        simple_key.possible = false;
        Ok(())
    }

    fn increase_flow_level(&mut self) {
        self.simple_keys.push(SimpleKey::empty());
        assert!(self.flow_level != i32::MAX, "flow level overflow");
        self.flow_level += 1;
    }

    fn decrease_flow_level(&mut self) {
        if self.flow_level != 0 {
            self.flow_level -= 1;
            let _ = self.simple_keys.pop();
        }
    }

    /// Open a block collection at `column`, emitting its start token. When
    /// `number` refers back to a saved simple key, the token is inserted
    /// before it.
    fn roll_indent(&mut self, column: i64, number: Option<usize>, data: TokenData, mark: Mark) {
        if self.flow_level != 0 {
            return;
        }
        if self.indent < column {
            self.indents.push(self.indent);
            self.indent = column;
            let token = Token {
                data,
                start_mark: mark,
                end_mark: mark,
            };
            if let Some(number) = number {
                self.tokens.insert(number - self.tokens_parsed, token);
            } else {
                self.tokens.push_back(token);
            }
        }
    }

    /// Close block collections opened deeper than `column`.
    fn unroll_indent(&mut self, column: i64) {
        if self.flow_level != 0 {
            return;
        }
        while self.indent > column {
            let token = Token {
                data: TokenData::BlockEnd,
                start_mark: self.mark,
                end_mark: self.mark,
            };
            self.tokens.push_back(token);
            self.indent = self.indents.pop().unwrap();
        }
    }

    fn fetch_stream_start(&mut self) {
        self.indent = -1;
        self.simple_keys.push(SimpleKey::empty());
        self.simple_key_allowed = true;
        self.stream_start_produced = true;
        let token = Token {
            data: TokenData::StreamStart,
            start_mark: self.mark,
            end_mark: self.mark,
        };
        self.tokens.push_back(token);
    }

    fn fetch_stream_end(&mut self) -> Result<(), ScanError> {
        if self.mark.column != 0 {
            self.mark.column = 0;
            self.mark.line += 1;
        }
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let token = Token {
            data: TokenData::StreamEnd,
            start_mark: self.mark,
            end_mark: self.mark,
        };
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_directive(&mut self) -> Result<(), ScanError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_directive()?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_document_indicator(&mut self, data: TokenData) -> Result<(), ScanError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let start_mark = self.mark;
        self.skip();
        self.skip();
        self.skip();
        let end_mark = self.mark;
        self.tokens.push_back(Token {
            data,
            start_mark,
            end_mark,
        });
        Ok(())
    }

    fn fetch_flow_collection_start(&mut self, data: TokenData) -> Result<(), ScanError> {
        self.save_simple_key()?;
        self.increase_flow_level();
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        self.skip();
        let end_mark = self.mark;
        self.tokens.push_back(Token {
            data,
            start_mark,
            end_mark,
        });
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, data: TokenData) -> Result<(), ScanError> {
        self.remove_simple_key()?;
        self.decrease_flow_level();
        self.simple_key_allowed = false;
        let start_mark = self.mark;
        self.skip();
        let end_mark = self.mark;
        self.tokens.push_back(Token {
            data,
            start_mark,
            end_mark,
        });
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> Result<(), ScanError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        self.skip();
        let end_mark = self.mark;
        self.tokens.push_back(Token {
            data: TokenData::FlowEntry,
            start_mark,
            end_mark,
        });
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<(), ScanError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return self.indentation_error(
                    "",
                    self.mark,
                    "block sequence entries are not allowed in this context",
                );
            }
            self.roll_indent(
                self.mark.column as i64,
                None,
                TokenData::BlockSequenceStart,
                self.mark,
            );
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        self.skip();
        let end_mark = self.mark;
        self.tokens.push_back(Token {
            data: TokenData::BlockEntry,
            start_mark,
            end_mark,
        });
        Ok(())
    }

    fn fetch_key(&mut self) -> Result<(), ScanError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return self.indentation_error(
                    "",
                    self.mark,
                    "mapping keys are not allowed in this context",
                );
            }
            self.roll_indent(
                self.mark.column as i64,
                None,
                TokenData::BlockMappingStart,
                self.mark,
            );
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = self.flow_level == 0;
        let start_mark = self.mark;
        self.skip();
        let end_mark = self.mark;
        self.tokens.push_back(Token {
            data: TokenData::Key,
            start_mark,
            end_mark,
        });
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<(), ScanError> {
        let simple_key = self.simple_keys.last_mut().unwrap();
        if simple_key.possible {
            let token = Token {
                data: TokenData::Key,
                start_mark: simple_key.mark,
                end_mark: simple_key.mark,
            };
            let token_number = simple_key.token_number;
            let mark = simple_key.mark;
            simple_key.possible = false;
            self.tokens.insert(token_number - self.tokens_parsed, token);
            self.roll_indent(
                mark.column as i64,
                Some(token_number),
                TokenData::BlockMappingStart,
                mark,
            );
            self.simple_key_allowed = false;
        } else {
            if self.flow_level == 0 {
                if !self.simple_key_allowed {
                    return self.indentation_error(
                        "",
                        self.mark,
                        "mapping values are not allowed in this context",
                    );
                }
                self.roll_indent(
                    self.mark.column as i64,
                    None,
                    TokenData::BlockMappingStart,
                    self.mark,
                );
            }
            self.simple_key_allowed = self.flow_level == 0;
        }
        let start_mark = self.mark;
        self.skip();
        let end_mark = self.mark;
        self.tokens.push_back(Token {
            data: TokenData::Value,
            start_mark,
            end_mark,
        });
        Ok(())
    }

    fn fetch_anchor(&mut self, alias: bool) -> Result<(), ScanError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_anchor(alias)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_tag(&mut self) -> Result<(), ScanError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_tag()?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_block_scalar(&mut self, literal: bool) -> Result<(), ScanError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let token = self.scan_block_scalar(literal)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_flow_scalar(&mut self, single: bool) -> Result<(), ScanError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_flow_scalar(single)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_plain_scalar(&mut self) -> Result<(), ScanError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_plain_scalar()?;
        self.tokens.push_back(token);
        Ok(())
    }

    /// Skip whitespace, comments and line breaks ahead of the next token.
    fn scan_to_next_token(&mut self) -> Result<(), ScanError> {
        loop {
            if self.mark.column == 0 && IS_BOM!(self.buffer) {
                self.skip();
            }
            while CHECK!(self.buffer, ' ')
                || (self.flow_level != 0 || !self.simple_key_allowed)
                    && CHECK!(self.buffer, '\t')
            {
                self.skip();
            }
            if CHECK!(self.buffer, '#') {
                while !IS_BREAKZ!(self.buffer) {
                    self.skip();
                }
            }
            if !IS_BREAK!(self.buffer) {
                break;
            }
            self.skip_line();
            if self.flow_level == 0 {
                self.simple_key_allowed = true;
            }
        }
        Ok(())
    }

    fn scan_directive(&mut self) -> Result<Token, ScanError> {
        let start_mark = self.mark;
        self.skip();
        let name = self.scan_directive_name(start_mark)?;
        let token = if name == "YAML" {
            let (major, minor) = self.scan_version_directive_value(start_mark)?;
            Token {
                data: TokenData::VersionDirective { major, minor },
                start_mark,
                end_mark: self.mark,
            }
        } else if name == "TAG" {
            let (handle, prefix) = self.scan_tag_directive_value(start_mark)?;
            Token {
                data: TokenData::TagDirective { handle, prefix },
                start_mark,
                end_mark: self.mark,
            }
        } else {
            return self.error(
                "while scanning a directive",
                start_mark,
                "found unknown directive name",
            );
        };
        while IS_BLANK!(self.buffer) {
            self.skip();
        }
        if CHECK!(self.buffer, '#') {
            while !IS_BREAKZ!(self.buffer) {
                self.skip();
            }
        }
        if !IS_BREAKZ!(self.buffer) {
            return self.error(
                "while scanning a directive",
                start_mark,
                "did not find expected comment or line break",
            );
        }
        if IS_BREAK!(self.buffer) {
            self.skip_line();
        }
        Ok(token)
    }

    fn scan_directive_name(&mut self, start_mark: Mark) -> Result<String, ScanError> {
        let mut string = String::new();
        while IS_ALPHA!(self.buffer) {
            self.read_into(&mut string);
        }
        if string.is_empty() {
            self.error(
                "while scanning a directive",
                start_mark,
                "could not find expected directive name",
            )
        } else if !IS_BLANKZ!(self.buffer) {
            self.error(
                "while scanning a directive",
                start_mark,
                "found unexpected non-alphabetical character",
            )
        } else {
            Ok(string)
        }
    }

    fn scan_version_directive_value(&mut self, start_mark: Mark) -> Result<(i32, i32), ScanError> {
        while IS_BLANK!(self.buffer) {
            self.skip();
        }
        let major = self.scan_version_directive_number(start_mark)?;
        if !CHECK!(self.buffer, '.') {
            return self.error(
                "while scanning a %YAML directive",
                start_mark,
                "did not find expected digit or '.' character",
            );
        }
        self.skip();
        let minor = self.scan_version_directive_number(start_mark)?;
        Ok((major, minor))
    }

    fn scan_version_directive_number(&mut self, start_mark: Mark) -> Result<i32, ScanError> {
        const MAX_NUMBER_LENGTH: usize = 9;
        let mut digits = String::new();
        while IS_DIGIT!(self.buffer) {
            if digits.len() >= MAX_NUMBER_LENGTH {
                return self.error(
                    "while scanning a %YAML directive",
                    start_mark,
                    "found extremely long version number",
                );
            }
            self.read_into(&mut digits);
        }
        if digits.is_empty() {
            return self.error(
                "while scanning a %YAML directive",
                start_mark,
                "did not find expected version number",
            );
        }
        let number = atoi::atoi::<i32>(digits.as_bytes()).expect("digits fit an i32");
        Ok(number)
    }

    fn scan_tag_directive_value(&mut self, start_mark: Mark) -> Result<(String, String), ScanError> {
        while IS_BLANK!(self.buffer) {
            self.skip();
        }
        let handle = self.scan_tag_handle(true, start_mark)?;
        if !IS_BLANK!(self.buffer) {
            return self.error(
                "while scanning a %TAG directive",
                start_mark,
                "did not find expected whitespace",
            );
        }
        while IS_BLANK!(self.buffer) {
            self.skip();
        }
        let prefix = self.scan_tag_uri(true, true, None, start_mark)?;
        if !IS_BLANKZ!(self.buffer) {
            return self.error(
                "while scanning a %TAG directive",
                start_mark,
                "did not find expected whitespace or line break",
            );
        }
        Ok((handle, prefix))
    }

    fn scan_anchor(&mut self, alias: bool) -> Result<Token, ScanError> {
        let mut string = String::new();
        let start_mark = self.mark;
        self.skip();
        while IS_ALPHA!(self.buffer) {
            self.read_into(&mut string);
        }
        let end_mark = self.mark;
        if string.is_empty()
            || !(IS_BLANKZ!(self.buffer)
                || CHECK!(self.buffer, '?')
                || CHECK!(self.buffer, ':')
                || CHECK!(self.buffer, ',')
                || CHECK!(self.buffer, ']')
                || CHECK!(self.buffer, '}')
                || CHECK!(self.buffer, '%')
                || CHECK!(self.buffer, '@')
                || CHECK!(self.buffer, '`'))
        {
            return self.error(
                if alias {
                    "while scanning an alias"
                } else {
                    "while scanning an anchor"
                },
                start_mark,
                "did not find expected alphabetic or numeric character",
            );
        }
        Ok(Token {
            data: if alias {
                TokenData::Alias { value: string }
            } else {
                TokenData::Anchor { value: string }
            },
            start_mark,
            end_mark,
        })
    }

    fn scan_tag(&mut self) -> Result<Token, ScanError> {
        let start_mark = self.mark;
        let mut handle;
        let mut suffix;
        if CHECK_AT!(self.buffer, '<', 1) {
            // Verbatim tag: !<uri>
            handle = String::new();
            self.skip();
            self.skip();
            suffix = self.scan_tag_uri(true, false, None, start_mark)?;
            if !CHECK!(self.buffer, '>') {
                return self.error(
                    "while scanning a tag",
                    start_mark,
                    "did not find the expected '>'",
                );
            }
            self.skip();
        } else {
            handle = self.scan_tag_handle(false, start_mark)?;
            if handle.starts_with('!') && handle.len() > 1 && handle.ends_with('!') {
                suffix = self.scan_tag_uri(false, false, None, start_mark)?;
            } else {
                suffix = self.scan_tag_uri(false, false, Some(&handle), start_mark)?;
                handle = String::from("!");
                if suffix.is_empty() {
                    std::mem::swap(&mut handle, &mut suffix);
                }
            }
        }
        if !IS_BLANKZ!(self.buffer)
            && !(self.flow_level != 0
                && (CHECK!(self.buffer, ',')
                    || CHECK!(self.buffer, ']')
                    || CHECK!(self.buffer, '}')))
        {
            return Err(ScanError::InvalidCharacterInTag {
                context_mark: start_mark,
                problem_mark: self.mark,
            });
        }
        Ok(Token {
            data: TokenData::Tag { handle, suffix },
            start_mark,
            end_mark: self.mark,
        })
    }

    fn scan_tag_handle(&mut self, directive: bool, start_mark: Mark) -> Result<String, ScanError> {
        let mut string = String::new();
        if !CHECK!(self.buffer, '!') {
            return self.error(
                if directive {
                    "while scanning a tag directive"
                } else {
                    "while scanning a tag"
                },
                start_mark,
                "did not find expected '!'",
            );
        }
        self.read_into(&mut string);
        while IS_ALPHA!(self.buffer) {
            self.read_into(&mut string);
        }
        if CHECK!(self.buffer, '!') {
            self.read_into(&mut string);
        } else if directive && string != "!" {
            // A %TAG handle is either "!", "!!" or "!word!".
            return self.error(
                "while parsing a tag directive",
                start_mark,
                "did not find expected '!'",
            );
        }
        Ok(string)
    }

    /// Scan a tag suffix or `%TAG` prefix, validating against the URI
    /// character set. `uri_char` widens the set with the flow indicators and
    /// `#`, which verbatim tags and directive prefixes may contain.
    fn scan_tag_uri(
        &mut self,
        uri_char: bool,
        directive: bool,
        head: Option<&str>,
        start_mark: Mark,
    ) -> Result<String, ScanError> {
        let head = head.unwrap_or("");
        let mut length = head.len();
        // The handle beyond the leading '!' is part of the suffix when the
        // handle turns out not to be declared.
        let mut string = if length > 1 {
            String::from(&head[1..])
        } else {
            String::new()
        };
        loop {
            let Some(ch) = self.buffer.front().copied() else {
                break;
            };
            if !is_uri_char(ch) {
                break;
            }
            if !uri_char && matches!(ch, ',' | '[' | ']' | '#') {
                break;
            }
            if ch == '%' {
                self.scan_uri_escapes(start_mark, &mut string)?;
            } else {
                self.read_into(&mut string);
            }
            length += 1;
        }
        if length == 0 {
            return self.error(
                if directive {
                    "while parsing a %TAG directive"
                } else {
                    "while parsing a tag"
                },
                start_mark,
                "did not find expected tag URI",
            );
        }
        Ok(string)
    }

    /// Decode a run of `%HH` escapes into the UTF-8 character they encode.
    fn scan_uri_escapes(
        &mut self,
        start_mark: Mark,
        string: &mut String,
    ) -> Result<(), ScanError> {
        let mut bytes = Vec::with_capacity(4);
        let mut width = 0usize;
        loop {
            if !(CHECK!(self.buffer, '%')
                && IS_HEX_AT!(self.buffer, 1)
                && IS_HEX_AT!(self.buffer, 2))
            {
                return Err(ScanError::InvalidCharacterInTag {
                    context_mark: start_mark,
                    problem_mark: self.mark,
                });
            }
            let octet = ((AS_HEX_AT!(self.buffer, 1) << 4) + AS_HEX_AT!(self.buffer, 2)) as u8;
            if bytes.is_empty() {
                width = if octet & 0x80 == 0 {
                    1
                } else if octet & 0xE0 == 0xC0 {
                    2
                } else if octet & 0xF0 == 0xE0 {
                    3
                } else if octet & 0xF8 == 0xF0 {
                    4
                } else {
                    0
                };
                if width == 0 {
                    return Err(ScanError::InvalidEncoding {
                        problem: "found an incorrect leading UTF-8 octet in a URI escape",
                        problem_mark: self.mark,
                    });
                }
            } else if octet & 0xC0 != 0x80 {
                return Err(ScanError::InvalidEncoding {
                    problem: "found an incorrect trailing UTF-8 octet in a URI escape",
                    problem_mark: self.mark,
                });
            }
            bytes.push(octet);
            self.skip();
            self.skip();
            self.skip();
            if bytes.len() == width {
                break;
            }
        }
        match std::str::from_utf8(&bytes) {
            Ok(decoded) => {
                string.push_str(decoded);
                Ok(())
            }
            Err(_) => Err(ScanError::InvalidEncoding {
                problem: "URI escapes do not form a valid UTF-8 sequence",
                problem_mark: self.mark,
            }),
        }
    }

    fn scan_block_scalar(&mut self, literal: bool) -> Result<Token, ScanError> {
        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut chomping = Chomping::Clip;
        let mut increment: i64 = 0;
        let mut indent: i64 = 0;
        let mut leading_blank = false;
        let start_mark = self.mark;
        self.skip();

        // Header: chomping indicator and explicit indentation indicator, in
        // either order.
        if CHECK!(self.buffer, '+') || CHECK!(self.buffer, '-') {
            chomping = if CHECK!(self.buffer, '+') {
                Chomping::Keep
            } else {
                Chomping::Strip
            };
            self.skip();
            if IS_DIGIT!(self.buffer) {
                if CHECK!(self.buffer, '0') {
                    return self.error(
                        "while scanning a block scalar",
                        start_mark,
                        "found an indentation indicator equal to 0",
                    );
                }
                increment = AS_DIGIT!(self.buffer) as i64;
                self.skip();
            }
        } else if IS_DIGIT!(self.buffer) {
            if CHECK!(self.buffer, '0') {
                return self.error(
                    "while scanning a block scalar",
                    start_mark,
                    "found an indentation indicator equal to 0",
                );
            }
            increment = AS_DIGIT!(self.buffer) as i64;
            self.skip();
            if CHECK!(self.buffer, '+') || CHECK!(self.buffer, '-') {
                chomping = if CHECK!(self.buffer, '+') {
                    Chomping::Keep
                } else {
                    Chomping::Strip
                };
                self.skip();
            }
        }

        while IS_BLANK!(self.buffer) {
            self.skip();
        }
        if CHECK!(self.buffer, '#') {
            while !IS_BREAKZ!(self.buffer) {
                self.skip();
            }
        }
        if !IS_BREAKZ!(self.buffer) {
            return self.error(
                "while scanning a block scalar",
                start_mark,
                "did not find expected comment or line break",
            );
        }
        if IS_BREAK!(self.buffer) {
            self.skip_line();
        }

        let mut end_mark = self.mark;
        if increment != 0 {
            indent = if self.indent >= 0 {
                self.indent + increment
            } else {
                increment
            };
        }
        self.scan_block_scalar_breaks(&mut indent, &mut trailing_breaks, start_mark, &mut end_mark)?;

        while self.mark.column as i64 == indent && !IS_Z!(self.buffer) {
            let trailing_blank = IS_BLANK!(self.buffer);
            if !literal && leading_break.starts_with('\n') && !leading_blank && !trailing_blank {
                if trailing_breaks.is_empty() {
                    string.push(' ');
                }
                leading_break.clear();
            } else {
                string.push_str(&leading_break);
                leading_break.clear();
            }
            string.push_str(&trailing_breaks);
            trailing_breaks.clear();
            leading_blank = IS_BLANK!(self.buffer);
            while !IS_BREAKZ!(self.buffer) {
                self.read_into(&mut string);
            }
            if IS_BREAK!(self.buffer) {
                self.read_break_into(&mut leading_break);
            }
            self.scan_block_scalar_breaks(
                &mut indent,
                &mut trailing_breaks,
                start_mark,
                &mut end_mark,
            )?;
        }

        if chomping != Chomping::Strip {
            string.push_str(&leading_break);
        }
        if chomping == Chomping::Keep {
            string.push_str(&trailing_breaks);
        }

        Ok(Token {
            data: TokenData::Scalar {
                value: string,
                style: if literal {
                    ScalarStyle::Literal
                } else {
                    ScalarStyle::Folded
                },
            },
            start_mark,
            end_mark,
        })
    }

    /// Consume indentation and empty lines between block scalar content
    /// lines, determining the content indent when none was given.
    fn scan_block_scalar_breaks(
        &mut self,
        indent: &mut i64,
        breaks: &mut String,
        start_mark: Mark,
        end_mark: &mut Mark,
    ) -> Result<(), ScanError> {
        let mut max_indent: i64 = 0;
        *end_mark = self.mark;
        loop {
            while (*indent == 0 || (self.mark.column as i64) < *indent) && IS_SPACE!(self.buffer) {
                self.skip();
            }
            if self.mark.column as i64 > max_indent {
                max_indent = self.mark.column as i64;
            }
            if (*indent == 0 || (self.mark.column as i64) < *indent) && IS_TAB!(self.buffer) {
                return self.indentation_error(
                    "while scanning a block scalar",
                    start_mark,
                    "found a tab character where an indentation space is expected",
                );
            }
            if !IS_BREAK!(self.buffer) {
                break;
            }
            self.read_break_into(breaks);
            *end_mark = self.mark;
        }
        if *indent == 0 {
            *indent = max_indent.max(self.indent + 1).max(1);
        }
        Ok(())
    }

    fn scan_flow_scalar(&mut self, single: bool) -> Result<Token, ScanError> {
        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut whitespaces = String::new();
        let mut leading_blanks;
        let start_mark = self.mark;
        self.skip();
        loop {
            if self.mark.column == 0
                && (CHECK_AT!(self.buffer, '-', 0)
                    && CHECK_AT!(self.buffer, '-', 1)
                    && CHECK_AT!(self.buffer, '-', 2)
                    || CHECK_AT!(self.buffer, '.', 0)
                        && CHECK_AT!(self.buffer, '.', 1)
                        && CHECK_AT!(self.buffer, '.', 2))
                && IS_BLANKZ_AT!(self.buffer, 3)
            {
                return Err(ScanError::UnterminatedString {
                    context_mark: start_mark,
                    problem_mark: self.mark,
                });
            }
            if IS_Z!(self.buffer) {
                return Err(ScanError::UnterminatedString {
                    context_mark: start_mark,
                    problem_mark: self.mark,
                });
            }
            leading_blanks = false;
            while !IS_BLANKZ!(self.buffer) {
                if single && CHECK_AT!(self.buffer, '\'', 0) && CHECK_AT!(self.buffer, '\'', 1) {
                    // An escaped single quote.
                    string.push('\'');
                    self.skip();
                    self.skip();
                    continue;
                }
                if CHECK!(self.buffer, if single { '\'' } else { '"' }) {
                    break;
                }
                if !single && CHECK!(self.buffer, '\\') && IS_BREAK_AT!(self.buffer, 1) {
                    // An escaped line break is removed along with the
                    // following indentation.
                    self.skip();
                    self.skip_line();
                    leading_blanks = true;
                    break;
                }
                if !single && CHECK!(self.buffer, '\\') {
                    self.scan_flow_scalar_escape(start_mark, &mut string)?;
                    continue;
                }
                self.read_into(&mut string);
            }
            if CHECK!(self.buffer, if single { '\'' } else { '"' }) {
                break;
            }
            while IS_BLANK!(self.buffer) || IS_BREAK!(self.buffer) {
                if IS_BLANK!(self.buffer) {
                    if leading_blanks {
                        self.skip();
                    } else {
                        self.read_into(&mut whitespaces);
                    }
                } else if leading_blanks {
                    self.read_break_into(&mut trailing_breaks);
                } else {
                    whitespaces.clear();
                    self.read_break_into(&mut leading_break);
                    leading_blanks = true;
                }
            }
            if leading_blanks {
                // Fold: a single break becomes a space, further empty lines
                // keep their breaks.
                if leading_break.starts_with('\n') {
                    if trailing_breaks.is_empty() {
                        string.push(' ');
                    } else {
                        string.push_str(&trailing_breaks);
                        trailing_breaks.clear();
                    }
                } else {
                    string.push_str(&leading_break);
                    string.push_str(&trailing_breaks);
                    trailing_breaks.clear();
                }
                leading_break.clear();
            } else {
                string.push_str(&whitespaces);
                whitespaces.clear();
            }
        }
        self.skip();
        Ok(Token {
            data: TokenData::Scalar {
                value: string,
                style: if single {
                    ScalarStyle::SingleQuoted
                } else {
                    ScalarStyle::DoubleQuoted
                },
            },
            start_mark,
            end_mark: self.mark,
        })
    }

    /// Decode one `\X` escape in a double-quoted scalar.
    fn scan_flow_scalar_escape(
        &mut self,
        start_mark: Mark,
        string: &mut String,
    ) -> Result<(), ScanError> {
        let mut code_length = 0usize;
        match self.buffer.get(1).copied() {
            Some('0') => string.push('\0'),
            Some('a') => string.push('\x07'),
            Some('b') => string.push('\x08'),
            Some('t' | '\t') => string.push('\t'),
            Some('n') => string.push('\n'),
            Some('v') => string.push('\x0B'),
            Some('f') => string.push('\x0C'),
            Some('r') => string.push('\r'),
            Some('e') => string.push('\x1B'),
            Some(' ') => string.push(' '),
            Some('"') => string.push('"'),
            Some('/') => string.push('/'),
            Some('\\') => string.push('\\'),
            // NEL (#x85)
            Some('N') => string.push('\u{0085}'),
            // NBSP (#xA0)
            Some('_') => string.push('\u{00a0}'),
            // LS (#x2028)
            Some('L') => string.push('\u{2028}'),
            // PS (#x2029)
            Some('P') => string.push('\u{2029}'),
            Some('x') => code_length = 2,
            Some('u') => code_length = 4,
            Some('U') => code_length = 8,
            None => {
                return Err(ScanError::UnterminatedString {
                    context_mark: start_mark,
                    problem_mark: self.mark,
                });
            }
            Some(_) => {
                return Err(ScanError::InvalidEscape {
                    problem_mark: self.mark,
                });
            }
        }
        self.skip();
        self.skip();
        if code_length != 0 {
            let mut value: u32 = 0;
            for k in 0..code_length {
                if !IS_HEX_AT!(self.buffer, k) {
                    return Err(ScanError::InvalidEscape {
                        problem_mark: self.mark,
                    });
                }
                value = (value << 4) + AS_HEX_AT!(self.buffer, k);
            }
            let Some(ch) = char::from_u32(value) else {
                return Err(ScanError::InvalidEncoding {
                    problem: "found invalid Unicode character escape code",
                    problem_mark: self.mark,
                });
            };
            string.push(ch);
            for _ in 0..code_length {
                self.skip();
            }
        }
        Ok(())
    }

    fn scan_plain_scalar(&mut self) -> Result<Token, ScanError> {
        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut whitespaces = String::new();
        let mut leading_blanks = false;
        let indent = self.indent + 1;
        let start_mark = self.mark;
        let mut end_mark = self.mark;
        loop {
            if self.mark.column == 0
                && (CHECK_AT!(self.buffer, '-', 0)
                    && CHECK_AT!(self.buffer, '-', 1)
                    && CHECK_AT!(self.buffer, '-', 2)
                    || CHECK_AT!(self.buffer, '.', 0)
                        && CHECK_AT!(self.buffer, '.', 1)
                        && CHECK_AT!(self.buffer, '.', 2))
                && IS_BLANKZ_AT!(self.buffer, 3)
            {
                break;
            }
            if CHECK!(self.buffer, '#') {
                break;
            }
            while !IS_BLANKZ!(self.buffer) {
                if self.flow_level != 0
                    && CHECK!(self.buffer, ':')
                    && (CHECK_AT!(self.buffer, ',', 1)
                        || CHECK_AT!(self.buffer, '?', 1)
                        || CHECK_AT!(self.buffer, '[', 1)
                        || CHECK_AT!(self.buffer, ']', 1)
                        || CHECK_AT!(self.buffer, '{', 1)
                        || CHECK_AT!(self.buffer, '}', 1))
                {
                    return self.error(
                        "while scanning a plain scalar",
                        start_mark,
                        "found unexpected ':'",
                    );
                }
                if CHECK!(self.buffer, ':') && IS_BLANKZ_AT!(self.buffer, 1)
                    || self.flow_level != 0
                        && (CHECK!(self.buffer, ',')
                            || CHECK!(self.buffer, '[')
                            || CHECK!(self.buffer, ']')
                            || CHECK!(self.buffer, '{')
                            || CHECK!(self.buffer, '}'))
                {
                    break;
                }
                if leading_blanks || !whitespaces.is_empty() {
                    if leading_blanks {
                        if leading_break.starts_with('\n') {
                            if trailing_breaks.is_empty() {
                                string.push(' ');
                            } else {
                                string.push_str(&trailing_breaks);
                                trailing_breaks.clear();
                            }
                        } else {
                            string.push_str(&leading_break);
                            string.push_str(&trailing_breaks);
                            trailing_breaks.clear();
                        }
                        leading_break.clear();
                        leading_blanks = false;
                    } else {
                        string.push_str(&whitespaces);
                        whitespaces.clear();
                    }
                }
                self.read_into(&mut string);
                end_mark = self.mark;
            }
            if !(IS_BLANK!(self.buffer) || IS_BREAK!(self.buffer)) {
                break;
            }
            while IS_BLANK!(self.buffer) || IS_BREAK!(self.buffer) {
                if IS_BLANK!(self.buffer) {
                    if leading_blanks
                        && (self.mark.column as i64) < indent
                        && IS_TAB!(self.buffer)
                    {
                        return self.indentation_error(
                            "while scanning a plain scalar",
                            start_mark,
                            "found a tab character that violates indentation",
                        );
                    }
                    if leading_blanks {
                        self.skip();
                    } else {
                        self.read_into(&mut whitespaces);
                    }
                } else if leading_blanks {
                    self.read_break_into(&mut trailing_breaks);
                } else {
                    whitespaces.clear();
                    self.read_break_into(&mut leading_break);
                    leading_blanks = true;
                }
            }
            if self.flow_level == 0 && (self.mark.column as i64) < indent {
                break;
            }
        }
        if leading_blanks {
            self.simple_key_allowed = true;
        }
        Ok(Token {
            data: TokenData::Scalar {
                value: string,
                style: ScalarStyle::Plain,
            },
            start_mark,
            end_mark,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(input: &str) -> Result<Vec<TokenData>, ScanError> {
        let mut scanner = Scanner::new(Source::from(input))?;
        let mut tokens = Vec::new();
        loop {
            let token = scanner.next()?;
            let is_end = matches!(token.data, TokenData::StreamEnd);
            tokens.push(token.data);
            if is_end {
                return Ok(tokens);
            }
        }
    }

    fn plain(value: &str) -> TokenData {
        TokenData::Scalar {
            value: String::from(value),
            style: ScalarStyle::Plain,
        }
    }

    #[test]
    fn block_mapping_tokens() {
        let tokens = scan_all("key: value\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                TokenData::StreamStart,
                TokenData::BlockMappingStart,
                TokenData::Key,
                plain("key"),
                TokenData::Value,
                plain("value"),
                TokenData::BlockEnd,
                TokenData::StreamEnd,
            ]
        );
    }

    #[test]
    fn block_sequence_tokens() {
        let tokens = scan_all("- 1\n- 2\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                TokenData::StreamStart,
                TokenData::BlockSequenceStart,
                TokenData::BlockEntry,
                plain("1"),
                TokenData::BlockEntry,
                plain("2"),
                TokenData::BlockEnd,
                TokenData::StreamEnd,
            ]
        );
    }

    #[test]
    fn flow_mapping_tokens() {
        let tokens = scan_all("{a: 1, b: 2}\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                TokenData::StreamStart,
                TokenData::FlowMappingStart,
                TokenData::Key,
                plain("a"),
                TokenData::Value,
                plain("1"),
                TokenData::FlowEntry,
                TokenData::Key,
                plain("b"),
                TokenData::Value,
                plain("2"),
                TokenData::FlowMappingEnd,
                TokenData::StreamEnd,
            ]
        );
    }

    #[test]
    fn directives_and_document_markers() {
        let tokens = scan_all("%YAML 1.2\n---\nx\n...\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                TokenData::StreamStart,
                TokenData::VersionDirective { major: 1, minor: 2 },
                TokenData::DocumentStart,
                plain("x"),
                TokenData::DocumentEnd,
                TokenData::StreamEnd,
            ]
        );
    }

    #[test]
    fn anchor_alias_and_tag() {
        let tokens = scan_all("a: &x !!int 1\nb: *x\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                TokenData::StreamStart,
                TokenData::BlockMappingStart,
                TokenData::Key,
                plain("a"),
                TokenData::Value,
                TokenData::Anchor {
                    value: String::from("x")
                },
                TokenData::Tag {
                    handle: String::from("!!"),
                    suffix: String::from("int")
                },
                plain("1"),
                TokenData::Key,
                plain("b"),
                TokenData::Value,
                TokenData::Alias {
                    value: String::from("x")
                },
                TokenData::BlockEnd,
                TokenData::StreamEnd,
            ]
        );
    }

    #[test]
    fn double_quoted_escapes() {
        let tokens = scan_all("\"a\\tb\\u0041\\x0a\"\n").unwrap();
        assert_eq!(
            tokens[1],
            TokenData::Scalar {
                value: String::from("a\tbA\n"),
                style: ScalarStyle::DoubleQuoted,
            }
        );
    }

    #[test]
    fn single_quote_doubling() {
        let tokens = scan_all("'it''s'\n").unwrap();
        assert_eq!(
            tokens[1],
            TokenData::Scalar {
                value: String::from("it's"),
                style: ScalarStyle::SingleQuoted,
            }
        );
    }

    #[test]
    fn plain_scalar_folds_line_breaks() {
        let tokens = scan_all("a\n b\n\n c\n").unwrap();
        assert_eq!(tokens[1], plain("a b\nc"));
    }

    #[test]
    fn literal_block_scalar_preserves_breaks() {
        let tokens = scan_all("|\n  line1\n  line2\n").unwrap();
        assert_eq!(
            tokens[1],
            TokenData::Scalar {
                value: String::from("line1\nline2\n"),
                style: ScalarStyle::Literal,
            }
        );
    }

    #[test]
    fn folded_block_scalar_folds() {
        let tokens = scan_all(">\n  one\n  two\n\n  three\n").unwrap();
        assert_eq!(
            tokens[1],
            TokenData::Scalar {
                value: String::from("one two\nthree\n"),
                style: ScalarStyle::Folded,
            }
        );
    }

    #[test]
    fn block_scalar_chomping() {
        let strip = scan_all("|-\n  text\n\n\n").unwrap();
        assert_eq!(
            strip[1],
            TokenData::Scalar {
                value: String::from("text"),
                style: ScalarStyle::Literal,
            }
        );
        let keep = scan_all("|+\n  text\n\n").unwrap();
        assert_eq!(
            keep[1],
            TokenData::Scalar {
                value: String::from("text\n\n"),
                style: ScalarStyle::Literal,
            }
        );
    }

    #[test]
    fn block_scalar_explicit_indent() {
        let tokens = scan_all("|2\n   text\n").unwrap();
        assert_eq!(
            tokens[1],
            TokenData::Scalar {
                value: String::from(" text\n"),
                style: ScalarStyle::Literal,
            }
        );
    }

    #[test]
    fn unterminated_quoted_scalar_fails() {
        assert!(matches!(
            scan_all("\"abc\n"),
            Err(ScanError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn unknown_escape_fails() {
        assert!(matches!(
            scan_all("\"\\q\"\n"),
            Err(ScanError::InvalidEscape { .. })
        ));
    }

    #[test]
    fn escape_above_unicode_range_fails() {
        assert!(matches!(
            scan_all("\"\\U00110000\"\n"),
            Err(ScanError::InvalidEncoding { .. })
        ));
    }

    #[test]
    fn tab_indentation_in_block_scalar_fails() {
        assert!(matches!(
            scan_all("|\n\tx\n"),
            Err(ScanError::InvalidIndentation { .. })
        ));
    }

    #[test]
    fn verbatim_tag() {
        let tokens = scan_all("!<tag:yaml.org,2002:str> x\n").unwrap();
        assert_eq!(
            tokens[1],
            TokenData::Tag {
                handle: String::new(),
                suffix: String::from("tag:yaml.org,2002:str"),
            }
        );
    }

    #[test]
    fn tag_rejects_non_uri_character() {
        assert!(matches!(
            scan_all("!foo\u{00e9} x\n"),
            Err(ScanError::InvalidCharacterInTag { .. })
        ));
    }

    #[test]
    fn marks_track_lines_and_columns() {
        let mut scanner = Scanner::new(Source::from("a: 1\nb: 2\n")).unwrap();
        let mut last_line = 0;
        loop {
            let token = scanner.next().unwrap();
            if matches!(token.data, TokenData::StreamEnd) {
                last_line = token.start_mark.line;
                break;
            }
        }
        assert_eq!(last_line, 2);
    }
}
