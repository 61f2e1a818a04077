use crate::error::EmitError;
use crate::macros::{is_alpha, is_blankz, is_break, is_printable, is_space};
use crate::node::{AnchorState, Node, NodeData, NodeKind};
use crate::{
    resolver, ContainerStyle, YamlVersion, BOOL_TAG, FLOAT_TAG, INT_TAG, MAP_TAG, NULL_TAG,
    SEQ_TAG, STR_TAG,
};

/// Serialize a node tree into canonical block-style YAML text.
pub fn serialize(node: &Node) -> Result<String, EmitError> {
    Emitter::new().emit(node)
}

/// Serialize a stream of documents, each framed by `---` and `...`.
pub fn serialize_docs(docs: &[Node]) -> Result<String, EmitError> {
    Emitter::new().emit_docs(docs)
}

/// How a string scalar may be presented.
struct ScalarAnalysis {
    multiline: bool,
    flow_plain_allowed: bool,
    block_plain_allowed: bool,
    single_quoted_allowed: bool,
}

/// The serializer.
///
/// Walks a node tree and writes YAML text, choosing scalar styles, emitting
/// escapes, and reproducing anchors, tags and flow styles. Emission is
/// deterministic: equal trees with equal properties produce identical bytes.
pub struct Emitter {
    buffer: String,
    /// The indentation increment, 1 < n < 10.
    best_indent: i32,
    /// The preferred line width, or a negative value for unlimited.
    best_width: i32,
    /// Pass non-ASCII characters through instead of escaping them.
    unicode: bool,
    indent: i32,
    indents: Vec<i32>,
    flow_level: i32,
    column: i32,
    whitespace: bool,
    indention: bool,
    mapping_context: bool,
    simple_key_context: bool,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter {
    pub fn new() -> Emitter {
        Emitter {
            buffer: String::new(),
            best_indent: 2,
            best_width: 80,
            unicode: false,
            indent: -1,
            indents: Vec::with_capacity(16),
            flow_level: 0,
            column: 0,
            whitespace: true,
            indention: true,
            mapping_context: false,
            simple_key_context: false,
        }
    }

    /// Set the indentation increment. Values outside 2..=9 fall back to 2.
    pub fn set_indent(&mut self, indent: i32) {
        self.best_indent = if 1 < indent && indent < 10 { indent } else { 2 };
    }

    /// Set the preferred line width. A negative value means unlimited.
    pub fn set_width(&mut self, width: i32) {
        self.best_width = if width >= 0 { width } else { i32::MAX };
    }

    /// Allow unescaped non-ASCII output.
    pub fn set_unicode(&mut self, unicode: bool) {
        self.unicode = unicode;
    }

    /// Serialize a single document. The `---` marker is elided unless a
    /// `%YAML` directive precedes the content.
    pub fn emit(&mut self, node: &Node) -> Result<String, EmitError> {
        self.reset();
        if node.version() == YamlVersion::V1_1 {
            self.write_indicator("%YAML 1.1", true, false, false);
            self.write_indent();
            self.write_indicator("---", true, false, false);
        }
        self.emit_root(node)?;
        self.finish_line();
        Ok(std::mem::take(&mut self.buffer))
    }

    /// Serialize a document stream: `---` ahead of every document and `...`
    /// after it.
    pub fn emit_docs(&mut self, docs: &[Node]) -> Result<String, EmitError> {
        self.reset();
        for node in docs {
            if node.version() == YamlVersion::V1_1 {
                self.write_indicator("%YAML 1.1", true, false, false);
                self.write_indent();
            }
            self.write_indicator("---", true, false, false);
            self.emit_root(node)?;
            self.write_indent();
            self.write_indicator("...", true, false, false);
            self.write_indent();
        }
        self.finish_line();
        Ok(std::mem::take(&mut self.buffer))
    }

    /// Serialize a single document into a caller-provided sink. The sink is
    /// not retained after the call returns.
    pub fn emit_to_writer(
        &mut self,
        node: &Node,
        writer: &mut dyn std::io::Write,
    ) -> Result<(), EmitError> {
        let text = self.emit(node)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Serialize a document stream into a caller-provided sink.
    pub fn emit_docs_to_writer(
        &mut self,
        docs: &[Node],
        writer: &mut dyn std::io::Write,
    ) -> Result<(), EmitError> {
        let text = self.emit_docs(docs)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.indent = -1;
        self.indents.clear();
        self.flow_level = 0;
        self.column = 0;
        self.whitespace = true;
        self.indention = true;
        self.mapping_context = false;
        self.simple_key_context = false;
    }

    fn emit_root(&mut self, node: &Node) -> Result<(), EmitError> {
        self.mapping_context = false;
        self.simple_key_context = false;
        self.emit_node(node)
    }

    fn finish_line(&mut self) {
        if self.column != 0 {
            self.put_break();
        }
    }

    fn emit_node(&mut self, node: &Node) -> Result<(), EmitError> {
        if let AnchorState::Alias(name) = &node.anchor {
            return self.emit_alias(name);
        }
        self.process_anchor(&node.anchor)?;
        self.process_tag(node)?;
        match &node.data {
            NodeData::Sequence(items) => self.emit_sequence(node, items),
            NodeData::Mapping(_) => self.emit_mapping(node),
            _ => self.emit_scalar(node),
        }
    }

    fn emit_alias(&mut self, name: &str) -> Result<(), EmitError> {
        Self::check_anchor_name(name, true)?;
        self.write_indicator("*", true, false, false);
        self.write_raw(name);
        self.whitespace = false;
        self.indention = false;
        if self.simple_key_context {
            self.put(' ');
        }
        Ok(())
    }

    fn process_anchor(&mut self, anchor: &AnchorState) -> Result<(), EmitError> {
        if let AnchorState::Anchor(name) = anchor {
            Self::check_anchor_name(name, false)?;
            self.write_indicator("&", true, false, false);
            self.write_raw(name);
            self.whitespace = false;
            self.indention = false;
        }
        Ok(())
    }

    fn check_anchor_name(name: &str, alias: bool) -> Result<(), EmitError> {
        if name.is_empty() {
            return Err(EmitError::Problem(if alias {
                "alias value must not be empty"
            } else {
                "anchor value must not be empty"
            }));
        }
        if !name.chars().all(is_alpha) {
            return Err(EmitError::Problem(if alias {
                "alias value must contain alphanumerical characters only"
            } else {
                "anchor value must contain alphanumerical characters only"
            }));
        }
        Ok(())
    }

    /// The tag the core schema would resolve for a node's kind; it is never
    /// emitted explicitly.
    fn default_tag(kind: NodeKind) -> &'static str {
        match kind {
            NodeKind::Sequence => SEQ_TAG,
            NodeKind::Mapping => MAP_TAG,
            NodeKind::Null => NULL_TAG,
            NodeKind::Boolean => BOOL_TAG,
            NodeKind::Integer => INT_TAG,
            NodeKind::Float => FLOAT_TAG,
            NodeKind::String => STR_TAG,
        }
    }

    fn process_tag(&mut self, node: &Node) -> Result<(), EmitError> {
        let Some(tag) = node.tag_name() else {
            return Ok(());
        };
        if tag.is_empty() {
            return Err(EmitError::Problem("tag value must not be empty"));
        }
        if tag == Self::default_tag(node.kind()) {
            return Ok(());
        }
        if let Some(suffix) = tag.strip_prefix("tag:yaml.org,2002:") {
            self.write_tag_handle("!!");
            self.write_tag_content(suffix);
        } else if tag.starts_with('!') && tag.len() > 1 {
            self.write_tag_handle("!");
            self.write_tag_content(&tag[1..]);
        } else {
            self.write_indicator("!<", true, false, false);
            self.write_tag_content(tag);
            self.write_indicator(">", false, false, false);
        }
        Ok(())
    }

    fn emit_sequence(&mut self, node: &Node, items: &[Node]) -> Result<(), EmitError> {
        if self.flow_level > 0 || node.style() == ContainerStyle::Flow || items.is_empty() {
            self.emit_flow_sequence(items)
        } else {
            self.emit_block_sequence(items)
        }
    }

    fn emit_flow_sequence(&mut self, items: &[Node]) -> Result<(), EmitError> {
        self.write_indicator("[", true, true, false);
        self.increase_indent(true, false);
        self.flow_level += 1;
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                self.write_indicator(",", false, false, false);
            }
            if self.column > self.best_width {
                self.write_indent();
            }
            self.mapping_context = false;
            self.simple_key_context = false;
            self.emit_node(item)?;
        }
        self.flow_level -= 1;
        self.indent = self.indents.pop().unwrap();
        self.write_indicator("]", false, false, false);
        Ok(())
    }

    fn emit_block_sequence(&mut self, items: &[Node]) -> Result<(), EmitError> {
        // A sequence in a mapping value position stays at its key's indent.
        self.increase_indent(false, self.mapping_context && !self.indention);
        for item in items {
            self.write_indent();
            self.write_indicator("-", true, false, true);
            self.mapping_context = false;
            self.simple_key_context = false;
            self.emit_node(item)?;
        }
        self.indent = self.indents.pop().unwrap();
        Ok(())
    }

    fn emit_mapping(&mut self, node: &Node) -> Result<(), EmitError> {
        let mapping = node.as_mapping().expect("mapping node");
        if self.flow_level > 0 || node.style() == ContainerStyle::Flow || mapping.is_empty() {
            self.emit_flow_mapping(node)
        } else {
            self.emit_block_mapping(node)
        }
    }

    fn emit_flow_mapping(&mut self, node: &Node) -> Result<(), EmitError> {
        let mapping = node.as_mapping().expect("mapping node");
        self.write_indicator("{", true, true, false);
        self.increase_indent(true, false);
        self.flow_level += 1;
        for (index, (key, value)) in mapping.iter().enumerate() {
            if index > 0 {
                self.write_indicator(",", false, false, false);
            }
            if self.column > self.best_width {
                self.write_indent();
            }
            if Self::is_simple_key(key) {
                self.mapping_context = true;
                self.simple_key_context = true;
                self.emit_node(key)?;
                self.write_indicator(":", false, false, false);
            } else {
                self.write_indicator("?", true, false, false);
                self.mapping_context = true;
                self.simple_key_context = false;
                self.emit_node(key)?;
                self.write_indicator(":", true, false, false);
            }
            self.mapping_context = true;
            self.simple_key_context = false;
            self.emit_node(value)?;
        }
        self.flow_level -= 1;
        self.indent = self.indents.pop().unwrap();
        self.write_indicator("}", false, false, false);
        Ok(())
    }

    fn emit_block_mapping(&mut self, node: &Node) -> Result<(), EmitError> {
        let mapping = node.as_mapping().expect("mapping node");
        self.increase_indent(false, false);
        for (key, value) in mapping.iter() {
            self.write_indent();
            if Self::is_simple_key(key) {
                self.mapping_context = true;
                self.simple_key_context = true;
                self.emit_node(key)?;
                self.write_indicator(":", false, false, false);
            } else {
                self.write_indicator("?", true, false, true);
                self.mapping_context = true;
                self.simple_key_context = false;
                self.emit_node(key)?;
                self.write_indent();
                self.write_indicator(":", true, false, true);
            }
            self.mapping_context = true;
            self.simple_key_context = false;
            self.emit_node(value)?;
        }
        self.indent = self.indents.pop().unwrap();
        Ok(())
    }

    /// A key goes on one line with a trailing `:` when it is an alias or a
    /// scalar of reasonable size; everything else takes the explicit `?`
    /// form.
    fn is_simple_key(key: &Node) -> bool {
        if key.is_alias() {
            return true;
        }
        match &key.data {
            NodeData::Sequence(_) | NodeData::Mapping(_) => false,
            NodeData::String(value) => {
                !value.chars().any(|ch| is_break(ch)) && value.len() <= 128
            }
            _ => true,
        }
    }

    fn emit_scalar(&mut self, node: &Node) -> Result<(), EmitError> {
        self.increase_indent(true, false);
        match &node.data {
            NodeData::Null => self.write_plain_scalar("null"),
            NodeData::Bool(true) => self.write_plain_scalar("true"),
            NodeData::Bool(false) => self.write_plain_scalar("false"),
            NodeData::Int(value) => {
                let mut formatted = itoa::Buffer::new();
                self.write_plain_scalar(formatted.format(*value));
            }
            NodeData::Float(value) => {
                if value.is_nan() {
                    self.write_plain_scalar(".nan");
                } else if *value == f64::INFINITY {
                    self.write_plain_scalar(".inf");
                } else if *value == f64::NEG_INFINITY {
                    self.write_plain_scalar("-.inf");
                } else {
                    let mut formatted = ryu::Buffer::new();
                    self.write_plain_scalar(formatted.format_finite(*value));
                }
            }
            NodeData::String(value) => self.emit_string_scalar(value, node.version()),
            NodeData::Sequence(_) | NodeData::Mapping(_) => unreachable!("scalar node"),
        }
        self.indent = self.indents.pop().unwrap();
        Ok(())
    }

    /// Style selection for strings: plain when nothing would change under
    /// re-resolution, double-quoted when escapes are required, single-quoted
    /// otherwise.
    fn emit_string_scalar(&mut self, value: &str, version: YamlVersion) {
        let analysis = self.analyze_scalar(value);
        let reclassified =
            !matches!(resolver::resolve(value, version), Ok(resolver::Resolved::Str));
        let plain_allowed = if self.flow_level > 0 {
            analysis.flow_plain_allowed
        } else {
            analysis.block_plain_allowed
        };
        if plain_allowed
            && !reclassified
            && !value.is_empty()
            && !(self.simple_key_context && analysis.multiline)
        {
            self.write_plain_scalar(value);
        } else if analysis.single_quoted_allowed && !analysis.multiline {
            self.write_single_quoted_scalar(value);
        } else {
            self.write_double_quoted_scalar(value);
        }
    }

    /// Character-level feasibility of the plain and single-quoted styles.
    fn analyze_scalar(&self, value: &str) -> ScalarAnalysis {
        let mut block_indicators = false;
        let mut flow_indicators = false;
        let mut line_breaks = false;
        let mut special_characters = false;
        let mut leading_space = false;
        let mut leading_break = false;
        let mut trailing_space = false;
        let mut trailing_break = false;
        let mut break_space = false;
        let mut space_break = false;
        let mut preceded_by_whitespace = true;
        let mut previous_space = false;
        let mut previous_break = false;

        if value.is_empty() {
            return ScalarAnalysis {
                multiline: false,
                flow_plain_allowed: false,
                block_plain_allowed: true,
                single_quoted_allowed: true,
            };
        }
        if value.starts_with("---") || value.starts_with("...") {
            block_indicators = true;
            flow_indicators = true;
        }

        let mut chars = value.chars();
        let mut first = true;
        while let Some(ch) = chars.next() {
            let next = chars.clone().next();
            let followed_by_whitespace = is_blankz(next);
            if first {
                match ch {
                    '#' | ',' | '[' | ']' | '{' | '}' | '&' | '*' | '!' | '|' | '>' | '\''
                    | '"' | '%' | '@' | '`' => {
                        flow_indicators = true;
                        block_indicators = true;
                    }
                    '?' | ':' => {
                        flow_indicators = true;
                        if followed_by_whitespace {
                            block_indicators = true;
                        }
                    }
                    '-' if followed_by_whitespace => {
                        flow_indicators = true;
                        block_indicators = true;
                    }
                    _ => {}
                }
            } else {
                match ch {
                    ',' | '?' | '[' | ']' | '{' | '}' => {
                        flow_indicators = true;
                    }
                    ':' => {
                        flow_indicators = true;
                        if followed_by_whitespace {
                            block_indicators = true;
                        }
                    }
                    '#' if preceded_by_whitespace => {
                        flow_indicators = true;
                        block_indicators = true;
                    }
                    _ => {}
                }
            }

            if !is_printable(ch) || !ch.is_ascii() && !self.unicode {
                special_characters = true;
            }
            if is_break(ch) {
                line_breaks = true;
            }

            if is_space(ch) {
                if first {
                    leading_space = true;
                }
                if next.is_none() {
                    trailing_space = true;
                }
                if previous_break {
                    break_space = true;
                }
                previous_space = true;
                previous_break = false;
            } else if is_break(ch) {
                if first {
                    leading_break = true;
                }
                if next.is_none() {
                    trailing_break = true;
                }
                if previous_space {
                    space_break = true;
                }
                previous_space = false;
                previous_break = true;
            } else {
                previous_space = false;
                previous_break = false;
            }

            preceded_by_whitespace = is_blankz(ch);
            first = false;
        }

        let mut analysis = ScalarAnalysis {
            multiline: line_breaks,
            flow_plain_allowed: true,
            block_plain_allowed: true,
            single_quoted_allowed: true,
        };
        if leading_space || leading_break || trailing_space || trailing_break {
            analysis.flow_plain_allowed = false;
            analysis.block_plain_allowed = false;
        }
        if break_space {
            analysis.flow_plain_allowed = false;
            analysis.block_plain_allowed = false;
            analysis.single_quoted_allowed = false;
        }
        if space_break || special_characters {
            analysis.flow_plain_allowed = false;
            analysis.block_plain_allowed = false;
            analysis.single_quoted_allowed = false;
        }
        if line_breaks {
            analysis.flow_plain_allowed = false;
            analysis.block_plain_allowed = false;
        }
        if flow_indicators {
            analysis.flow_plain_allowed = false;
        }
        if block_indicators {
            analysis.block_plain_allowed = false;
        }
        analysis
    }

    fn put(&mut self, ch: char) {
        self.buffer.push(ch);
        self.column += 1;
    }

    fn put_break(&mut self) {
        self.buffer.push('\n');
        self.column = 0;
    }

    fn write_raw(&mut self, string: &str) {
        for ch in string.chars() {
            self.put(ch);
        }
    }

    fn increase_indent(&mut self, flow: bool, indentless: bool) {
        self.indents.push(self.indent);
        if self.indent < 0 {
            self.indent = if flow { self.best_indent } else { 0 };
        } else if !indentless {
            self.indent += self.best_indent;
        }
    }

    fn write_indent(&mut self) {
        let indent = self.indent.max(0);
        if !self.indention || self.column > indent || self.column == indent && !self.whitespace
        {
            self.put_break();
        }
        while self.column < indent {
            self.put(' ');
        }
        self.whitespace = true;
        self.indention = true;
    }

    fn write_indicator(
        &mut self,
        indicator: &str,
        need_whitespace: bool,
        is_whitespace: bool,
        is_indention: bool,
    ) {
        if need_whitespace && !self.whitespace {
            self.put(' ');
        }
        self.write_raw(indicator);
        self.whitespace = is_whitespace;
        self.indention = self.indention && is_indention;
    }

    fn write_tag_handle(&mut self, handle: &str) {
        if !self.whitespace {
            self.put(' ');
        }
        self.write_raw(handle);
        self.whitespace = false;
        self.indention = false;
    }

    fn write_tag_content(&mut self, content: &str) {
        for ch in content.chars() {
            if is_alpha(ch)
                || matches!(
                    ch,
                    ';' | '/' | '?' | ':' | '@' | '&' | '=' | '+' | '$' | ',' | '.' | '~' | '*'
                        | '\'' | '(' | ')' | '[' | ']'
                )
            {
                self.put(ch);
                continue;
            }
            // URI-escape everything else.
            let mut encoded = [0u8; 4];
            for byte in ch.encode_utf8(&mut encoded).bytes() {
                self.put('%');
                self.put(char::from_digit((byte >> 4) as u32, 16).unwrap().to_ascii_uppercase());
                self.put(char::from_digit((byte & 0x0F) as u32, 16).unwrap().to_ascii_uppercase());
            }
        }
        self.whitespace = false;
        self.indention = false;
    }

    fn write_plain_scalar(&mut self, value: &str) {
        let allow_breaks = !self.simple_key_context;
        let mut spaces = false;
        if !self.whitespace && (!value.is_empty() || self.flow_level != 0) {
            self.put(' ');
        }
        let mut chars = value.chars();
        while let Some(ch) = chars.next() {
            let next = chars.clone().next();
            if is_space(ch) {
                if allow_breaks
                    && !spaces
                    && self.column > self.best_width
                    && !is_space(next)
                {
                    self.write_indent();
                } else {
                    self.put(ch);
                }
                spaces = true;
            } else {
                self.put(ch);
                self.indention = false;
                spaces = false;
            }
        }
        self.whitespace = false;
        self.indention = false;
    }

    fn write_single_quoted_scalar(&mut self, value: &str) {
        let allow_breaks = !self.simple_key_context;
        let mut spaces = false;
        self.write_indicator("'", true, false, false);
        let mut chars = value.chars();
        let mut is_first = true;
        while let Some(ch) = chars.next() {
            let next = chars.clone().next();
            let is_last = next.is_none();
            if is_space(ch) {
                if allow_breaks
                    && !spaces
                    && self.column > self.best_width
                    && !is_first
                    && !is_last
                    && !is_space(next)
                {
                    self.write_indent();
                } else {
                    self.put(ch);
                }
                spaces = true;
            } else {
                if ch == '\'' {
                    self.put('\'');
                }
                self.put(ch);
                self.indention = false;
                spaces = false;
            }
            is_first = false;
        }
        self.write_indicator("'", false, false, false);
        self.whitespace = false;
        self.indention = false;
    }

    fn write_double_quoted_scalar(&mut self, value: &str) {
        let allow_breaks = !self.simple_key_context;
        let mut spaces = false;
        self.write_indicator("\"", true, false, false);
        let mut chars = value.chars();
        let mut first = true;
        while let Some(ch) = chars.next() {
            if !is_printable(ch)
                || !self.unicode && !ch.is_ascii()
                || ch == '\u{feff}'
                || is_break(ch)
                || ch == '"'
                || ch == '\\'
            {
                self.put('\\');
                match ch {
                    '\0' => self.put('0'),
                    '\x07' => self.put('a'),
                    '\x08' => self.put('b'),
                    '\x09' => self.put('t'),
                    '\x0A' => self.put('n'),
                    '\x0B' => self.put('v'),
                    '\x0C' => self.put('f'),
                    '\x0D' => self.put('r'),
                    '\x1B' => self.put('e'),
                    '\x22' => self.put('"'),
                    '\x5C' => self.put('\\'),
                    '\u{0085}' => self.put('N'),
                    '\u{00A0}' => self.put('_'),
                    '\u{2028}' => self.put('L'),
                    '\u{2029}' => self.put('P'),
                    _ => {
                        // The shortest hex form that fits the code point,
                        // uppercase digits.
                        let (prefix, width) = if ch <= '\u{00ff}' {
                            ('x', 2)
                        } else if ch <= '\u{ffff}' {
                            ('u', 4)
                        } else {
                            ('U', 8)
                        };
                        self.put(prefix);
                        let value = ch as u32;
                        for k in (0..width).rev() {
                            let digit = (value >> (k * 4)) & 0x0F;
                            self.put(
                                char::from_digit(digit, 16)
                                    .expect("digit out of range")
                                    .to_ascii_uppercase(),
                            );
                        }
                    }
                }
                spaces = false;
            } else if is_space(ch) {
                if allow_breaks
                    && !spaces
                    && self.column > self.best_width
                    && !first
                    && chars.clone().next().is_some()
                {
                    self.write_indent();
                    if is_space(chars.clone().next()) {
                        self.put('\\');
                    }
                } else {
                    self.put(ch);
                }
                spaces = true;
            } else {
                self.put(ch);
                spaces = false;
            }
            first = false;
        }
        self.write_indicator("\"", false, false, false);
        self.whitespace = false;
        self.indention = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::{deserialize, deserialize_docs};
    use crate::mapping::Mapping;

    fn mapping_of(pairs: &[(&str, Node)]) -> Node {
        pairs
            .iter()
            .map(|(key, value)| (Node::from(*key), value.clone()))
            .collect()
    }

    #[test]
    fn block_mapping_output() {
        let node = mapping_of(&[
            ("foo", Node::from(true)),
            ("bar", Node::from(123)),
            ("baz", Node::from(3.14)),
        ]);
        assert_eq!(serialize(&node).unwrap(), "foo: true\nbar: 123\nbaz: 3.14\n");
    }

    #[test]
    fn block_sequence_output() {
        let node = Node::from(vec![Node::from(1), Node::from(2), Node::from(3)]);
        assert_eq!(serialize(&node).unwrap(), "- 1\n- 2\n- 3\n");
    }

    #[test]
    fn nested_containers() {
        let node = mapping_of(&[
            (
                "servers",
                Node::from(vec![
                    mapping_of(&[("name", Node::from("alpha"))]),
                    mapping_of(&[("name", Node::from("beta"))]),
                ]),
            ),
            ("count", Node::from(2)),
        ]);
        assert_eq!(
            serialize(&node).unwrap(),
            "servers:\n- name: alpha\n- name: beta\ncount: 2\n"
        );
    }

    #[test]
    fn canonical_scalar_forms() {
        assert_eq!(serialize(&Node::null()).unwrap(), "null\n");
        assert_eq!(serialize(&Node::from(true)).unwrap(), "true\n");
        assert_eq!(serialize(&Node::from(-17)).unwrap(), "-17\n");
        assert_eq!(serialize(&Node::from(2.5)).unwrap(), "2.5\n");
        assert_eq!(serialize(&Node::from(f64::INFINITY)).unwrap(), ".inf\n");
        assert_eq!(serialize(&Node::from(f64::NEG_INFINITY)).unwrap(), "-.inf\n");
        assert_eq!(serialize(&Node::from(f64::NAN)).unwrap(), ".nan\n");
    }

    #[test]
    fn strings_that_would_reclassify_are_quoted() {
        assert_eq!(serialize(&Node::from("true")).unwrap(), "'true'\n");
        assert_eq!(serialize(&Node::from("123")).unwrap(), "'123'\n");
        assert_eq!(serialize(&Node::from("1.5")).unwrap(), "'1.5'\n");
        assert_eq!(serialize(&Node::from("null")).unwrap(), "'null'\n");
        assert_eq!(serialize(&Node::from("")).unwrap(), "''\n");
        assert_eq!(serialize(&Node::from("plain text")).unwrap(), "plain text\n");
    }

    #[test]
    fn one_one_booleans_quote_under_their_version() {
        let mut node = Node::from("yes");
        node.set_version(YamlVersion::V1_1);
        let text = serialize(&node).unwrap();
        assert_eq!(text, "%YAML 1.1\n--- 'yes'\n");
    }

    #[test]
    fn non_printables_force_double_quotes() {
        assert_eq!(serialize(&Node::from("a\tb")).unwrap(), "\"a\\tb\"\n");
        assert_eq!(serialize(&Node::from("line1\nline2")).unwrap(), "\"line1\\nline2\"\n");
        assert_eq!(serialize(&Node::from("\u{0085}")).unwrap(), "\"\\N\"\n");
        assert_eq!(serialize(&Node::from("\u{2028}")).unwrap(), "\"\\L\"\n");
        assert_eq!(serialize(&Node::from("\x1b")).unwrap(), "\"\\e\"\n");
        assert_eq!(serialize(&Node::from("\x01")).unwrap(), "\"\\x01\"\n");
    }

    #[test]
    fn non_ascii_escapes_by_default() {
        assert_eq!(serialize(&Node::from("caf\u{e9}")).unwrap(), "\"caf\\xE9\"\n");
        let mut emitter = Emitter::new();
        emitter.set_unicode(true);
        assert_eq!(emitter.emit(&Node::from("caf\u{e9}")).unwrap(), "caf\u{e9}\n");
    }

    #[test]
    fn reserved_indicators_are_quoted() {
        assert_eq!(serialize(&Node::from("- item")).unwrap(), "'- item'\n");
        assert_eq!(serialize(&Node::from("a: b")).unwrap(), "'a: b'\n");
        assert_eq!(serialize(&Node::from("#comment")).unwrap(), "'#comment'\n");
        assert_eq!(serialize(&Node::from(" padded ")).unwrap(), "' padded '\n");
    }

    #[test]
    fn flow_style_is_reproduced() {
        let doc = deserialize("a: {x: 1, y: 2}\n").unwrap();
        assert_eq!(serialize(&doc).unwrap(), "a: {x: 1, y: 2}\n");
    }

    #[test]
    fn empty_containers_emit_flow() {
        assert_eq!(serialize(&Node::sequence()).unwrap(), "[]\n");
        assert_eq!(serialize(&Node::mapping()).unwrap(), "{}\n");
    }

    #[test]
    fn tags_are_emitted_unless_default() {
        // A tag matching the kind's resolved tag is not repeated; quoting
        // alone keeps "42" a string on re-parse.
        let doc = deserialize("!!str 42\n").unwrap();
        assert_eq!(serialize(&doc).unwrap(), "'42'\n");

        let doc = deserialize("!!int 42\n").unwrap();
        assert_eq!(serialize(&doc).unwrap(), "42\n");

        let mut node = Node::from("x");
        node.set_tag_name("!local");
        assert_eq!(serialize(&node).unwrap(), "!local x\n");

        let mut node = Node::from("x");
        node.set_tag_name("tag:example.com,2024:thing");
        assert_eq!(serialize(&node).unwrap(), "!<tag:example.com,2024:thing> x\n");
    }

    #[test]
    fn anchors_and_aliases_are_reproduced() {
        let doc = deserialize("a: &x 1\nb: *x\n").unwrap();
        assert_eq!(serialize(&doc).unwrap(), "a: &x 1\nb: *x\n");
    }

    #[test]
    fn alias_of_serializes_as_reference() {
        let mut anchored = Node::from(vec![Node::from(1)]);
        anchored.set_anchor_name("shared");
        let alias = Node::alias_of(&anchored).unwrap();
        let node: Node = [
            (Node::from("a"), anchored),
            (Node::from("b"), alias),
        ]
        .into_iter()
        .collect();
        assert_eq!(serialize(&node).unwrap(), "a: &shared\n- 1\nb: *shared\n");
    }

    #[test]
    fn complex_keys_take_explicit_form() {
        let mut mapping = Mapping::new();
        mapping.insert(
            Node::from(vec![Node::from(1), Node::from(2)]),
            Node::from("value"),
        );
        let node = Node::from(mapping);
        assert_eq!(serialize(&node).unwrap(), "? - 1\n  - 2\n: value\n");
    }

    #[test]
    fn multi_document_output() {
        let docs = vec![
            mapping_of(&[("foo", Node::from("bar"))]),
            mapping_of(&[("baz", Node::from("qux"))]),
        ];
        let text = serialize_docs(&docs).unwrap();
        assert_eq!(text, "---\nfoo: bar\n...\n---\nbaz: qux\n...\n");
        assert_eq!(deserialize_docs(text).unwrap(), docs);
    }

    #[test]
    fn deterministic_output() {
        let doc = deserialize("a: [1, 2]\nb:\n  c: text\n").unwrap();
        let first = serialize(&doc).unwrap();
        let second = serialize(&doc).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn writer_sink() {
        let mut out = Vec::new();
        Emitter::new()
            .emit_to_writer(&Node::from(1), &mut out)
            .unwrap();
        assert_eq!(out, b"1\n");
    }

    #[test]
    fn float_overflow_becomes_infinity() {
        let doc = deserialize("big: 1e999\n").unwrap();
        assert_eq!(serialize(&doc).unwrap(), "big: .inf\n");
    }
}
