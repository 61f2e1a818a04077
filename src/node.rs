use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut};

use crate::convert::FromNode;
use crate::error::NodeError;
use crate::mapping::Mapping;
use crate::{ContainerStyle, YamlVersion};

/// The seven value kinds a node can hold.
///
/// The declaration order is the kind ordinal used by the total order on
/// nodes: sequence < mapping < null < bool < int < float < string.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum NodeKind {
    Sequence,
    Mapping,
    Null,
    Boolean,
    Integer,
    Float,
    String,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            NodeKind::Sequence => "sequence",
            NodeKind::Mapping => "mapping",
            NodeKind::Null => "null",
            NodeKind::Boolean => "boolean",
            NodeKind::Integer => "integer",
            NodeKind::Float => "float",
            NodeKind::String => "string",
        })
    }
}

/// Whether a node defines an anchor, references one, or neither.
#[derive(Clone, Default, PartialEq, Eq, Hash, Debug)]
pub enum AnchorState {
    /// No anchor involvement.
    #[default]
    None,
    /// The node defines `&name`.
    Anchor(String),
    /// The node was produced from, or serializes as, `*name`.
    Alias(String),
}

#[derive(Clone, Debug, Default)]
pub(crate) enum NodeData {
    Sequence(Vec<Node>),
    Mapping(Mapping),
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// A YAML node: one of seven value kinds plus node-level properties.
///
/// A non-alias node exclusively owns its children and its scalar buffer.
/// Properties (tag, anchor state, container style, YAML version) ride next
/// to the value but do not participate in equality, ordering or hashing.
#[derive(Clone, Debug, Default)]
pub struct Node {
    pub(crate) data: NodeData,
    pub(crate) tag: Option<String>,
    pub(crate) anchor: AnchorState,
    pub(crate) style: ContainerStyle,
    pub(crate) version: YamlVersion,
}

impl Node {
    /// The distinguished null node.
    pub fn null() -> Node {
        Node::default()
    }

    /// An empty sequence node.
    pub fn sequence() -> Node {
        Node {
            data: NodeData::Sequence(Vec::new()),
            ..Node::default()
        }
    }

    /// An empty mapping node.
    pub fn mapping() -> Node {
        Node {
            data: NodeData::Mapping(Mapping::new()),
            ..Node::default()
        }
    }

    pub(crate) fn from_data(data: NodeData) -> Node {
        Node {
            data,
            ..Node::default()
        }
    }

    /// The current value kind. Never fails.
    pub fn kind(&self) -> NodeKind {
        match &self.data {
            NodeData::Sequence(_) => NodeKind::Sequence,
            NodeData::Mapping(_) => NodeKind::Mapping,
            NodeData::Null => NodeKind::Null,
            NodeData::Bool(_) => NodeKind::Boolean,
            NodeData::Int(_) => NodeKind::Integer,
            NodeData::Float(_) => NodeKind::Float,
            NodeData::String(_) => NodeKind::String,
        }
    }

    pub fn is_sequence(&self) -> bool {
        self.kind() == NodeKind::Sequence
    }

    pub fn is_mapping(&self) -> bool {
        self.kind() == NodeKind::Mapping
    }

    pub fn is_null(&self) -> bool {
        self.kind() == NodeKind::Null
    }

    pub fn is_bool(&self) -> bool {
        self.kind() == NodeKind::Boolean
    }

    pub fn is_int(&self) -> bool {
        self.kind() == NodeKind::Integer
    }

    pub fn is_float(&self) -> bool {
        self.kind() == NodeKind::Float
    }

    pub fn is_string(&self) -> bool {
        self.kind() == NodeKind::String
    }

    pub fn is_scalar(&self) -> bool {
        !self.is_sequence() && !self.is_mapping()
    }

    fn type_error(&self, expected: NodeKind) -> NodeError {
        NodeError::Type {
            expected,
            actual: self.kind(),
        }
    }

    /// The boolean value, or a type error.
    pub fn as_bool(&self) -> Result<bool, NodeError> {
        match &self.data {
            NodeData::Bool(value) => Ok(*value),
            _ => Err(self.type_error(NodeKind::Boolean)),
        }
    }

    /// The integer value, or a type error.
    pub fn as_int(&self) -> Result<i64, NodeError> {
        match &self.data {
            NodeData::Int(value) => Ok(*value),
            _ => Err(self.type_error(NodeKind::Integer)),
        }
    }

    /// The float value, or a type error.
    pub fn as_float(&self) -> Result<f64, NodeError> {
        match &self.data {
            NodeData::Float(value) => Ok(*value),
            _ => Err(self.type_error(NodeKind::Float)),
        }
    }

    /// The string contents, or a type error.
    pub fn as_str(&self) -> Result<&str, NodeError> {
        match &self.data {
            NodeData::String(value) => Ok(value),
            _ => Err(self.type_error(NodeKind::String)),
        }
    }

    /// The sequence elements, or a type error.
    pub fn as_sequence(&self) -> Result<&[Node], NodeError> {
        match &self.data {
            NodeData::Sequence(items) => Ok(items),
            _ => Err(self.type_error(NodeKind::Sequence)),
        }
    }

    pub fn as_sequence_mut(&mut self) -> Result<&mut Vec<Node>, NodeError> {
        let actual = self.kind();
        match &mut self.data {
            NodeData::Sequence(items) => Ok(items),
            _ => Err(NodeError::Type {
                expected: NodeKind::Sequence,
                actual,
            }),
        }
    }

    /// The mapping contents, or a type error.
    pub fn as_mapping(&self) -> Result<&Mapping, NodeError> {
        match &self.data {
            NodeData::Mapping(mapping) => Ok(mapping),
            _ => Err(self.type_error(NodeKind::Mapping)),
        }
    }

    pub fn as_mapping_mut(&mut self) -> Result<&mut Mapping, NodeError> {
        let actual = self.kind();
        match &mut self.data {
            NodeData::Mapping(mapping) => Ok(mapping),
            _ => Err(NodeError::Type {
                expected: NodeKind::Mapping,
                actual,
            }),
        }
    }

    /// Convert the node into a native value through its [`FromNode`]
    /// implementation, applying numeric widening and narrowing where the
    /// value is representable.
    pub fn get_value<T: FromNode>(&self) -> Result<T, NodeError> {
        T::from_node(self)
    }

    /// A sequence element by index.
    pub fn get(&self, index: usize) -> Result<&Node, NodeError> {
        let items = self.as_sequence()?;
        items.get(index).ok_or(NodeError::IndexOutOfRange {
            index,
            len: items.len(),
        })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Node, NodeError> {
        let items = self.as_sequence_mut()?;
        let len = items.len();
        items
            .get_mut(index)
            .ok_or(NodeError::IndexOutOfRange { index, len })
    }

    /// A mapping value by key node. Read-only access to a missing key is an
    /// error; use [`Node::get_or_insert`] to create entries.
    pub fn get_key(&self, key: &Node) -> Result<&Node, NodeError> {
        self.as_mapping()?.get(key).ok_or(NodeError::KeyNotFound)
    }

    pub fn get_key_mut(&mut self, key: &Node) -> Result<&mut Node, NodeError> {
        self.as_mapping_mut()?
            .get_mut(key)
            .ok_or(NodeError::KeyNotFound)
    }

    /// Writable mapping access: a missing key receives a null child.
    pub fn get_or_insert(&mut self, key: Node) -> Result<&mut Node, NodeError> {
        Ok(self.as_mapping_mut()?.get_or_insert(key))
    }

    /// Whether a mapping contains `key`. Returns `false` on every other
    /// kind rather than failing.
    pub fn contains(&self, key: &Node) -> bool {
        match &self.data {
            NodeData::Mapping(mapping) => mapping.contains_key(key),
            _ => false,
        }
    }

    /// The number of elements, pairs, or string bytes.
    pub fn size(&self) -> Result<usize, NodeError> {
        match &self.data {
            NodeData::Sequence(items) => Ok(items.len()),
            NodeData::Mapping(mapping) => Ok(mapping.len()),
            NodeData::String(value) => Ok(value.len()),
            _ => Err(self.type_error(NodeKind::Sequence)),
        }
    }

    pub fn is_empty(&self) -> Result<bool, NodeError> {
        Ok(self.size()? == 0)
    }

    /// Iterate over sequence elements in order.
    pub fn seq_items(&self) -> Result<std::slice::Iter<'_, Node>, NodeError> {
        Ok(self.as_sequence()?.iter())
    }

    pub fn seq_items_mut(&mut self) -> Result<std::slice::IterMut<'_, Node>, NodeError> {
        Ok(self.as_sequence_mut()?.iter_mut())
    }

    /// Iterate over mapping pairs in insertion order.
    pub fn map_entries(&self) -> Result<indexmap::map::Iter<'_, Node, Node>, NodeError> {
        Ok(self.as_mapping()?.iter())
    }

    /// The anchor name, when the node defines or references one.
    pub fn anchor_name(&self) -> Option<&str> {
        match &self.anchor {
            AnchorState::None => None,
            AnchorState::Anchor(name) | AnchorState::Alias(name) => Some(name),
        }
    }

    pub fn has_anchor(&self) -> bool {
        matches!(self.anchor, AnchorState::Anchor(_))
    }

    pub fn is_alias(&self) -> bool {
        matches!(self.anchor, AnchorState::Alias(_))
    }

    /// Attach an anchor name, making the node referenceable by aliases.
    pub fn set_anchor_name(&mut self, name: impl Into<String>) {
        self.anchor = AnchorState::Anchor(name.into());
    }

    pub fn anchor_state(&self) -> &AnchorState {
        &self.anchor
    }

    /// A node that serializes as `*name`, referring to `anchored`. The value
    /// is a deep copy, so reads keep working and the tree stays acyclic.
    pub fn alias_of(anchored: &Node) -> Result<Node, NodeError> {
        let AnchorState::Anchor(name) = &anchored.anchor else {
            return Err(NodeError::InvalidUsage(
                "alias_of requires a node with an anchor name",
            ));
        };
        Ok(Node {
            data: anchored.data.clone(),
            tag: anchored.tag.clone(),
            anchor: AnchorState::Alias(name.clone()),
            style: anchored.style,
            version: anchored.version,
        })
    }

    /// The resolved tag, when one is attached.
    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn has_tag(&self) -> bool {
        self.tag.is_some()
    }

    pub fn set_tag_name(&mut self, tag: impl Into<String>) {
        self.tag = Some(tag.into());
    }

    /// The serialization style bit for container nodes.
    pub fn style(&self) -> ContainerStyle {
        self.style
    }

    pub fn set_style(&mut self, style: ContainerStyle) {
        self.style = style;
    }

    /// The YAML version the node was parsed under.
    pub fn version(&self) -> YamlVersion {
        self.version
    }

    pub fn set_version(&mut self, version: YamlVersion) {
        self.version = version;
    }
}

/// Equality is value-kind plus componentwise content. Tags, anchors, styles
/// and versions do not participate.
impl PartialEq for Node {
    fn eq(&self, other: &Node) -> bool {
        match (&self.data, &other.data) {
            (NodeData::Sequence(a), NodeData::Sequence(b)) => a == b,
            (NodeData::Mapping(a), NodeData::Mapping(b)) => a == b,
            (NodeData::Null, NodeData::Null) => true,
            (NodeData::Bool(a), NodeData::Bool(b)) => a == b,
            (NodeData::Int(a), NodeData::Int(b)) => a == b,
            (NodeData::Float(a), NodeData::Float(b)) => a.total_cmp(b) == Ordering::Equal,
            (NodeData::String(a), NodeData::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Node {}

/// The total order: kind ordinal first, then content. Floats order by
/// `total_cmp` so every node is comparable and usable as a mapping key.
impl Ord for Node {
    fn cmp(&self, other: &Node) -> Ordering {
        match (&self.data, &other.data) {
            (NodeData::Sequence(a), NodeData::Sequence(b)) => a.cmp(b),
            (NodeData::Mapping(a), NodeData::Mapping(b)) => a.cmp(b),
            (NodeData::Null, NodeData::Null) => Ordering::Equal,
            (NodeData::Bool(a), NodeData::Bool(b)) => a.cmp(b),
            (NodeData::Int(a), NodeData::Int(b)) => a.cmp(b),
            (NodeData::Float(a), NodeData::Float(b)) => a.total_cmp(b),
            (NodeData::String(a), NodeData::String(b)) => a.cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Node) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.data).hash(state);
        match &self.data {
            NodeData::Sequence(items) => items.hash(state),
            NodeData::Mapping(mapping) => {
                // Order-insensitive: combine per-pair hashes so equal
                // mappings with different insertion orders hash alike.
                let mut combined: u64 = 0;
                for (key, value) in mapping.iter() {
                    let mut pair_hasher = std::collections::hash_map::DefaultHasher::new();
                    key.hash(&mut pair_hasher);
                    value.hash(&mut pair_hasher);
                    combined = combined.wrapping_add(pair_hasher.finish());
                }
                combined.hash(state);
            }
            NodeData::Null => {}
            NodeData::Bool(value) => value.hash(state),
            NodeData::Int(value) => value.hash(state),
            NodeData::Float(value) => value.to_bits().hash(state),
            NodeData::String(value) => value.hash(state),
        }
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Node {
        Node::from_data(NodeData::Bool(value))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Node {
        Node::from_data(NodeData::Int(value))
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Node {
        Node::from_data(NodeData::Int(value as i64))
    }
}

impl From<u32> for Node {
    fn from(value: u32) -> Node {
        Node::from_data(NodeData::Int(value as i64))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Node {
        Node::from_data(NodeData::Float(value))
    }
}

impl From<f32> for Node {
    fn from(value: f32) -> Node {
        Node::from_data(NodeData::Float(value as f64))
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Node {
        Node::from_data(NodeData::String(value.to_owned()))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Node {
        Node::from_data(NodeData::String(value))
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Node {
        Node::from_data(NodeData::Sequence(items))
    }
}

impl From<Mapping> for Node {
    fn from(mapping: Mapping) -> Node {
        Node::from_data(NodeData::Mapping(mapping))
    }
}

impl FromIterator<Node> for Node {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Node {
        Node::from_data(NodeData::Sequence(iter.into_iter().collect()))
    }
}

impl FromIterator<(Node, Node)> for Node {
    fn from_iter<I: IntoIterator<Item = (Node, Node)>>(iter: I) -> Node {
        Node::from_data(NodeData::Mapping(iter.into_iter().collect()))
    }
}

impl Index<usize> for Node {
    type Output = Node;

    /// Panics when the node is not a sequence or the index is out of range;
    /// [`Node::get`] is the checked form.
    fn index(&self, index: usize) -> &Node {
        self.get(index).expect("sequence index")
    }
}

impl IndexMut<usize> for Node {
    fn index_mut(&mut self, index: usize) -> &mut Node {
        self.get_mut(index).expect("sequence index")
    }
}

impl Index<&str> for Node {
    type Output = Node;

    /// Panics when the node is not a mapping or the key is absent;
    /// [`Node::get_key`] is the checked form.
    fn index(&self, key: &str) -> &Node {
        self.get_key(&Node::from(key)).expect("mapping key")
    }
}

impl IndexMut<&str> for Node {
    /// Inserts a null child when the key is absent.
    fn index_mut(&mut self, key: &str) -> &mut Node {
        self.get_or_insert(Node::from(key)).expect("mapping node")
    }
}
