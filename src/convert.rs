use std::collections::{BTreeMap, HashMap};

use crate::error::NodeError;
use crate::node::{Node, NodeData, NodeKind};

/// The deserialization half of the conversion hook: build a native value
/// from a node.
///
/// Implement this for your own types to make them available through
/// [`Node::get_value`]:
///
/// ```
/// use yamltree::{FromNode, Node, NodeError};
///
/// struct Book {
///     title: String,
///     year: i64,
/// }
///
/// impl FromNode for Book {
///     fn from_node(node: &Node) -> Result<Book, NodeError> {
///         Ok(Book {
///             title: node.get_key(&Node::from("title"))?.get_value()?,
///             year: node.get_key(&Node::from("year"))?.get_value()?,
///         })
///     }
/// }
///
/// let doc = yamltree::deserialize("title: Noman's Journey\nyear: 2023\n").unwrap();
/// let book: Book = doc.get_value().unwrap();
/// assert_eq!(book.title, "Noman's Journey");
/// assert_eq!(book.year, 2023);
/// ```
pub trait FromNode: Sized {
    fn from_node(node: &Node) -> Result<Self, NodeError>;
}

/// The serialization half of the conversion hook: build a node from a
/// native value.
pub trait IntoNode {
    fn into_node(self) -> Node;
}

/// The numeric content of a scalar node, widened to the common cases.
///
/// Booleans widen to 0/1, integers widen to float exactly as IEEE-754
/// prescribes, and floats narrow to integers only when the value is an
/// integer in range.
fn numeric_i64(node: &Node) -> Result<i64, NodeError> {
    match &node.data {
        NodeData::Bool(value) => Ok(i64::from(*value)),
        NodeData::Int(value) => Ok(*value),
        NodeData::Float(value) => {
            if value.fract() == 0.0 && *value >= -(2f64.powi(63)) && *value < 2f64.powi(63) {
                Ok(*value as i64)
            } else {
                Err(NodeError::Conversion)
            }
        }
        _ => Err(NodeError::Type {
            expected: NodeKind::Integer,
            actual: node.kind(),
        }),
    }
}

fn numeric_f64(node: &Node) -> Result<f64, NodeError> {
    match &node.data {
        NodeData::Bool(value) => Ok(if *value { 1.0 } else { 0.0 }),
        NodeData::Int(value) => Ok(*value as f64),
        NodeData::Float(value) => Ok(*value),
        _ => Err(NodeError::Type {
            expected: NodeKind::Float,
            actual: node.kind(),
        }),
    }
}

impl FromNode for bool {
    fn from_node(node: &Node) -> Result<bool, NodeError> {
        node.as_bool()
    }
}

macro_rules! from_node_int {
    ($($ty:ty)*) => {
        $(
            impl FromNode for $ty {
                fn from_node(node: &Node) -> Result<$ty, NodeError> {
                    <$ty>::try_from(numeric_i64(node)?).map_err(|_| NodeError::Conversion)
                }
            }
        )*
    };
}

from_node_int!(i8 i16 i32 i64 isize u8 u16 u32 u64 usize);

impl FromNode for f64 {
    fn from_node(node: &Node) -> Result<f64, NodeError> {
        numeric_f64(node)
    }
}

impl FromNode for f32 {
    fn from_node(node: &Node) -> Result<f32, NodeError> {
        Ok(numeric_f64(node)? as f32)
    }
}

impl FromNode for String {
    fn from_node(node: &Node) -> Result<String, NodeError> {
        Ok(node.as_str()?.to_owned())
    }
}

impl FromNode for Node {
    fn from_node(node: &Node) -> Result<Node, NodeError> {
        Ok(node.clone())
    }
}

/// A nullable wrapper: null maps to `None`, anything else converts.
impl<T: FromNode> FromNode for Option<T> {
    fn from_node(node: &Node) -> Result<Option<T>, NodeError> {
        if node.is_null() {
            Ok(None)
        } else {
            T::from_node(node).map(Some)
        }
    }
}

impl<T: FromNode> FromNode for Vec<T> {
    fn from_node(node: &Node) -> Result<Vec<T>, NodeError> {
        node.as_sequence()?.iter().map(T::from_node).collect()
    }
}

/// A fixed-arity sequence.
impl<T: FromNode, const N: usize> FromNode for [T; N] {
    fn from_node(node: &Node) -> Result<[T; N], NodeError> {
        let items = node.as_sequence()?;
        if items.len() != N {
            return Err(NodeError::Conversion);
        }
        let converted: Vec<T> = items.iter().map(T::from_node).collect::<Result<_, _>>()?;
        converted.try_into().map_err(|_| NodeError::Conversion)
    }
}

macro_rules! from_node_tuple {
    ($(($($name:ident : $idx:tt),+))*) => {
        $(
            impl<$($name: FromNode),+> FromNode for ($($name,)+) {
                fn from_node(node: &Node) -> Result<($($name,)+), NodeError> {
                    let items = node.as_sequence()?;
                    const ARITY: usize = [$($idx),+].len();
                    if items.len() != ARITY {
                        return Err(NodeError::Conversion);
                    }
                    Ok(($($name::from_node(&items[$idx])?,)+))
                }
            }
        )*
    };
}

from_node_tuple! {
    (A: 0)
    (A: 0, B: 1)
    (A: 0, B: 1, C: 2)
    (A: 0, B: 1, C: 2, D: 3)
}

impl<T: FromNode> FromNode for BTreeMap<String, T> {
    fn from_node(node: &Node) -> Result<BTreeMap<String, T>, NodeError> {
        node.as_mapping()?
            .iter()
            .map(|(key, value)| Ok((key.as_str()?.to_owned(), T::from_node(value)?)))
            .collect()
    }
}

impl<T: FromNode> FromNode for HashMap<String, T> {
    fn from_node(node: &Node) -> Result<HashMap<String, T>, NodeError> {
        node.as_mapping()?
            .iter()
            .map(|(key, value)| Ok((key.as_str()?.to_owned(), T::from_node(value)?)))
            .collect()
    }
}

/// Everything a [`Node`] can be built from converts through the hook, so
/// generic code can bound on `IntoNode` alone.
impl<T> IntoNode for T
where
    Node: From<T>,
{
    fn into_node(self) -> Node {
        Node::from(self)
    }
}
