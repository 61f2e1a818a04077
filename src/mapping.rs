use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::node::Node;

/// A YAML mapping: key-value pairs with unique keys, iterated and serialized
/// in insertion order.
///
/// Lookup goes through a hash index, but the index never changes what is
/// observable: iteration order is the order keys were first inserted.
#[derive(Clone, Debug, Default)]
pub struct Mapping {
    map: IndexMap<Node, Node>,
}

impl Mapping {
    pub fn new() -> Mapping {
        Mapping::default()
    }

    pub fn with_capacity(capacity: usize) -> Mapping {
        Mapping {
            map: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert a pair, returning the previous value if the key was present.
    ///
    /// Re-inserting an existing key keeps the key's original position.
    pub fn insert(&mut self, key: Node, value: Node) -> Option<Node> {
        self.map.insert(key, value)
    }

    pub fn get(&self, key: &Node) -> Option<&Node> {
        self.map.get(key)
    }

    pub fn get_mut(&mut self, key: &Node) -> Option<&mut Node> {
        self.map.get_mut(key)
    }

    /// Look up a key, inserting a null value for it first when missing.
    pub fn get_or_insert(&mut self, key: Node) -> &mut Node {
        self.map.entry(key).or_default()
    }

    pub fn contains_key(&self, key: &Node) -> bool {
        self.map.contains_key(key)
    }

    /// Remove a pair, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &Node) -> Option<Node> {
        self.map.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Node, Node> {
        self.map.iter()
    }

    /// Iterate over pairs with mutable values. Keys stay immutable; editing
    /// a key in place could silently break uniqueness.
    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, Node, Node> {
        self.map.iter_mut()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, Node, Node> {
        self.map.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, Node, Node> {
        self.map.values()
    }
}

/// Mappings are equal when they hold the same pairs, in any order.
impl PartialEq for Mapping {
    fn eq(&self, other: &Mapping) -> bool {
        self.map == other.map
    }
}

impl Eq for Mapping {}

/// The total order compares the pair sequences in iteration order.
impl Ord for Mapping {
    fn cmp(&self, other: &Mapping) -> Ordering {
        self.map.iter().cmp(other.map.iter())
    }
}

impl PartialOrd for Mapping {
    fn partial_cmp(&self, other: &Mapping) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = (&'a Node, &'a Node);
    type IntoIter = indexmap::map::Iter<'a, Node, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

impl IntoIterator for Mapping {
    type Item = (Node, Node);
    type IntoIter = indexmap::map::IntoIter<Node, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

impl FromIterator<(Node, Node)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (Node, Node)>>(iter: I) -> Mapping {
        Mapping {
            map: iter.into_iter().collect(),
        }
    }
}

impl Extend<(Node, Node)> for Mapping {
    fn extend<I: IntoIterator<Item = (Node, Node)>>(&mut self, iter: I) {
        self.map.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_preserved() {
        let mut mapping = Mapping::new();
        mapping.insert(Node::from("zebra"), Node::from(1));
        mapping.insert(Node::from("apple"), Node::from(2));
        mapping.insert(Node::from("mango"), Node::from(3));
        let keys: Vec<_> = mapping
            .keys()
            .map(|key| key.as_str().unwrap().to_owned())
            .collect();
        assert_eq!(keys, ["zebra", "apple", "mango"]);
    }

    #[test]
    fn equality_ignores_order() {
        let forward: Mapping = [
            (Node::from("a"), Node::from(1)),
            (Node::from("b"), Node::from(2)),
        ]
        .into_iter()
        .collect();
        let backward: Mapping = [
            (Node::from("b"), Node::from(2)),
            (Node::from("a"), Node::from(1)),
        ]
        .into_iter()
        .collect();
        assert_eq!(forward, backward);
    }

    #[test]
    fn reinsert_keeps_position() {
        let mut mapping = Mapping::new();
        mapping.insert(Node::from("a"), Node::from(1));
        mapping.insert(Node::from("b"), Node::from(2));
        let old = mapping.insert(Node::from("a"), Node::from(3));
        assert_eq!(old, Some(Node::from(1)));
        let keys: Vec<_> = mapping
            .keys()
            .map(|key| key.as_str().unwrap().to_owned())
            .collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn complex_keys() {
        let mut mapping = Mapping::new();
        let key = Node::from(vec![Node::from(1), Node::from(2)]);
        mapping.insert(key.clone(), Node::from("value"));
        assert!(mapping.contains_key(&key));
        assert!(!mapping.contains_key(&Node::from(1)));
    }
}
