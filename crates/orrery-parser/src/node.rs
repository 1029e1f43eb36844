//! Ordered configuration tree.

/// A named node holding ordered key/value pairs and ordered child nodes.
///
/// Keys and child names may repeat and keep the order in which they were read.
/// Lookups are case-sensitive and exact.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigNode {
    name: String,
    values: Vec<(String, String)>,
    nodes: Vec<ConfigNode>,
}

impl ConfigNode {
    /// Creates an empty node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Builder form of [`add_value`](Self::add_value).
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_value(key, value);
        self
    }

    /// Builder form of [`add_node`](Self::add_node).
    pub fn with_node(mut self, node: ConfigNode) -> Self {
        self.add_node(node);
        self
    }

    /// Appends a key/value pair.
    pub fn add_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.push((key.into(), value.into()));
    }

    /// Appends a child node.
    pub fn add_node(&mut self, node: ConfigNode) {
        self.nodes.push(node);
    }

    /// Node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All key/value pairs in order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All child nodes in order.
    pub fn nodes(&self) -> &[ConfigNode] {
        &self.nodes
    }

    /// First value stored under `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value stored under `key`, in order.
    pub fn values_of<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.values
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if at least one value is stored under `key`.
    pub fn has_value(&self, key: &str) -> bool {
        self.values.iter().any(|(k, _)| k == key)
    }

    /// First child node called `name`.
    pub fn node(&self, name: &str) -> Option<&ConfigNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Every child node called `name`, in order.
    pub fn nodes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigNode> + 'a {
        self.nodes.iter().filter(move |n| n.name == name)
    }

    /// Returns `true` if at least one child node is called `name`.
    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name == name)
    }

    /// Returns `true` if the node has neither values nor children.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.nodes.is_empty()
    }

    /// Moves every value and child of `other` to the end of this node.
    pub fn append(&mut self, other: ConfigNode) {
        self.values.extend(other.values);
        self.nodes.extend(other.nodes);
    }

    /// Writes the node, including its own name and braces, in the text format.
    pub fn to_text(&self) -> String {
        crate::text::write_node(self)
    }
}
