use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// One line of the reference script, the unit that receives independent
/// rewrites.
///
/// Holds the original line content. Whitespace is only used to decide whether
/// a line becomes a node, never stripped from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node(pub String);

impl Node {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

/// The ordered rewrites produced for a single node.
///
/// Order only determines output order, not correctness. An empty set is
/// structurally allowed and collapses every combination built from it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VariantSet(pub Vec<String>);

impl VariantSet {
    pub fn new(variants: Vec<String>) -> Self {
        Self(variants)
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Deref for VariantSet {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for VariantSet {
    fn from(variants: Vec<String>) -> Self {
        Self(variants)
    }
}

impl<const N: usize> From<[&str; N]> for VariantSet {
    fn from(variants: [&str; N]) -> Self {
        Self(variants.iter().map(|v| v.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_keeps_original_content() {
        let node = Node::new("  hello there ");
        assert_eq!(node.as_str(), "  hello there ");
        assert_eq!(node.to_string(), "  hello there ");
    }

    #[test]
    fn variant_set_derefs_to_slice() {
        let set = VariantSet::from(["a", "b"]);
        assert_eq!(set.len(), 2);
        assert_eq!(set[1], "b");
        assert!(VariantSet::default().is_empty());
    }
}
