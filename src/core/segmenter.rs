/// Segmenter — splits a reference script into ordered nodes.

use crate::schema::node::Node;

/// Split `text` on `'\n'` and keep every line that is non-empty after
/// trimming, in source order.
///
/// Kept nodes carry the untrimmed line, so a CRLF line keeps its trailing
/// `'\r'`. Empty or whitespace-only input yields no nodes.
pub fn segment(text: &str) -> Vec<Node> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(Node::from)
        .collect()
}
