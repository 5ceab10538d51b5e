//! Canonical serialization of a tree-sitter tree.
//!
//! Comments and extras are dropped; every remaining token's text is kept,
//! so two serializations are byte-equal iff the trees agree on everything
//! but trivia and layout.

use std::fmt::Write as _;
use tree_sitter::Node;

pub(crate) fn serialize(node: Node, source: &str) -> String {
    let mut out = String::new();
    write_node(&mut out, node, source, None);
    out
}

/// Like [`serialize`], but the node with id `skip` (and its subtree) is
/// omitted.
pub(crate) fn serialize_skipping(node: Node, source: &str, skip: Option<usize>) -> String {
    let mut out = String::new();
    write_node(&mut out, node, source, skip);
    out
}

pub(crate) fn is_trivia(node: Node) -> bool {
    node.is_extra() || matches!(node.kind(), "comment" | "marginalia")
}

fn write_node(out: &mut String, node: Node, source: &str, skip: Option<usize>) {
    if is_trivia(node) || skip == Some(node.id()) {
        return;
    }
    let mut cursor = node.walk();
    let children = node.children(&mut cursor).collect::<Vec<_>>();
    if children.is_empty() {
        let _ = write!(out, "({} {:?})", node.kind(), &source[node.byte_range()]);
    } else {
        out.push('(');
        out.push_str(node.kind());
        for child in children {
            write_node(out, child, source, skip);
        }
        out.push(')');
    }
}
