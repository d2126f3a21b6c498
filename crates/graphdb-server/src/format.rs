//! Success-text rendering for tool results.
//!
//! These templates are part of the external contract — callers parse this
//! text, so the exact wording and punctuation must not drift.

use graphdb_core::{Edge, Node};

/// `Successfully added node '<id>' with type '<type>'`
pub fn added_node(node: &Node) -> String {
    format!(
        "Successfully added node '{}' with type '{}'",
        node.id, node.node_type
    )
}

/// `Successfully added edge '<from>' -> '<to>' with label '<label>'`
pub fn added_edge(edge: &Edge) -> String {
    format!(
        "Successfully added edge '{}' -> '{}' with label '{}'",
        edge.from, edge.to, edge.label
    )
}

/// `Successfully deleted node '<id>'`
pub fn deleted_node(id: &str) -> String {
    format!("Successfully deleted node '{id}'")
}

/// `Successfully deleted edge '<from>' -> '<to>' with label '<label>'`
pub fn deleted_edge(from: &str, to: &str, label: &str) -> String {
    format!("Successfully deleted edge '{from}' -> '{to}' with label '{label}'")
}

/// `Found N neighbors for node '<id>':\n- <id> (type: <t>)\n…`
pub fn neighbors(node_id: &str, nodes: &[Node]) -> String {
    let mut out = format!("Found {} neighbors for node '{node_id}':", nodes.len());
    for n in nodes {
        out.push_str(&format!("\n- {} (type: {})", n.id, n.node_type));
    }
    out
}

/// `Found N paths from '<from>' to '<to>':\nPath i: a -> b -> …\n…`
pub fn paths(from: &str, to: &str, found: &[Vec<String>]) -> String {
    let mut out = format!("Found {} paths from '{from}' to '{to}':", found.len());
    for (i, path) in found.iter().enumerate() {
        out.push_str(&format!("\nPath {}: {}", i + 1, path.join(" -> ")));
    }
    out
}

/// `Found N nodes matching criteria:\n- <id> (type: <t>) {k: v, …}\n…`
pub fn found(nodes: &[Node]) -> String {
    let mut out = format!("Found {} nodes matching criteria:", nodes.len());
    for n in nodes {
        let mut props: Vec<String> = n
            .props
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect();
        props.sort();
        out.push_str(&format!(
            "\n- {} (type: {}) {{{}}}",
            n.id,
            n.node_type,
            props.join(", ")
        ));
    }
    out
}
