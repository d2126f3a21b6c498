//! Core data types: nodes, edges, and traversal direction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A property map: string keys to string values.
///
/// The public JSON shape omits this field entirely when it is empty, but an
/// absent map and an empty map are equivalent once loaded — both normalize
/// to an empty mapping.
pub type Props = HashMap<String, String>;

/// A string-identified vertex carrying an optional type tag and a property map.
///
/// A node is created once and never mutated in place — "updates" are a
/// `delete_node` followed by a fresh `add_node`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique, non-empty identifier.
    pub id: String,
    /// Classification tag. Empty string means "untyped".
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub node_type: String,
    /// Free-form string-valued properties.
    #[serde(default, skip_serializing_if = "Props::is_empty")]
    pub props: Props,
}

impl Node {
    /// Create a new untyped node with no properties.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: String::new(),
            props: Props::new(),
        }
    }

    /// Attach a type tag, consuming and returning `self`.
    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = node_type.into();
        self
    }

    /// Attach a property map, consuming and returning `self`.
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    /// Whether this node carries a non-empty type tag.
    pub fn is_typed(&self) -> bool {
        !self.node_type.is_empty()
    }
}

/// A directed, labeled connection between two nodes.
///
/// The triple `(from, to, label)` is the edge's identity: at most one edge
/// exists per triple, but distinct labels between the same ordered pair are
/// permitted (this is a multigraph).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node id.
    pub from: String,
    /// Destination node id.
    pub to: String,
    /// Non-empty edge label.
    pub label: String,
    /// Free-form string-valued properties.
    #[serde(default, skip_serializing_if = "Props::is_empty")]
    pub props: Props,
}

impl Edge {
    /// Create a new edge with no properties.
    pub fn new(from: impl Into<String>, to: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: label.into(),
            props: Props::new(),
        }
    }

    /// Attach a property map, consuming and returning `self`.
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    /// The identity triple for this edge.
    pub fn key(&self) -> (String, String, String) {
        (self.from.clone(), self.to.clone(), self.label.clone())
    }
}

/// Traversal orientation for a neighbors query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Follow edges where the queried node is `from`.
    Out,
    /// Follow edges where the queried node is `to`.
    In,
    /// Union of `Out` and `In`.
    Both,
}

impl Direction {
    /// Parse the three accepted wire values (`"out"`, `"in"`, `"both"`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "out" => Some(Direction::Out),
            "in" => Some(Direction::In),
            "both" => Some(Direction::Both),
            _ => None,
        }
    }
}
