//! The in-memory graph core: indexed node/edge storage with O(1) lookup.

use super::types::{Direction, Edge, Node};
use crate::error::{GraphError, Result};
use std::collections::{HashMap, HashSet};

/// The identity triple of an edge: `(from, to, label)`.
pub type EdgeKey = (String, String, String);

/// Indexed in-memory store for nodes and edges.
///
/// `Graph` has no internal synchronization — callers that need concurrent
/// access should wrap it (see [`crate::persistent::PersistentGraph`]), which
/// also drives the durable backend. `Graph` on its own is a pure, in-process
/// value structure.
#[derive(Debug, Default)]
pub struct Graph {
    by_id: HashMap<String, Node>,
    by_type: HashMap<String, HashSet<String>>,
    edges: HashMap<EdgeKey, Edge>,
    out_edges: HashMap<String, HashSet<EdgeKey>>,
    in_edges: HashMap<String, HashSet<EdgeKey>>,
    closed: bool,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(GraphError::GraphClosed)
        } else {
            Ok(())
        }
    }

    /// Insert a node.
    ///
    /// Fails with [`GraphError::NodeExists`] if the id is already present,
    /// or [`GraphError::EmptyNodeId`] if `node.id` is empty.
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        self.ensure_open()?;
        if node.id.is_empty() {
            return Err(GraphError::EmptyNodeId);
        }
        if self.by_id.contains_key(&node.id) {
            return Err(GraphError::NodeExists { id: node.id });
        }
        if node.is_typed() {
            self.by_type
                .entry(node.node_type.clone())
                .or_default()
                .insert(node.id.clone());
        }
        self.by_id.insert(node.id.clone(), node);
        Ok(())
    }

    /// Fetch a snapshot of a node by id.
    pub fn get_node(&self, id: &str) -> Result<Node> {
        self.ensure_open()?;
        self.by_id
            .get(id)
            .cloned()
            .ok_or_else(|| GraphError::NodeNotFound { id: id.to_string() })
    }

    /// Whether a node with this id exists.
    pub fn has_node(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Remove a node and every edge incident to it (in either direction).
    pub fn delete_node(&mut self, id: &str) -> Result<(Node, Vec<Edge>)> {
        self.ensure_open()?;
        let node = self
            .by_id
            .remove(id)
            .ok_or_else(|| GraphError::NodeNotFound { id: id.to_string() })?;

        if node.is_typed() {
            if let Some(set) = self.by_type.get_mut(&node.node_type) {
                set.remove(id);
                if set.is_empty() {
                    self.by_type.remove(&node.node_type);
                }
            }
        }

        let mut removed = Vec::new();
        let incident: HashSet<EdgeKey> = self
            .out_edges
            .get(id)
            .into_iter()
            .flatten()
            .chain(self.in_edges.get(id).into_iter().flatten())
            .cloned()
            .collect();

        for key in incident {
            if let Some(edge) = self.remove_edge_indexes(&key) {
                removed.push(edge);
            }
        }
        self.out_edges.remove(id);
        self.in_edges.remove(id);

        Ok((node, removed))
    }

    /// Insert an edge. Both endpoints must already exist.
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        self.ensure_open()?;
        if edge.from.is_empty() || edge.to.is_empty() || edge.label.is_empty() {
            return Err(GraphError::InvalidOperation {
                message: "edge from/to/label must be non-empty".to_string(),
            });
        }
        if !self.by_id.contains_key(&edge.from) {
            return Err(GraphError::NodeNotFound {
                id: edge.from.clone(),
            });
        }
        if !self.by_id.contains_key(&edge.to) {
            return Err(GraphError::NodeNotFound { id: edge.to.clone() });
        }
        let key = edge.key();
        if self.edges.contains_key(&key) {
            return Err(GraphError::EdgeExists {
                from: edge.from,
                to: edge.to,
                label: edge.label,
            });
        }
        self.out_edges
            .entry(edge.from.clone())
            .or_default()
            .insert(key.clone());
        self.in_edges
            .entry(edge.to.clone())
            .or_default()
            .insert(key.clone());
        self.edges.insert(key, edge);
        Ok(())
    }

    /// Fetch a snapshot of an edge by identity.
    pub fn get_edge(&self, from: &str, to: &str, label: &str) -> Result<Edge> {
        self.ensure_open()?;
        let key = (from.to_string(), to.to_string(), label.to_string());
        self.edges
            .get(&key)
            .cloned()
            .ok_or_else(|| GraphError::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
                label: label.to_string(),
            })
    }

    /// Remove an edge by identity.
    pub fn delete_edge(&mut self, from: &str, to: &str, label: &str) -> Result<Edge> {
        self.ensure_open()?;
        let key = (from.to_string(), to.to_string(), label.to_string());
        self.remove_edge_indexes(&key)
            .ok_or_else(|| GraphError::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
                label: label.to_string(),
            })
    }

    fn remove_edge_indexes(&mut self, key: &EdgeKey) -> Option<Edge> {
        let edge = self.edges.remove(key)?;
        if let Some(set) = self.out_edges.get_mut(&edge.from) {
            set.remove(key);
            if set.is_empty() {
                self.out_edges.remove(&edge.from);
            }
        }
        if let Some(set) = self.in_edges.get_mut(&edge.to) {
            set.remove(key);
            if set.is_empty() {
                self.in_edges.remove(&edge.to);
            }
        }
        Some(edge)
    }

    /// Enumerate deduplicated neighbor node ids in the requested direction,
    /// optionally restricted to edges carrying a specific label.
    pub fn neighbors(
        &self,
        id: &str,
        direction: Direction,
        label: Option<&str>,
    ) -> Result<Vec<String>> {
        self.ensure_open()?;
        if !self.by_id.contains_key(id) {
            return Err(GraphError::NodeNotFound { id: id.to_string() });
        }

        let mut seen = HashSet::new();
        let mut result = Vec::new();

        let mut push_via = |keys: &HashSet<EdgeKey>, other: fn(&EdgeKey) -> &String| {
            for key in keys {
                if let Some(l) = label {
                    if key.2 != l {
                        continue;
                    }
                }
                let neighbor = other(key);
                if seen.insert(neighbor.clone()) {
                    result.push(neighbor.clone());
                }
            }
        };

        if matches!(direction, Direction::Out | Direction::Both) {
            if let Some(keys) = self.out_edges.get(id) {
                push_via(keys, |k| &k.1);
            }
        }
        if matches!(direction, Direction::In | Direction::Both) {
            if let Some(keys) = self.in_edges.get(id) {
                push_via(keys, |k| &k.0);
            }
        }

        Ok(result)
    }

    /// All edges whose `from` equals `id`.
    pub fn out_edges(&self, id: &str) -> Vec<Edge> {
        self.out_edges
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|k| self.edges.get(k).cloned())
            .collect()
    }

    /// All edges whose `to` equals `id`.
    pub fn in_edges(&self, id: &str) -> Vec<Edge> {
        self.in_edges
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|k| self.edges.get(k).cloned())
            .collect()
    }

    /// All nodes carrying the given type tag. Unknown types yield an empty
    /// list, never an error.
    pub fn nodes_by_type(&self, node_type: &str) -> Result<Vec<Node>> {
        self.ensure_open()?;
        Ok(self
            .by_type
            .get(node_type)
            .into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id).cloned())
            .collect())
    }

    /// Number of nodes currently stored.
    pub fn node_count(&self) -> usize {
        self.by_id.len()
    }

    /// Number of edges currently stored.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterate over every node (used for durability round-trips and future
    /// export paths; nothing in the live request flow requires it).
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.by_id.values()
    }

    /// Iterate over every edge.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Mark the graph closed; every subsequent operation fails with
    /// [`GraphError::GraphClosed`].
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
