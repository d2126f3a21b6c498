//! The three built-in query kinds: neighbors, bounded paths, and find.

use super::store::Graph;
use super::types::{Direction, Node};
use crate::error::{GraphError, Result};
use std::collections::{HashMap, VecDeque};

/// The hard ceiling on `max_depth` for a paths query.
pub const MAX_DEPTH_CEILING: u32 = 10;

/// The default `max_depth` when a paths query omits it.
pub const DEFAULT_MAX_DEPTH: u32 = 4;

/// Parameters for a neighbors query.
#[derive(Debug, Clone)]
pub struct NeighborsQuery {
    /// The node whose neighbors are requested.
    pub node: String,
    /// Traversal orientation.
    pub direction: Direction,
    /// Restrict to edges carrying this label, if given.
    pub label: Option<String>,
}

/// Parameters for a bounded path query.
#[derive(Debug, Clone)]
pub struct PathsQuery {
    /// The starting node.
    pub from: String,
    /// The destination node.
    pub to: String,
    /// Maximum edge count per returned path.
    pub max_depth: u32,
}

/// Parameters for a property-based find query.
#[derive(Debug, Clone)]
pub struct FindQuery {
    /// Criterion -> value. Must contain `type`.
    pub filters: HashMap<String, String>,
}

/// A directed walk, given as the sequence of node ids it visits in order.
pub type Path = Vec<String>;

/// Run a neighbors query against `graph`.
pub fn run_neighbors(graph: &Graph, q: &NeighborsQuery) -> Result<Vec<Node>> {
    let ids = graph.neighbors(&q.node, q.direction, q.label.as_deref())?;
    ids.into_iter()
        .map(|id| graph.get_node(&id))
        .collect::<Result<Vec<_>>>()
}

/// Run a bounded path query against `graph`.
///
/// Breadth-first, forward direction only, pruning any extension that would
/// revisit a node already on the current path. A self-query (`from == to`)
/// returns the single zero-length path containing only that node.
pub fn run_paths(graph: &Graph, q: &PathsQuery) -> Result<Vec<Path>> {
    if q.max_depth == 0 || q.max_depth > MAX_DEPTH_CEILING {
        return Err(GraphError::MaxDepthExceeded {
            max_depth: q.max_depth,
            ceiling: MAX_DEPTH_CEILING,
        });
    }
    if !graph.has_node(&q.from) {
        return Err(GraphError::NodeNotFound {
            id: q.from.clone(),
        });
    }
    if !graph.has_node(&q.to) {
        return Err(GraphError::NodeNotFound { id: q.to.clone() });
    }

    if q.from == q.to {
        return Ok(vec![vec![q.from.clone()]]);
    }

    let mut results = Vec::new();
    let mut queue: VecDeque<Path> = VecDeque::new();
    queue.push_back(vec![q.from.clone()]);

    while let Some(path) = queue.pop_front() {
        let depth = (path.len() - 1) as u32;
        if depth >= q.max_depth {
            continue;
        }
        let current = path.last().expect("path is never empty").clone();
        let neighbors = graph.neighbors(&current, Direction::Out, None)?;
        for next in neighbors {
            if path.contains(&next) {
                continue;
            }
            let mut extended = path.clone();
            extended.push(next.clone());
            if next == q.to {
                results.push(extended.clone());
            }
            queue.push_back(extended);
        }
    }

    Ok(results)
}

/// Run a find query against `graph`.
///
/// Requires a `type` filter; all other filters are matched exactly against
/// `node.props`.
pub fn run_find(graph: &Graph, q: &FindQuery) -> Result<Vec<Node>> {
    let node_type = q.filters.get("type").ok_or(GraphError::UnsupportedFind)?;
    let candidates = graph.nodes_by_type(node_type)?;

    Ok(candidates
        .into_iter()
        .filter(|node| {
            q.filters
                .iter()
                .filter(|(k, _)| k.as_str() != "type")
                .all(|(k, v)| node.props.get(k) == Some(v))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::Edge;

    fn linear_graph() -> Graph {
        let mut g = Graph::new();
        for id in ["a", "b", "c", "d"] {
            g.add_node(Node::new(id)).unwrap();
        }
        g.add_edge(Edge::new("a", "b", "e")).unwrap();
        g.add_edge(Edge::new("b", "c", "e")).unwrap();
        g.add_edge(Edge::new("c", "d", "e")).unwrap();
        g.add_edge(Edge::new("a", "d", "e")).unwrap();
        g
    }

    #[test]
    fn bounded_path_search_finds_both_paths() {
        let g = linear_graph();
        let q = PathsQuery {
            from: "a".to_string(),
            to: "d".to_string(),
            max_depth: 3,
        };
        let mut paths = run_paths(&g, &q).unwrap();
        paths.sort_by_key(|p| p.len());
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], vec!["a", "d"]);
        assert_eq!(paths[1], vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn bounded_path_search_respects_max_depth() {
        let g = linear_graph();
        let q = PathsQuery {
            from: "a".to_string(),
            to: "d".to_string(),
            max_depth: 1,
        };
        let paths = run_paths(&g, &q).unwrap();
        assert_eq!(paths, vec![vec!["a".to_string(), "d".to_string()]]);
    }

    #[test]
    fn self_query_returns_zero_length_path() {
        let g = linear_graph();
        let q = PathsQuery {
            from: "a".to_string(),
            to: "a".to_string(),
            max_depth: 4,
        };
        let paths = run_paths(&g, &q).unwrap();
        assert_eq!(paths, vec![vec!["a".to_string()]]);
    }

    #[test]
    fn max_depth_above_ceiling_is_rejected() {
        let g = linear_graph();
        let q = PathsQuery {
            from: "a".to_string(),
            to: "d".to_string(),
            max_depth: 11,
        };
        assert!(matches!(
            run_paths(&g, &q).unwrap_err(),
            GraphError::MaxDepthExceeded { .. }
        ));
    }

    #[test]
    fn find_requires_type_filter() {
        let g = linear_graph();
        let q = FindQuery {
            filters: HashMap::new(),
        };
        assert!(matches!(
            run_find(&g, &q).unwrap_err(),
            GraphError::UnsupportedFind
        ));
    }

    #[test]
    fn find_filters_by_type_and_props() {
        let mut g = Graph::new();
        g.add_node(
            Node::new("user:alice")
                .with_type("user")
                .with_props([("name".to_string(), "Alice".to_string())].into()),
        )
        .unwrap();
        g.add_node(Node::new("user:bob").with_type("user"))
            .unwrap();

        let mut filters = HashMap::new();
        filters.insert("type".to_string(), "user".to_string());
        filters.insert("name".to_string(), "Alice".to_string());
        let results = run_find(&g, &FindQuery { filters }).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "user:alice");
    }
}
