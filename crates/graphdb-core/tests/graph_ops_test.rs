//! Integration tests for core graph operations (add/get/delete, neighbors).

use graphdb_core::{Direction, Edge, Node, PersistentGraph};

#[test]
fn add_node_rejects_duplicate_and_empty_id() {
    let pg = PersistentGraph::in_memory().unwrap();
    pg.add_node(Node::new("a")).unwrap();
    assert!(pg.add_node(Node::new("a")).is_err());
    assert!(pg.add_node(Node::new("")).is_err());
}

#[test]
fn get_node_returns_not_found_for_missing_id() {
    let pg = PersistentGraph::in_memory().unwrap();
    assert!(pg.get_node("ghost").is_err());
}

#[test]
fn add_edge_fails_with_missing_endpoints() {
    let pg = PersistentGraph::in_memory().unwrap();
    pg.add_node(Node::new("a")).unwrap();
    assert!(pg.add_edge(Edge::new("a", "missing", "knows")).is_err());
}

#[test]
fn multigraph_allows_distinct_labels_between_same_pair() {
    let pg = PersistentGraph::in_memory().unwrap();
    pg.add_node(Node::new("a")).unwrap();
    pg.add_node(Node::new("b")).unwrap();
    pg.add_edge(Edge::new("a", "b", "follows")).unwrap();
    pg.add_edge(Edge::new("a", "b", "likes")).unwrap();
    assert!(pg.add_edge(Edge::new("a", "b", "follows")).is_err());
}

#[test]
fn neighbors_both_direction_unions_and_dedups() {
    let pg = PersistentGraph::in_memory().unwrap();
    pg.add_node(Node::new("a")).unwrap();
    pg.add_node(Node::new("b")).unwrap();
    pg.add_edge(Edge::new("a", "b", "x")).unwrap();
    pg.add_edge(Edge::new("b", "a", "y")).unwrap();

    let mut both: Vec<String> = pg
        .neighbors("a", Direction::Both, None)
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    both.sort();
    assert_eq!(both, vec!["b".to_string()]);
}

#[test]
fn neighbors_restricted_by_label() {
    let pg = PersistentGraph::in_memory().unwrap();
    pg.add_node(Node::new("a")).unwrap();
    pg.add_node(Node::new("b")).unwrap();
    pg.add_node(Node::new("c")).unwrap();
    pg.add_edge(Edge::new("a", "b", "follows")).unwrap();
    pg.add_edge(Edge::new("a", "c", "blocks")).unwrap();

    let out = pg.neighbors("a", Direction::Out, Some("follows")).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "b");
}

#[test]
fn delete_node_cascades_to_incident_edges() {
    let pg = PersistentGraph::in_memory().unwrap();
    pg.add_node(Node::new("a")).unwrap();
    pg.add_node(Node::new("b")).unwrap();
    pg.add_edge(Edge::new("a", "b", "follows")).unwrap();

    pg.delete_node("a").unwrap();
    assert!(pg.get_edge("a", "b", "follows").is_err());
    assert!(pg.neighbors("b", Direction::In, None).unwrap().is_empty());
}

#[test]
fn delete_edge_is_independent_of_unrelated_labels() {
    let pg = PersistentGraph::in_memory().unwrap();
    pg.add_node(Node::new("a")).unwrap();
    pg.add_node(Node::new("b")).unwrap();
    pg.add_edge(Edge::new("a", "b", "follows")).unwrap();
    pg.add_edge(Edge::new("a", "b", "likes")).unwrap();

    pg.delete_edge("a", "b", "follows").unwrap();
    assert!(pg.get_edge("a", "b", "follows").is_err());
    assert!(pg.get_edge("a", "b", "likes").is_ok());
}
