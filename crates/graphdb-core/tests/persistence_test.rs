//! Durability and compensation tests against the RocksDB-backed store.

use graphdb_core::{Direction, Edge, Node, PersistentGraph};
use tempfile::TempDir;

#[test]
fn durability_round_trip_across_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let pg = PersistentGraph::open(dir.path()).unwrap();
        pg.add_node(Node::new("user:alice").with_type("user"))
            .unwrap();
        pg.add_node(Node::new("a")).unwrap();
        pg.add_node(Node::new("b")).unwrap();
        pg.add_edge(Edge::new("a", "b", "follows")).unwrap();
        pg.close().unwrap();
    }

    let reopened = PersistentGraph::open(dir.path()).unwrap();
    let out = reopened.neighbors("a", Direction::Out, None).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "b");

    let users = reopened.nodes_by_type("user").unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, "user:alice");
}

#[test]
fn cascade_delete_is_durable_across_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let pg = PersistentGraph::open(dir.path()).unwrap();
        pg.add_node(Node::new("a")).unwrap();
        pg.add_node(Node::new("b")).unwrap();
        pg.add_edge(Edge::new("a", "b", "follows")).unwrap();
        pg.delete_node("a").unwrap();
        pg.close().unwrap();
    }

    let reopened = PersistentGraph::open(dir.path()).unwrap();
    assert!(reopened.get_node("a").is_err());
    assert!(reopened.get_edge("a", "b", "follows").is_err());
}

#[test]
fn unknown_version_is_refused_rather_than_migrated() {
    use graphdb_core::{DurableBackend, MemoryKv, StorageBackend};

    let mut kv = MemoryKv::new();
    kv.put(b"meta:version", b"99.0").unwrap();
    let err = DurableBackend::new(Box::new(kv));
    assert!(err.is_err());
}
