//! # graphdb-core
//!
//! An embeddable, labeled multi-graph store: string-identified nodes carrying
//! string-valued properties, connected by directed labeled edges.
//!
//! ## Core Principles
//!
//! - **Write-Through**: every mutation is mirrored to durable storage before
//!   it is acknowledged; nothing is buffered in memory only.
//! - **Fail Fast**: operations return errors immediately, no silent failures,
//!   no internal retries.
//! - **Explicit Rollback**: a persistence failure compensates the in-memory
//!   side so the two tiers never diverge.
//!
//! ## Architecture
//!
//! ```text
//! Persistent Graph (write-through wrapper, reader/writer lock)
//!     |
//!     +-- Graph Core (indexed nodes, edges, adjacency)
//!     |
//!     +-- Durable Backend (key-value store, atomic transactions)
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use graphdb_core::{PersistentGraph, Node};
//! use std::path::Path;
//!
//! let graph = PersistentGraph::open(Path::new("./my.graphdb")).unwrap();
//! graph.add_node(Node::new("user:alice").with_type("user")).unwrap();
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod graph;
pub mod persistent;
pub mod storage;

pub use error::{GraphError, Result};
pub use graph::query::{FindQuery, NeighborsQuery, PathsQuery};
pub use graph::{Direction, Edge, Graph, Node};
pub use persistent::PersistentGraph;
pub use storage::{DurableBackend, MemoryKv, StorageBackend, Stats};

#[cfg(feature = "rocksdb-backend")]
pub use storage::RocksKv;
