//! Node/edge-aware durable backend: key encoding, transactions, and replay.

use super::{BatchOperation, StorageBackend};
use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph, Node};
use std::time::{SystemTime, UNIX_EPOCH};

const NODE_PREFIX: &[u8] = b"node:";
const EDGE_PREFIX: &[u8] = b"edge:";
const META_VERSION_KEY: &[u8] = b"meta:version";
const META_STATS_KEY: &[u8] = b"meta:stats";

/// The on-disk format version this implementation writes and accepts.
pub const STORAGE_VERSION: &str = "1.0";

/// Approximate database statistics.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stats {
    /// Approximate on-disk size in bytes (sum of serialized node/edge values).
    pub size_bytes: u64,
    /// Number of nodes currently stored.
    pub node_count: u64,
    /// Number of edges currently stored.
    pub edge_count: u64,
    /// Epoch seconds of the last successful save, if any.
    pub last_save: Option<u64>,
    /// Epoch seconds of the last successful load, if any.
    pub last_load: Option<u64>,
}

fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn node_key(id: &str) -> Vec<u8> {
    let mut key = NODE_PREFIX.to_vec();
    key.extend_from_slice(id.as_bytes());
    key
}

/// Encode a variable-length segment as a 4-byte big-endian length prefix
/// followed by its raw bytes, so concatenating several segments is
/// unambiguous regardless of the characters they contain. This is how edge
/// keys avoid collisions between ids/labels that themselves contain the
/// historical `:` separator.
fn push_length_prefixed(buf: &mut Vec<u8>, segment: &str) {
    let bytes = segment.as_bytes();
    buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(bytes);
}

fn edge_key(from: &str, to: &str, label: &str) -> Vec<u8> {
    let mut key = EDGE_PREFIX.to_vec();
    push_length_prefixed(&mut key, from);
    push_length_prefixed(&mut key, to);
    push_length_prefixed(&mut key, label);
    key
}

/// A node/edge-aware durable backend layered over a raw [`StorageBackend`].
pub struct DurableBackend {
    kv: Box<dyn StorageBackend>,
}

impl DurableBackend {
    /// Wrap a raw key-value backend, initializing the `meta:version` key if
    /// this is a fresh store, or refusing to proceed if an existing store
    /// carries an unknown version.
    pub fn new(kv: Box<dyn StorageBackend>) -> Result<Self> {
        let mut backend = Self { kv };
        match backend.kv.get(META_VERSION_KEY)? {
            None => {
                backend.kv.put(META_VERSION_KEY, STORAGE_VERSION.as_bytes())?;
            }
            Some(bytes) => {
                let version = String::from_utf8(bytes).map_err(|e| {
                    GraphError::serialization("meta:version is not valid UTF-8", Some(e))
                })?;
                if version != STORAGE_VERSION {
                    return Err(GraphError::storage(
                        format!(
                            "refusing to load database with version '{version}', expected '{STORAGE_VERSION}'"
                        ),
                        None::<std::io::Error>,
                    ));
                }
            }
        }
        Ok(backend)
    }

    /// Begin a transaction. Mutations are buffered and only touch the
    /// underlying store on [`Transaction::commit`].
    pub fn begin_transaction(&mut self) -> Transaction<'_> {
        Transaction {
            backend: self,
            ops: Vec::new(),
            committed: false,
        }
    }

    /// Replay the `nodes` then `edges` keyspaces into a freshly constructed
    /// [`Graph`]. Fails if any value does not deserialize, or if an edge
    /// references a node id absent from the replayed set.
    pub fn load_graph(&self) -> Result<Graph> {
        let mut graph = Graph::new();

        for (_, value) in self.kv.scan_prefix(NODE_PREFIX)? {
            let node: Node = serde_json::from_slice(&value)
                .map_err(|e| GraphError::serialization("failed to decode node", Some(e)))?;
            graph.add_node(node).map_err(|e| {
                GraphError::storage(format!("replay failed: {e}"), None::<std::io::Error>)
            })?;
        }

        for (_, value) in self.kv.scan_prefix(EDGE_PREFIX)? {
            let edge: Edge = serde_json::from_slice(&value)
                .map_err(|e| GraphError::serialization("failed to decode edge", Some(e)))?;
            graph.add_edge(edge).map_err(|e| {
                GraphError::storage(
                    format!("replay failed (referential integrity): {e}"),
                    None::<std::io::Error>,
                )
            })?;
        }

        Ok(graph)
    }

    /// Approximate size/count/timestamp statistics.
    pub fn stats(&self) -> Result<Stats> {
        let nodes = self.kv.scan_prefix(NODE_PREFIX)?;
        let edges = self.kv.scan_prefix(EDGE_PREFIX)?;
        let size_bytes: u64 = nodes
            .iter()
            .chain(edges.iter())
            .map(|(k, v)| (k.len() + v.len()) as u64)
            .sum();

        let stored: Option<Stats> = self
            .kv
            .get(META_STATS_KEY)?
            .and_then(|bytes| serde_json::from_slice(&bytes).ok());

        Ok(Stats {
            size_bytes,
            node_count: nodes.len() as u64,
            edge_count: edges.len() as u64,
            last_save: stored.as_ref().and_then(|s| s.last_save),
            last_load: stored.as_ref().and_then(|s| s.last_load),
        })
    }

    /// Record that a load just completed, for [`DurableBackend::stats`].
    pub fn record_load(&mut self) -> Result<()> {
        self.touch_stats(|s| s.last_load = Some(now_epoch_secs()))
    }

    fn touch_stats(&mut self, f: impl FnOnce(&mut Stats)) -> Result<()> {
        let mut stats = self
            .kv
            .get(META_STATS_KEY)?
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or(Stats {
                size_bytes: 0,
                node_count: 0,
                edge_count: 0,
                last_save: None,
                last_load: None,
            });
        f(&mut stats);
        let bytes = serde_json::to_vec(&stats)
            .map_err(|e| GraphError::serialization("failed to encode stats", Some(e)))?;
        self.kv.put(META_STATS_KEY, &bytes)
    }

    /// Release any resources held by the underlying store.
    pub fn close(&mut self) -> Result<()> {
        self.kv.flush()
    }
}

/// A buffered set of mutations that commit atomically in a single
/// `write_batch` call, or discard with no effect on `rollback`.
pub struct Transaction<'a> {
    backend: &'a mut DurableBackend,
    ops: Vec<BatchOperation>,
    committed: bool,
}

impl<'a> Transaction<'a> {
    /// Buffer a node upsert.
    pub fn save_node(&mut self, node: &Node) -> Result<()> {
        let bytes = serde_json::to_vec(node)
            .map_err(|e| GraphError::serialization("failed to encode node", Some(e)))?;
        self.ops.push(BatchOperation::Put {
            key: node_key(&node.id),
            value: bytes,
        });
        Ok(())
    }

    /// Buffer a node removal.
    pub fn delete_node(&mut self, id: &str) -> Result<()> {
        self.ops.push(BatchOperation::Delete {
            key: node_key(id),
        });
        Ok(())
    }

    /// Buffer an edge upsert.
    pub fn save_edge(&mut self, edge: &Edge) -> Result<()> {
        let bytes = serde_json::to_vec(edge)
            .map_err(|e| GraphError::serialization("failed to encode edge", Some(e)))?;
        self.ops.push(BatchOperation::Put {
            key: edge_key(&edge.from, &edge.to, &edge.label),
            value: bytes,
        });
        Ok(())
    }

    /// Buffer an edge removal.
    pub fn delete_edge(&mut self, from: &str, to: &str, label: &str) -> Result<()> {
        self.ops.push(BatchOperation::Delete {
            key: edge_key(from, to, label),
        });
        Ok(())
    }

    /// Commit all buffered operations in a single atomic batch. Safe to call
    /// more than once: a second call is a no-op.
    pub fn commit(&mut self) -> Result<()> {
        if self.committed {
            return Ok(());
        }
        let ops = std::mem::take(&mut self.ops);
        self.backend.kv.write_batch(ops)?;
        self.committed = true;
        self.backend.touch_stats(|s| s.last_save = Some(now_epoch_secs()))?;
        Ok(())
    }

    /// Discard all buffered operations. A safe no-op whether or not
    /// [`Transaction::commit`] already succeeded.
    pub fn rollback(&mut self) -> Result<()> {
        self.ops.clear();
        Ok(())
    }
}
