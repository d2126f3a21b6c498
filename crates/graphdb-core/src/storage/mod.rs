//! Storage backend abstractions and implementations.
//!
//! This module defines the low-level [`StorageBackend`] key-value trait and
//! two implementations ([`MemoryKv`], [`RocksKv`]), then layers a
//! node/edge-aware [`DurableBackend`] on top that understands the three
//! logical keyspaces (`nodes`, `edges`, `meta`) and exposes transactions.
//!
//! ## Design Philosophy
//!
//! - **Persistence Primary**: RocksDB is the production backend; the memory
//!   backend exists for tests and in-memory mode.
//! - **Explicit Operations**: no automatic flushing or background magic.
//! - **Fail Fast**: operations return errors immediately, no silent failures.

mod backend;
mod memory_kv;
#[cfg(feature = "rocksdb-backend")]
mod rocksdb_kv;

pub use backend::{DurableBackend, Stats, Transaction};
pub use memory_kv::MemoryKv;
#[cfg(feature = "rocksdb-backend")]
pub use rocksdb_kv::RocksKv;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Key-value pair returned by a prefix scan.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// Low-level byte-oriented key-value storage interface.
///
/// All operations are explicit and return `Result` to surface failures.
/// Implementations must ensure atomic batch operations.
pub trait StorageBackend: Send + Sync {
    /// Store a key-value pair. Durable immediately.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GraphError::Storage`] if the write fails.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Retrieve a value by key. `Ok(None)` if the key doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GraphError::Storage`] if the read fails.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Delete a key-value pair. Idempotent: missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GraphError::Storage`] if the delete fails.
    fn delete(&mut self, key: &[u8]) -> Result<()>;

    /// Iterate over all key-value pairs whose key starts with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GraphError::Storage`] if iteration setup fails.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<KeyValue>>;

    /// Execute a batch of write operations atomically.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GraphError::Storage`] if any operation in the batch fails.
    fn write_batch(&mut self, operations: Vec<BatchOperation>) -> Result<()>;

    /// Flush any buffered writes to disk. No automatic flushing happens.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GraphError::Storage`] if flush fails.
    fn flush(&mut self) -> Result<()>;
}

/// A single write operation in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put {
        /// Key to write.
        key: Vec<u8>,
        /// Value to write.
        value: Vec<u8>,
    },
    /// Delete a key.
    Delete {
        /// Key to delete.
        key: Vec<u8>,
    },
}
