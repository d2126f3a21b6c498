//! Error types for graph operations.
//!
//! All fallible operations return [`Result<T>`] with context-rich error messages.

use thiserror::Error;

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Comprehensive error type for all graph operations.
///
/// Errors are designed to fail fast and provide clear context about what went wrong.
#[derive(Error, Debug)]
pub enum GraphError {
    /// A node with this id already exists.
    #[error("Node already exists: {id}")]
    NodeExists {
        /// The id that was already present.
        id: String,
    },

    /// A node id was empty; ids must be non-empty.
    #[error("Node id must not be empty")]
    EmptyNodeId,

    /// The referenced node does not exist.
    #[error("Node not found: {id}")]
    NodeNotFound {
        /// The missing node id.
        id: String,
    },

    /// An edge with this `(from, to, label)` triple already exists.
    #[error("Edge already exists: '{from}' -> '{to}' with label '{label}'")]
    EdgeExists {
        /// Source node id.
        from: String,
        /// Destination node id.
        to: String,
        /// Edge label.
        label: String,
    },

    /// The referenced edge does not exist.
    #[error("Edge not found: '{from}' -> '{to}' with label '{label}'")]
    EdgeNotFound {
        /// Source node id.
        from: String,
        /// Destination node id.
        to: String,
        /// Edge label.
        label: String,
    },

    /// A direction argument was not one of `in`, `out`, `both`.
    #[error("Invalid direction: {direction}")]
    InvalidDirection {
        /// The offending value.
        direction: String,
    },

    /// A path query's `max_depth` exceeded the hard ceiling.
    #[error("max_depth {max_depth} exceeds the ceiling of {ceiling}")]
    MaxDepthExceeded {
        /// The requested depth.
        max_depth: u32,
        /// The hard ceiling.
        ceiling: u32,
    },

    /// A find query was missing the required `type` filter.
    #[error("find queries without a 'type' filter are not supported")]
    UnsupportedFind,

    /// An operation was attempted after the graph was closed.
    #[error("graph is closed")]
    GraphClosed,

    /// Storage backend error (RocksDB, file I/O, etc.)
    #[error("Storage error: {message}")]
    Storage {
        /// Detailed error message.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error details.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid operation that doesn't fit the other variants (e.g. a
    /// compensation that itself could not be completed).
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Description of what went wrong.
        message: String,
    },
}

impl GraphError {
    /// Create a storage error from a message and optional source.
    pub fn storage<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Create a serialization error from a message and optional source.
    pub fn serialization<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Serialization {
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }
}
