//! The graph core: indexed storage, data types, and the three query kinds.

pub mod query;
pub mod store;
pub mod types;

pub use query::{FindQuery, NeighborsQuery, PathsQuery};
pub use store::Graph;
pub use types::{Direction, Edge, Node, Props};
