//! The JSON-RPC / MCP dispatcher and its seven tool adapters.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use tracing::debug;

use graphdb_core::graph::query::{FindQuery, PathsQuery};
use graphdb_core::{Edge, Node, PersistentGraph};

use crate::format;
use crate::tools::{
    self, AddEdgeParams, AddNodeParams, DeleteEdgeParams, DeleteNodeParams, QueryFindParams,
    QueryNeighborsParams, QueryPathsParams,
};

fn mcp_err(msg: impl std::fmt::Display) -> McpError {
    McpError::internal_error(msg.to_string(), None)
}

/// Wrap a tool-level failure as a successful JSON-RPC result carrying
/// `isError: true` — per the protocol, a malformed argument or a graph
/// failure is never a JSON-RPC `error` object.
fn tool_error(message: impl std::fmt::Display) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!("Error: {message}"))])
}

fn tool_ok(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

/// The MCP server: a thin JSON-RPC dispatcher around a shared [`PersistentGraph`].
///
/// `PersistentGraph` is already internally synchronized (a single
/// reader/writer lock covers both the in-memory graph and the backend
/// transaction), so the server only needs to share it behind an `Arc` —
/// no additional mutex is layered on top.
#[derive(Clone)]
pub struct GraphDbServer {
    tool_router: ToolRouter<Self>,
    graph: Arc<PersistentGraph>,
}

#[tool_router]
impl GraphDbServer {
    /// Wrap an already-open graph for serving.
    pub fn new(graph: Arc<PersistentGraph>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            graph,
        }
    }

    /// Insert a node into the graph.
    #[tool(description = "Add a node with an id, optional type, and optional string-valued properties.")]
    pub(crate) async fn add_node(
        &self,
        Parameters(params): Parameters<AddNodeParams>,
    ) -> Result<CallToolResult, McpError> {
        let graph = Arc::clone(&self.graph);
        tokio::task::spawn_blocking(move || {
            let id = match tools::require_string(&params.id, "id") {
                Ok(id) => id,
                Err(e) => return tool_error(e),
            };
            let node = Node::new(id)
                .with_type(params.node_type.unwrap_or_default())
                .with_props(tools::coerce_props(params.props));

            debug!(id = %node.id, "add_node");
            match graph.add_node(node.clone()) {
                Ok(()) => tool_ok(format::added_node(&node)),
                Err(e) => tool_error(e),
            }
        })
        .await
        .map_err(|e| mcp_err(format!("task join failed: {e}")))
    }

    /// Insert an edge into the graph.
    #[tool(description = "Add an edge between two existing nodes, with a label and optional string-valued properties.")]
    pub(crate) async fn add_edge(
        &self,
        Parameters(params): Parameters<AddEdgeParams>,
    ) -> Result<CallToolResult, McpError> {
        let graph = Arc::clone(&self.graph);
        tokio::task::spawn_blocking(move || {
            let from = match tools::require_string(&params.from, "from") {
                Ok(v) => v,
                Err(e) => return tool_error(e),
            };
            let to = match tools::require_string(&params.to, "to") {
                Ok(v) => v,
                Err(e) => return tool_error(e),
            };
            let label = match tools::require_string(&params.label, "label") {
                Ok(v) => v,
                Err(e) => return tool_error(e),
            };
            let edge = Edge::new(from, to, label).with_props(tools::coerce_props(params.props));

            debug!(from = %edge.from, to = %edge.to, label = %edge.label, "add_edge");
            match graph.add_edge(edge.clone()) {
                Ok(()) => tool_ok(format::added_edge(&edge)),
                Err(e) => tool_error(e),
            }
        })
        .await
        .map_err(|e| mcp_err(format!("task join failed: {e}")))
    }

    /// Delete a node and every edge incident to it.
    #[tool(description = "Delete a node by id. Cascades to every edge incident to it.")]
    pub(crate) async fn delete_node(
        &self,
        Parameters(params): Parameters<DeleteNodeParams>,
    ) -> Result<CallToolResult, McpError> {
        let graph = Arc::clone(&self.graph);
        tokio::task::spawn_blocking(move || {
            let id = match tools::require_string(&params.id, "id") {
                Ok(id) => id,
                Err(e) => return tool_error(e),
            };
            debug!(id = %id, "delete_node");
            match graph.delete_node(&id) {
                Ok(()) => tool_ok(format::deleted_node(&id)),
                Err(e) => tool_error(e),
            }
        })
        .await
        .map_err(|e| mcp_err(format!("task join failed: {e}")))
    }

    /// Delete an edge by its `(from, to, label)` identity.
    #[tool(description = "Delete an edge identified by its (from, to, label) triple.")]
    pub(crate) async fn delete_edge(
        &self,
        Parameters(params): Parameters<DeleteEdgeParams>,
    ) -> Result<CallToolResult, McpError> {
        let graph = Arc::clone(&self.graph);
        tokio::task::spawn_blocking(move || {
            let from = match tools::require_string(&params.from, "from") {
                Ok(v) => v,
                Err(e) => return tool_error(e),
            };
            let to = match tools::require_string(&params.to, "to") {
                Ok(v) => v,
                Err(e) => return tool_error(e),
            };
            let label = match tools::require_string(&params.label, "label") {
                Ok(v) => v,
                Err(e) => return tool_error(e),
            };
            debug!(from = %from, to = %to, label = %label, "delete_edge");
            match graph.delete_edge(&from, &to, &label) {
                Ok(()) => tool_ok(format::deleted_edge(&from, &to, &label)),
                Err(e) => tool_error(e),
            }
        })
        .await
        .map_err(|e| mcp_err(format!("task join failed: {e}")))
    }

    /// Enumerate a node's neighbors.
    #[tool(description = "Find neighbors of a node. direction is one of in/out/both (default both); label restricts to edges with that label.")]
    pub(crate) async fn query_neighbors(
        &self,
        Parameters(params): Parameters<QueryNeighborsParams>,
    ) -> Result<CallToolResult, McpError> {
        let graph = Arc::clone(&self.graph);
        tokio::task::spawn_blocking(move || {
            let node = match tools::require_string(&params.node, "node") {
                Ok(v) => v,
                Err(e) => return tool_error(e),
            };
            let direction = match tools::coerce_direction(params.direction.as_deref()) {
                Ok(d) => d,
                Err(e) => return tool_error(e),
            };
            debug!(node = %node, "query_neighbors");
            match graph.neighbors(&node, direction, params.label.as_deref()) {
                Ok(nodes) => tool_ok(format::neighbors(&node, &nodes)),
                Err(e) => tool_error(e),
            }
        })
        .await
        .map_err(|e| mcp_err(format!("task join failed: {e}")))
    }

    /// Find bounded, simple, forward-directed paths between two nodes.
    #[tool(description = "Find all simple directed paths from one node to another, up to max_depth edges (1-10, default 4).")]
    pub(crate) async fn query_paths(
        &self,
        Parameters(params): Parameters<QueryPathsParams>,
    ) -> Result<CallToolResult, McpError> {
        let graph = Arc::clone(&self.graph);
        tokio::task::spawn_blocking(move || {
            let from = match tools::require_string(&params.from, "from") {
                Ok(v) => v,
                Err(e) => return tool_error(e),
            };
            let to = match tools::require_string(&params.to, "to") {
                Ok(v) => v,
                Err(e) => return tool_error(e),
            };
            let max_depth = match tools::coerce_max_depth(params.max_depth.as_ref()) {
                Ok(d) => d,
                Err(e) => return tool_error(e),
            };
            let q = PathsQuery {
                from: from.clone(),
                to: to.clone(),
                max_depth,
            };
            debug!(from = %q.from, to = %q.to, max_depth, "query_paths");
            match graph.query_paths(&q) {
                Ok(found) => tool_ok(format::paths(&from, &to, &found)),
                Err(e) => tool_error(e),
            }
        })
        .await
        .map_err(|e| mcp_err(format!("task join failed: {e}")))
    }

    /// Find nodes by type and/or exact property match.
    #[tool(description = "Find nodes by type and/or exact property match. At least one of type or props is required.")]
    pub(crate) async fn query_find(
        &self,
        Parameters(params): Parameters<QueryFindParams>,
    ) -> Result<CallToolResult, McpError> {
        let graph = Arc::clone(&self.graph);
        tokio::task::spawn_blocking(move || {
            let filters = match tools::build_find_filters(params.node_type, params.props) {
                Ok(f) => f,
                Err(e) => return tool_error(e),
            };
            debug!(filters = ?filters, "query_find");
            match graph.query_find(&FindQuery { filters }) {
                Ok(nodes) => tool_ok(format::found(&nodes)),
                Err(e) => tool_error(e),
            }
        })
        .await
        .map_err(|e| mcp_err(format!("task join failed: {e}")))
    }
}

#[tool_handler]
impl ServerHandler for GraphDbServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "graphdb".into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some(
                "graphdb is a local labeled multi-graph database. Use add_node/add_edge to \
                 build the graph, query_neighbors/query_paths/query_find to read it. All \
                 mutations are durable immediately when a -db path is given."
                    .into(),
            ),
        }
    }
}

/// Start the MCP server over stdio.
pub async fn run_server(graph: Arc<PersistentGraph>) -> anyhow::Result<()> {
    tracing::info!("starting graphdb-server v{}", env!("CARGO_PKG_VERSION"));

    let server = GraphDbServer::new(graph);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    tracing::info!("graphdb-server stopped");
    Ok(())
}
