//! Tool parameter schemas and the argument-coercion rules shared by all
//! seven adapters.

use graphdb_core::{Direction, Props};
use rmcp::schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Lower bound on `max_depth` accepted by `query_paths`.
pub const MIN_MAX_DEPTH: u32 = 1;
/// Upper bound on `max_depth` accepted by `query_paths`.
pub const MAX_MAX_DEPTH: u32 = 10;
/// The default `max_depth` when the caller omits it.
pub const DEFAULT_MAX_DEPTH: u32 = 4;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddNodeParams {
    /// Unique, non-empty node identifier. Loosely typed so a missing or
    /// non-string value surfaces as a tool error rather than failing
    /// argument extraction before the tool body runs.
    #[serde(default)]
    pub id: Option<Value>,
    /// Classification tag; omit for an untyped node.
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    /// String-valued properties. Non-string values are silently dropped.
    #[serde(default)]
    pub props: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddEdgeParams {
    /// Source node id.
    #[serde(default)]
    pub from: Option<Value>,
    /// Destination node id.
    #[serde(default)]
    pub to: Option<Value>,
    /// Non-empty edge label.
    #[serde(default)]
    pub label: Option<Value>,
    /// String-valued properties. Non-string values are silently dropped.
    #[serde(default)]
    pub props: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteNodeParams {
    /// Id of the node to delete.
    #[serde(default)]
    pub id: Option<Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteEdgeParams {
    /// Source node id.
    #[serde(default)]
    pub from: Option<Value>,
    /// Destination node id.
    #[serde(default)]
    pub to: Option<Value>,
    /// Edge label.
    #[serde(default)]
    pub label: Option<Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryNeighborsParams {
    /// The node whose neighbors to enumerate.
    #[serde(default)]
    pub node: Option<Value>,
    /// One of `in`, `out`, `both`. Defaults to `both`.
    #[serde(default)]
    pub direction: Option<String>,
    /// Restrict to edges carrying this label.
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryPathsParams {
    /// The starting node.
    #[serde(default)]
    pub from: Option<Value>,
    /// The destination node.
    #[serde(default)]
    pub to: Option<Value>,
    /// Maximum edge count per path, in `[1,10]`. Defaults to 4.
    #[serde(default)]
    pub max_depth: Option<Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryFindParams {
    /// Required node type tag.
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    /// Additional exact-match property filters.
    #[serde(default)]
    pub props: Option<Map<String, Value>>,
}

/// Coerce a required string-typed argument out of its loosely-typed JSON
/// value: missing, non-string, and empty-string are all rejected here,
/// inside the tool body, rather than at argument deserialization, so every
/// case surfaces as a tool error instead of a JSON-RPC protocol error.
pub fn require_string(value: &Option<Value>, field: &str) -> Result<String, String> {
    match value {
        None => Err(format!("'{field}' is required")),
        Some(Value::String(s)) if s.is_empty() => {
            Err(format!("'{field}' must not be empty"))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(format!("'{field}' must be a string")),
    }
}

/// Convert a JSON props object into a plain string map, silently discarding
/// any value that is not itself a JSON string.
pub fn coerce_props(props: Option<Map<String, Value>>) -> Props {
    props
        .into_iter()
        .flatten()
        .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
        .collect::<HashMap<_, _>>()
}

/// Parse a direction argument, defaulting to `both` when absent.
pub fn coerce_direction(value: Option<&str>) -> Result<Direction, String> {
    match value {
        None => Ok(Direction::Both),
        Some(s) => Direction::parse(s).ok_or_else(|| format!("invalid direction '{s}'")),
    }
}

/// Coerce a JSON `max_depth` argument (an integral JSON number) into a
/// bounds-checked `u32`, defaulting to [`DEFAULT_MAX_DEPTH`] when absent.
pub fn coerce_max_depth(value: Option<&Value>) -> Result<u32, String> {
    let depth = match value {
        None => DEFAULT_MAX_DEPTH,
        Some(v) => {
            let n = v
                .as_u64()
                .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as u64))
                .ok_or_else(|| "max_depth must be an integer".to_string())?;
            u32::try_from(n).map_err(|_| "max_depth is out of range".to_string())?
        }
    };
    if !(MIN_MAX_DEPTH..=MAX_MAX_DEPTH).contains(&depth) {
        return Err(format!(
            "max_depth must be between {MIN_MAX_DEPTH} and {MAX_MAX_DEPTH}"
        ));
    }
    Ok(depth)
}

/// Build the `filters` map for a find query from the `type`/`props` params,
/// failing if neither is given.
pub fn build_find_filters(
    node_type: Option<String>,
    props: Option<Map<String, Value>>,
) -> Result<HashMap<String, String>, String> {
    if node_type.is_none() && props.is_none() {
        return Err("query_find requires 'type' or 'props'".to_string());
    }
    let mut filters = coerce_props(props);
    if let Some(t) = node_type {
        filters.insert("type".to_string(), t);
    }
    Ok(filters)
}
