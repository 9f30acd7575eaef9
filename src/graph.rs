use std::collections::BTreeMap;

use crate::error::{FlowcutError, FlowcutResult};

/// A single scalar parameter value carried by a node.
///
/// The wire format only admits numbers, strings, and booleans; anything else
/// is a format error at parse time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric view, `None` for strings and booleans.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// String view, `None` for numbers and booleans.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A directed edge leaving a node's output port.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Connection {
    /// Target node ID.
    pub node: String,
    /// Target input-port name.
    pub input: String,
}

/// One step in the authored graph: an input source, a transformation, or the
/// output sink.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Node {
    /// Node ID, unique within the graph. Not part of the per-node wire shape;
    /// filled in from the surrounding map key during parse.
    #[serde(skip)]
    pub id: String,
    /// Type tag, e.g. "input", "scale", "output".
    pub name: String,
    /// Raw parameters. Normalization happens in the resolver, not here.
    #[serde(default)]
    pub data: BTreeMap<String, ParamValue>,
    /// Output ports, each with an ordered connection list.
    #[serde(default)]
    pub outputs: BTreeMap<String, Vec<Connection>>,
}

impl Node {
    /// Return `true` when this is the graph's source node.
    pub fn is_input(&self) -> bool {
        self.name == "input"
    }

    /// Return `true` when this is the graph's sink node.
    pub fn is_output(&self) -> bool {
        self.name == "output"
    }
}

/// In-memory representation of one submitted node graph.
///
/// Constructed fresh per compile request; never shared or persisted. Keys are
/// kept in a `BTreeMap` so every iteration over nodes or ports is
/// deterministic regardless of submission order.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct Graph {
    pub nodes: BTreeMap<String, Node>,
}

#[derive(serde::Deserialize)]
struct RawGraph {
    nodes: BTreeMap<String, Node>,
}

impl Graph {
    /// Parse a graph submission from JSON text.
    pub fn parse(raw: &str) -> FlowcutResult<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| FlowcutError::graph_format(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Parse a graph submission from an already-decoded JSON value.
    ///
    /// Node-ID uniqueness is enforced structurally: IDs are the keys of the
    /// `nodes` object. Connection targets must name existing node IDs.
    pub fn from_value(value: serde_json::Value) -> FlowcutResult<Self> {
        let raw: RawGraph = serde_json::from_value(value)
            .map_err(|e| FlowcutError::graph_format(format!("malformed graph: {e}")))?;

        let mut nodes = raw.nodes;
        for (id, node) in nodes.iter_mut() {
            node.id = id.clone();
            if node.name.trim().is_empty() {
                return Err(FlowcutError::graph_format(format!(
                    "node '{id}' has an empty type name"
                )));
            }
        }

        let graph = Graph { nodes };
        for (id, node) in &graph.nodes {
            for (port, connections) in &node.outputs {
                for conn in connections {
                    if !graph.nodes.contains_key(&conn.node) {
                        return Err(FlowcutError::graph_format(format!(
                            "node '{id}' port '{port}' connects to unknown node '{}'",
                            conn.node
                        )));
                    }
                }
            }
        }

        Ok(graph)
    }

    /// Look up a node by ID.
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }
}
