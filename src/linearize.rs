use std::collections::BTreeSet;

use crate::error::{FlowcutResult, GraphValidationError};
use crate::graph::{Graph, Node};

/// Walk a graph from its unique input node to its output node, producing the
/// deterministic ordered node sequence.
///
/// Traversal policy (single-chain semantics): output ports are scanned in
/// lexical key order and the first port with a non-empty connection list is
/// followed through its first connection. Extra ports and extra connections
/// are deliberately ignored — the graph model does not represent branching or
/// merging. Nodes unreachable from the input node are excluded from the
/// result.
pub fn linearize(graph: &Graph) -> FlowcutResult<Vec<&Node>> {
    let input = find_input(graph)?;

    let mut order = Vec::new();
    let mut visited = BTreeSet::new();
    let mut current = input;

    loop {
        visited.insert(current.id.as_str());
        order.push(current);

        let Some(next_id) = next_hop(current) else {
            break;
        };
        // Dangling targets are a format error at parse time; a graph built by
        // hand may still carry one, which simply terminates the walk.
        let Some(next) = graph.get(next_id) else {
            break;
        };

        if visited.contains(next.id.as_str()) {
            if current.is_output() {
                break;
            }
            return Err(GraphValidationError::CycleDetected {
                node: next.id.clone(),
            }
            .into());
        }
        current = next;
    }

    if !order.last().is_some_and(|n| n.is_output()) {
        return Err(GraphValidationError::NoOutputReached.into());
    }

    Ok(order)
}

/// Locate the unique `input`-typed node, scanning IDs in lexicographic order.
fn find_input(graph: &Graph) -> Result<&Node, GraphValidationError> {
    let mut found = None;
    for node in graph.nodes.values() {
        if node.is_input() {
            if found.is_some() {
                return Err(GraphValidationError::TooManyInputNodes);
            }
            found = Some(node);
        }
    }
    found.ok_or(GraphValidationError::NoInputNode)
}

/// First connection of the first non-empty output port, in lexical port order.
fn next_hop(node: &Node) -> Option<&str> {
    node.outputs
        .values()
        .find_map(|connections| connections.first())
        .map(|conn| conn.node.as_str())
}
