use std::path::PathBuf;

/// Convenience alias used across the crate.
pub type FlowcutResult<T> = Result<T, FlowcutError>;

/// Topology failures detected while linearizing a graph.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphValidationError {
    #[error("graph has no 'input' node")]
    NoInputNode,

    #[error("graph has more than one 'input' node")]
    TooManyInputNodes,

    #[error("walk from the input node ended without reaching an 'output' node")]
    NoOutputReached,

    #[error("cycle detected: walk revisits node '{node}' before reaching an 'output' node")]
    CycleDetected { node: String },
}

#[derive(thiserror::Error, Debug)]
pub enum FlowcutError {
    /// The submitted graph payload is structurally malformed.
    #[error("graph format error: {0}")]
    GraphFormat(String),

    #[error(transparent)]
    GraphValidation(#[from] GraphValidationError),

    /// Node type is not in the operation catalog (under the `Reject` policy).
    #[error("unsupported node type '{node_type}' on node '{node}'")]
    UnsupportedNode { node: String, node_type: String },

    /// A parameter value is missing its documented domain or type.
    #[error("invalid parameter: node '{node}' field '{field}': {reason}")]
    Parameter {
        node: String,
        field: String,
        reason: String,
    },

    #[error("source file not found: '{}'", .0.display())]
    SourceNotFound(PathBuf),

    /// The external engine exited abnormally. The payload is the engine's
    /// diagnostic text, verbatim.
    #[error("engine execution failed: {0}")]
    EngineExecution(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlowcutError {
    pub fn graph_format(msg: impl Into<String>) -> Self {
        Self::GraphFormat(msg.into())
    }

    pub fn unsupported_node(node: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self::UnsupportedNode {
            node: node.into(),
            node_type: node_type.into(),
        }
    }

    pub fn parameter(
        node: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Parameter {
            node: node.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn engine(diagnostic: impl Into<String>) -> Self {
        Self::EngineExecution(diagnostic.into())
    }
}
