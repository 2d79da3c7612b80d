use thiserror::Error;

use crate::node::NodeId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node is not a composite: {0}")]
    NotComposite(NodeId),

    #[error("Node is not a reference: {0}")]
    NotReference(NodeId),

    #[error("Cycle detected: {node} is {target} or one of its ancestors")]
    CycleDetected { node: NodeId, target: NodeId },

    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

pub type TreeResult<T> = Result<T, TreeError>;
