use thiserror::Error;

use crate::graph::NodeId;

/// A single offending row found while loading a graph.
/// `row` is the position of the row in the sequence handed to the loader.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadViolation {
    #[error("node row {row}: duplicate node id {id}")]
    DuplicateNode { row: usize, id: NodeId },

    #[error("edge row {row}: {src} -> {dst} references unknown node {missing}")]
    DanglingEdge { row: usize, src: NodeId, dst: NodeId, missing: NodeId },

    #[error("edge row {row}: {src} -> {dst} has invalid distance {weight}")]
    InvalidWeight { row: usize, src: NodeId, dst: NodeId, weight: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Query referenced a node that is not in the graph
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Every violation from one load attempt, in row order
    #[error("graph failed integrity checks with {} violation(s)", .0.len())]
    DataIntegrity(Vec<LoadViolation>),
}

impl GraphError {
    /// Violations carried by a failed load, empty for query errors
    pub fn violations(&self) -> &[LoadViolation] {
        match self {
            GraphError::DataIntegrity(violations) => violations,
            GraphError::UnknownNode(_) => &[],
        }
    }
}

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("no node in the graph carries a position")]
    NoPlacedNodes,

    #[error("kd-tree error: {0}")]
    KdTree(String),
}

impl From<kdtree::ErrorKind> for LocateError {
    fn from(error: kdtree::ErrorKind) -> Self {
        LocateError::KdTree(error.to_string())
    }
}
