//! Error types for graph operations.
//!
//! Every rejected mutation and every failed query is reported through
//! [`GraphError`]. A rejected operation never leaves the graph partially
//! modified, so all of these errors are recoverable: fix the input and retry.

use crate::domain::{EdgeId, NodeId};
use thiserror::Error;

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors produced by [`Graph`](crate::Graph) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GraphError {
    /// An id was negative.
    #[error("id must be non-negative, got {0}")]
    NegativeId(i64),

    /// A node with this id is already registered.
    #[error("node id {0} is already in use")]
    DuplicateNodeId(NodeId),

    /// A node with this label is already registered.
    #[error("node label '{0}' is already in use")]
    DuplicateLabel(String),

    /// An edge with this id is already registered.
    #[error("edge id {0} is already in use")]
    DuplicateEdgeId(EdgeId),

    /// No node has this label.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// An edge already connects this ordered pair.
    #[error("edge already exists: {from} -> {to}")]
    EdgeExists {
        /// Source label
        from: String,
        /// Destination label
        to: String,
    },

    /// No edge connects this ordered pair.
    #[error("edge not found: {from} -> {to}")]
    EdgeNotFound {
        /// Source label
        from: String,
        /// Destination label
        to: String,
    },

    /// The graph contains a directed cycle.
    ///
    /// `cycle` lists the labels along the cycle, starting and ending with the
    /// same node.
    #[error("cycle detected: {}", .cycle.join(" -> "))]
    CycleDetected {
        /// Labels along the cycle
        cycle: Vec<String>,
    },
}

impl GraphError {
    /// Creates an edge-exists error.
    pub(crate) fn edge_exists(from: &str, to: &str) -> Self {
        Self::EdgeExists {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Creates an edge-not-found error.
    pub(crate) fn edge_not_found(from: &str, to: &str) -> Self {
        Self::EdgeNotFound {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_display_joins_path() {
        let err = GraphError::CycleDetected {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cycle detected: a -> b -> a");
    }

    #[test]
    fn edge_errors_name_both_endpoints() {
        let display = GraphError::edge_exists("src", "dst").to_string();
        assert!(display.contains("src -> dst"));

        let display = GraphError::edge_not_found("x", "y").to_string();
        assert_eq!(display, "edge not found: x -> y");
    }
}
