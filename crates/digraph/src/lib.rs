//! Digraph - an in-memory directed, edge-weighted graph.
//!
//! Nodes are keyed by a unique label and carry a unique id; edges carry a
//! unique id, an integer weight and an optional label, with at most one edge
//! per ordered pair of nodes. On top of the storage the crate provides
//! topological sorting with cycle detection and single-source shortest paths.
//!
//! The crate also ships the `digraph` CLI, which replays command scripts
//! (see [`script`]) and reports on the resulting graph.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod graph;
pub mod script;

// Public CLI modules (needed by binary)
pub mod cli;
pub mod config;

pub use domain::{Distance, Edge, EdgeId, Node, NodeId};
pub use error::{GraphError, Result};
pub use graph::{Graph, SettledNode, ShortestPaths};
