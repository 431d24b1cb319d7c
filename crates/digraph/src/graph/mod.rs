//! Directed weighted graph storage and mutation.
//!
//! # Architecture
//!
//! The implementation uses:
//! - `petgraph::StableDiGraph<Node, Edge>` for adjacency in both directions
//! - `HashMap<String, NodeIndex>` for O(1) label lookups
//! - two `HashSet`s tracking node ids and edge ids independently
//!
//! A stable graph keeps every `NodeIndex` valid across removals. The
//! algorithms rely on that: each run keeps its own state table indexed by
//! `NodeIndex::index()` and sized by `node_bound()`.
//!
//! ## Edge Direction
//!
//! Edges point from source to destination. A node's outgoing edges are
//! `edges_directed(index, Outgoing)`, its incoming edges
//! `edges_directed(index, Incoming)`. At most one edge exists per ordered
//! pair, so `find_edge(source, dest)` identifies an edge uniquely.
//!
//! ## Failure Semantics
//!
//! Every mutation validates all preconditions before touching storage. A
//! rejected call returns an error and leaves the graph exactly as it was.

mod dump;
mod shortest_path;
mod topo;

pub use shortest_path::{SettledNode, ShortestPaths};

use crate::domain::{Edge, EdgeId, Node, NodeId};
use crate::error::{GraphError, Result};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A directed, edge-weighted graph keyed by node label.
///
/// # Example
///
/// ```
/// use digraph::{Graph, NodeId, EdgeId};
///
/// let mut graph = Graph::new();
/// graph.add_node(NodeId(1), "a").unwrap();
/// graph.add_node(NodeId(2), "b").unwrap();
/// graph.add_edge(EdgeId(1), "a", "b", 4, None).unwrap();
///
/// assert_eq!(graph.topo_sort().unwrap(), vec!["a", "b"]);
/// assert_eq!(graph.shortest_path("a").unwrap().lines(), vec!["a: 0", "b: 4"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Node and edge storage.
    inner: StableDiGraph<Node, Edge>,

    /// Label index. Every live node has exactly one entry.
    labels: HashMap<String, NodeIndex>,

    /// Ids of live nodes
    node_ids: HashSet<NodeId>,

    /// Ids of live edges
    edge_ids: HashSet<EdgeId>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node.
    ///
    /// # Errors
    ///
    /// - [`GraphError::DuplicateNodeId`] if `id` is in use
    /// - [`GraphError::DuplicateLabel`] if `label` is in use
    pub fn add_node(&mut self, id: NodeId, label: impl Into<String>) -> Result<()> {
        let label = label.into();

        if self.node_ids.contains(&id) {
            debug!(%id, %label, reason = "id in use", "node rejected");
            return Err(GraphError::DuplicateNodeId(id));
        }
        if self.labels.contains_key(&label) {
            debug!(%id, %label, reason = "label in use", "node rejected");
            return Err(GraphError::DuplicateLabel(label));
        }

        let index = self.inner.add_node(Node {
            id,
            label: label.clone(),
        });
        debug!(%id, %label, "node added");
        self.labels.insert(label, index);
        self.node_ids.insert(id);
        Ok(())
    }

    /// Adds an edge from `source` to `dest`.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - [`GraphError::DuplicateEdgeId`] if `id` is in use
    /// - [`GraphError::NodeNotFound`] if either label is unknown
    /// - [`GraphError::EdgeExists`] if an edge already joins `source` to `dest`
    pub fn add_edge(
        &mut self,
        id: EdgeId,
        source: &str,
        dest: &str,
        weight: i64,
        label: Option<&str>,
    ) -> Result<()> {
        if self.edge_ids.contains(&id) {
            debug!(%id, source, dest, reason = "id in use", "edge rejected");
            return Err(GraphError::DuplicateEdgeId(id));
        }
        let from = self.index_of(source)?;
        let to = self.index_of(dest)?;
        if self.inner.find_edge(from, to).is_some() {
            debug!(%id, source, dest, reason = "pair connected", "edge rejected");
            return Err(GraphError::edge_exists(source, dest));
        }

        self.inner.add_edge(
            from,
            to,
            Edge {
                id,
                weight,
                label: label.map(str::to_string),
            },
        );
        self.edge_ids.insert(id);
        debug!(%id, source, dest, weight, "edge added");
        Ok(())
    }

    /// Removes a node together with every edge into or out of it.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if `label` is unknown.
    pub fn del_node(&mut self, label: &str) -> Result<()> {
        let index = self.index_of(label)?;

        let mut incident: Vec<EdgeId> = self
            .inner
            .edges_directed(index, Direction::Outgoing)
            .chain(self.inner.edges_directed(index, Direction::Incoming))
            .map(|edge| edge.weight().id)
            .collect();
        // a self-loop is listed in both directions
        incident.sort_unstable();
        incident.dedup();
        for id in &incident {
            self.edge_ids.remove(id);
        }

        self.labels.remove(label);
        if let Some(node) = self.inner.remove_node(index) {
            self.node_ids.remove(&node.id);
            debug!(id = %node.id, label, edges = incident.len(), "node removed");
        }
        Ok(())
    }

    /// Removes the edge from `source` to `dest`.
    ///
    /// # Errors
    ///
    /// - [`GraphError::NodeNotFound`] if `source` is unknown
    /// - [`GraphError::EdgeNotFound`] if no edge joins `source` to `dest`
    pub fn del_edge(&mut self, source: &str, dest: &str) -> Result<()> {
        let from = self.index_of(source)?;
        let edge = self
            .labels
            .get(dest)
            .and_then(|&to| self.inner.find_edge(from, to))
            .ok_or_else(|| GraphError::edge_not_found(source, dest))?;

        if let Some(removed) = self.inner.remove_edge(edge) {
            self.edge_ids.remove(&removed.id);
            debug!(id = %removed.id, source, dest, "edge removed");
        }
        Ok(())
    }

    /// Number of live nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of live edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        debug_assert_eq!(self.inner.edge_count(), self.edge_ids.len());
        self.inner.edge_count()
    }

    /// Returns `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Returns `true` if a node has this label.
    #[must_use]
    pub fn contains_node(&self, label: &str) -> bool {
        self.labels.contains_key(label)
    }

    /// Returns the node with this label.
    #[must_use]
    pub fn node(&self, label: &str) -> Option<&Node> {
        self.labels.get(label).map(|&index| &self.inner[index])
    }

    /// Returns the edge from `source` to `dest`.
    #[must_use]
    pub fn edge(&self, source: &str, dest: &str) -> Option<&Edge> {
        let from = *self.labels.get(source)?;
        let to = *self.labels.get(dest)?;
        self.inner
            .find_edge(from, to)
            .map(|edge| &self.inner[edge])
    }

    /// Labels of all nodes, in storage order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner
            .node_indices()
            .map(|index| self.inner[index].label.as_str())
    }

    /// Destination labels of the edges leaving `label`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if `label` is unknown.
    pub fn successors(&self, label: &str) -> Result<Vec<&str>> {
        self.adjacent(label, Direction::Outgoing)
    }

    /// Source labels of the edges entering `label`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if `label` is unknown.
    pub fn predecessors(&self, label: &str) -> Result<Vec<&str>> {
        self.adjacent(label, Direction::Incoming)
    }

    fn adjacent(&self, label: &str, direction: Direction) -> Result<Vec<&str>> {
        let index = self.index_of(label)?;
        Ok(self
            .inner
            .neighbors_directed(index, direction)
            .map(|other| self.inner[other].label.as_str())
            .collect())
    }

    /// Resolves a label to its storage index.
    fn index_of(&self, label: &str) -> Result<NodeIndex> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound(label.to_string()))
    }
}
