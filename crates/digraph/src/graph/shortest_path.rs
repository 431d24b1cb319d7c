//! Single-source shortest paths (Dijkstra with lazy deletion).
//!
//! Every node is queued up front: the source at distance zero, everything
//! else at [`Distance::Infinite`]. Each successful relaxation pushes a fresh
//! entry instead of updating the queued one; the outdated entries are
//! discarded when they surface, because their node is already settled.
//!
//! Weights are assumed non-negative. Negative weights are not rejected, but
//! the resulting distances are not guaranteed to be shortest. The run still
//! terminates because each node is settled at most once.

use super::Graph;
use crate::domain::Distance;
use crate::error::Result;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, NodeIndexable};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use tracing::{debug, trace};

/// A queued candidate.
///
/// Field order drives the derived ordering: distance first, then label, so
/// ties settle in label order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Entry {
    pub(crate) distance: Distance,
    pub(crate) label: String,
    pub(crate) node: NodeIndex,
}

/// Min-priority queue with lazy deletion.
///
/// Tracks which nodes are settled. `pop_unsettled` discards entries for
/// settled nodes and settles the node it returns.
#[derive(Debug)]
pub(crate) struct Frontier {
    heap: BinaryHeap<Reverse<Entry>>,
    settled: Vec<bool>,
    discarded: usize,
}

impl Frontier {
    /// Creates a frontier able to track nodes with index below `bound`.
    pub(crate) fn new(bound: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(bound),
            settled: vec![false; bound],
            discarded: 0,
        }
    }

    /// Queues `node` at `distance`. Older entries for the node stay queued.
    pub(crate) fn push(&mut self, node: NodeIndex, distance: Distance, label: &str) {
        self.heap.push(Reverse(Entry {
            distance,
            label: label.to_string(),
            node,
        }));
    }

    /// Pops the closest unsettled entry and settles its node.
    ///
    /// Entries whose node is already settled are dropped on the way.
    pub(crate) fn pop_unsettled(&mut self) -> Option<Entry> {
        while let Some(Reverse(entry)) = self.heap.pop() {
            if self.is_settled(entry.node) {
                self.discarded += 1;
                trace!(label = %entry.label, distance = %entry.distance, "stale entry discarded");
                continue;
            }
            self.settled[entry.node.index()] = true;
            return Some(entry);
        }
        None
    }

    /// Returns `true` once `node` has been popped by `pop_unsettled`.
    pub(crate) fn is_settled(&self, node: NodeIndex) -> bool {
        self.settled.get(node.index()).copied().unwrap_or(false)
    }

    /// Number of stale entries dropped so far.
    pub(crate) fn discarded(&self) -> usize {
        self.discarded
    }
}

/// Per-node state for one run.
#[derive(Debug, Clone, Copy)]
struct Tentative {
    distance: Distance,
    parent: Option<NodeIndex>,
}

impl Tentative {
    const UNREACHED: Self = Self {
        distance: Distance::Infinite,
        parent: None,
    };
}

/// One node's final result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettledNode {
    /// Node label
    pub label: String,
    /// Distance from the source
    pub distance: Distance,
    /// Previous node on the shortest path, `None` for the source and for
    /// unreachable nodes
    pub parent: Option<String>,
}

impl fmt::Display for SettledNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.distance)
    }
}

/// Result of [`Graph::shortest_path`].
///
/// Entries appear in the order nodes were settled. Unreachable nodes come
/// last with an infinite distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortestPaths {
    source: String,
    entries: Vec<SettledNode>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl ShortestPaths {
    fn new(source: String, entries: Vec<SettledNode>) -> Self {
        let positions = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.label.clone(), position))
            .collect();
        Self {
            source,
            entries,
            positions,
        }
    }

    /// Label of the source node.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Entries in settle order.
    #[must_use]
    pub fn entries(&self) -> &[SettledNode] {
        &self.entries
    }

    /// Entries rendered as `label: distance`, in settle order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Number of entries (one per node).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, label: &str) -> Option<&SettledNode> {
        self.positions.get(label).map(|&position| &self.entries[position])
    }

    /// Distance to `label`, or `None` if the label was not in the graph.
    #[must_use]
    pub fn distance(&self, label: &str) -> Option<Distance> {
        self.entry(label).map(|entry| entry.distance)
    }

    /// Predecessor of `label` on its shortest path.
    #[must_use]
    pub fn parent(&self, label: &str) -> Option<&str> {
        self.entry(label)?.parent.as_deref()
    }

    /// Labels along the shortest path from the source to `target`, both
    /// included.
    ///
    /// Returns `None` if `target` is unknown or unreachable. Also returns
    /// `None` if negative weights left the parent links looping.
    #[must_use]
    pub fn path_to(&self, target: &str) -> Option<Vec<String>> {
        let entry = self.entry(target)?;
        if !entry.distance.is_finite() {
            return None;
        }

        let mut path = vec![entry.label.clone()];
        let mut current = entry;
        while let Some(parent) = current.parent.as_deref() {
            if path.len() > self.entries.len() {
                return None;
            }
            current = self.entry(parent)?;
            path.push(current.label.clone());
        }
        path.reverse();
        Some(path)
    }
}

impl Graph {
    /// Computes the distance from `source` to every node.
    ///
    /// Ties between equal distances settle in label order. Each call starts
    /// from fresh state, so repeated calls on an unchanged graph return equal
    /// results.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`](crate::GraphError::NodeNotFound)
    /// if `source` is unknown.
    pub fn shortest_path(&self, source: &str) -> Result<ShortestPaths> {
        let start = self.index_of(source)?;
        let bound = self.inner.node_bound();

        let mut table = vec![Tentative::UNREACHED; bound];
        table[start.index()].distance = Distance::ZERO;

        let mut frontier = Frontier::new(bound);
        for node in self.inner.node_indices() {
            frontier.push(node, table[node.index()].distance, &self.inner[node].label);
        }

        let mut order = Vec::with_capacity(self.inner.node_count());
        while let Some(Entry { node, .. }) = frontier.pop_unsettled() {
            let reached = table[node.index()].distance;
            for edge in self.inner.edges(node) {
                let next = edge.target();
                let candidate = reached.extend(edge.weight().weight);
                if candidate < table[next.index()].distance {
                    table[next.index()] = Tentative {
                        distance: candidate,
                        parent: Some(node),
                    };
                    let label = &self.inner[next].label;
                    trace!(%label, distance = %candidate, "relaxed");
                    frontier.push(next, candidate, label);
                }
            }
            order.push(node);
        }

        debug!(
            source,
            settled = order.len(),
            stale = frontier.discarded(),
            "shortest paths computed"
        );

        let entries = order
            .into_iter()
            .map(|node| {
                let state = table[node.index()];
                SettledNode {
                    label: self.inner[node].label.clone(),
                    distance: state.distance,
                    parent: state.parent.map(|parent| self.inner[parent].label.clone()),
                }
            })
            .collect();
        Ok(ShortestPaths::new(source.to_string(), entries))
    }
}
