//! Topological ordering with cycle detection.
//!
//! Depth-first search over every node, with three marks per node:
//! unvisited, in progress (on the DFS stack), finalized. Finalized nodes are
//! appended to a post-order list. Reversing that list gives an order in which
//! every edge points forward. Reaching an in-progress node means a back edge,
//! which means a cycle.
//!
//! The DFS keeps its own stack, so long chains cannot exhaust the call stack.

use super::Graph;
use crate::error::{GraphError, Result};
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::NodeIndexable;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Finalized,
}

/// One level of the explicit DFS stack.
struct Frame {
    node: NodeIndex,
    successors: Vec<NodeIndex>,
    cursor: usize,
}

/// Per-run DFS state, indexed by `NodeIndex::index()`.
struct Dfs<'g> {
    graph: &'g Graph,
    marks: Vec<Mark>,
    post_order: Vec<NodeIndex>,
}

impl<'g> Dfs<'g> {
    fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            marks: vec![Mark::Unvisited; graph.inner.node_bound()],
            post_order: Vec::with_capacity(graph.inner.node_count()),
        }
    }

    fn frame(&self, node: NodeIndex) -> Frame {
        Frame {
            node,
            successors: self.graph.inner.neighbors(node).collect(),
            cursor: 0,
        }
    }

    /// Explores everything reachable from `root`.
    fn visit(&mut self, root: NodeIndex) -> Result<()> {
        if self.marks[root.index()] == Mark::Finalized {
            return Ok(());
        }

        self.marks[root.index()] = Mark::InProgress;
        let mut stack = vec![self.frame(root)];

        while let Some(frame) = stack.last_mut() {
            let Some(&next) = frame.successors.get(frame.cursor) else {
                let node = frame.node;
                stack.pop();
                self.marks[node.index()] = Mark::Finalized;
                self.post_order.push(node);
                continue;
            };
            frame.cursor += 1;

            match self.marks[next.index()] {
                Mark::Finalized => {}
                Mark::InProgress => return Err(self.cycle_error(&stack, next)),
                Mark::Unvisited => {
                    self.marks[next.index()] = Mark::InProgress;
                    stack.push(self.frame(next));
                }
            }
        }
        Ok(())
    }

    /// Builds the cycle path from the stack: the revisited node, everything
    /// above it, then the revisited node again.
    fn cycle_error(&self, stack: &[Frame], revisited: NodeIndex) -> GraphError {
        let start = stack
            .iter()
            .position(|frame| frame.node == revisited)
            .unwrap_or(0);
        let cycle: Vec<String> = stack[start..]
            .iter()
            .map(|frame| frame.node)
            .chain(std::iter::once(revisited))
            .map(|node| self.graph.inner[node].label.clone())
            .collect();
        debug!(cycle = ?cycle, "topological sort aborted");
        GraphError::CycleDetected { cycle }
    }
}

impl Graph {
    /// Returns every node label in topological order.
    ///
    /// For each edge `u -> v`, `u` comes before `v`. Which of several valid
    /// orders is produced depends on storage order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CycleDetected`] if the graph has a directed
    /// cycle, including a self-loop.
    pub fn topo_sort(&self) -> Result<Vec<String>> {
        let mut dfs = Dfs::new(self);
        for root in self.inner.node_indices() {
            dfs.visit(root)?;
        }

        let mut order = dfs.post_order;
        order.reverse();
        debug!(nodes = order.len(), "topological sort complete");
        Ok(order
            .into_iter()
            .map(|node| self.inner[node].label.clone())
            .collect())
    }

    /// Returns `true` if the graph contains a directed cycle.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        matches!(self.topo_sort(), Err(GraphError::CycleDetected { .. }))
    }
}
