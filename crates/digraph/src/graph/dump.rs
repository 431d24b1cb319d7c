//! Human-readable graph dump.
//!
//! ```text
//! (1)a
//!   (10)--road,4--> b
//!   (11)--7--> c
//! (2)b
//! (3)c
//! ```
//!
//! One line per node, `(id)label`, followed by one indented line per
//! outgoing edge. The edge label segment is left out for unlabeled edges.
//! Order follows storage order; it is stable for a given sequence of
//! mutations but carries no other meaning.

use super::Graph;
use petgraph::visit::EdgeRef;
use std::fmt;
use std::io::{self, Write};

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in self.inner.node_indices() {
            let node = &self.inner[index];
            writeln!(f, "({}){}", node.id, node.label)?;

            for edge in self.inner.edges(index) {
                let weight = edge.weight();
                let dest = &self.inner[edge.target()].label;
                match &weight.label {
                    Some(label) => writeln!(
                        f,
                        "  ({})--{},{}--> {}",
                        weight.id, label, weight.weight, dest
                    )?,
                    None => writeln!(f, "  ({})--{}--> {}", weight.id, weight.weight, dest)?,
                }
            }
        }
        Ok(())
    }
}

impl Graph {
    /// Writes the dump to `out`.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    pub fn write_dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{self}")
    }

    /// Prints the dump to standard output.
    pub fn print(&self) {
        print!("{self}");
    }
}
