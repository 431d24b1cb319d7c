//! Domain types for the graph engine.
//!
//! Nodes and edges carry caller-supplied ids. Ids are unsigned once
//! constructed; conversion from a signed integer is where negative ids are
//! rejected.

use crate::error::GraphError;
use serde::{Serialize, Serializer};
use std::fmt;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub u64);

/// Unique identifier for an edge
///
/// Edge ids are tracked separately from node ids, so `NodeId(1)` and
/// `EdgeId(1)` never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EdgeId(pub u64);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            /// Returns the raw id value
            #[must_use]
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = GraphError;

            fn try_from(id: i64) -> Result<Self, Self::Error> {
                u64::try_from(id)
                    .map(Self)
                    .map_err(|_| GraphError::NegativeId(id))
            }
        }
    };
}

impl_id!(NodeId);
impl_id!(EdgeId);

/// A node record.
///
/// Holds identity only. Traversal state (visit marks, distances, parents)
/// lives in per-run tables owned by the algorithms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Caller-supplied id
    pub id: NodeId,
    /// Unique label, the primary lookup key
    pub label: String,
}

/// An edge record.
///
/// Endpoints are implied by where the edge is stored in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Caller-supplied id
    pub id: EdgeId,
    /// Integer weight
    pub weight: i64,
    /// Optional edge label
    pub label: Option<String>,
}

/// A shortest-path distance.
///
/// Ordered so that every finite distance is less than [`Distance::Infinite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Distance {
    /// Reachable at this total weight
    Finite(i64),
    /// Not reachable from the source
    Infinite,
}

impl Distance {
    /// Distance of the source node.
    pub const ZERO: Self = Self::Finite(0);

    /// Extends this distance by one edge weight.
    ///
    /// Unreachable stays unreachable. A sum that overflows `i64` is treated as
    /// unreachable so it can never win a relaxation.
    #[must_use]
    pub fn extend(self, weight: i64) -> Self {
        match self {
            Self::Finite(d) => d.checked_add(weight).map_or(Self::Infinite, Self::Finite),
            Self::Infinite => Self::Infinite,
        }
    }

    /// Returns `true` for finite distances.
    #[must_use]
    pub fn is_finite(self) -> bool {
        matches!(self, Self::Finite(_))
    }

    /// Returns the finite value, if any.
    #[must_use]
    pub fn finite(self) -> Option<i64> {
        match self {
            Self::Finite(d) => Some(d),
            Self::Infinite => None,
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(d) => write!(f, "{d}"),
            Self::Infinite => f.write_str("Infinity"),
        }
    }
}

/// Serializes as the integer distance, or `null` when unreachable.
impl Serialize for Distance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Finite(d) => serializer.serialize_some(d),
            Self::Infinite => serializer.serialize_none(),
        }
    }
}
