//! Stepwise Input Topology
//!
//! The structures every algorithm runner consumes:
//!
//! - **Grid**: a rectangular maze of cells with walls, addressed by
//!   [`GridCoord`] and explored through the 4 cardinal [`Direction`]s.
//! - **Graph**: an unweighted adjacency-list graph for BFS/DFS traversal.
//! - **Weighted graph**: an undirected edge list for spanning-tree
//!   construction.
//!
//! # Ordering
//!
//! Every collection here preserves insertion order. Runners derive their
//! tie-breaking from that order, so two structures built from the same input
//! always produce the same trace.

mod error;
mod graph;
mod grid;
mod neighbors;
mod weighted;

pub use error::TopologyError;
pub use graph::{Graph, GraphNode, NodeId};
pub use grid::{Grid, GridCoord};
pub use neighbors::{are_neighbors, count_open_neighbors, Direction, Neighbors};
pub use weighted::{Edge, EdgeId, VertexId, WeightedGraph};

/// Number of neighbors a grid cell has away from the border.
pub const CARDINAL_NEIGHBORS: usize = 4;

/// Vertical neighbor directions (up, down).
pub const VERTICAL_NEIGHBORS: usize = 2;

/// Horizontal neighbor directions (left, right).
pub const HORIZONTAL_NEIGHBORS: usize = 2;

const _: () = assert!(VERTICAL_NEIGHBORS + HORIZONTAL_NEIGHBORS == CARDINAL_NEIGHBORS);
