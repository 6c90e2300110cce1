//! Error types for topology construction.

use thiserror::Error;

use crate::{GridCoord, NodeId, VertexId};

/// Errors raised while building an input structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// A grid needs at least one row and one column.
    #[error("grid dimensions must be non-zero, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },

    /// A wall mask does not cover the grid exactly.
    #[error("wall mask has {actual} cells, expected {expected}")]
    WallMaskLength { expected: usize, actual: usize },

    /// A coordinate lies outside the grid.
    #[error("cell {coord} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        coord: GridCoord,
        rows: usize,
        cols: usize,
    },

    /// Two graph nodes share an id.
    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),

    /// A connection references a node that does not exist.
    #[error("node {from} connects to unknown node {to}")]
    UnknownConnection { from: NodeId, to: NodeId },

    /// An edge endpoint is not a vertex of the graph.
    #[error("edge endpoint {vertex} is not below vertex count {vertex_count}")]
    UnknownVertex {
        vertex: VertexId,
        vertex_count: usize,
    },

    /// Self-loops carry no meaning for a spanning tree.
    #[error("edge {0} -> {0} is a self-loop")]
    SelfLoop(VertexId),
}
