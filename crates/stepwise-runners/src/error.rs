//! Input validation errors for runners.

use stepwise_topology::{GridCoord, NodeId, TopologyError};
use thiserror::Error;

/// Input rejected before a run exists.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("invalid topology: {0}")]
    Topology(#[from] TopologyError),

    #[error("{role} cell {coord} is outside the {rows}x{cols} grid")]
    EndpointOutOfBounds {
        role: &'static str,
        coord: GridCoord,
        rows: usize,
        cols: usize,
    },

    #[error("{role} cell {coord} is a wall")]
    EndpointOnWall { role: &'static str, coord: GridCoord },

    #[error("{role} node {node} is not in the graph")]
    UnknownNode { role: &'static str, node: NodeId },

    #[error("{count} vertices is below the minimum of {min}")]
    TooFewVertices { count: usize, min: usize },

    #[error("edge density {0} is outside [0, 1]")]
    InvalidDensity(f64),

    #[error("weight range {min}..={max} is invalid")]
    InvalidWeightRange { min: u32, max: u32 },

    #[error("array must hold at least one value")]
    EmptyArray,

    #[error("value range {min}..={max} is invalid")]
    InvalidValueRange { min: u32, max: u32 },

    #[error("digit {digit} at {cell} is outside 0-9")]
    InvalidDigit { cell: GridCoord, digit: u8 },
}
