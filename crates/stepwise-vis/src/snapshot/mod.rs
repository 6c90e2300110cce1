//! Rendered state for each visualizer, rebuilt by folding trace events.
//!
//! A snapshot is a plain value. [`Reduce::apply`] returns a new snapshot and
//! never touches the old one, so any earlier frame can be kept, compared, or
//! shown again while playback continues.

mod array;
mod grid;
mod lanes;
mod mst;
mod sudoku;
mod traversal;

use std::fmt;

use serde::Serialize;
use stepwise_runners::TraceEvent;

pub use array::ArraySnapshot;
pub use grid::{CellStatus, GridSnapshot, PathOutcome};
pub use lanes::{ComparisonSnapshot, Lane, LanesSnapshot, RaceSnapshot};
pub use mst::{EdgeStatus, EdgeView, MstSnapshot, VertexStatus};
pub use sudoku::{SudokuOutcome, SudokuSnapshot};
pub use traversal::{NodeStatus, NodeView, TraversalOutcome, TraversalSnapshot};

/// A snapshot that can absorb one trace event at a time.
///
/// `apply` is total over every event variant. An event that points outside
/// the snapshot (a cell off the grid, an index past the array) can only come
/// from a mismatched trace and panics.
pub trait Reduce: Clone + fmt::Debug + PartialEq + Serialize + Send + Sync + 'static {
    type Event: TraceEvent + PartialEq + Serialize + Send + Sync + 'static;

    /// The snapshot after `event`.
    fn apply(&self, event: &Self::Event) -> Self;

    /// The snapshot after every event in order.
    fn fold<'a, I>(&self, events: I) -> Self
    where
        I: IntoIterator<Item = &'a Self::Event>,
    {
        events
            .into_iter()
            .fold(self.clone(), |snapshot, event| snapshot.apply(event))
    }
}
