//! Eager Algorithm Runners
//!
//! Every visualizer runs its algorithm to completion **before** anything is
//! shown. The run produces a linear [`Trace`] of decision points, and the
//! playback engine replays that trace at whatever pace the viewer chooses.
//!
//! # Core Insight
//!
//! An animation is not a side effect of the algorithm - it's a **fold** over
//! a recorded event list. Record once, replay as often as you like:
//!
//! 1. Runner executes synchronously, no timers, no I/O
//! 2. Each state-visible decision appends one event
//! 3. Exactly one terminal event seals the trace
//! 4. The scheduler owns pacing; the runner never sleeps
//!
//! # Runners
//!
//! | Domain | Runner | Terminal events |
//! |---|---|---|
//! | Grid pathfinding | [`astar`] | `Complete`, `Exhausted` |
//! | Graph traversal | [`bfs`], [`dfs`] | `Complete`, `NoPath` |
//! | Spanning tree | [`prim`], [`kruskal`] | `Complete` |
//! | Sorting | [`sort`] | `Finished` |
//! | Sudoku | [`solve`] | `Solved`, `Exhausted` |
//!
//! [`lockstep`] merges several traces into one so two or more runners can
//! share a single clock: [`traversal::compare`] pits BFS against DFS and
//! [`sorting::race`] runs all four sorts on the same array.
//!
//! Unsolvable inputs end in a terminal event, never an error. Errors are
//! reserved for inputs that fail validation before a run exists.

mod error;
mod lockstep;
mod trace;

pub mod mst;
pub mod pathfinding;
pub mod sorting;
pub mod sudoku;
pub mod traversal;

pub use error::InputError;
pub use lockstep::{lockstep, Lockstep};
pub use trace::{Trace, TraceError, TraceEvent, TraceRecorder};

pub use mst::{kruskal, prim, MstAlgorithm, MstEvent, MstInput, RandomGraphConfig};
pub use pathfinding::{astar, MazeInput, PathEvent};
pub use sorting::{leaderboard, race, sort, RandomArrayConfig, SortAlgorithm, SortEvent, SortInput};
pub use sudoku::{solve, Board, SudokuEvent, SudokuInput};
pub use traversal::{bfs, compare, dfs, SampleGraph, TraversalEvent, TraversalInput};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_ends_in_one_terminal() {
        let maze = astar(&MazeInput::preset().unwrap());
        assert_eq!(maze.count(TraceEvent::is_terminal), 1);

        let graph = SampleGraph::Maze.input().unwrap();
        assert_eq!(bfs(&graph).count(TraceEvent::is_terminal), 1);
        assert_eq!(dfs(&graph).count(TraceEvent::is_terminal), 1);

        let mst = RandomGraphConfig::default().generate().unwrap();
        assert_eq!(prim(&mst).count(TraceEvent::is_terminal), 1);
        assert_eq!(kruskal(&mst).count(TraceEvent::is_terminal), 1);

        let array = sorting::RandomArrayConfig::default().generate().unwrap();
        for algorithm in SortAlgorithm::ALL {
            assert_eq!(sort(algorithm, &array).count(TraceEvent::is_terminal), 1);
        }

        assert_eq!(solve(&SudokuInput::classic()).count(TraceEvent::is_terminal), 1);
    }
}
