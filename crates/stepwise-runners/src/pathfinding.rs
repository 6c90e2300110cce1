//! A* pathfinding on a walled grid.
//!
//! The open list is a plain vector scanned for the lowest `f`. Ties go to
//! the cell that entered the list first, and removal keeps the remaining
//! order, so the exploration pattern is fully determined by the grid.

use serde::{Deserialize, Serialize};
use stepwise_topology::{Grid, GridCoord, Neighbors};
use tracing::debug;

use crate::{InputError, Trace, TraceEvent, TraceRecorder};

/// Default maze height.
pub const DEFAULT_ROWS: usize = 20;
/// Default maze width.
pub const DEFAULT_COLS: usize = 30;
/// Default start cell.
pub const DEFAULT_START: GridCoord = GridCoord::new(5, 5);
/// Default goal cell.
pub const DEFAULT_GOAL: GridCoord = GridCoord::new(15, 25);

/// A grid with validated start and goal cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMazeInput")]
pub struct MazeInput {
    grid: Grid,
    start: GridCoord,
    goal: GridCoord,
}

#[derive(Deserialize)]
struct RawMazeInput {
    grid: Grid,
    start: GridCoord,
    goal: GridCoord,
}

impl TryFrom<RawMazeInput> for MazeInput {
    type Error = InputError;

    fn try_from(raw: RawMazeInput) -> Result<Self, Self::Error> {
        Self::new(raw.grid, raw.start, raw.goal)
    }
}

impl MazeInput {
    /// Validate endpoints against the grid.
    pub fn new(grid: Grid, start: GridCoord, goal: GridCoord) -> Result<Self, InputError> {
        for (role, coord) in [("start", start), ("goal", goal)] {
            if !grid.contains(coord) {
                return Err(InputError::EndpointOutOfBounds {
                    role,
                    coord,
                    rows: grid.rows(),
                    cols: grid.cols(),
                });
            }
            if grid.is_wall(coord) {
                return Err(InputError::EndpointOnWall { role, coord });
            }
        }
        Ok(Self { grid, start, goal })
    }

    /// The open 20x30 maze from (5, 5) to (15, 25).
    pub fn preset() -> Result<Self, InputError> {
        Self::new(Grid::new(DEFAULT_ROWS, DEFAULT_COLS)?, DEFAULT_START, DEFAULT_GOAL)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn start(&self) -> GridCoord {
        self.start
    }

    pub fn goal(&self) -> GridCoord {
        self.goal
    }
}

/// One A* decision point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathEvent {
    /// Cell selected from the open list.
    Current { cell: GridCoord },
    /// Cell moved to the closed list.
    Visit { cell: GridCoord },
    /// Cell added to the open list.
    Frontier { cell: GridCoord },
    /// Final path, start to goal inclusive.
    Path { cells: Vec<GridCoord> },
    /// Goal reached with this path cost.
    Complete { cost: usize },
    /// Open list ran dry.
    Exhausted,
}

impl TraceEvent for PathEvent {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Exhausted)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Current { .. } => "current",
            Self::Visit { .. } => "visit",
            Self::Frontier { .. } => "frontier",
            Self::Path { .. } => "path",
            Self::Complete { .. } => "complete",
            Self::Exhausted => "exhausted",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Score {
    g: usize,
    f: usize,
    parent: Option<usize>,
}

/// Run A* from start to goal, recording every decision.
pub fn astar(input: &MazeInput) -> Trace<PathEvent> {
    let grid = input.grid();
    let cell_at = |i: usize| GridCoord::new(i / grid.cols(), i % grid.cols());
    let index = |c: GridCoord| c.row * grid.cols() + c.col;

    let start = index(input.start);
    let goal = index(input.goal);

    let mut scores = vec![Score::default(); grid.len()];
    let mut open_set = vec![false; grid.len()];
    let mut closed = vec![false; grid.len()];
    let mut open = vec![start];
    open_set[start] = true;

    let mut recorder = TraceRecorder::new();

    while !open.is_empty() {
        let mut best = 0;
        for (i, &cell) in open.iter().enumerate().skip(1) {
            if scores[cell].f < scores[open[best]].f {
                best = i;
            }
        }
        let current = open[best];
        recorder.push(PathEvent::Current {
            cell: cell_at(current),
        });

        if current == goal {
            let mut cells = vec![cell_at(current)];
            let mut cursor = scores[current].parent;
            while let Some(p) = cursor {
                cells.push(cell_at(p));
                cursor = scores[p].parent;
            }
            cells.reverse();
            let cost = scores[current].g;
            recorder.push(PathEvent::Path { cells });
            debug!(events = recorder.len() + 1, cost, "astar reached goal");
            return recorder.finish(PathEvent::Complete { cost });
        }

        open.remove(best);
        open_set[current] = false;
        closed[current] = true;
        recorder.push(PathEvent::Visit {
            cell: cell_at(current),
        });

        for neighbor in Neighbors::open_of(grid, cell_at(current)) {
            let n = index(neighbor);
            if closed[n] {
                continue;
            }
            let g = scores[current].g + 1;
            let improved = if open_set[n] {
                g < scores[n].g
            } else {
                open.push(n);
                open_set[n] = true;
                recorder.push(PathEvent::Frontier { cell: neighbor });
                true
            };
            if improved {
                scores[n] = Score {
                    g,
                    f: g + neighbor.manhattan(&input.goal),
                    parent: Some(current),
                };
            }
        }
    }

    debug!(events = recorder.len() + 1, "astar exhausted open list");
    recorder.finish(PathEvent::Exhausted)
}
