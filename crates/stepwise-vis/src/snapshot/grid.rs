//! Grid snapshot for A* playback.

use serde::{Deserialize, Serialize};
use stepwise_runners::{MazeInput, PathEvent};
use stepwise_topology::GridCoord;

use super::Reduce;

/// What a cell currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    Empty,
    Wall,
    Start,
    Goal,
    Visited,
    Frontier,
    Current,
    Path,
}

/// How the search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PathOutcome {
    Found { cost: usize },
    Unreachable,
}

/// Per-cell view of an A* search.
///
/// Start and goal keep their tags for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub rows: usize,
    pub cols: usize,
    /// Row-major cell statuses.
    pub cells: Vec<CellStatus>,
    pub start: GridCoord,
    pub goal: GridCoord,
    pub current: Option<GridCoord>,
    pub visited: usize,
    pub path_length: usize,
    pub outcome: Option<PathOutcome>,
}

impl GridSnapshot {
    pub fn new(input: &MazeInput) -> Self {
        let grid = input.grid();
        let mut cells = vec![CellStatus::Empty; grid.len()];
        for wall in grid.walls() {
            cells[wall.row * grid.cols() + wall.col] = CellStatus::Wall;
        }
        let mut snapshot = Self {
            rows: grid.rows(),
            cols: grid.cols(),
            cells,
            start: input.start(),
            goal: input.goal(),
            current: None,
            visited: 0,
            path_length: 0,
            outcome: None,
        };
        let (start, goal) = (snapshot.index(input.start()), snapshot.index(input.goal()));
        snapshot.cells[start] = CellStatus::Start;
        snapshot.cells[goal] = CellStatus::Goal;
        snapshot
    }

    /// Status of one cell.
    pub fn status(&self, cell: GridCoord) -> CellStatus {
        self.cells[self.index(cell)]
    }

    /// Number of cells showing `status`.
    pub fn count(&self, status: CellStatus) -> usize {
        self.cells.iter().filter(|&&s| s == status).count()
    }

    fn index(&self, cell: GridCoord) -> usize {
        assert!(
            cell.row < self.rows && cell.col < self.cols,
            "cell {} outside {}x{} grid",
            cell,
            self.rows,
            self.cols
        );
        cell.row * self.cols + cell.col
    }

    fn mark(&mut self, cell: GridCoord, status: CellStatus) {
        let i = self.index(cell);
        if cell != self.start && cell != self.goal {
            self.cells[i] = status;
        }
    }
}

impl Reduce for GridSnapshot {
    type Event = PathEvent;

    fn apply(&self, event: &PathEvent) -> Self {
        let mut next = self.clone();
        match event {
            PathEvent::Current { cell } => {
                next.mark(*cell, CellStatus::Current);
                next.current = Some(*cell);
            }
            PathEvent::Visit { cell } => {
                next.mark(*cell, CellStatus::Visited);
                next.visited += 1;
            }
            PathEvent::Frontier { cell } => next.mark(*cell, CellStatus::Frontier),
            PathEvent::Path { cells } => {
                for cell in cells {
                    next.mark(*cell, CellStatus::Path);
                }
                next.path_length = cells.len();
            }
            PathEvent::Complete { cost } => {
                next.outcome = Some(PathOutcome::Found { cost: *cost });
            }
            PathEvent::Exhausted => {
                next.current = None;
                next.outcome = Some(PathOutcome::Unreachable);
            }
        }
        next
    }
}
