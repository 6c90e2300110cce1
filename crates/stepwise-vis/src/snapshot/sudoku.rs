//! Board snapshot for the backtracking solver.

use serde::{Deserialize, Serialize};
use stepwise_runners::sudoku::SIZE;
use stepwise_runners::{Board, SudokuEvent, SudokuInput};
use stepwise_topology::GridCoord;

use super::Reduce;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SudokuOutcome {
    Solved,
    Unsolvable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SudokuSnapshot {
    pub board: Board,
    /// Cells fixed by the puzzle. Events never touch these.
    pub givens: [[bool; SIZE]; SIZE],
    /// Cell of the last placement or undo.
    pub active: Option<GridCoord>,
    pub places: usize,
    pub backtracks: usize,
    pub outcome: Option<SudokuOutcome>,
}

impl SudokuSnapshot {
    pub fn new(input: &SudokuInput) -> Self {
        Self {
            board: *input.board(),
            givens: input.givens(),
            active: None,
            places: 0,
            backtracks: 0,
            outcome: None,
        }
    }

    pub fn is_given(&self, cell: GridCoord) -> bool {
        self.givens[cell.row][cell.col]
    }

    fn check(&self, cell: GridCoord) {
        assert!(
            cell.row < SIZE && cell.col < SIZE,
            "cell {} outside the board",
            cell
        );
        assert!(!self.is_given(cell), "cell {} is a given", cell);
    }
}

impl Reduce for SudokuSnapshot {
    type Event = SudokuEvent;

    fn apply(&self, event: &SudokuEvent) -> Self {
        let mut next = self.clone();
        match *event {
            SudokuEvent::Place { cell, digit } => {
                next.check(cell);
                assert!((1..=9).contains(&digit), "digit {} out of range", digit);
                next.board.set(cell, digit);
                next.active = Some(cell);
                next.places += 1;
            }
            SudokuEvent::Backtrack { cell } => {
                next.check(cell);
                next.board.set(cell, 0);
                next.active = Some(cell);
                next.backtracks += 1;
            }
            SudokuEvent::Solved => {
                next.active = None;
                next.outcome = Some(SudokuOutcome::Solved);
            }
            SudokuEvent::Exhausted => {
                next.active = None;
                next.outcome = Some(SudokuOutcome::Unsolvable);
            }
        }
        next
    }
}
