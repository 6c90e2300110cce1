//! Backtracking Sudoku solver.
//!
//! Cells are filled in row-major order, trying digits 1 through 9. Every
//! trial placement and every undo is recorded, so an unsolvable board ends
//! with as many `Backtrack` events as `Place` events.

use serde::{Deserialize, Serialize};
use stepwise_topology::GridCoord;
use tracing::debug;

use crate::{InputError, Trace, TraceEvent, TraceRecorder};

/// Side length of the board.
pub const SIZE: usize = 9;
/// Side length of one box.
pub const BOX: usize = 3;

/// The puzzle shipped with the visualizer. Zero is an empty cell.
pub const CLASSIC: [[u8; SIZE]; SIZE] = [
    [5, 3, 0, 0, 7, 0, 0, 0, 0],
    [6, 0, 0, 1, 9, 5, 0, 0, 0],
    [0, 9, 8, 0, 0, 0, 0, 6, 0],
    [8, 0, 0, 0, 6, 0, 0, 0, 3],
    [4, 0, 0, 8, 0, 3, 0, 0, 1],
    [7, 0, 0, 0, 2, 0, 0, 0, 6],
    [0, 6, 0, 0, 0, 0, 2, 8, 0],
    [0, 0, 0, 4, 1, 9, 0, 0, 5],
    [0, 0, 0, 0, 8, 0, 0, 7, 9],
];

/// A 9x9 board of digits, zero meaning empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBoard")]
pub struct Board {
    cells: [[u8; SIZE]; SIZE],
}

#[derive(Deserialize)]
struct RawBoard {
    cells: [[u8; SIZE]; SIZE],
}

impl TryFrom<RawBoard> for Board {
    type Error = InputError;

    fn try_from(raw: RawBoard) -> Result<Self, Self::Error> {
        Self::new(raw.cells)
    }
}

impl Board {
    /// Validate that every digit is in 0-9.
    pub fn new(cells: [[u8; SIZE]; SIZE]) -> Result<Self, InputError> {
        for (row, line) in cells.iter().enumerate() {
            for (col, &digit) in line.iter().enumerate() {
                if digit > 9 {
                    return Err(InputError::InvalidDigit {
                        cell: GridCoord::new(row, col),
                        digit,
                    });
                }
            }
        }
        Ok(Self { cells })
    }

    /// The classic puzzle.
    pub const fn classic() -> Self {
        Self { cells: CLASSIC }
    }

    pub const fn empty() -> Self {
        Self {
            cells: [[0; SIZE]; SIZE],
        }
    }

    pub fn get(&self, cell: GridCoord) -> u8 {
        self.cells[cell.row][cell.col]
    }

    pub fn set(&mut self, cell: GridCoord, digit: u8) {
        self.cells[cell.row][cell.col] = digit;
    }

    pub fn rows(&self) -> &[[u8; SIZE]; SIZE] {
        &self.cells
    }

    /// Whether `digit` may go in `cell` given the row, column and box.
    ///
    /// The cell itself is ignored, so a filled cell can be re-checked.
    pub fn is_legal(&self, cell: GridCoord, digit: u8) -> bool {
        let (br, bc) = (cell.row - cell.row % BOX, cell.col - cell.col % BOX);
        for i in 0..SIZE {
            if i != cell.col && self.cells[cell.row][i] == digit {
                return false;
            }
            if i != cell.row && self.cells[i][cell.col] == digit {
                return false;
            }
            let (r, c) = (br + i / BOX, bc + i % BOX);
            if (r, c) != (cell.row, cell.col) && self.cells[r][c] == digit {
                return false;
            }
        }
        true
    }

    /// First filled cell that clashes with another filled cell.
    pub fn first_conflict(&self) -> Option<GridCoord> {
        filled_cells(self).find(|&cell| !self.is_legal(cell, self.get(cell)))
    }

    /// Whether every cell is filled.
    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(|&d| d != 0)
    }

    /// Whether the board is full and conflict-free.
    pub fn is_solved(&self) -> bool {
        self.is_full() && self.first_conflict().is_none()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

fn filled_cells(board: &Board) -> impl Iterator<Item = GridCoord> + '_ {
    (0..SIZE * SIZE)
        .map(|i| GridCoord::new(i / SIZE, i % SIZE))
        .filter(move |&cell| board.get(cell) != 0)
}

/// A puzzle. Filled cells are the givens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SudokuInput {
    board: Board,
}

impl SudokuInput {
    pub fn new(board: Board) -> Self {
        Self { board }
    }

    pub fn classic() -> Self {
        Self::new(Board::classic())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mask of given cells.
    pub fn givens(&self) -> [[bool; SIZE]; SIZE] {
        self.board.cells.map(|row| row.map(|d| d != 0))
    }
}

/// One solver decision point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SudokuEvent {
    /// Trial placement.
    Place { cell: GridCoord, digit: u8 },
    /// Undo of the last placement in this cell.
    Backtrack { cell: GridCoord },
    Solved,
    Exhausted,
}

impl TraceEvent for SudokuEvent {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Solved | Self::Exhausted)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Place { .. } => "place",
            Self::Backtrack { .. } => "backtrack",
            Self::Solved => "solved",
            Self::Exhausted => "exhausted",
        }
    }
}

/// Solve by backtracking.
///
/// Givens that already clash cannot be completed, so the trace is just
/// `Exhausted`.
pub fn solve(input: &SudokuInput) -> Trace<SudokuEvent> {
    let mut recorder = TraceRecorder::new();
    if let Some(cell) = input.board.first_conflict() {
        debug!(%cell, "sudoku givens conflict");
        return recorder.finish(SudokuEvent::Exhausted);
    }

    let mut board = input.board;
    let solved = fill(&mut board, 0, &mut recorder);
    debug!(events = recorder.len() + 1, solved, "sudoku search finished");
    recorder.finish(if solved {
        SudokuEvent::Solved
    } else {
        SudokuEvent::Exhausted
    })
}

fn fill(board: &mut Board, pos: usize, rec: &mut TraceRecorder<SudokuEvent>) -> bool {
    if pos == SIZE * SIZE {
        return true;
    }
    let cell = GridCoord::new(pos / SIZE, pos % SIZE);
    if board.get(cell) != 0 {
        return fill(board, pos + 1, rec);
    }
    for digit in 1..=9 {
        if !board.is_legal(cell, digit) {
            continue;
        }
        board.set(cell, digit);
        rec.push(SudokuEvent::Place { cell, digit });
        if fill(board, pos + 1, rec) {
            return true;
        }
        board.set(cell, 0);
        rec.push(SudokuEvent::Backtrack { cell });
    }
    false
}
