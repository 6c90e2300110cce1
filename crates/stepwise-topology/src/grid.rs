//! Rectangular cell grid with walls.
//!
//! Cells are addressed by (row, col) with the origin in the top-left corner.
//! Walls are stored row-major so a grid can be compared and hashed cheaply.

use crate::TopologyError;

/// A cell position in a rectangular grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCoord {
    /// Row index (top is 0)
    pub row: usize,
    /// Column index (left is 0)
    pub col: usize,
}

impl GridCoord {
    /// Top-left cell.
    pub const ORIGIN: Self = Self { row: 0, col: 0 };

    /// Create a new coordinate.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance: |drow| + |dcol|.
    ///
    /// This is the A* heuristic; it never overestimates on a 4-connected
    /// grid with unit step cost.
    pub const fn manhattan(&self, other: &Self) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Offset this coordinate by a signed delta, if the result stays
    /// non-negative.
    pub fn offset(&self, drow: isize, dcol: isize) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add_signed(drow)?,
            col: self.col.checked_add_signed(dcol)?,
        })
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A rectangular grid where each cell is open or a wall.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawGrid")
)]
pub struct Grid {
    rows: usize,
    cols: usize,
    walls: Vec<bool>,
}

/// Wire form of a [`Grid`], checked on the way in.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGrid {
    rows: usize,
    cols: usize,
    walls: Vec<bool>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawGrid> for Grid {
    type Error = TopologyError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        let mut grid = Self::new(raw.rows, raw.cols)?;
        if raw.walls.len() != grid.len() {
            return Err(TopologyError::WallMaskLength {
                expected: grid.len(),
                actual: raw.walls.len(),
            });
        }
        grid.walls = raw.walls;
        Ok(grid)
    }
}

impl Grid {
    /// Create an open grid with no walls.
    pub fn new(rows: usize, cols: usize) -> Result<Self, TopologyError> {
        if rows == 0 || cols == 0 {
            return Err(TopologyError::EmptyGrid { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            walls: vec![false; rows * cols],
        })
    }

    /// Create a grid with walls at the given cells.
    pub fn with_walls<I>(rows: usize, cols: usize, walls: I) -> Result<Self, TopologyError>
    where
        I: IntoIterator<Item = GridCoord>,
    {
        let mut grid = Self::new(rows, cols)?;
        for coord in walls {
            grid.set_wall(coord, true)?;
        }
        Ok(grid)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Always false: construction rejects empty grids.
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    /// Whether the coordinate lies inside the grid.
    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    /// Row-major index of an in-bounds coordinate.
    pub fn index_of(&self, coord: GridCoord) -> Option<usize> {
        self.contains(coord).then(|| coord.row * self.cols + coord.col)
    }

    /// Coordinate of a row-major index.
    pub fn coord_of(&self, index: usize) -> Option<GridCoord> {
        (index < self.len()).then(|| GridCoord::new(index / self.cols, index % self.cols))
    }

    /// Whether the cell is a wall. Out-of-bounds cells count as walls.
    pub fn is_wall(&self, coord: GridCoord) -> bool {
        self.index_of(coord).map_or(true, |i| self.walls[i])
    }

    /// Place or clear a wall.
    pub fn set_wall(&mut self, coord: GridCoord, wall: bool) -> Result<(), TopologyError> {
        let index = self.index_of(coord).ok_or(TopologyError::OutOfBounds {
            coord,
            rows: self.rows,
            cols: self.cols,
        })?;
        self.walls[index] = wall;
        Ok(())
    }

    /// Flip a cell between open and wall, as the wall-drawing tool does.
    pub fn toggle_wall(&mut self, coord: GridCoord) -> Result<bool, TopologyError> {
        let wall = !self.is_wall(coord);
        self.set_wall(coord, wall)?;
        Ok(wall)
    }

    /// Remove every wall.
    pub fn clear_walls(&mut self) {
        self.walls.fill(false);
    }

    /// Iterate over every wall coordinate in row-major order.
    pub fn walls(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.walls
            .iter()
            .enumerate()
            .filter(|(_, &w)| w)
            .map(move |(i, _)| GridCoord::new(i / self.cols, i % self.cols))
    }

    /// Number of walls.
    pub fn wall_count(&self) -> usize {
        self.walls.iter().filter(|&&w| w).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance() {
        let a = GridCoord::new(5, 5);
        let b = GridCoord::new(15, 25);
        assert_eq!(a.manhattan(&b), 30);
        assert_eq!(b.manhattan(&a), 30);
        assert_eq!(a.manhattan(&a), 0);
    }

    #[test]
    fn offset_rejects_negative() {
        assert_eq!(GridCoord::ORIGIN.offset(-1, 0), None);
        assert_eq!(GridCoord::ORIGIN.offset(0, -1), None);
        assert_eq!(GridCoord::ORIGIN.offset(1, 2), Some(GridCoord::new(1, 2)));
    }

    #[test]
    fn empty_grid_rejected() {
        assert_eq!(
            Grid::new(0, 3),
            Err(TopologyError::EmptyGrid { rows: 0, cols: 3 })
        );
    }

    #[test]
    fn walls_roundtrip_row_major() {
        let walls = [GridCoord::new(2, 1), GridCoord::new(0, 3)];
        let grid = Grid::with_walls(4, 4, walls).unwrap();

        assert_eq!(grid.wall_count(), 2);
        let listed: Vec<_> = grid.walls().collect();
        assert_eq!(listed, vec![GridCoord::new(0, 3), GridCoord::new(2, 1)]);
    }

    #[test]
    fn wall_out_of_bounds_rejected() {
        let err = Grid::with_walls(2, 2, [GridCoord::new(2, 0)]).unwrap_err();
        assert!(matches!(err, TopologyError::OutOfBounds { .. }));
    }

    #[test]
    fn out_of_bounds_counts_as_wall() {
        let grid = Grid::new(3, 3).unwrap();
        assert!(!grid.is_wall(GridCoord::new(2, 2)));
        assert!(grid.is_wall(GridCoord::new(3, 0)));
    }

    #[test]
    fn toggle_and_clear() {
        let mut grid = Grid::new(3, 3).unwrap();
        let cell = GridCoord::new(1, 1);

        assert!(grid.toggle_wall(cell).unwrap());
        assert!(grid.is_wall(cell));
        assert!(!grid.toggle_wall(cell).unwrap());

        grid.set_wall(cell, true).unwrap();
        grid.clear_walls();
        assert_eq!(grid.wall_count(), 0);
    }

    #[test]
    fn index_coord_conversion() {
        let grid = Grid::new(20, 30).unwrap();
        let cell = GridCoord::new(15, 25);
        let index = grid.index_of(cell).unwrap();
        assert_eq!(index, 15 * 30 + 25);
        assert_eq!(grid.coord_of(index), Some(cell));
        assert_eq!(grid.coord_of(grid.len()), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_checks_wall_mask() {
        let grid = Grid::with_walls(2, 3, [GridCoord::new(1, 2)]).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(serde_json::from_str::<Grid>(&json).unwrap(), grid);

        let short = r#"{"rows":2,"cols":3,"walls":[false,true]}"#;
        let err = serde_json::from_str::<Grid>(short).unwrap_err();
        assert!(err.to_string().contains("wall mask has 2 cells"), "{}", err);

        let empty = r#"{"rows":0,"cols":3,"walls":[]}"#;
        assert!(serde_json::from_str::<Grid>(empty).is_err());
    }
}
