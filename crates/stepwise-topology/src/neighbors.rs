//! 4-Connection Neighbor Computation
//!
//! A grid cell connects to at most 4 neighbors:
//! - 2 vertical neighbors (up, down)
//! - 2 horizontal neighbors (left, right)
//!
//! The order of [`Direction::ALL`] is part of the A* contract: neighbors are
//! expanded up, down, left, right, and that order decides which of two equal
//! cost cells enters the open list first.

use crate::{Grid, GridCoord, CARDINAL_NEIGHBORS};

/// One of the four cardinal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions in expansion order.
    pub const ALL: [Self; CARDINAL_NEIGHBORS] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Signed (row, col) delta of one step in this direction.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    /// The direction pointing back.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Neighbor lookup over a bounded grid.
pub struct Neighbors;

impl Neighbors {
    /// In-bounds neighbors of a coordinate, in [`Direction::ALL`] order.
    ///
    /// Walls are included; callers decide whether a wall is passable.
    pub fn of(grid: &Grid, coord: GridCoord) -> impl Iterator<Item = GridCoord> + '_ {
        Direction::ALL.into_iter().filter_map(move |dir| {
            let (dr, dc) = dir.delta();
            coord.offset(dr, dc).filter(|n| grid.contains(*n))
        })
    }

    /// In-bounds neighbors that are not walls.
    pub fn open_of(grid: &Grid, coord: GridCoord) -> impl Iterator<Item = GridCoord> + '_ {
        Self::of(grid, coord).filter(move |n| !grid.is_wall(*n))
    }
}

/// Check if two coordinates are 4-connected neighbors.
pub fn are_neighbors(a: GridCoord, b: GridCoord) -> bool {
    a.manhattan(&b) == 1
}

/// Count how many of a cell's neighbors are open.
pub fn count_open_neighbors(grid: &Grid, coord: GridCoord) -> usize {
    Neighbors::open_of(grid, coord).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_are_unique() {
        let dirs = Direction::ALL;
        for i in 0..dirs.len() {
            for j in (i + 1)..dirs.len() {
                assert_ne!(dirs[i].delta(), dirs[j].delta(), "Duplicate direction at {} and {}", i, j);
            }
        }
    }

    #[test]
    fn opposite_cancels_delta() {
        for dir in Direction::ALL {
            let (dr, dc) = dir.delta();
            let (or, oc) = dir.opposite().delta();
            assert_eq!((dr + or, dc + oc), (0, 0));
        }
    }

    #[test]
    fn interior_cell_has_four_in_order() {
        let grid = Grid::new(3, 3).unwrap();
        let neighbors: Vec<_> = Neighbors::of(&grid, GridCoord::new(1, 1)).collect();
        assert_eq!(
            neighbors,
            vec![
                GridCoord::new(0, 1),
                GridCoord::new(2, 1),
                GridCoord::new(1, 0),
                GridCoord::new(1, 2),
            ]
        );
    }

    #[test]
    fn corner_cell_is_clipped() {
        let grid = Grid::new(3, 3).unwrap();
        let neighbors: Vec<_> = Neighbors::of(&grid, GridCoord::ORIGIN).collect();
        assert_eq!(neighbors, vec![GridCoord::new(1, 0), GridCoord::new(0, 1)]);

        let far: Vec<_> = Neighbors::of(&grid, GridCoord::new(2, 2)).collect();
        assert_eq!(far, vec![GridCoord::new(1, 2), GridCoord::new(2, 1)]);
    }

    #[test]
    fn walls_filtered_from_open_neighbors() {
        let grid = Grid::with_walls(3, 3, [GridCoord::new(0, 1), GridCoord::new(1, 2)]).unwrap();
        assert_eq!(count_open_neighbors(&grid, GridCoord::new(1, 1)), 2);
        assert_eq!(Neighbors::of(&grid, GridCoord::new(1, 1)).count(), 4);
    }

    #[test]
    fn neighbor_relation_symmetric() {
        let a = GridCoord::new(3, 2);
        let b = GridCoord::new(3, 3);
        assert!(are_neighbors(a, b));
        assert!(are_neighbors(b, a));
        assert!(!are_neighbors(a, GridCoord::new(4, 3)));
        assert!(!are_neighbors(a, a));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_neighbor_is_one_step_away(
                rows in 1usize..40,
                cols in 1usize..40,
                row in 0usize..40,
                col in 0usize..40,
            ) {
                let grid = Grid::new(rows, cols).unwrap();
                let cell = GridCoord::new(row % rows, col % cols);
                let neighbors: Vec<_> = Neighbors::of(&grid, cell).collect();

                prop_assert!(neighbors.len() <= CARDINAL_NEIGHBORS);
                for n in neighbors {
                    prop_assert!(grid.contains(n));
                    prop_assert!(are_neighbors(cell, n));
                }
            }
        }
    }
}
