use std::fmt;

/// Rows of the compiled-in maze. `#` marks a wall block.
const REFERENCE_ROWS: [&str; 7] = [
    "#######",
    "......#",
    "#.#...#",
    "#..#..#",
    "#.....#",
    "#.....#",
    "##.####",
];

/// Errors from building an occupancy grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid has no cells")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid cell {ch:?} at row {row}, column {column}")]
    InvalidCell { row: usize, column: usize, ch: char },
    #[error("cell buffer holds {found} cells, expected {expected}")]
    SizeMismatch { expected: usize, found: usize },
}

/// Fixed 2D occupancy grid. `true` cells are solid walls.
///
/// Cells are stored row-major; `(x, y)` is column `x` of row `y`. The grid is
/// read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl GridMap {
    /// Build a grid from a row-major cell buffer.
    pub fn new(width: usize, height: usize, cells: Vec<bool>) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }
        if cells.len() != width * height {
            return Err(GridError::SizeMismatch {
                expected: width * height,
                found: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// A grid of the given size with no walls at all.
    pub fn open(width: usize, height: usize) -> Result<Self, GridError> {
        Self::new(width, height, vec![false; width * height])
    }

    /// Parse textual rows. `#` or `1` is a wall, `.`, `0` or a space is open.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(GridError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (column, ch) in line.chars().enumerate() {
                let wall = match ch {
                    '#' | '1' => true,
                    '.' | '0' | ' ' => false,
                    _ => return Err(GridError::InvalidCell { row, column, ch }),
                };
                cells.push(wall);
            }
        }

        Self::new(width, rows.len(), cells)
    }

    /// The 7x7 maze with 24 wall blocks.
    pub fn reference() -> Self {
        Self::from_rows(&REFERENCE_ROWS).expect("reference grid is well formed")
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether `(x, y)` is a wall. Out-of-range cells are open.
    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    /// Number of wall cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    /// Wall cells as `(x, y)` in row-major scan order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, wall)| **wall)
            .map(move |(i, _)| (i % width, i / width))
    }

    /// Cell-space midpoint, used to center the maze on the origin. Half-integer
    /// for even extents.
    pub fn center(&self) -> (f32, f32) {
        (
            (self.width - 1) as f32 / 2.0,
            (self.height - 1) as f32 / 2.0,
        )
    }

    /// Rows rendered back to the `#`/`.` text form.
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|w| if *w { '#' } else { '.' }).collect())
            .collect()
    }
}

impl Default for GridMap {
    fn default() -> Self {
        Self::reference()
    }
}

impl fmt::Display for GridMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_grid_has_24_walls() {
        let grid = GridMap::reference();
        assert_eq!(grid.width(), 7);
        assert_eq!(grid.height(), 7);
        assert_eq!(grid.occupied_count(), 24);
        assert_eq!(grid.occupied_cells().count(), 24);
    }

    #[test]
    fn reference_corners_and_center_are_walls() {
        let grid = GridMap::reference();
        for (x, y) in [(0, 0), (6, 0), (0, 6), (6, 6), (3, 3)] {
            assert!(grid.is_wall(x, y), "({x}, {y}) should be a wall");
        }
        assert_eq!(grid.center(), (3.0, 3.0));
    }

    #[test]
    fn even_grid_centers_between_cells() {
        let grid = GridMap::open(6, 4).unwrap();
        assert_eq!(grid.center(), (2.5, 1.5));
    }

    #[test]
    fn occupied_cells_are_row_major() {
        let grid = GridMap::from_rows(&[".#", "##"]).unwrap();
        let cells: Vec<_> = grid.occupied_cells().collect();
        assert_eq!(cells, vec![(1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn parse_accepts_digits_and_spaces() {
        let grid = GridMap::from_rows(&["1 0", "010"]).unwrap();
        assert_eq!(grid.occupied_count(), 2);
        assert!(grid.is_wall(0, 0));
        assert!(grid.is_wall(1, 1));
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = GridMap::from_rows(&["###", "##"]).unwrap_err();
        assert_eq!(
            err,
            GridError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn invalid_cell_rejected() {
        let err = GridMap::from_rows(&["#x#"]).unwrap_err();
        assert!(matches!(err, GridError::InvalidCell { column: 1, ch: 'x', .. }));
    }

    #[test]
    fn empty_grid_rejected() {
        let rows: [&str; 0] = [];
        assert_eq!(GridMap::from_rows(&rows).unwrap_err(), GridError::Empty);
        assert_eq!(GridMap::open(0, 3).unwrap_err(), GridError::Empty);
    }

    #[test]
    fn open_grid_has_no_walls() {
        let grid = GridMap::open(7, 7).unwrap();
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.occupied_cells().count(), 0);
    }

    #[test]
    fn out_of_range_is_open() {
        let grid = GridMap::reference();
        assert!(!grid.is_wall(7, 0));
        assert!(!grid.is_wall(0, 7));
    }

    #[test]
    fn display_round_trips_rows() {
        let grid = GridMap::reference();
        let text = grid.to_string();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(GridMap::from_rows(&rows).unwrap(), grid);
    }
}
