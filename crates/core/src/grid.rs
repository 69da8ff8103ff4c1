//! Grid module - manages the tile grid
//!
//! The grid is a 4x4 square where each cell is empty (0) or holds a power of two.
//! Uses a flat array for better cache locality and zero-allocation.
//! Coordinates: (row, col) where both range 0..3, row 0 at the top.
//!
//! Every slide works on lines: rows for Left/Right, columns for Up/Down. A line
//! is read leading-edge first, combined, then written back in the same order,
//! so a single left-compacting [`combine_line`] serves all four directions.

use arrayvec::ArrayVec;

use crate::types::{Cell, Direction, EMPTY, GRID_CELLS, GRID_WIDTH};

/// One row or column, ordered from its leading edge
pub type Line = [Cell; GRID_WIDTH];

/// The game grid - 4 rows x 4 columns using flat array storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Grid {
    /// Flat array of cells, row-major order (row * WIDTH + col)
    cells: [Cell; GRID_CELLS],
}

impl Grid {
    /// Create a new empty grid
    pub fn new() -> Self {
        Self {
            cells: [EMPTY; GRID_CELLS],
        }
    }

    /// Create a grid from rows, top row first
    pub fn from_rows(rows: [[Cell; GRID_WIDTH]; GRID_WIDTH]) -> Self {
        let mut cells = [EMPTY; GRID_CELLS];
        for (row, values) in rows.iter().enumerate() {
            cells[row * GRID_WIDTH..(row + 1) * GRID_WIDTH].copy_from_slice(values);
        }
        Self { cells }
    }

    /// Create a grid from its flat row-major cells
    pub fn from_cells(cells: [Cell; GRID_CELLS]) -> Self {
        Self { cells }
    }

    /// Calculate flat index from (row, col) coordinates
    #[inline(always)]
    fn index(row: usize, col: usize) -> Option<usize> {
        if row >= GRID_WIDTH || col >= GRID_WIDTH {
            return None;
        }
        Some(row * GRID_WIDTH + col)
    }

    /// Get cell at (row, col), None if out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        Self::index(row, col).map(|idx| self.cells[idx])
    }

    /// Set cell at (row, col), false if out of bounds
    pub fn set(&mut self, row: usize, col: usize, value: Cell) -> bool {
        match Self::index(row, col) {
            Some(idx) => {
                self.cells[idx] = value;
                true
            }
            None => false,
        }
    }

    /// Set cell by flat index, false if out of bounds
    pub fn set_index(&mut self, idx: usize, value: Cell) -> bool {
        match self.cells.get_mut(idx) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell; GRID_CELLS] {
        &self.cells
    }

    /// Copy out as rows, top row first
    pub fn rows(&self) -> [[Cell; GRID_WIDTH]; GRID_WIDTH] {
        let mut rows = [[EMPTY; GRID_WIDTH]; GRID_WIDTH];
        self.write_rows(&mut rows);
        rows
    }

    /// Write rows into an existing buffer (allocation-free)
    pub fn write_rows(&self, out: &mut [[Cell; GRID_WIDTH]; GRID_WIDTH]) {
        for (row, values) in out.iter_mut().enumerate() {
            values.copy_from_slice(&self.cells[row * GRID_WIDTH..(row + 1) * GRID_WIDTH]);
        }
    }

    /// Clear the entire grid
    pub fn clear(&mut self) {
        self.cells = [EMPTY; GRID_CELLS];
    }

    /// Flat indices of all empty cells, in storage order
    pub fn empty_indices(&self) -> ArrayVec<usize, GRID_CELLS> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == EMPTY)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn has_empty(&self) -> bool {
        self.cells.contains(&EMPTY)
    }

    /// Check whether two orthogonal neighbours hold the same non-empty value
    pub fn has_adjacent_pair(&self) -> bool {
        for i in 0..GRID_CELLS {
            let v = self.cells[i];
            if v == EMPTY {
                continue;
            }
            // Right neighbour, same row only.
            if i % GRID_WIDTH < GRID_WIDTH - 1 && self.cells[i + 1] == v {
                return true;
            }
            // Neighbour below.
            if i < GRID_WIDTH * (GRID_WIDTH - 1) && self.cells[i + GRID_WIDTH] == v {
                return true;
            }
        }
        false
    }

    /// True when no slide in any direction can change the grid
    pub fn is_stuck(&self) -> bool {
        !self.has_empty() && !self.has_adjacent_pair()
    }

    pub fn has_tile(&self, value: Cell) -> bool {
        self.cells.contains(&value)
    }

    pub fn max_tile(&self) -> Cell {
        self.cells.iter().copied().max().unwrap_or(EMPTY)
    }

    /// Flat indices of the `line`-th row or column, leading edge first
    pub fn line_indices(direction: Direction, line: usize) -> [usize; GRID_WIDTH] {
        let mut out = [0usize; GRID_WIDTH];
        for (j, slot) in out.iter_mut().enumerate() {
            let k = if direction.is_reversed() {
                GRID_WIDTH - 1 - j
            } else {
                j
            };
            *slot = if direction.is_horizontal() {
                line * GRID_WIDTH + k
            } else {
                k * GRID_WIDTH + line
            };
        }
        out
    }

    /// Read a line in direction-normalized order
    pub fn read_line(&self, direction: Direction, line: usize) -> Line {
        Self::line_indices(direction, line).map(|idx| self.cells[idx])
    }

    /// Write a direction-normalized line back to its storage positions
    pub fn write_line(&mut self, direction: Direction, line: usize, values: Line) {
        for (idx, value) in Self::line_indices(direction, line).into_iter().zip(values) {
            self.cells[idx] = value;
        }
    }

    /// Slide and merge every line toward `direction`
    ///
    /// Returns the points earned from merges. Does not spawn.
    pub fn slide(&mut self, direction: Direction) -> u32 {
        let mut gained: u32 = 0;
        for line in 0..GRID_WIDTH {
            let (combined, points) = combine_line(self.read_line(direction, line));
            self.write_line(direction, line, combined);
            gained = gained.saturating_add(points);
        }
        gained
    }

    /// Check if a slide toward `direction` would change the grid
    pub fn can_slide(&self, direction: Direction) -> bool {
        let mut probe = *self;
        probe.slide(direction);
        probe != *self
    }

    /// Reflect left/right
    pub fn mirrored_horizontal(&self) -> Self {
        let mut out = Self::new();
        for row in 0..GRID_WIDTH {
            for col in 0..GRID_WIDTH {
                out.cells[row * GRID_WIDTH + col] = self.cells[row * GRID_WIDTH + GRID_WIDTH - 1 - col];
            }
        }
        out
    }

    /// Reflect top/bottom
    pub fn mirrored_vertical(&self) -> Self {
        let mut out = Self::new();
        for row in 0..GRID_WIDTH {
            let src = (GRID_WIDTH - 1 - row) * GRID_WIDTH;
            out.cells[row * GRID_WIDTH..(row + 1) * GRID_WIDTH]
                .copy_from_slice(&self.cells[src..src + GRID_WIDTH]);
        }
        out
    }
}

/// Compact a line toward index 0 and merge equal neighbours once
///
/// Empty cells are dropped first (order preserved), then adjacent pairs are
/// scanned left to right exactly once: an equal pair becomes one doubled tile
/// and the scan moves past both, so `[4, 4, 4, 4]` gives `[8, 8, 0, 0]`.
/// Returns the new line and the sum of merged values. Out-of-range values
/// (e.g. from `Grid::from_rows`) saturate at `u32::MAX` instead of overflowing.
pub fn combine_line(line: Line) -> (Line, u32) {
    let mut packed: ArrayVec<Cell, GRID_WIDTH> =
        line.iter().copied().filter(|&v| v != EMPTY).collect();

    let mut gained: u32 = 0;
    let mut i = 0;
    while i + 1 < packed.len() {
        if packed[i] == packed[i + 1] {
            packed[i] = packed[i].saturating_mul(2);
            gained = gained.saturating_add(packed[i]);
            packed[i + 1] = EMPTY;
            i += 2;
        } else {
            i += 1;
        }
    }

    let mut out = [EMPTY; GRID_WIDTH];
    for (slot, v) in out.iter_mut().zip(packed.into_iter().filter(|&v| v != EMPTY)) {
        *slot = v;
    }
    (out, gained)
}
