//! Growable row-major buffer used as one frame's rendered content.
//!
//! Rows share a single width and may only be appended or removed at the tail.
//! The grid is rebuilt wholesale on every refresh — nothing ever diffs it
//! against the previous frame.

use thiserror::Error;

/// Contract violations on grid access.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("cell ({row},{col}) outside {height}x{width} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    },
    #[error("remove_row on an empty grid")]
    Empty,
}

/// Fixed-width tabular buffer with stack-discipline rows.
#[derive(Debug, Clone, Default)]
pub struct Grid<T> {
    width: usize,
    rows: Vec<Vec<T>>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize) -> Self {
        Self { width, rows: Vec::new() }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append one default-filled row at the tail.
    pub fn append_row(&mut self) {
        self.rows.push(vec![T::default(); self.width]);
    }

    /// Remove the tail row.
    pub fn remove_row(&mut self) -> Result<(), GridError> {
        self.rows.pop().map(|_| ()).ok_or(GridError::Empty)
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<(), GridError> {
        if row >= self.rows.len() || col >= self.width {
            return Err(self.out_of_bounds(row, col));
        }
        self.rows[row][col] = value;
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Result<&T, GridError> {
        if row >= self.rows.len() || col >= self.width {
            return Err(self.out_of_bounds(row, col));
        }
        Ok(&self.rows[row][col])
    }

    /// Re-lay every row to the new width, truncating or default-padding.
    pub fn resize_width(&mut self, width: usize) {
        self.width = width;
        for row in &mut self.rows {
            row.resize(width, T::default());
        }
    }

    /// Drop all rows. The width is kept.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Pre-allocate backing storage for at least `rows` rows in total.
    pub fn reserve_rows(&mut self, rows: usize) {
        if rows > self.rows.len() {
            self.rows.reserve(rows - self.rows.len());
        }
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> GridError {
        GridError::OutOfBounds {
            row,
            col,
            height: self.rows.len(),
            width: self.width,
        }
    }
}
