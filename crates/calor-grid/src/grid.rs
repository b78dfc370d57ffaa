//! Dense, bounds-checked 2D grid of plain-data cells.

use std::fmt::{self, Write as _};

use bytemuck::Pod;
use calor_core::{ConfigError, GridError, GridPos};

use crate::access::GridAccess;

/// A dense 2D grid with one `T` per cell.
///
/// Storage is a single contiguous `Vec<T>` in row-major order
/// (`index = y * width + x`). Dimensions are fixed at construction.
/// `T: Pod` keeps the payload plain data, so the whole grid can be handed
/// to a compute engine as bytes without conversion.
///
/// # Examples
///
/// ```
/// use calor_grid::Grid;
///
/// let mut grid = Grid::<f32>::new(4, 3).unwrap();
/// grid.set(1, 2, 5.0).unwrap();
/// assert_eq!(grid.get(1, 2).unwrap(), 5.0);
/// assert!(grid.get(4, 0).is_err());
/// assert_eq!(grid.data()[2 * 4 + 1], 5.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Pod> Grid<T> {
    /// Maximum dimension size: positions use `i32`, so each axis must fit.
    pub const MAX_DIM: u32 = i32::MAX as u32;

    /// Create a grid with every cell zeroed.
    ///
    /// Returns `Err(ConfigError::EmptyGrid)` if either dimension is 0, or
    /// `Err(ConfigError::DimensionTooLarge)` if either exceeds `i32::MAX`.
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        Self::check_dims(width, height)?;
        let len = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            data: vec![T::zeroed(); len],
        })
    }

    /// Create a grid with every cell set to `value`.
    pub fn filled(width: u32, height: u32, value: T) -> Result<Self, ConfigError> {
        let mut grid = Self::new(width, height)?;
        grid.initialize_all(value);
        Ok(grid)
    }

    /// Wrap existing flattened row-major data.
    ///
    /// `data.len()` must equal `width * height`.
    pub fn from_data(width: u32, height: u32, data: Vec<T>) -> Result<Self, ConfigError> {
        Self::check_dims(width, height)?;
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(ConfigError::DataLengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    fn check_dims(width: u32, height: u32) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid { width, height });
        }
        if width > Self::MAX_DIM {
            return Err(ConfigError::DimensionTooLarge {
                name: "width",
                value: width,
                max: Self::MAX_DIM,
            });
        }
        if height > Self::MAX_DIM {
            return Err(ConfigError::DimensionTooLarge {
                name: "height",
                value: height,
                max: Self::MAX_DIM,
            });
        }
        Ok(())
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.data.len()
    }

    /// Always returns `false`: construction rejects empty grids.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `(x, y)` addresses a cell of this grid.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    fn index(&self, x: i32, y: i32) -> Result<usize, GridError> {
        if !self.contains(x, y) {
            return Err(GridError::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    /// Read the cell at `(x, y)`.
    pub fn get(&self, x: i32, y: i32) -> Result<T, GridError> {
        let i = self.index(x, y)?;
        Ok(self.data[i])
    }

    /// Read the cell at `pos`.
    pub fn get_at(&self, pos: GridPos) -> Result<T, GridError> {
        self.get(pos.x, pos.y)
    }

    /// Overwrite the cell at `(x, y)`.
    pub fn set(&mut self, x: i32, y: i32, value: T) -> Result<(), GridError> {
        let i = self.index(x, y)?;
        self.data[i] = value;
        Ok(())
    }

    /// Overwrite the cell at `pos`.
    pub fn set_at(&mut self, pos: GridPos, value: T) -> Result<(), GridError> {
        self.set(pos.x, pos.y, value)
    }

    /// Reset every cell to the zero value of `T`.
    pub fn initialize_default(&mut self) {
        self.data.fill(T::zeroed());
    }

    /// Set every cell to `value`.
    pub fn initialize_all(&mut self, value: T) {
        let width = self.width as usize;
        for y in 0..self.height as usize {
            for x in 0..width {
                self.data[y * width + x] = value;
            }
        }
    }

    /// Flattened row-major storage.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable flattened row-major storage. Writes go straight into the grid.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the grid, returning its flattened storage.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Iterate over all cells in flattened order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Iterate mutably over all cells in flattened order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// Row `y` as a contiguous slice.
    pub fn row(&self, y: i32) -> Result<&[T], GridError> {
        let start = self.index(0, y)?;
        Ok(&self.data[start..start + self.width as usize])
    }

    /// Row `y` as a mutable contiguous slice.
    pub fn row_mut(&mut self, y: i32) -> Result<&mut [T], GridError> {
        let start = self.index(0, y)?;
        let end = start + self.width as usize;
        Ok(&mut self.data[start..end])
    }

    /// Column `x`, bottom to top.
    pub fn column(&self, x: i32) -> Result<Vec<T>, GridError> {
        self.index(x, 0)?;
        Ok(self
            .data
            .iter()
            .skip(x as usize)
            .step_by(self.width as usize)
            .copied()
            .collect())
    }

    /// Render the grid as text, one `[ a, b, c ]` line per row from `y = 0`.
    pub fn dump(&self) -> String
    where
        T: fmt::Debug,
    {
        let mut out = format!("-- Grid, width = {}, height = {} --\n", self.width, self.height);
        for row in self.data.chunks(self.width as usize) {
            out.push_str("[ ");
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{cell:?}");
            }
            out.push_str(" ]\n");
        }
        out
    }
}

impl<T: Pod> GridAccess<T> for Grid<T> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn get(&self, x: i32, y: i32) -> Result<T, GridError> {
        Grid::get(self, x, y)
    }

    fn set(&mut self, x: i32, y: i32, value: T) -> Result<(), GridError> {
        Grid::set(self, x, y, value)
    }

    fn data(&self) -> &[T] {
        &self.data
    }

    fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<'a, T: Pod> IntoIterator for &'a Grid<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calor_core::TemperatureCell;
    use proptest::prelude::*;

    // ── Constructor tests ───────────────────────────────────────

    #[test]
    fn new_zero_width_returns_error() {
        assert!(matches!(
            Grid::<f32>::new(0, 5),
            Err(ConfigError::EmptyGrid { width: 0, height: 5 })
        ));
    }

    #[test]
    fn new_zero_height_returns_error() {
        assert!(matches!(
            Grid::<f32>::new(5, 0),
            Err(ConfigError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn new_rejects_dims_exceeding_i32_max() {
        let big = i32::MAX as u32 + 1;
        assert!(matches!(
            Grid::<u8>::new(big, 1),
            Err(ConfigError::DimensionTooLarge { name: "width", .. })
        ));
        assert!(matches!(
            Grid::<u8>::new(1, big),
            Err(ConfigError::DimensionTooLarge { name: "height", .. })
        ));
    }

    #[test]
    fn from_data_checks_length() {
        assert!(Grid::from_data(2, 2, vec![0.0f32; 4]).is_ok());
        assert_eq!(
            Grid::from_data(2, 2, vec![0.0f32; 5]),
            Err(ConfigError::DataLengthMismatch {
                expected: 4,
                actual: 5
            })
        );
    }

    #[test]
    fn from_data_uses_row_major_layout() {
        let grid = Grid::from_data(3, 2, vec![0u32, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(grid.get(0, 1).unwrap(), 3);
        assert_eq!(grid.get(2, 0).unwrap(), 2);
    }

    // ── Access tests ────────────────────────────────────────────

    #[test]
    fn out_of_range_reports_position_and_bounds() {
        let grid = Grid::<f32>::new(3, 2).unwrap();
        assert_eq!(
            grid.get(3, 0),
            Err(GridError::OutOfRange {
                x: 3,
                y: 0,
                width: 3,
                height: 2
            })
        );
        assert!(grid.get(-1, 0).is_err());
        assert!(grid.get(0, -1).is_err());
        assert!(grid.get(0, 2).is_err());
    }

    #[test]
    fn set_out_of_range_leaves_grid_untouched() {
        let mut grid = Grid::filled(2, 2, 1.0f32).unwrap();
        assert!(grid.set(2, 1, 9.0).is_err());
        assert!(grid.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn position_overloads_match() {
        let mut grid = Grid::<i32>::new(4, 4).unwrap();
        grid.set_at(GridPos::new(3, 1), 7).unwrap();
        assert_eq!(grid.get(3, 1).unwrap(), 7);
        assert_eq!(grid.get_at(GridPos::new(3, 1)).unwrap(), 7);
    }

    #[test]
    fn initialize_all_on_non_square_grid() {
        // Transposed loop bounds would index past the end on a wide grid.
        let mut grid = Grid::<f32>::new(7, 2).unwrap();
        grid.initialize_all(3.5);
        assert!(grid.iter().all(|&v| v == 3.5));
        assert_eq!(grid.cell_count(), 14);
    }

    #[test]
    fn initialize_default_zeroes_cells() {
        let mut grid = Grid::filled(3, 3, TemperatureCell::new(1.0, 2.0, 0.5)).unwrap();
        grid.initialize_default();
        assert!(grid.iter().all(|c| *c == TemperatureCell::default()));
    }

    #[test]
    fn data_mut_is_a_view_not_a_copy() {
        let mut grid = Grid::<f32>::new(2, 2).unwrap();
        grid.data_mut()[3] = 4.0;
        assert_eq!(grid.get(1, 1).unwrap(), 4.0);
    }

    #[test]
    fn iteration_is_restartable() {
        let grid = Grid::from_data(2, 2, vec![1i32, 2, 3, 4]).unwrap();
        let first: Vec<i32> = grid.iter().copied().collect();
        let second: Vec<i32> = (&grid).into_iter().copied().collect();
        assert_eq!(first, vec![1, 2, 3, 4]);
        assert_eq!(first, second);
    }

    #[test]
    fn rows_and_columns() {
        let grid = Grid::from_data(3, 2, vec![0u8, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(grid.row(1).unwrap(), &[3, 4, 5]);
        assert_eq!(grid.column(2).unwrap(), vec![2, 5]);
        assert!(grid.row(2).is_err());
        assert!(grid.column(3).is_err());
    }

    #[test]
    fn dump_prints_one_line_per_row() {
        let grid = Grid::from_data(2, 2, vec![1i32, 2, 3, 4]).unwrap();
        let text = grid.dump();
        assert!(text.contains("[ 1, 2 ]\n"));
        assert!(text.contains("[ 3, 4 ]\n"));
    }

    // ── Property tests ──────────────────────────────────────────

    proptest! {
        #[test]
        fn set_then_get_round_trips(
            w in 1u32..16,
            h in 1u32..16,
            x in 0i32..16,
            y in 0i32..16,
            v in any::<f32>().prop_filter("finite", |v| v.is_finite()),
        ) {
            let x = x % w as i32;
            let y = y % h as i32;
            let mut grid = Grid::<f32>::new(w, h).unwrap();
            grid.set(x, y, v).unwrap();
            prop_assert_eq!(grid.get(x, y).unwrap(), v);
        }

        #[test]
        fn outside_positions_are_rejected(
            w in 1u32..16,
            h in 1u32..16,
            x in -32i32..32,
            y in -32i32..32,
        ) {
            prop_assume!(x < 0 || y < 0 || x >= w as i32 || y >= h as i32);
            let mut grid = Grid::<f32>::new(w, h).unwrap();
            let is_out_of_range = matches!(grid.get(x, y), Err(GridError::OutOfRange { .. }));
            prop_assert!(is_out_of_range);
            prop_assert!(grid.set(x, y, 1.0).is_err());
        }
    }
}
