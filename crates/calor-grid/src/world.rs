//! A grid with a physical cell size.

use bytemuck::Pod;
use calor_core::{ConfigError, GridError, GridPos, WorldPos};

use crate::access::GridAccess;
use crate::grid::Grid;

/// A [`Grid`] placed in world space.
///
/// Cell `(x, y)` covers the world rectangle
/// `[x * cell_width, (x + 1) * cell_width) x [y * cell_height, (y + 1) * cell_height)`.
/// Both cell dimensions are finite and strictly positive.
///
/// # Examples
///
/// ```
/// use calor_core::{GridPos, WorldPos};
/// use calor_grid::WorldGrid;
///
/// let world = WorldGrid::<f32>::new(10, 10, 2.0, 0.5).unwrap();
/// assert_eq!(world.world_to_cell(WorldPos::new(4.1, 1.9)), GridPos::new(2, 3));
/// assert_eq!(world.cell_to_world_corner(GridPos::new(2, 3)), WorldPos::new(4.0, 1.5));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct WorldGrid<T> {
    grid: Grid<T>,
    cell_width: f32,
    cell_height: f32,
}

impl<T: Pod> WorldGrid<T> {
    /// Create a zeroed `width x height` grid with the given cell size.
    pub fn new(
        width: u32,
        height: u32,
        cell_width: f32,
        cell_height: f32,
    ) -> Result<Self, ConfigError> {
        Self::check_cell_size(cell_width, cell_height)?;
        Ok(Self {
            grid: Grid::new(width, height)?,
            cell_width,
            cell_height,
        })
    }

    /// Wrap an existing grid.
    pub fn from_grid(grid: Grid<T>, cell_width: f32, cell_height: f32) -> Result<Self, ConfigError> {
        Self::check_cell_size(cell_width, cell_height)?;
        Ok(Self {
            grid,
            cell_width,
            cell_height,
        })
    }

    fn check_cell_size(cell_width: f32, cell_height: f32) -> Result<(), ConfigError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(cell_width) || !valid(cell_height) {
            return Err(ConfigError::NonPositiveCellSize {
                cell_width,
                cell_height,
            });
        }
        Ok(())
    }

    /// World width of one cell.
    pub fn cell_width(&self) -> f32 {
        self.cell_width
    }

    /// World height of one cell.
    pub fn cell_height(&self) -> f32 {
        self.cell_height
    }

    /// Cell containing `pos`. Not bounds-checked: the result may lie
    /// outside the grid.
    pub fn world_to_cell(&self, pos: WorldPos) -> GridPos {
        GridPos::new(
            (pos.x / self.cell_width).floor() as i32,
            (pos.y / self.cell_height).floor() as i32,
        )
    }

    /// Bottom-left corner of `cell` in world units.
    pub fn cell_to_world_corner(&self, cell: GridPos) -> WorldPos {
        WorldPos::new(
            cell.x as f32 * self.cell_width,
            cell.y as f32 * self.cell_height,
        )
    }

    /// Centre of `cell` in world units.
    pub fn cell_to_world_center(&self, cell: GridPos) -> WorldPos {
        let corner = self.cell_to_world_corner(cell);
        WorldPos::new(
            corner.x + self.cell_width * 0.5,
            corner.y + self.cell_height * 0.5,
        )
    }

    /// The wrapped grid.
    pub fn grid(&self) -> &Grid<T> {
        &self.grid
    }

    /// The wrapped grid, mutably.
    pub fn grid_mut(&mut self) -> &mut Grid<T> {
        &mut self.grid
    }

    /// Unwrap into the underlying grid.
    pub fn into_grid(self) -> Grid<T> {
        self.grid
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Read the cell at `(x, y)`.
    pub fn get(&self, x: i32, y: i32) -> Result<T, GridError> {
        self.grid.get(x, y)
    }

    /// Read the cell at `pos`.
    pub fn get_at(&self, pos: GridPos) -> Result<T, GridError> {
        self.grid.get_at(pos)
    }

    /// Overwrite the cell at `(x, y)`.
    pub fn set(&mut self, x: i32, y: i32, value: T) -> Result<(), GridError> {
        self.grid.set(x, y, value)
    }

    /// Overwrite the cell at `pos`.
    pub fn set_at(&mut self, pos: GridPos, value: T) -> Result<(), GridError> {
        self.grid.set_at(pos, value)
    }

    /// Overwrite the cell under a world position.
    pub fn set_world(&mut self, pos: WorldPos, value: T) -> Result<(), GridError> {
        let cell = self.world_to_cell(pos);
        self.grid.set_at(cell, value)
    }

    /// Reset every cell to the zero value of `T`.
    pub fn initialize_default(&mut self) {
        self.grid.initialize_default();
    }

    /// Set every cell to `value`.
    pub fn initialize_all(&mut self, value: T) {
        self.grid.initialize_all(value);
    }

    /// Flattened row-major storage.
    pub fn data(&self) -> &[T] {
        self.grid.data()
    }

    /// Mutable flattened row-major storage.
    pub fn data_mut(&mut self) -> &mut [T] {
        self.grid.data_mut()
    }
}

impl<T: Pod> GridAccess<T> for WorldGrid<T> {
    fn width(&self) -> u32 {
        self.grid.width()
    }

    fn height(&self) -> u32 {
        self.grid.height()
    }

    fn get(&self, x: i32, y: i32) -> Result<T, GridError> {
        self.grid.get(x, y)
    }

    fn set(&mut self, x: i32, y: i32, value: T) -> Result<(), GridError> {
        self.grid.set(x, y, value)
    }

    fn data(&self) -> &[T] {
        self.grid.data()
    }

    fn data_mut(&mut self) -> &mut [T] {
        self.grid.data_mut()
    }
}
