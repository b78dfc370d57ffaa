//! Reusable grid fixtures.
//!
//! - [`uniform_grid`]: every cell at one temperature.
//! - [`hot_center_grid`]: cold field with one hot cell in the middle.
//! - [`random_world`]: seeded random temperatures on a unit-cell world.

use calor_core::{GridPos, TemperatureCell};
use calor_diffusion::populate_random_temperatures;
use calor_grid::{Grid, WorldGrid};

/// A `width x height` grid with every cell at `temperature`.
pub fn uniform_grid(width: u32, height: u32, temperature: f32) -> Grid<TemperatureCell> {
    Grid::filled(width, height, TemperatureCell::with_temperature(temperature))
        .expect("fixture dimensions are non-zero")
}

/// A zero-temperature grid whose centre cell is at `temperature`.
///
/// The centre is `(width / 2, height / 2)`.
pub fn hot_center_grid(width: u32, height: u32, temperature: f32) -> Grid<TemperatureCell> {
    let mut grid = uniform_grid(width, height, 0.0);
    grid.set_at(center(width, height), TemperatureCell::with_temperature(temperature))
        .expect("centre is inside the grid");
    grid
}

/// The centre cell of a `width x height` grid.
pub fn center(width: u32, height: u32) -> GridPos {
    GridPos::new((width / 2) as i32, (height / 2) as i32)
}

/// A unit-cell world with temperatures drawn uniformly from `[0, 100]`.
pub fn random_world(width: u32, height: u32, seed: u64) -> WorldGrid<TemperatureCell> {
    let mut world =
        WorldGrid::new(width, height, 1.0, 1.0).expect("fixture dimensions are non-zero");
    populate_random_temperatures(&mut world, 0.0, 100.0, seed).expect("range is valid");
    world
}
