//! Grid-space and world-space positions.

use std::fmt;
use std::ops::Add;

/// A cell position in grid space.
///
/// Signed so that positions computed from world coordinates may fall
/// outside a grid; bounds are checked at access time, not here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    /// Column.
    pub x: i32,
    /// Row. `y = 0` is the bottom row.
    pub y: i32,
}

impl GridPos {
    /// The origin `(0, 0)`.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for GridPos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A position in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldPos {
    /// Horizontal world coordinate.
    pub x: f32,
    /// Vertical world coordinate.
    pub y: f32,
}

impl WorldPos {
    /// Create a position.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for WorldPos {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}
