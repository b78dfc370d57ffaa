//! Window synchronization between a backing grid and a smaller window grid.
//!
//! A window is just a grid whose dimensions are no larger than the backing
//! grid's. It carries no mapping to backing coordinates; the offset of its
//! bottom-left corner is passed to every call. Both directions validate the
//! whole region before copying, so a failed call never leaves a partial copy.

use bytemuck::Pod;
use calor_core::{GridError, GridPos};
use tracing::trace;

use crate::access::GridAccess;

/// An axis-aligned rectangle of cells: `offset` is the bottom-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridBounds {
    /// Bottom-left cell.
    pub offset: GridPos,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl GridBounds {
    /// Create a bounding box.
    pub const fn new(offset: GridPos, width: u32, height: u32) -> Self {
        Self {
            offset,
            width,
            height,
        }
    }

    /// Whether `pos` lies inside the box.
    pub fn contains(&self, pos: GridPos) -> bool {
        let dx = i64::from(pos.x) - i64::from(self.offset.x);
        let dy = i64::from(pos.y) - i64::from(self.offset.y);
        dx >= 0 && dy >= 0 && dx < i64::from(self.width) && dy < i64::from(self.height)
    }

    /// Whether the box lies entirely inside a `width x height` grid.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.offset.x >= 0
            && self.offset.y >= 0
            && i64::from(self.offset.x) + i64::from(self.width) <= i64::from(width)
            && i64::from(self.offset.y) + i64::from(self.height) <= i64::from(height)
    }

    /// [`fits_within`](Self::fits_within) as a `Result`.
    pub fn check(&self, width: u32, height: u32) -> Result<(), GridError> {
        if self.fits_within(width, height) {
            Ok(())
        } else {
            Err(GridError::RegionOutOfRange {
                offset: self.offset,
                region: (self.width, self.height),
                grid: (width, height),
            })
        }
    }
}

/// Copy the region of `world` at `offset` into the whole of `window`.
///
/// After success, `window[wx, wy] == world[offset.x + wx, offset.y + wy]`
/// for every window cell. Returns [`GridError::RegionOutOfRange`] without
/// touching `window` if the region does not fit in `world`.
///
/// ```
/// use calor_core::GridPos;
/// use calor_grid::{read_into, Grid};
///
/// let world = Grid::from_data(4, 4, (0..16).collect::<Vec<u8>>()).unwrap();
/// let mut window = Grid::<u8>::new(2, 2).unwrap();
/// read_into(&world, &mut window, GridPos::new(1, 2)).unwrap();
/// assert_eq!(window.data(), &[9, 10, 13, 14]);
/// ```
pub fn read_into<T, W, G>(world: &W, window: &mut G, offset: GridPos) -> Result<(), GridError>
where
    T: Pod,
    W: GridAccess<T> + ?Sized,
    G: GridAccess<T> + ?Sized,
{
    let (ww, wh) = window.dims();
    let (gw, gh) = world.dims();
    GridBounds::new(offset, ww, wh).check(gw, gh)?;
    trace!(%offset, ww, wh, "window read");

    let (ww, gw) = (ww as usize, gw as usize);
    let (ox, oy) = (offset.x as usize, offset.y as usize);
    let src = world.data();
    for (wy, dst_row) in window.data_mut().chunks_exact_mut(ww).enumerate() {
        let start = (oy + wy) * gw + ox;
        dst_row.copy_from_slice(&src[start..start + ww]);
    }
    Ok(())
}

/// Copy the whole of `window` into the region of `world` at `offset`.
///
/// The inverse of [`read_into`]; cells of `world` outside the region are
/// untouched. Returns [`GridError::RegionOutOfRange`] without touching
/// `world` if the region does not fit.
pub fn write_from<T, W, G>(world: &mut W, window: &G, offset: GridPos) -> Result<(), GridError>
where
    T: Pod,
    W: GridAccess<T> + ?Sized,
    G: GridAccess<T> + ?Sized,
{
    let (ww, wh) = window.dims();
    let (gw, gh) = world.dims();
    GridBounds::new(offset, ww, wh).check(gw, gh)?;
    trace!(%offset, ww, wh, "window write");

    let (ww, gw) = (ww as usize, gw as usize);
    let (ox, oy) = (offset.x as usize, offset.y as usize);
    let dst = world.data_mut();
    for (wy, src_row) in window.data().chunks_exact(ww).enumerate() {
        let start = (oy + wy) * gw + ox;
        dst[start..start + ww].copy_from_slice(src_row);
    }
    Ok(())
}
