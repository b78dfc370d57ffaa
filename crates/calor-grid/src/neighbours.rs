//! 4-connected neighbour lookup.
//!
//! Neighbours are always emitted in the order left (`x - 1`), right
//! (`x + 1`), down (`y - 1`), up (`y + 1`). Missing neighbours at the grid
//! boundary are omitted, never wrapped or clamped.

use bytemuck::Pod;
use calor_core::GridError;
use smallvec::SmallVec;

use crate::access::GridAccess;

/// Collect the 4-connected neighbours of `(x, y)`.
///
/// `left` and `down` are lookback overrides for row-major sweeps that
/// update cells in place: when `Some`, the supplied value is emitted in
/// that slot instead of reading the grid, at any position including the
/// left column and bottom row. When `None`, the slot is read from the grid
/// or omitted at the boundary. Right and up have no override.
///
/// Returns [`GridError::OutOfRange`] if `(x, y)` itself is outside the grid.
///
/// ```
/// use calor_grid::{neighbours_at, Grid};
///
/// let grid = Grid::from_data(3, 3, (0..9).collect::<Vec<u32>>()).unwrap();
/// let n = neighbours_at(&grid, 1, 1, None, None).unwrap();
/// assert_eq!(n.as_slice(), &[3, 5, 1, 7]);
///
/// let corner = neighbours_at(&grid, 0, 0, None, None).unwrap();
/// assert_eq!(corner.as_slice(), &[1, 3]);
/// ```
pub fn neighbours_at<T, G>(
    grid: &G,
    x: i32,
    y: i32,
    left: Option<T>,
    down: Option<T>,
) -> Result<SmallVec<[T; 4]>, GridError>
where
    T: Pod,
    G: GridAccess<T> + ?Sized,
{
    let (w, h) = grid.dims();
    if x < 0 || y < 0 || x as u32 >= w || y as u32 >= h {
        return Err(GridError::OutOfRange {
            x,
            y,
            width: w,
            height: h,
        });
    }
    let mut out = SmallVec::new();

    match left {
        Some(v) => out.push(v),
        None if x > 0 => out.push(grid.get(x - 1, y)?),
        None => {}
    }
    if (x as u32) < w - 1 {
        out.push(grid.get(x + 1, y)?);
    }
    match down {
        Some(v) => out.push(v),
        None if y > 0 => out.push(grid.get(x, y - 1)?),
        None => {}
    }
    if (y as u32) < h - 1 {
        out.push(grid.get(x, y + 1)?);
    }

    Ok(out)
}

/// Flattened indices of the in-grid neighbours of `(x, y)` in a
/// `width x height` row-major grid, in the same order as [`neighbours_at`].
///
/// The caller guarantees `x < width` and `y < height`. Used by compute
/// kernels that address flat buffers directly.
pub fn neighbour_indices(x: u32, y: u32, width: u32, height: u32) -> SmallVec<[usize; 4]> {
    let w = width as usize;
    let i = y as usize * w + x as usize;
    let mut out = SmallVec::new();
    if x > 0 {
        out.push(i - 1);
    }
    if x + 1 < width {
        out.push(i + 1);
    }
    if y > 0 {
        out.push(i - w);
    }
    if y + 1 < height {
        out.push(i + w);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Grid;
    use proptest::prelude::*;

    fn numbered(w: u32, h: u32) -> Grid<i32> {
        Grid::from_data(w, h, (0..(w * h) as i32).collect()).unwrap()
    }

    #[test]
    fn corner_has_two() {
        let grid = numbered(5, 5);
        assert_eq!(neighbours_at(&grid, 0, 0, None, None).unwrap().len(), 2);
        assert_eq!(neighbours_at(&grid, 4, 4, None, None).unwrap().len(), 2);
        assert_eq!(neighbours_at(&grid, 4, 0, None, None).unwrap().len(), 2);
    }

    #[test]
    fn edge_has_three() {
        let grid = numbered(5, 5);
        assert_eq!(neighbours_at(&grid, 2, 0, None, None).unwrap().len(), 3);
        assert_eq!(neighbours_at(&grid, 0, 2, None, None).unwrap().len(), 3);
        assert_eq!(neighbours_at(&grid, 4, 2, None, None).unwrap().len(), 3);
        assert_eq!(neighbours_at(&grid, 2, 4, None, None).unwrap().len(), 3);
    }

    #[test]
    fn interior_order_is_left_right_down_up() {
        let grid = numbered(5, 5);
        let n = neighbours_at(&grid, 2, 2, None, None).unwrap();
        assert_eq!(n.as_slice(), &[11, 13, 7, 17]);
    }

    #[test]
    fn overrides_fill_left_and_down_slots_at_origin() {
        let grid = numbered(5, 5);
        let n = neighbours_at(&grid, 0, 0, Some(-1), Some(-2)).unwrap();
        assert_eq!(n.as_slice(), &[-1, 1, -2, 5]);
    }

    #[test]
    fn overrides_replace_grid_reads_in_interior() {
        let grid = numbered(5, 5);
        let n = neighbours_at(&grid, 2, 2, Some(100), Some(200)).unwrap();
        assert_eq!(n.as_slice(), &[100, 13, 200, 17]);
    }

    #[test]
    fn single_cell_grid() {
        let grid = numbered(1, 1);
        assert!(neighbours_at(&grid, 0, 0, None, None).unwrap().is_empty());
        let n = neighbours_at(&grid, 0, 0, Some(7), Some(8)).unwrap();
        assert_eq!(n.as_slice(), &[7, 8]);
    }

    #[test]
    fn out_of_range_centre_is_an_error() {
        let grid = numbered(3, 3);
        assert!(matches!(
            neighbours_at(&grid, 3, 0, None, None),
            Err(GridError::OutOfRange { x: 3, y: 0, .. })
        ));
        assert!(neighbours_at(&grid, 0, -1, Some(1), None).is_err());
    }

    proptest! {
        #[test]
        fn indices_match_grid_lookup(w in 1u32..12, h in 1u32..12, x in 0u32..12, y in 0u32..12) {
            let x = x % w;
            let y = y % h;
            let grid = numbered(w, h);
            let values = neighbours_at(&grid, x as i32, y as i32, None, None).unwrap();
            let via_index: Vec<i32> = neighbour_indices(x, y, w, h)
                .into_iter()
                .map(|i| grid.data()[i])
                .collect();
            prop_assert_eq!(values.to_vec(), via_index);
        }
    }
}
