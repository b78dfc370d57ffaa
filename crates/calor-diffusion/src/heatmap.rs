//! Color-mapped visualization of a window.
//!
//! Each window cell becomes a `k x k` block of RGBA `f32` pixels. Pixel rows
//! are stored bottom-up, like grid rows: image row `py` shows window row
//! `py / k`.

use calor_core::{ConfigError, EngineError, GridPos, TemperatureCell};

/// Color of the outline drawn around the selected cell.
pub const SELECTION_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Parameters of the heatmap render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatmapParams {
    /// Edge length in pixels of the block drawn for one cell.
    pub magnification: u32,
    /// Temperature drawn fully cold.
    pub min_temperature: f32,
    /// Temperature drawn fully hot.
    pub max_temperature: f32,
    /// Window cell outlined with [`SELECTION_COLOR`], if any.
    pub selected: Option<GridPos>,
}

impl Default for HeatmapParams {
    fn default() -> Self {
        Self {
            magnification: 8,
            min_temperature: 0.0,
            max_temperature: 100.0,
            selected: None,
        }
    }
}

impl HeatmapParams {
    /// Check magnification and temperature range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.magnification == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "magnification",
                value: 0.0,
            });
        }
        let (min, max) = (self.min_temperature, self.max_temperature);
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ConfigError::InvalidRange { min, max });
        }
        Ok(())
    }

    /// Pixel dimensions of the image for a `window_width x window_height`
    /// window, or `None` if the image is not addressable.
    pub fn image_dims(&self, window_width: u32, window_height: u32) -> Option<(u32, u32)> {
        let width = window_width.checked_mul(self.magnification)?;
        let height = window_height.checked_mul(self.magnification)?;
        (width as usize).checked_mul(height as usize)?;
        Some((width, height))
    }
}

/// An RGBA image rendered from a window.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major pixels, bottom row first.
    pub pixels: Vec<[f32; 4]>,
}

impl HeatmapImage {
    /// A transparent black image sized for a `window_width x window_height`
    /// window at the given magnification.
    ///
    /// # Panics
    ///
    /// If the pixel dimensions overflow `u32`. [`StepperConfig::validate`]
    /// rejects such windows.
    ///
    /// [`StepperConfig::validate`]: crate::StepperConfig::validate
    pub fn for_window(window_width: u32, window_height: u32, magnification: u32) -> Self {
        let width = window_width * magnification;
        let height = window_height * magnification;
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; width as usize * height as usize],
        }
    }

    /// Pixel at `(px, py)`, or `None` outside the image.
    pub fn pixel(&self, px: u32, py: u32) -> Option<[f32; 4]> {
        if px >= self.width || py >= self.height {
            return None;
        }
        self.pixels
            .get(py as usize * self.width as usize + px as usize)
            .copied()
    }

    /// Raw pixel bytes, suitable for texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Linear cold-to-hot ramp: blue at `min`, red at `max`, opaque.
///
/// Temperatures outside the range saturate; NaN renders cold.
pub fn temperature_color(temperature: f32, min: f32, max: f32) -> [f32; 4] {
    let t = ((temperature - min) / (max - min)).clamp(0.0, 1.0);
    let t = if t.is_nan() { 0.0 } else { t };
    [t, 0.0, 1.0 - t, 1.0]
}

/// Render one pixel row of the heatmap for a `width`-cell-wide window.
///
/// `row` must hold `width * params.magnification` pixels and `py` must lie
/// inside the window's image; callers check both.
pub(crate) fn render_row(
    cells: &[TemperatureCell],
    width: u32,
    params: &HeatmapParams,
    py: u32,
    row: &mut [[f32; 4]],
) {
    let k = params.magnification;
    let cy = py / k;
    let w = width as usize;
    let cell_row = &cells[cy as usize * w..(cy as usize + 1) * w];
    for (px, pixel) in row.iter_mut().enumerate() {
        let cx = px as u32 / k;
        let on_outline = params.selected.is_some_and(|sel| {
            sel.x == cx as i32
                && sel.y == cy as i32
                && (px as u32 % k == 0 || px as u32 % k == k - 1 || py % k == 0 || py % k == k - 1)
        });
        *pixel = if on_outline {
            SELECTION_COLOR
        } else {
            temperature_color(
                cell_row[cx as usize].temperature,
                params.min_temperature,
                params.max_temperature,
            )
        };
    }
}

/// Render a `width`-cell-wide window into `image` sequentially.
///
/// The window height is implied by `image.height / params.magnification`.
/// Fails without touching `image` if the image is not a whole number of
/// cell blocks or `cells` does not hold exactly the window.
pub fn render(
    cells: &[TemperatureCell],
    width: u32,
    params: &HeatmapParams,
    image: &mut HeatmapImage,
) -> Result<(), EngineError> {
    let k = params.magnification as usize;
    let w = width as usize;
    let (iw, ih) = (image.width as usize, image.height as usize);
    if k == 0 || w == 0 || iw != w * k || ih % k != 0 || image.pixels.len() != iw * ih {
        return Err(EngineError::DispatchFailed {
            reason: format!(
                "heatmap image is {}x{}, not whole {k}x{k} blocks over a {width}-cell-wide window",
                image.width, image.height
            ),
        });
    }
    let expected = w * (ih / k);
    if cells.len() != expected {
        return Err(EngineError::SizeMismatch {
            expected: expected * TemperatureCell::SIZE,
            actual: cells.len() * TemperatureCell::SIZE,
        });
    }
    for (py, row) in image.pixels.chunks_exact_mut(iw).enumerate() {
        render_row(cells, width, params, py as u32, row);
    }
    Ok(())
}
