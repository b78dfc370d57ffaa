//! Stepper and field configuration.

use std::time::Duration;

use calor_core::{ConfigError, TemperatureCell};
use calor_grid::WorldGrid;

use crate::engine::RemainderPolicy;
use crate::heatmap::HeatmapParams;
use crate::kernel::DiffusionParams;

// ── StepperConfig ──────────────────────────────────────────────────

/// Configuration of a [`WindowedStepper`](crate::WindowedStepper).
#[derive(Clone, Debug, PartialEq)]
pub struct StepperConfig {
    /// Window width in cells. Default: 32.
    pub window_width: u32,
    /// Window height in cells. Default: 32.
    pub window_height: u32,
    /// Diffusion and cooling factors. Default: 0.9 and 0.
    pub params: DiffusionParams,
    /// Ambient temperature for the cooling term. Default: 0.
    pub ambient_temperature: f32,
    /// Work-group width. Default: 8.
    pub group_width: u32,
    /// Work-group height. Default: 8.
    pub group_height: u32,
    /// Handling of a window not divisible into whole groups.
    pub remainder: RemainderPolicy,
    /// Longest wait for readback. `None` waits indefinitely.
    pub readback_timeout: Option<Duration>,
    /// Render a heatmap after every step when set.
    pub heatmap: Option<HeatmapParams>,
    /// Fail a step whose window holds a temperature beyond this magnitude.
    /// Non-finite temperatures always fail the step.
    pub divergence_limit: Option<f32>,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            window_width: 32,
            window_height: 32,
            params: DiffusionParams::default(),
            ambient_temperature: 0.0,
            group_width: 8,
            group_height: 8,
            remainder: RemainderPolicy::Reject,
            readback_timeout: None,
            heatmap: None,
            divergence_limit: None,
        }
    }
}

impl StepperConfig {
    /// Validate everything that does not depend on the backing grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Window must have at least one cell.
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.window_width,
                height: self.window_height,
            });
        }
        // 2. Work groups must be non-empty.
        if self.group_width == 0 || self.group_height == 0 {
            return Err(ConfigError::InvalidWorkGroup {
                width: self.group_width,
                height: self.group_height,
            });
        }
        // 3. Factors and ambient must be finite.
        self.params.validate()?;
        if !self.ambient_temperature.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "ambient_temperature",
                value: self.ambient_temperature,
            });
        }
        // 4. Divergence limit, if present, must be finite and positive.
        if let Some(limit) = self.divergence_limit {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(ConfigError::InvalidParameter {
                    name: "divergence_limit",
                    value: limit,
                });
            }
        }
        // 5. Heatmap parameters, and an image size that fits.
        if let Some(heatmap) = &self.heatmap {
            heatmap.validate()?;
            if heatmap
                .image_dims(self.window_width, self.window_height)
                .is_none()
            {
                let longest = self.window_width.max(self.window_height);
                return Err(ConfigError::DimensionTooLarge {
                    name: "heatmap",
                    value: longest,
                    max: u32::MAX / heatmap.magnification,
                });
            }
        }
        Ok(())
    }

    /// Window cell count.
    pub fn window_cells(&self) -> usize {
        self.window_width as usize * self.window_height as usize
    }

    /// Byte size of one transfer buffer.
    pub fn buffer_bytes(&self) -> usize {
        self.window_cells() * TemperatureCell::SIZE
    }
}

// ── FieldConfig ────────────────────────────────────────────────────

/// Configuration of the backing field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
    /// Width in cells. Default: 1000.
    pub width: u32,
    /// Height in cells. Default: 1000.
    pub height: u32,
    /// World width of a cell. Default: 1.
    pub cell_width: f32,
    /// World height of a cell. Default: 1.
    pub cell_height: f32,
    /// Initial value of every cell. Default: temperature 10, no source.
    pub initial: TemperatureCell,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            cell_width: 1.0,
            cell_height: 1.0,
            initial: TemperatureCell::with_temperature(10.0),
        }
    }
}

impl FieldConfig {
    /// Build the field with every cell set to `initial`.
    pub fn build(&self) -> Result<WorldGrid<TemperatureCell>, ConfigError> {
        let mut world = WorldGrid::new(self.width, self.height, self.cell_width, self.cell_height)?;
        world.initialize_all(self.initial);
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stepper_config_is_valid() {
        let cfg = StepperConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.window_cells(), 1024);
        assert_eq!(cfg.buffer_bytes(), 1024 * 12);
    }

    #[test]
    fn validate_empty_window_fails() {
        let cfg = StepperConfig {
            window_height: 0,
            ..StepperConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyGrid { .. })));
    }

    #[test]
    fn validate_zero_group_fails() {
        let cfg = StepperConfig {
            group_width: 0,
            ..StepperConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidWorkGroup { width: 0, height: 8 })
        ));
    }

    #[test]
    fn validate_non_finite_ambient_fails() {
        let cfg = StepperConfig {
            ambient_temperature: f32::NAN,
            ..StepperConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidParameter { name: "ambient_temperature", .. })
        ));
    }

    #[test]
    fn validate_bad_divergence_limit_fails() {
        for limit in [0.0, -1.0, f32::INFINITY] {
            let cfg = StepperConfig {
                divergence_limit: Some(limit),
                ..StepperConfig::default()
            };
            assert!(cfg.validate().is_err(), "accepted limit {limit}");
        }
    }

    #[test]
    fn validate_checks_heatmap() {
        let cfg = StepperConfig {
            heatmap: Some(HeatmapParams {
                magnification: 0,
                ..HeatmapParams::default()
            }),
            ..StepperConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_heatmap_too_large_to_address() {
        let cfg = StepperConfig {
            window_width: 1 << 16,
            window_height: 8,
            heatmap: Some(HeatmapParams {
                magnification: 1 << 16,
                ..HeatmapParams::default()
            }),
            ..StepperConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::DimensionTooLarge {
                name: "heatmap",
                value: 1 << 16,
                max: u32::MAX >> 16
            })
        );

        let fits = StepperConfig {
            window_width: 1 << 8,
            ..cfg
        };
        assert!(fits.validate().is_ok());
    }

    #[test]
    fn field_config_builds_filled_world() {
        let field = FieldConfig {
            width: 8,
            height: 4,
            cell_width: 0.5,
            ..FieldConfig::default()
        };
        let world = field.build().unwrap();
        assert_eq!((world.width(), world.height()), (8, 4));
        assert_eq!(world.cell_width(), 0.5);
        assert!(world.data().iter().all(|c| c.temperature == 10.0));
    }

    #[test]
    fn field_config_propagates_errors() {
        let field = FieldConfig {
            cell_height: 0.0,
            ..FieldConfig::default()
        };
        assert!(matches!(
            field.build(),
            Err(ConfigError::NonPositiveCellSize { .. })
        ));
    }
}
