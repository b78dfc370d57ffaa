//! The windowed, double-buffered diffusion stepper.
//!
//! Each [`WindowedStepper::step`] runs a fixed sequence:
//!
//! 1. copy the window region of the backing grid into the window and
//!    upload it to the engine's input buffer;
//! 2. dispatch the diffusion kernel from input to output;
//! 3. read the output buffer back into the window;
//! 4. reject the step if any window temperature diverged;
//! 5. optionally render the pre-step input buffer as a heatmap;
//! 6. copy the window back into the backing grid.
//!
//! Sync-out is the last fallible phase, so a step that returns `Err`
//! leaves the backing grid untouched.

use std::time::Instant;

use calor_core::{ConfigError, EngineError, GridPos, StepError, TemperatureCell};
use calor_grid::{read_into, write_from, Grid, GridAccess};
use tracing::{debug, trace, warn};

use crate::config::StepperConfig;
use crate::engine::{ComputeEngine, DiffusionDispatch, HeatmapDispatch, WorkGroups};
use crate::heatmap::HeatmapImage;
use crate::kernel::DiffusionParams;
use crate::metrics::StepMetrics;

/// Engine plus the two transfer buffers it owns for this stepper.
struct Resources<E: ComputeEngine> {
    engine: E,
    input: E::Buffer,
    output: E::Buffer,
}

/// Steps a fixed-size window of a larger field on a [`ComputeEngine`].
///
/// The two transfer buffers are allocated once in [`new`](Self::new) and
/// released exactly once: by [`teardown`](Self::teardown), which also hands
/// the engine back, or on drop.
///
/// # Examples
///
/// ```
/// use calor_core::{GridPos, TemperatureCell};
/// use calor_diffusion::{SoftwareEngine, StepperConfig, WindowedStepper};
/// use calor_grid::Grid;
///
/// let mut world = Grid::filled(64, 64, TemperatureCell::with_temperature(5.0)).unwrap();
/// world.set(20, 20, TemperatureCell::with_temperature(50.0)).unwrap();
///
/// let config = StepperConfig { window_width: 16, window_height: 16, ..Default::default() };
/// let mut stepper = WindowedStepper::new(SoftwareEngine::new(), world.width(), world.height(), config).unwrap();
///
/// stepper.step(&mut world, GridPos::new(16, 16), 0.1).unwrap();
/// assert!(world.get(20, 20).unwrap().temperature < 50.0);
///
/// let engine = stepper.teardown();
/// assert_eq!(engine.live_buffers(), 0);
/// ```
pub struct WindowedStepper<E: ComputeEngine> {
    resources: Option<Resources<E>>,
    config: StepperConfig,
    world_dims: (u32, u32),
    groups: WorkGroups,
    window: Grid<TemperatureCell>,
    heatmap: Option<HeatmapImage>,
    metrics: StepMetrics,
    step_count: u64,
}

impl<E: ComputeEngine> WindowedStepper<E> {
    /// Validate `config` against a `world_width x world_height` backing
    /// grid and allocate the transfer buffers on `engine`.
    ///
    /// On error no buffer is left allocated.
    pub fn new(
        mut engine: E,
        world_width: u32,
        world_height: u32,
        config: StepperConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let window_dims = (config.window_width, config.window_height);
        if window_dims.0 > world_width || window_dims.1 > world_height {
            return Err(ConfigError::WindowTooLarge {
                window: window_dims,
                grid: (world_width, world_height),
            });
        }
        let groups = WorkGroups::plan(
            config.window_cells(),
            config.group_width,
            config.group_height,
            config.remainder,
        )?;
        if groups.skipped_cells > 0 {
            warn!(
                skipped = groups.skipped_cells,
                cells = config.window_cells(),
                group_size = groups.group_size(),
                "truncating dispatch leaves trailing window cells uncomputed"
            );
        }
        let window = Grid::new(config.window_width, config.window_height)?;

        let expected = config.buffer_bytes();
        let input = engine.create_buffer(expected)?;
        let output = match engine.create_buffer(expected) {
            Ok(b) => b,
            Err(e) => {
                engine.release_buffer(input);
                return Err(e.into());
            }
        };
        let lens = [engine.buffer_len(&input), engine.buffer_len(&output)];
        if let Some(&actual) = lens.iter().find(|&&len| len != expected) {
            engine.release_buffer(input);
            engine.release_buffer(output);
            return Err(ConfigError::BufferSizeMismatch { expected, actual });
        }

        let heatmap = config.heatmap.map(|p| {
            HeatmapImage::for_window(config.window_width, config.window_height, p.magnification)
        });
        debug!(
            window_width = config.window_width,
            window_height = config.window_height,
            groups = groups.count,
            buffer_bytes = expected,
            "windowed stepper ready"
        );
        Ok(Self {
            resources: Some(Resources {
                engine,
                input,
                output,
            }),
            config,
            world_dims: (world_width, world_height),
            groups,
            window,
            heatmap,
            metrics: StepMetrics::default(),
            step_count: 0,
        })
    }

    /// Advance the window at `offset` of `world` by `delta_time`.
    ///
    /// `world` must have the dimensions given to [`new`](Self::new). On
    /// success returns this step's metrics.
    pub fn step<G>(
        &mut self,
        world: &mut G,
        offset: GridPos,
        delta_time: f32,
    ) -> Result<&StepMetrics, StepError>
    where
        G: GridAccess<TemperatureCell> + ?Sized,
    {
        if !delta_time.is_finite() {
            return Err(StepError::NonFiniteDeltaTime { value: delta_time });
        }
        if world.dims() != self.world_dims {
            return Err(StepError::WorldMismatch {
                expected: self.world_dims,
                actual: world.dims(),
            });
        }
        let res = self.resources.as_mut().ok_or_else(|| EngineError::DispatchFailed {
            reason: "stepper resources already released".into(),
        })?;
        let start = Instant::now();
        let mut metrics = StepMetrics {
            step_id: self.step_count + 1,
            dispatched_items: self.groups.covered_cells,
            skipped_items: self.groups.skipped_cells,
            ..StepMetrics::default()
        };

        // 1. Sync-in.
        let t = Instant::now();
        read_into(&*world, &mut self.window, offset)?;
        res.engine
            .upload(&mut res.input, bytemuck::cast_slice(self.window.data()))?;
        metrics.sync_in_us = elapsed_us(t);

        // 2. Dispatch.
        let t = Instant::now();
        let dispatch = DiffusionDispatch {
            width: self.config.window_width,
            height: self.config.window_height,
            delta_time,
            ambient_temperature: self.config.ambient_temperature,
            params: self.config.params,
            groups: self.groups,
        };
        res.engine.dispatch(&dispatch, &res.input, &mut res.output)?;
        metrics.dispatch_us = elapsed_us(t);

        // 3. Readback.
        let t = Instant::now();
        res.engine.read_back(
            &res.output,
            bytemuck::cast_slice_mut(self.window.data_mut()),
            self.config.readback_timeout,
        )?;
        metrics.readback_us = elapsed_us(t);

        // 4. Divergence check, before anything reaches the backing grid.
        let limit = self.config.divergence_limit;
        if let Some((index, cell)) = self.window.iter().enumerate().find(|(_, c)| {
            !c.temperature.is_finite() || limit.is_some_and(|l| c.temperature.abs() > l)
        }) {
            warn!(index, value = cell.temperature, "window temperature diverged");
            return Err(StepError::Diverged {
                index,
                value: cell.temperature,
            });
        }

        // 5. Heatmap of the pre-step state, still held in the input buffer.
        if let (Some(image), Some(params)) = (self.heatmap.as_mut(), self.config.heatmap) {
            let t = Instant::now();
            let dispatch = HeatmapDispatch {
                width: self.config.window_width,
                height: self.config.window_height,
                params,
            };
            res.engine.dispatch_heatmap(&dispatch, &res.input, image)?;
            metrics.heatmap_us = elapsed_us(t);
        }

        // 6. Sync-out.
        let t = Instant::now();
        write_from(world, &self.window, offset)?;
        metrics.sync_out_us = elapsed_us(t);

        metrics.total_us = elapsed_us(start);
        self.step_count += 1;
        trace!(
            step = self.step_count,
            %offset,
            delta_time,
            total_us = metrics.total_us,
            "windowed step"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            trace!("window after step {}:\n{}", self.step_count, self.window.dump());
        }
        self.metrics = metrics;
        Ok(&self.metrics)
    }

    /// Current diffusion and cooling factors.
    pub fn params(&self) -> DiffusionParams {
        self.config.params
    }

    /// Replace the factors used from the next step on.
    pub fn set_params(&mut self, params: DiffusionParams) -> Result<(), ConfigError> {
        params.validate()?;
        self.config.params = params;
        Ok(())
    }

    /// The configuration this stepper runs with.
    pub fn config(&self) -> &StepperConfig {
        &self.config
    }

    /// Work-group layout planned at setup.
    pub fn work_groups(&self) -> WorkGroups {
        self.groups
    }

    /// The window as of the last step's readback.
    pub fn window(&self) -> &Grid<TemperatureCell> {
        &self.window
    }

    /// The heatmap of the last successful step, if configured.
    pub fn heatmap(&self) -> Option<&HeatmapImage> {
        self.heatmap.as_ref()
    }

    /// Metrics of the last successful step.
    pub fn metrics(&self) -> &StepMetrics {
        &self.metrics
    }

    /// Number of successful steps.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Release both buffers and return the engine.
    pub fn teardown(mut self) -> E {
        let Resources {
            mut engine,
            input,
            output,
        } = self
            .resources
            .take()
            .expect("resources present until teardown");
        engine.release_buffer(input);
        engine.release_buffer(output);
        debug!(steps = self.step_count, "windowed stepper torn down");
        engine
    }
}

impl<E: ComputeEngine> Drop for WindowedStepper<E> {
    fn drop(&mut self) {
        if let Some(Resources {
            mut engine,
            input,
            output,
        }) = self.resources.take()
        {
            engine.release_buffer(input);
            engine.release_buffer(output);
            debug!(steps = self.step_count, "windowed stepper dropped");
        }
    }
}

fn elapsed_us(since: Instant) -> u64 {
    since.elapsed().as_micros() as u64
}
