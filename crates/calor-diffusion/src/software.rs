//! Host-side compute engine running work groups on the rayon pool.

use std::time::Duration;

use calor_core::{EngineError, TemperatureCell};
use rayon::prelude::*;
use tracing::trace;

use crate::engine::{ComputeEngine, DiffusionDispatch, HeatmapDispatch};
use crate::heatmap::{self, HeatmapImage};
use crate::kernel::diffuse_cell;

/// A buffer owned by [`SoftwareEngine`].
#[derive(Clone, Debug, PartialEq)]
pub struct SoftwareBuffer {
    cells: Vec<TemperatureCell>,
}

impl SoftwareBuffer {
    /// The buffer contents.
    pub fn cells(&self) -> &[TemperatureCell] {
        &self.cells
    }
}

/// [`ComputeEngine`] that executes on the host.
///
/// Each work group is one contiguous chunk of the output buffer; chunks run
/// in parallel via `par_chunks_mut`. Work is complete when `dispatch`
/// returns, so [`read_back`](ComputeEngine::read_back) never times out.
#[derive(Debug, Default)]
pub struct SoftwareEngine {
    live_buffers: usize,
    dispatches: u64,
}

impl SoftwareEngine {
    /// Create an engine with no buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers created and not yet released.
    pub fn live_buffers(&self) -> usize {
        self.live_buffers
    }

    /// Diffusion dispatches run so far.
    pub fn dispatches(&self) -> u64 {
        self.dispatches
    }

    fn check_len(buffer: &SoftwareBuffer, bytes: usize) -> Result<(), EngineError> {
        let expected = buffer.cells.len() * TemperatureCell::SIZE;
        if bytes != expected {
            return Err(EngineError::SizeMismatch {
                expected,
                actual: bytes,
            });
        }
        Ok(())
    }

    fn check_cells(buffer: &SoftwareBuffer, cells: usize) -> Result<(), EngineError> {
        Self::check_len(buffer, cells * TemperatureCell::SIZE)
    }
}

impl ComputeEngine for SoftwareEngine {
    type Buffer = SoftwareBuffer;

    fn create_buffer(&mut self, len_bytes: usize) -> Result<SoftwareBuffer, EngineError> {
        if len_bytes % TemperatureCell::SIZE != 0 {
            return Err(EngineError::DispatchFailed {
                reason: format!(
                    "buffer length {len_bytes} is not a multiple of the cell size {}",
                    TemperatureCell::SIZE
                ),
            });
        }
        self.live_buffers += 1;
        Ok(SoftwareBuffer {
            cells: vec![TemperatureCell::default(); len_bytes / TemperatureCell::SIZE],
        })
    }

    fn buffer_len(&self, buffer: &SoftwareBuffer) -> usize {
        buffer.cells.len() * TemperatureCell::SIZE
    }

    fn upload(&mut self, buffer: &mut SoftwareBuffer, bytes: &[u8]) -> Result<(), EngineError> {
        Self::check_len(buffer, bytes.len())?;
        bytemuck::cast_slice_mut::<TemperatureCell, u8>(&mut buffer.cells).copy_from_slice(bytes);
        Ok(())
    }

    fn dispatch(
        &mut self,
        dispatch: &DiffusionDispatch,
        input: &SoftwareBuffer,
        output: &mut SoftwareBuffer,
    ) -> Result<(), EngineError> {
        let cells = dispatch.cells();
        Self::check_cells(input, cells)?;
        Self::check_cells(output, cells)?;

        let groups = dispatch.groups;
        let group_size = groups.group_size();
        let src = &input.cells;
        output.cells[..groups.covered_cells]
            .par_chunks_mut(group_size)
            .enumerate()
            .for_each(|(group, chunk)| {
                let base = group * group_size;
                for (local, out) in chunk.iter_mut().enumerate() {
                    *out = diffuse_cell(
                        src,
                        dispatch.width,
                        dispatch.height,
                        base + local,
                        &dispatch.params,
                        dispatch.delta_time,
                        dispatch.ambient_temperature,
                    );
                }
            });
        self.dispatches += 1;
        trace!(groups = groups.count, items = groups.covered_cells, "software dispatch");
        Ok(())
    }

    fn dispatch_heatmap(
        &mut self,
        dispatch: &HeatmapDispatch,
        input: &SoftwareBuffer,
        image: &mut HeatmapImage,
    ) -> Result<(), EngineError> {
        Self::check_cells(input, dispatch.width as usize * dispatch.height as usize)?;
        let pixels = image.width as usize * image.height as usize;
        let expected = dispatch.params.image_dims(dispatch.width, dispatch.height);
        if expected != Some((image.width, image.height)) || image.pixels.len() != pixels {
            return Err(EngineError::DispatchFailed {
                reason: format!(
                    "heatmap image is {}x{}, does not fit a {}x{} window at magnification {}",
                    image.width,
                    image.height,
                    dispatch.width,
                    dispatch.height,
                    dispatch.params.magnification
                ),
            });
        }
        let row_len = image.width as usize;
        image
            .pixels
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(py, row)| {
                heatmap::render_row(&input.cells, dispatch.width, &dispatch.params, py as u32, row);
            });
        Ok(())
    }

    fn read_back(
        &mut self,
        buffer: &SoftwareBuffer,
        out: &mut [u8],
        _timeout: Option<Duration>,
    ) -> Result<(), EngineError> {
        Self::check_len(buffer, out.len())?;
        out.copy_from_slice(bytemuck::cast_slice(&buffer.cells));
        Ok(())
    }

    fn release_buffer(&mut self, buffer: SoftwareBuffer) {
        self.live_buffers = self.live_buffers.saturating_sub(1);
        drop(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RemainderPolicy, WorkGroups};
    use crate::heatmap::HeatmapParams;
    use crate::kernel::DiffusionParams;

    fn dispatch_for(width: u32, height: u32, policy: RemainderPolicy) -> DiffusionDispatch {
        DiffusionDispatch {
            width,
            height,
            delta_time: 1.0,
            ambient_temperature: 0.0,
            params: DiffusionParams::new(0.2, 0.0),
            groups: WorkGroups::plan((width * height) as usize, 2, 2, policy).unwrap(),
        }
    }

    fn upload_cells(engine: &mut SoftwareEngine, buf: &mut SoftwareBuffer, cells: &[TemperatureCell]) {
        engine.upload(buf, bytemuck::cast_slice(cells)).unwrap();
    }

    #[test]
    fn buffers_are_counted() {
        let mut engine = SoftwareEngine::new();
        let a = engine.create_buffer(24).unwrap();
        let b = engine.create_buffer(0).unwrap();
        assert_eq!(engine.live_buffers(), 2);
        assert_eq!(engine.buffer_len(&a), 24);
        engine.release_buffer(a);
        engine.release_buffer(b);
        assert_eq!(engine.live_buffers(), 0);
    }

    #[test]
    fn create_rejects_partial_cells() {
        let mut engine = SoftwareEngine::new();
        assert!(matches!(
            engine.create_buffer(13),
            Err(EngineError::DispatchFailed { .. })
        ));
        assert_eq!(engine.live_buffers(), 0);
    }

    #[test]
    fn upload_and_read_back_check_length() {
        let mut engine = SoftwareEngine::new();
        let mut buf = engine.create_buffer(24).unwrap();
        assert_eq!(
            engine.upload(&mut buf, &[0u8; 12]),
            Err(EngineError::SizeMismatch {
                expected: 24,
                actual: 12
            })
        );
        let cells = [
            TemperatureCell::new(1.0, 2.0, 3.0),
            TemperatureCell::new(4.0, 5.0, 6.0),
        ];
        upload_cells(&mut engine, &mut buf, &cells);
        let mut out = [TemperatureCell::default(); 2];
        engine
            .read_back(&buf, bytemuck::cast_slice_mut(&mut out), None)
            .unwrap();
        assert_eq!(out, cells);
        engine.release_buffer(buf);
    }

    #[test]
    fn dispatch_spreads_hot_cell() {
        let mut engine = SoftwareEngine::new();
        let bytes = 4 * 4 * TemperatureCell::SIZE;
        let mut input = engine.create_buffer(bytes).unwrap();
        let mut output = engine.create_buffer(bytes).unwrap();
        let mut cells = [TemperatureCell::default(); 16];
        cells[5].temperature = 10.0;
        upload_cells(&mut engine, &mut input, &cells);

        engine
            .dispatch(&dispatch_for(4, 4, RemainderPolicy::Reject), &input, &mut output)
            .unwrap();
        let out = output.cells();
        assert!((out[5].temperature - 2.0).abs() < 1e-5);
        for i in [1, 4, 6, 9] {
            assert!((out[i].temperature - 2.0).abs() < 1e-5, "cell {i}");
        }
        assert_eq!(out[0].temperature, 0.0);
        assert_eq!(engine.dispatches(), 1);
    }

    #[test]
    fn truncated_dispatch_leaves_tail_untouched() {
        let mut engine = SoftwareEngine::new();
        let bytes = 3 * 3 * TemperatureCell::SIZE;
        let input = engine.create_buffer(bytes).unwrap();
        let mut output = engine.create_buffer(bytes).unwrap();
        let stale = [TemperatureCell::with_temperature(-1.0); 9];
        upload_cells(&mut engine, &mut output, &stale);

        let d = dispatch_for(3, 3, RemainderPolicy::Truncate);
        assert_eq!(d.groups.covered_cells, 8);
        engine.dispatch(&d, &input, &mut output).unwrap();
        assert!(output.cells()[..8].iter().all(|c| c.temperature == 0.0));
        assert_eq!(output.cells()[8].temperature, -1.0);
    }

    #[test]
    fn dispatch_rejects_wrong_buffer_size() {
        let mut engine = SoftwareEngine::new();
        let input = engine.create_buffer(4 * TemperatureCell::SIZE).unwrap();
        let mut output = engine.create_buffer(9 * TemperatureCell::SIZE).unwrap();
        let err = engine
            .dispatch(&dispatch_for(3, 3, RemainderPolicy::CoverAll), &input, &mut output)
            .unwrap_err();
        assert!(matches!(err, EngineError::SizeMismatch { .. }));
    }

    #[test]
    fn heatmap_dispatch_renders_every_pixel() {
        let mut engine = SoftwareEngine::new();
        let mut input = engine.create_buffer(4 * TemperatureCell::SIZE).unwrap();
        upload_cells(
            &mut engine,
            &mut input,
            &[TemperatureCell::with_temperature(100.0); 4],
        );
        let params = HeatmapParams {
            magnification: 3,
            ..HeatmapParams::default()
        };
        let mut image = HeatmapImage::for_window(2, 2, 3);
        engine
            .dispatch_heatmap(
                &HeatmapDispatch {
                    width: 2,
                    height: 2,
                    params,
                },
                &input,
                &mut image,
            )
            .unwrap();
        assert!(image.pixels.iter().all(|p| *p == [1.0, 0.0, 0.0, 1.0]));

        let mut wrong = HeatmapImage::for_window(2, 2, 2);
        assert!(engine
            .dispatch_heatmap(
                &HeatmapDispatch {
                    width: 2,
                    height: 2,
                    params,
                },
                &input,
                &mut wrong,
            )
            .is_err());
    }
}
