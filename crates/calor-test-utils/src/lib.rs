//! Test utilities and mock types for Calor development.
//!
//! Provides [`MockEngine`], a [`ComputeEngine`] that records every call in
//! a shared [`EngineLog`] and can be configured to misreport buffer sizes,
//! fail allocation or dispatch, or stall readback, plus grid [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use calor_core::{EngineError, TemperatureCell};
use calor_diffusion::engine::{ComputeEngine, DiffusionDispatch, HeatmapDispatch};
use calor_diffusion::heatmap::{self, HeatmapImage};
use calor_diffusion::kernel::diffuse_cell;

/// One call made on a [`MockEngine`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineCall {
    Create { id: usize, len_bytes: usize },
    Upload { id: usize },
    Dispatch { input: usize, output: usize, groups: usize },
    DispatchHeatmap { input: usize },
    ReadBack { id: usize },
    Release { id: usize },
}

/// Every call made on a [`MockEngine`], in order.
#[derive(Clone, Debug, Default)]
pub struct EngineLog {
    pub calls: Vec<EngineCall>,
}

impl EngineLog {
    /// Ids of all buffers created.
    pub fn created(&self) -> Vec<usize> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                EngineCall::Create { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Ids of all buffers released, in release order.
    pub fn released(&self) -> Vec<usize> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                EngineCall::Release { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Number of diffusion dispatches.
    pub fn dispatches(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, EngineCall::Dispatch { .. }))
            .count()
    }

    /// Whether every created buffer was released exactly once.
    pub fn balanced(&self) -> bool {
        let mut created = self.created();
        let mut released = self.released();
        created.sort_unstable();
        released.sort_unstable();
        created == released
    }
}

/// Shared handle to a [`MockEngine`]'s log; survives the engine.
#[derive(Clone, Debug, Default)]
pub struct LogHandle(Arc<Mutex<EngineLog>>);

impl LogHandle {
    /// Lock the log for inspection.
    pub fn lock(&self) -> MutexGuard<'_, EngineLog> {
        self.0.lock().expect("engine log poisoned")
    }

    fn push(&self, call: EngineCall) {
        self.lock().calls.push(call);
    }
}

/// Buffer handed out by [`MockEngine`].
#[derive(Debug)]
pub struct MockBuffer {
    pub id: usize,
    pub cells: Vec<TemperatureCell>,
}

/// Recording [`ComputeEngine`] running the real diffusion kernel
/// sequentially, one work group after another.
///
/// ```
/// use calor_diffusion::ComputeEngine;
/// use calor_test_utils::MockEngine;
///
/// let mut engine = MockEngine::new();
/// let log = engine.log();
/// let buf = engine.create_buffer(24).unwrap();
/// engine.release_buffer(buf);
/// assert!(log.lock().balanced());
/// ```
#[derive(Debug, Default)]
pub struct MockEngine {
    log: LogHandle,
    next_id: usize,
    reported_len: Option<usize>,
    fail_create_after: Option<usize>,
    readback_delay: Option<Duration>,
    dispatch_error: Option<EngineError>,
    heatmap_error: Option<EngineError>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `bytes` from `buffer_len` regardless of the real size.
    pub fn with_reported_len(mut self, bytes: usize) -> Self {
        self.reported_len = Some(bytes);
        self
    }

    /// Succeed `n` buffer creations, then fail every later one.
    pub fn with_create_failure_after(mut self, n: usize) -> Self {
        self.fail_create_after = Some(n);
        self
    }

    /// Pretend readback takes `delay`; a shorter timeout fails with
    /// [`EngineError::Timeout`].
    pub fn with_readback_delay(mut self, delay: Duration) -> Self {
        self.readback_delay = Some(delay);
        self
    }

    /// Fail every diffusion dispatch with `error`.
    pub fn with_dispatch_error(mut self, error: EngineError) -> Self {
        self.dispatch_error = Some(error);
        self
    }

    /// Fail every heatmap dispatch with `error`.
    pub fn with_heatmap_error(mut self, error: EngineError) -> Self {
        self.heatmap_error = Some(error);
        self
    }

    /// Handle to the call log.
    pub fn log(&self) -> LogHandle {
        self.log.clone()
    }

    fn check_len(buffer: &MockBuffer, bytes: usize) -> Result<(), EngineError> {
        let expected = buffer.cells.len() * TemperatureCell::SIZE;
        if bytes != expected {
            return Err(EngineError::SizeMismatch {
                expected,
                actual: bytes,
            });
        }
        Ok(())
    }
}

impl ComputeEngine for MockEngine {
    type Buffer = MockBuffer;

    fn create_buffer(&mut self, len_bytes: usize) -> Result<MockBuffer, EngineError> {
        if self.fail_create_after.is_some_and(|n| self.next_id >= n) {
            return Err(EngineError::DispatchFailed {
                reason: "mock allocation failure".into(),
            });
        }
        let id = self.next_id;
        self.next_id += 1;
        self.log.push(EngineCall::Create { id, len_bytes });
        Ok(MockBuffer {
            id,
            cells: vec![TemperatureCell::default(); len_bytes / TemperatureCell::SIZE],
        })
    }

    fn buffer_len(&self, buffer: &MockBuffer) -> usize {
        self.reported_len
            .unwrap_or(buffer.cells.len() * TemperatureCell::SIZE)
    }

    fn upload(&mut self, buffer: &mut MockBuffer, bytes: &[u8]) -> Result<(), EngineError> {
        Self::check_len(buffer, bytes.len())?;
        self.log.push(EngineCall::Upload { id: buffer.id });
        for (cell, chunk) in buffer.cells.iter_mut().zip(bytes.chunks_exact(TemperatureCell::SIZE)) {
            *cell = bytemuck::pod_read_unaligned(chunk);
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        dispatch: &DiffusionDispatch,
        input: &MockBuffer,
        output: &mut MockBuffer,
    ) -> Result<(), EngineError> {
        self.log.push(EngineCall::Dispatch {
            input: input.id,
            output: output.id,
            groups: dispatch.groups.count,
        });
        if let Some(e) = &self.dispatch_error {
            return Err(e.clone());
        }
        let group_size = dispatch.groups.group_size();
        for group in 0..dispatch.groups.count {
            for local in 0..group_size {
                let i = group * group_size + local;
                if i >= dispatch.cells() {
                    break;
                }
                output.cells[i] = diffuse_cell(
                    &input.cells,
                    dispatch.width,
                    dispatch.height,
                    i,
                    &dispatch.params,
                    dispatch.delta_time,
                    dispatch.ambient_temperature,
                );
            }
        }
        Ok(())
    }

    fn dispatch_heatmap(
        &mut self,
        dispatch: &HeatmapDispatch,
        input: &MockBuffer,
        image: &mut HeatmapImage,
    ) -> Result<(), EngineError> {
        self.log.push(EngineCall::DispatchHeatmap { input: input.id });
        if let Some(e) = &self.heatmap_error {
            return Err(e.clone());
        }
        heatmap::render(&input.cells, dispatch.width, &dispatch.params, image)
    }

    fn read_back(
        &mut self,
        buffer: &MockBuffer,
        out: &mut [u8],
        timeout: Option<Duration>,
    ) -> Result<(), EngineError> {
        self.log.push(EngineCall::ReadBack { id: buffer.id });
        if let (Some(delay), Some(waited)) = (self.readback_delay, timeout) {
            if delay > waited {
                return Err(EngineError::Timeout { waited });
            }
        }
        Self::check_len(buffer, out.len())?;
        out.copy_from_slice(bytemuck::cast_slice(&buffer.cells));
        Ok(())
    }

    fn release_buffer(&mut self, buffer: MockBuffer) {
        self.log.push(EngineCall::Release { id: buffer.id });
    }
}
