//! Python bindings for the per-stream filter engine

use pyo3::prelude::*;
use numpy::PyReadwriteArray1;
use crate::pcm::{FilterConfig, PositionHook, StreamConfig, StreamFilter};
use super::filter_bindings::PyFilterKind;

/// Incremental stream filter exposed to Python
///
/// Operates in place on a writable numpy uint8 array holding the circular
/// sample buffer.
#[pyclass(name = "StreamFilter", unsendable)]
pub struct PyStreamFilter {
    filter: StreamFilter,
}

#[pymethods]
impl PyStreamFilter {
    /// Open a stream filter
    ///
    /// Args:
    ///     max_channels: Largest channel count the stream may use
    #[new]
    #[pyo3(signature = (max_channels=2))]
    fn new(max_channels: usize) -> Self {
        Self {
            filter: StreamFilter::open(max_channels),
        }
    }

    /// Full (re)configuration, called on every stream prepare
    #[pyo3(signature = (channels, bit_depth, sample_rate, kind, cutoff, bytes_per_sample=4))]
    fn configure(
        &mut self,
        channels: usize,
        bit_depth: u32,
        sample_rate: u32,
        kind: PyFilterKind,
        cutoff: f32,
        bytes_per_sample: usize,
    ) -> PyResult<()> {
        let stream = StreamConfig {
            channels,
            bit_depth,
            bytes_per_sample,
            sample_rate,
        };
        let filter = FilterConfig {
            kind: kind.into(),
            cutoff,
        };

        Ok(self.filter.configure(&stream, &filter)?)
    }

    /// Filter the buffer up to the given hardware frame position
    fn advance(&mut self, mut buffer: PyReadwriteArray1<u8>, hw_frame_pos: usize) -> PyResult<()> {
        self.filter.advance(buffer.as_slice_mut()?, hw_frame_pos);
        Ok(())
    }

    /// Handle a position query given in bytes
    ///
    /// Returns:
    ///     Hardware position in frames
    fn pointer(&mut self, mut buffer: PyReadwriteArray1<u8>, hw_pos_bytes: usize) -> PyResult<usize> {
        Ok(self.filter.pointer(buffer.as_slice_mut()?, hw_pos_bytes))
    }

    /// Last processed frame offset
    fn cursor(&self) -> usize {
        self.filter.cursor().position()
    }
}
