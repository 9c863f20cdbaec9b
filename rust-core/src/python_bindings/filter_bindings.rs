//! Python bindings for biquad design and single-channel filtering

use pyo3::prelude::*;
use numpy::{PyArray1, PyReadonlyArray1};
use crate::filters::{synthesize, ChannelFilter, FilterKind, FilterParams};

/// Filter kind enum exposed to Python
#[pyclass(name = "FilterKind")]
#[derive(Clone)]
pub enum PyFilterKind {
    Bypass,
    LowPass,
    HighPass,
    BandPass,
}

impl From<PyFilterKind> for FilterKind {
    fn from(py_kind: PyFilterKind) -> Self {
        match py_kind {
            PyFilterKind::Bypass => FilterKind::None,
            PyFilterKind::LowPass => FilterKind::LowPass,
            PyFilterKind::HighPass => FilterKind::HighPass,
            PyFilterKind::BandPass => FilterKind::BandPass,
        }
    }
}

/// Design biquad coefficients
///
/// Returns:
///     Tuple of (b0, b1, b2, a1, a2), normalized by a0
#[pyfunction]
pub fn design_biquad(kind: PyFilterKind, sample_rate: f32, cutoff: f32) -> (f32, f32, f32, f32, f32) {
    let c = synthesize(kind.into(), sample_rate, cutoff);
    (c.b0, c.b1, c.b2, c.a1, c.a2)
}

/// Single-channel biquad filter exposed to Python
#[pyclass(name = "ChannelFilter")]
pub struct PyChannelFilter {
    filter: ChannelFilter,
}

#[pymethods]
impl PyChannelFilter {
    /// Create a new channel filter
    ///
    /// Args:
    ///     kind: Filter kind
    ///     sample_rate: Sample rate in Hz
    ///     cutoff: Cutoff frequency in Hz
    #[new]
    fn new(kind: PyFilterKind, sample_rate: f32, cutoff: f32) -> Self {
        Self {
            filter: ChannelFilter::new(kind.into(), sample_rate, cutoff),
        }
    }

    /// Process a block of samples
    ///
    /// Args:
    ///     input_signal: Input samples as numpy array
    ///
    /// Returns:
    ///     Filtered output as numpy array
    fn process_block<'py>(
        &mut self,
        py: Python<'py>,
        input_signal: PyReadonlyArray1<f32>,
    ) -> PyResult<&'py PyArray1<f32>> {
        let mut output = input_signal.as_slice()?.to_vec();
        self.filter.process_block_inplace(&mut output);

        Ok(PyArray1::from_vec(py, output))
    }

    /// Change any of kind, sample rate or cutoff; history is cleared
    #[pyo3(signature = (kind=None, sample_rate=None, cutoff=None))]
    fn reconfigure(&mut self, kind: Option<PyFilterKind>, sample_rate: Option<f32>, cutoff: Option<f32>) {
        self.filter.reconfigure(FilterParams {
            kind: kind.map(Into::into),
            sample_rate,
            cutoff,
        });
    }

    /// Reset filter state
    fn reset(&mut self) {
        self.filter.reset();
    }

    /// Get filter coefficients as (b0, b1, b2, a1, a2)
    fn get_coefficients(&self) -> (f32, f32, f32, f32, f32) {
        let c = self.filter.coefficients();
        (c.b0, c.b1, c.b2, c.a1, c.a2)
    }

    /// Magnitude response in dB at the given frequencies (Hz)
    fn magnitude_response_db<'py>(
        &self,
        py: Python<'py>,
        frequencies: PyReadonlyArray1<f64>,
    ) -> PyResult<&'py PyArray1<f64>> {
        let mag = self
            .filter
            .coefficients()
            .magnitude_response_db(frequencies.as_slice()?, self.filter.sample_rate() as f64);

        Ok(PyArray1::from_vec(py, mag))
    }
}
