//! PyO3 bindings for Python integration

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::FilterError;

mod filter_bindings;
mod stream_bindings;

impl From<FilterError> for PyErr {
    fn from(err: FilterError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

/// Python module definition
#[pymodule]
fn pcm_filter(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<filter_bindings::PyChannelFilter>()?;
    m.add_class::<stream_bindings::PyStreamFilter>()?;

    // Add FilterKind enum
    m.add_class::<filter_bindings::PyFilterKind>()?;

    m.add_function(wrap_pyfunction!(filter_bindings::design_biquad, m)?)?;

    Ok(())
}
