//! PyO3 bindings for Python integration

use crate::error::SignalError;
use pyo3::exceptions::{PyValueError, PyZeroDivisionError};
use pyo3::prelude::*;

mod feature_bindings;
mod transform_bindings;

impl From<SignalError> for PyErr {
    fn from(err: SignalError) -> Self {
        match err {
            SignalError::InvalidInput(_) => PyValueError::new_err(err.to_string()),
            SignalError::DivisionByZero { .. } => PyZeroDivisionError::new_err(err.to_string()),
        }
    }
}

/// Python module definition
#[pymodule]
fn signal_features(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<transform_bindings::PyWindowType>()?;

    m.add_function(wrap_pyfunction!(transform_bindings::fft, m)?)?;
    m.add_function(wrap_pyfunction!(transform_bindings::stft, m)?)?;
    m.add_function(wrap_pyfunction!(transform_bindings::envelope, m)?)?;
    m.add_function(wrap_pyfunction!(transform_bindings::envelope_spectrum, m)?)?;
    m.add_function(wrap_pyfunction!(transform_bindings::welch_psd, m)?)?;
    m.add_function(wrap_pyfunction!(transform_bindings::design_butterworth, m)?)?;
    m.add_function(wrap_pyfunction!(transform_bindings::butterworth_filter, m)?)?;

    m.add_function(wrap_pyfunction!(feature_bindings::time_features, m)?)?;
    m.add_function(wrap_pyfunction!(feature_bindings::moving_rms, m)?)?;
    m.add_function(wrap_pyfunction!(feature_bindings::frequency_features, m)?)?;
    m.add_function(wrap_pyfunction!(feature_bindings::time_frequency_features, m)?)?;

    Ok(())
}
