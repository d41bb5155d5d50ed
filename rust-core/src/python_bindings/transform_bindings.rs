//! Python bindings for the transform primitives

use crate::filters::{self, FilterSpec, WindowType};
use crate::signal::Signal;
use crate::spectrum::{self, StftConfig};
use numpy::{PyArray1, PyArray2, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Window type enum exposed to Python
#[pyclass(name = "WindowType")]
#[derive(Clone)]
pub enum PyWindowType {
    Hann,
    Hamming,
    Blackman,
    Gaussian,
    Rectangular,
}

impl From<PyWindowType> for WindowType {
    fn from(py_win: PyWindowType) -> Self {
        match py_win {
            PyWindowType::Hann => WindowType::Hann,
            PyWindowType::Hamming => WindowType::Hamming,
            PyWindowType::Blackman => WindowType::Blackman,
            PyWindowType::Gaussian => WindowType::Gaussian,
            PyWindowType::Rectangular => WindowType::Rectangular,
        }
    }
}

pub(super) fn to_signal(samples: &PyReadonlyArray1<f64>, sample_rate: f64) -> PyResult<Signal> {
    Ok(Signal::new(samples.as_slice()?.to_vec(), sample_rate)?)
}

/// One-sided spectrum of a signal
///
/// Returns:
///     (frequencies, magnitudes, phases) as numpy arrays
#[pyfunction]
#[pyo3(signature = (signal, sample_rate=1.0))]
pub fn fft<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    sample_rate: f64,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let spectrum = spectrum::compute_fft(&to_signal(&signal, sample_rate)?)?;
    Ok((
        PyArray1::from_slice(py, spectrum.frequencies()),
        PyArray1::from_slice(py, spectrum.magnitudes()),
        PyArray1::from_slice(py, spectrum.phases()),
    ))
}

/// Short-time Fourier transform
///
/// Returns:
///     (frequencies, times, magnitudes) with magnitudes shaped (windows, bins)
#[pyfunction]
#[pyo3(signature = (signal, sample_rate=1.0, window_length=256, overlap=0.5, window_type=PyWindowType::Hann))]
pub fn stft<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    sample_rate: f64,
    window_length: usize,
    overlap: f64,
    window_type: PyWindowType,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>, &'py PyArray2<f64>)> {
    let config = StftConfig {
        window_length,
        overlap,
        window_type: window_type.into(),
    };
    let grid = spectrum::compute_stft_with(&to_signal(&signal, sample_rate)?, &config)?;
    Ok((
        PyArray1::from_slice(py, grid.frequencies()),
        PyArray1::from_slice(py, grid.times()),
        PyArray2::from_owned_array(py, grid.magnitudes().clone()),
    ))
}

/// Amplitude envelope via the Hilbert transform
#[pyfunction]
#[pyo3(signature = (signal, sample_rate=1.0))]
pub fn envelope<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    sample_rate: f64,
) -> PyResult<&'py PyArray1<f64>> {
    let env = spectrum::compute_envelope(&to_signal(&signal, sample_rate)?)?;
    Ok(PyArray1::from_vec(py, env.into_samples()))
}

/// Spectrum of the envelope, optionally band-limited first
///
/// Returns:
///     (frequencies, magnitudes)
#[pyfunction]
#[pyo3(signature = (signal, sample_rate=1.0, band=None))]
pub fn envelope_spectrum<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    sample_rate: f64,
    band: Option<(f64, f64)>,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let spectrum = spectrum::envelope_spectrum(&to_signal(&signal, sample_rate)?, band)?;
    Ok((
        PyArray1::from_slice(py, spectrum.frequencies()),
        PyArray1::from_slice(py, spectrum.magnitudes()),
    ))
}

/// Welch power spectral density
///
/// Returns:
///     (frequencies, density)
#[pyfunction]
#[pyo3(signature = (signal, sample_rate=1.0, segment_length=256))]
pub fn welch_psd<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    sample_rate: f64,
    segment_length: usize,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let psd = spectrum::welch_psd(&to_signal(&signal, sample_rate)?, segment_length)?;
    Ok((
        PyArray1::from_vec(py, psd.frequencies),
        PyArray1::from_vec(py, psd.density),
    ))
}

fn filter_spec(kind: &str, order: usize, cutoffs: &[f64], sample_rate: f64) -> PyResult<FilterSpec> {
    match (kind, cutoffs) {
        ("lowpass", &[cutoff]) => Ok(FilterSpec::lowpass(order, cutoff, sample_rate)),
        ("highpass", &[cutoff]) => Ok(FilterSpec::highpass(order, cutoff, sample_rate)),
        ("bandpass", &[low, high]) => Ok(FilterSpec::bandpass(order, low, high, sample_rate)),
        _ => Err(PyValueError::new_err(format!(
            "unsupported filter '{kind}' with {} cutoff(s); expected lowpass/highpass with one or bandpass with two",
            cutoffs.len()
        ))),
    }
}

/// Butterworth transfer function coefficients
///
/// Args:
///     kind: "lowpass", "highpass" or "bandpass"
///     order: Filter order (>= 1)
///     cutoffs: One cutoff in Hz, or (low, high) for bandpass
///     sample_rate: Sample rate in Hz
///
/// Returns:
///     (b, a) as numpy arrays
#[pyfunction]
pub fn design_butterworth<'py>(
    py: Python<'py>,
    kind: &str,
    order: usize,
    cutoffs: Vec<f64>,
    sample_rate: f64,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let coeffs = filters::design_butterworth(&filter_spec(kind, order, &cutoffs, sample_rate)?)?;
    Ok((PyArray1::from_slice(py, coeffs.b()), PyArray1::from_slice(py, coeffs.a())))
}

/// Zero-phase Butterworth filtering
#[pyfunction]
pub fn butterworth_filter<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    sample_rate: f64,
    kind: &str,
    order: usize,
    cutoffs: Vec<f64>,
) -> PyResult<&'py PyArray1<f64>> {
    let spec = filter_spec(kind, order, &cutoffs, sample_rate)?;
    let filtered = filters::butterworth_filter(&to_signal(&signal, sample_rate)?, &spec)?;
    Ok(PyArray1::from_vec(py, filtered.into_samples()))
}
