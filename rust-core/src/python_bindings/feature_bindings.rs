//! Python bindings for the feature extractors
//!
//! Feature sets come back as `dict[str, float]`, feature series as
//! `dict[str, ndarray]` plus the window centre times.

use super::transform_bindings::{to_signal, PyWindowType};
use crate::features::{
    self, DegeneratePolicy, FeatureSet, FrequencyBand, FrequencyFeatureConfig, SpectralFeature,
    TimeFeature, TimeFeatureConfig,
};
use crate::spectrum::StftConfig;
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

fn policy(nan_on_degenerate: bool) -> DegeneratePolicy {
    if nan_on_degenerate {
        DegeneratePolicy::Nan
    } else {
        DegeneratePolicy::Fail
    }
}

fn parse_keys<T>(names: Vec<String>, parse: impl Fn(&str) -> Option<T>) -> PyResult<Vec<T>> {
    names
        .iter()
        .map(|name| parse(name).ok_or_else(|| PyValueError::new_err(format!("unknown feature '{name}'"))))
        .collect()
}

fn to_dict<'py>(py: Python<'py>, set: &FeatureSet) -> PyResult<&'py PyDict> {
    let dict = PyDict::new(py);
    for (key, value) in set.iter() {
        dict.set_item(key, value)?;
    }
    Ok(dict)
}

fn frequency_config(
    features: Option<Vec<String>>,
    bands: Option<Vec<(String, f64, f64)>>,
    welch_segment: Option<usize>,
    nan_on_degenerate: bool,
) -> PyResult<FrequencyFeatureConfig> {
    let mut config = FrequencyFeatureConfig {
        welch_segment,
        policy: policy(nan_on_degenerate),
        ..FrequencyFeatureConfig::default()
    };
    if let Some(names) = features {
        config.features = parse_keys(names, SpectralFeature::from_key)?;
    }
    config.bands = bands
        .unwrap_or_default()
        .into_iter()
        .map(|(label, low, high)| FrequencyBand::new(label, low, high))
        .collect();
    Ok(config)
}

/// Time-domain features
///
/// Args:
///     signal: Input samples
///     sample_rate: Sample rate in Hz
///     features: Feature keys to compute (default: all)
///     entropy_bins: Histogram bins for Shannon entropy
///     nan_on_degenerate: Report NaN instead of raising ZeroDivisionError
#[pyfunction]
#[pyo3(signature = (signal, sample_rate=1.0, features=None, entropy_bins=10, nan_on_degenerate=false))]
pub fn time_features<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    sample_rate: f64,
    features: Option<Vec<String>>,
    entropy_bins: usize,
    nan_on_degenerate: bool,
) -> PyResult<&'py PyDict> {
    let mut config = TimeFeatureConfig {
        entropy_bins,
        policy: policy(nan_on_degenerate),
        ..TimeFeatureConfig::default()
    };
    if let Some(names) = features {
        config.features = parse_keys(names, TimeFeature::from_key)?;
    }

    let set = features::extract_time_features(&to_signal(&signal, sample_rate)?, &config)?;
    to_dict(py, &set)
}

/// RMS over sliding windows of `window` samples
#[pyfunction]
#[pyo3(signature = (signal, window, step=1))]
pub fn moving_rms<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    window: usize,
    step: usize,
) -> PyResult<&'py PyArray1<f64>> {
    let rms = features::moving_rms(&to_signal(&signal, 1.0)?, window, step)?;
    Ok(PyArray1::from_vec(py, rms))
}

/// Frequency-domain features
///
/// Args:
///     bands: List of (label, low_hz, high_hz) for band energies
///     welch_segment: Welch segment length; adds `psd_total` when given
#[pyfunction]
#[pyo3(signature = (signal, sample_rate=1.0, features=None, bands=None, welch_segment=None, nan_on_degenerate=false))]
pub fn frequency_features<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    sample_rate: f64,
    features: Option<Vec<String>>,
    bands: Option<Vec<(String, f64, f64)>>,
    welch_segment: Option<usize>,
    nan_on_degenerate: bool,
) -> PyResult<&'py PyDict> {
    let config = frequency_config(features, bands, welch_segment, nan_on_degenerate)?;
    let set = features::extract_frequency_features(&to_signal(&signal, sample_rate)?, &config)?;
    to_dict(py, &set)
}

/// Spectral features per STFT window
///
/// Returns:
///     (times, {feature: values}) with one value per window
#[pyfunction]
#[pyo3(signature = (
    signal,
    sample_rate=1.0,
    window_length=256,
    overlap=0.5,
    window_type=PyWindowType::Hann,
    features=None,
    bands=None,
    nan_on_degenerate=false
))]
#[allow(clippy::too_many_arguments)]
pub fn time_frequency_features<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    sample_rate: f64,
    window_length: usize,
    overlap: f64,
    window_type: PyWindowType,
    features: Option<Vec<String>>,
    bands: Option<Vec<(String, f64, f64)>>,
    nan_on_degenerate: bool,
) -> PyResult<(&'py PyArray1<f64>, &'py PyDict)> {
    let stft = StftConfig {
        window_length,
        overlap,
        window_type: window_type.into(),
    };
    let config = frequency_config(features, bands, None, nan_on_degenerate)?;

    let series =
        features::extract_time_frequency_features(&to_signal(&signal, sample_rate)?, &stft, &config)?;

    let dict = PyDict::new(py);
    for (key, values) in series.iter() {
        dict.set_item(key, PyArray1::from_slice(py, values))?;
    }
    Ok((PyArray1::from_slice(py, series.times()), dict))
}
