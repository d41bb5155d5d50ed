//! Feature extraction over time, frequency and time-frequency representations

pub mod frequency_domain;
pub mod stats;
pub mod time_domain;
pub mod time_frequency;

pub use frequency_domain::{
    extract_frequency_features, FrequencyBand, FrequencyFeatureConfig, SpectralFeature,
};
pub use time_domain::{extract_time_features, moving_rms, TimeFeature, TimeFeatureConfig};
pub use time_frequency::extract_time_frequency_features;

use crate::error::{Result, SignalError};

/// What to report for a statistic whose denominator is exactly zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// Fail the whole extraction with `DivisionByZero`
    #[default]
    Fail,

    /// Report NaN for that feature and keep going
    Nan,
}

impl DegeneratePolicy {
    /// `numerator / denominator`, or the policy's outcome when the denominator is zero
    pub(crate) fn divide(self, feature: &str, numerator: f64, denominator: f64) -> Result<f64> {
        if denominator == 0.0 {
            self.degenerate(feature)
        } else {
            Ok(numerator / denominator)
        }
    }

    /// The policy's outcome for an undefined statistic
    pub(crate) fn degenerate(self, feature: &str) -> Result<f64> {
        match self {
            DegeneratePolicy::Fail => Err(SignalError::division_by_zero(feature)),
            DegeneratePolicy::Nan => Ok(f64::NAN),
        }
    }
}

/// Named scalar features from one extractor run
///
/// Entries keep the order they were computed in; lookups are by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    entries: Vec<(String, f64)>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feature; a name already present keeps its first value
    pub(crate) fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        if self.get(&name).is_none() {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|&(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(key, value)| (key.as_str(), *value))
    }
}

/// Named per-window feature sequences, aligned to window centre times
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSeries {
    times: Vec<f64>,
    entries: Vec<(String, Vec<f64>)>,
}

impl FeatureSeries {
    /// Build from per-window feature sets (all sharing one key set)
    pub(crate) fn from_windows(times: Vec<f64>, windows: Vec<FeatureSet>) -> Self {
        let mut entries: Vec<(String, Vec<f64>)> = windows
            .first()
            .map(|set| {
                set.keys()
                    .map(|key| (key.to_string(), Vec::with_capacity(windows.len())))
                    .collect()
            })
            .unwrap_or_default();

        for set in &windows {
            for (key, values) in entries.iter_mut() {
                values.push(set.get(key).unwrap_or(f64::NAN));
            }
        }

        Self { times, entries }
    }

    /// Window centre times in seconds
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Number of time windows
    pub fn num_windows(&self) -> usize {
        self.times.len()
    }
}
