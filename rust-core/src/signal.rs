//! Sampled signal representation
//!
//! A `Signal` is the uniform input every transform and extractor consumes:
//! finite samples plus the rate they were taken at.

use crate::error::{Result, SignalError};

/// Sample rate assumed when the caller does not supply one
pub const DEFAULT_SAMPLE_RATE: f64 = 1.0;

/// Immutable sampled signal
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: f64,
}

impl Signal {
    /// Create a signal, validating its invariants
    ///
    /// # Errors
    /// `InvalidInput` if `samples` is empty, contains a non-finite value,
    /// or `sample_rate` is not a finite positive number.
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> Result<Self> {
        if samples.is_empty() {
            return Err(SignalError::invalid("signal must contain at least one sample"));
        }
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SignalError::invalid(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }
        if let Some(idx) = samples.iter().position(|s| !s.is_finite()) {
            return Err(SignalError::invalid(format!(
                "sample {idx} is not a finite number"
            )));
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Create a signal sampled at [`DEFAULT_SAMPLE_RATE`]
    pub fn with_default_rate(samples: Vec<f64>) -> Result<Self> {
        Self::new(samples, DEFAULT_SAMPLE_RATE)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Nyquist frequency in Hz
    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    /// Build a new signal with the same rate from derived samples
    pub(crate) fn with_samples(&self, samples: Vec<f64>) -> Result<Self> {
        Self::new(samples, self.sample_rate)
    }

    /// Extract the samples between `start` and `end` seconds
    ///
    /// `end` past the last sample is clamped to the signal length.
    ///
    /// # Errors
    /// `InvalidInput` if `start >= end`, `start` is negative, or the range
    /// selects no samples.
    pub fn slice_seconds(&self, start: f64, end: f64) -> Result<Self> {
        if !(start < end) || start < 0.0 {
            return Err(SignalError::invalid(format!(
                "invalid time range [{start}, {end}) s"
            )));
        }

        let start_idx = (start * self.sample_rate) as usize;
        let end_idx = ((end * self.sample_rate) as usize).min(self.samples.len());
        if start_idx >= end_idx {
            return Err(SignalError::invalid(format!(
                "time range [{start}, {end}) s selects no samples"
            )));
        }

        self.with_samples(self.samples[start_idx..end_idx].to_vec())
    }

    /// Split into equally sized, possibly overlapping segments
    ///
    /// A trailing partial segment is dropped.
    pub fn segments(&self, config: &SegmentConfig) -> Result<Vec<Signal>> {
        let (length, step) = config.resolve(self)?;

        (0..=self.samples.len() - length)
            .step_by(step)
            .map(|start| self.with_samples(self.samples[start..start + length].to_vec()))
            .collect()
    }
}

/// Segmentation parameters for segment-wise feature tables
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentConfig {
    /// Segment length in seconds
    pub segment_seconds: f64,

    /// Overlap between consecutive segments in percent, `[0, 100)`
    pub overlap_percent: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            segment_seconds: 1.0,
            overlap_percent: 0.0,
        }
    }
}

impl SegmentConfig {
    /// Resolve to (segment length, step) in samples for `signal`
    fn resolve(&self, signal: &Signal) -> Result<(usize, usize)> {
        if !(self.segment_seconds > 0.0) {
            return Err(SignalError::invalid(format!(
                "segment size must be positive, got {} s",
                self.segment_seconds
            )));
        }
        if !(0.0..100.0).contains(&self.overlap_percent) {
            return Err(SignalError::invalid(format!(
                "overlap must be in [0, 100) percent, got {}",
                self.overlap_percent
            )));
        }
        if signal.sample_rate() < 1.0 {
            return Err(SignalError::invalid(format!(
                "segmentation needs a sample rate of at least 1 Hz, got {}",
                signal.sample_rate()
            )));
        }

        let length = (self.segment_seconds * signal.sample_rate()) as usize;
        if length == 0 || length > signal.len() {
            return Err(SignalError::invalid(format!(
                "segment of {length} samples does not fit a signal of {} samples",
                signal.len()
            )));
        }

        let step = ((length as f64 * (1.0 - self.overlap_percent / 100.0)) as usize).max(1);
        Ok((length, step))
    }
}
