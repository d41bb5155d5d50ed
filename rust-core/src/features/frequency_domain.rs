//! Frequency-domain features of the single-sided amplitude spectrum
//!
//! Centroid, spread, skewness and kurtosis treat the magnitudes as weights of
//! a distribution over the bin frequencies. Magnitudes below
//! [`SPECTRAL_NOISE_FLOOR`] of the peak carry no weight, so FFT rounding
//! residue cannot turn a single-bin spectrum into a wide one. A spectrum
//! concentrated in one bin has no defined skewness or kurtosis and follows
//! the degenerate policy.

use super::stats::Moments;
use super::{DegeneratePolicy, FeatureSet};
use crate::error::{Result, SignalError};
use crate::signal::Signal;
use crate::spectrum::fft::compute_fft;
use crate::spectrum::welch::welch_psd;
use tracing::debug;

/// Magnitude, relative to the spectral peak, below which a bin carries no
/// weight in the shape statistics
pub const SPECTRAL_NOISE_FLOOR: f64 = 1e-12;

/// Spectral feature catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpectralFeature {
    Mean,
    Rms,
    PeakFrequency,
    PeakMagnitude,
    Centroid,
    Spread,
    Skewness,
    Kurtosis,
    Energy,
}

impl SpectralFeature {
    pub const ALL: [SpectralFeature; 9] = [
        SpectralFeature::Mean,
        SpectralFeature::Rms,
        SpectralFeature::PeakFrequency,
        SpectralFeature::PeakMagnitude,
        SpectralFeature::Centroid,
        SpectralFeature::Spread,
        SpectralFeature::Skewness,
        SpectralFeature::Kurtosis,
        SpectralFeature::Energy,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SpectralFeature::Mean => "spectral_mean",
            SpectralFeature::Rms => "spectral_rms",
            SpectralFeature::PeakFrequency => "peak_frequency",
            SpectralFeature::PeakMagnitude => "peak_magnitude",
            SpectralFeature::Centroid => "spectral_centroid",
            SpectralFeature::Spread => "spectral_spread",
            SpectralFeature::Skewness => "spectral_skewness",
            SpectralFeature::Kurtosis => "spectral_kurtosis",
            SpectralFeature::Energy => "spectral_energy",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

/// Named frequency band `[low, high)` in Hz
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyBand {
    pub label: String,
    pub low: f64,
    pub high: f64,
}

impl FrequencyBand {
    pub fn new(label: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            label: label.into(),
            low,
            high,
        }
    }

    /// Output key of the band's energy
    pub fn key(&self) -> String {
        format!("band_energy_{}", self.label)
    }

    pub fn contains(&self, frequency: f64) -> bool {
        self.low <= frequency && frequency < self.high
    }
}

/// Frequency-domain extraction configuration
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyFeatureConfig {
    /// Spectral features to compute, in output order
    pub features: Vec<SpectralFeature>,

    /// Bands whose energy is reported after the spectral features
    pub bands: Vec<FrequencyBand>,

    /// Welch segment length; `Some` adds `psd_total`
    pub welch_segment: Option<usize>,

    pub policy: DegeneratePolicy,
}

impl Default for FrequencyFeatureConfig {
    fn default() -> Self {
        Self {
            features: SpectralFeature::ALL.to_vec(),
            bands: Vec::new(),
            welch_segment: None,
            policy: DegeneratePolicy::Fail,
        }
    }
}

impl FrequencyFeatureConfig {
    pub fn with_features(features: &[SpectralFeature]) -> Self {
        Self {
            features: features.to_vec(),
            ..Self::default()
        }
    }

    pub fn with_bands(mut self, bands: Vec<FrequencyBand>) -> Self {
        self.bands = bands;
        self
    }

    /// Reject inverted, negative or non-finite bands and duplicate labels
    pub fn validate(&self) -> Result<()> {
        for (i, band) in self.bands.iter().enumerate() {
            if !band.low.is_finite() || !band.high.is_finite() || band.low < 0.0 {
                return Err(SignalError::invalid(format!(
                    "band '{}' has invalid bounds [{}, {})",
                    band.label, band.low, band.high
                )));
            }
            if band.low >= band.high {
                return Err(SignalError::invalid(format!(
                    "band '{}' low edge {} Hz must be below high edge {} Hz",
                    band.label, band.low, band.high
                )));
            }
            if self.bands[..i].iter().any(|b| b.label == band.label) {
                return Err(SignalError::invalid(format!(
                    "duplicate band label '{}'",
                    band.label
                )));
            }
        }

        if self.welch_segment == Some(0) {
            return Err(SignalError::invalid("Welch segment length must be at least 1"));
        }

        Ok(())
    }
}

/// Compute the configured spectral features of `signal`
///
/// # Errors
/// `InvalidInput` for invalid bands. Under [`DegeneratePolicy::Fail`],
/// `DivisionByZero` for the shape statistics of an all-zero spectrum, and
/// for skewness/kurtosis of a spectrum concentrated in a single bin (a
/// constant signal, or a bin-centred tone).
pub fn extract_frequency_features(signal: &Signal, config: &FrequencyFeatureConfig) -> Result<FeatureSet> {
    config.validate()?;

    let spectrum = compute_fft(signal)?;
    debug!(
        bins = spectrum.len(),
        features = config.features.len(),
        bands = config.bands.len(),
        "extracting frequency-domain features"
    );

    let mut set = spectral_features(spectrum.frequencies(), spectrum.magnitudes(), config)?;

    if let Some(segment) = config.welch_segment {
        set.insert("psd_total", welch_psd(signal, segment)?.total());
    }

    Ok(set)
}

/// Spectral features of one magnitude vector over `frequencies`
///
/// Bands are not validated here; callers validate the config once.
pub(crate) fn spectral_features(
    frequencies: &[f64],
    magnitudes: &[f64],
    config: &FrequencyFeatureConfig,
) -> Result<FeatureSet> {
    let policy = config.policy;
    let n = magnitudes.len() as f64;
    let energy: f64 = magnitudes.iter().map(|m| m * m).sum();
    let floor = SPECTRAL_NOISE_FLOOR * magnitudes.iter().fold(0.0, |acc: f64, &m| acc.max(m));
    let weights: Vec<f64> = magnitudes
        .iter()
        .map(|&m| if m > floor { m } else { 0.0 })
        .collect();
    let distribution = Moments::weighted(frequencies, &weights);

    let shape = |feature: SpectralFeature| -> Result<f64> {
        let key = feature.key();
        let Some(m) = distribution else {
            return policy.degenerate(key);
        };
        match feature {
            SpectralFeature::Centroid => Ok(m.mean),
            SpectralFeature::Spread => Ok(m.std_dev()),
            SpectralFeature::Skewness => m.skewness(policy, key),
            _ => m.kurtosis(policy, key),
        }
    };

    let mut set = FeatureSet::new();
    for &feature in &config.features {
        let value = match feature {
            SpectralFeature::Mean => magnitudes.iter().sum::<f64>() / n,
            SpectralFeature::Rms => (energy / n).sqrt(),
            SpectralFeature::PeakFrequency => peak(magnitudes).map_or(f64::NAN, |k| frequencies[k]),
            SpectralFeature::PeakMagnitude => peak(magnitudes).map_or(f64::NAN, |k| magnitudes[k]),
            SpectralFeature::Energy => energy,
            SpectralFeature::Centroid
            | SpectralFeature::Spread
            | SpectralFeature::Skewness
            | SpectralFeature::Kurtosis => shape(feature)?,
        };
        set.insert(feature.key(), value);
    }

    for band in &config.bands {
        let band_energy: f64 = frequencies
            .iter()
            .zip(magnitudes)
            .filter(|(f, _)| band.contains(**f))
            .map(|(_, m)| m * m)
            .sum();
        set.insert(band.key(), band_energy);
    }

    Ok(set)
}

/// Index of the largest magnitude; the lowest bin wins ties
fn peak(magnitudes: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (k, &m) in magnitudes.iter().enumerate() {
        match best {
            Some(b) if m <= magnitudes[b] => {}
            _ => best = Some(k),
        }
    }
    best
}
