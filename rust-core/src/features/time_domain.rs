//! Time-domain features computed directly from the raw samples

use super::stats::Moments;
use super::{DegeneratePolicy, FeatureSet};
use crate::error::{Result, SignalError};
use crate::signal::Signal;
use tracing::debug;

/// Default histogram bin count for Shannon entropy
pub const DEFAULT_ENTROPY_BINS: usize = 10;

/// Time-domain feature catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFeature {
    Mean,
    Rms,
    StandardDeviation,
    Variance,
    Peak,
    PeakToPeak,
    CrestFactor,
    Skewness,
    Kurtosis,
    ShapeFactor,
    ImpulseFactor,
    ClearanceFactor,
    LineIntegral,
    ShannonEntropy,
}

impl TimeFeature {
    pub const ALL: [TimeFeature; 14] = [
        TimeFeature::Mean,
        TimeFeature::Rms,
        TimeFeature::StandardDeviation,
        TimeFeature::Variance,
        TimeFeature::Peak,
        TimeFeature::PeakToPeak,
        TimeFeature::CrestFactor,
        TimeFeature::Skewness,
        TimeFeature::Kurtosis,
        TimeFeature::ShapeFactor,
        TimeFeature::ImpulseFactor,
        TimeFeature::ClearanceFactor,
        TimeFeature::LineIntegral,
        TimeFeature::ShannonEntropy,
    ];

    /// Output key of the feature
    pub fn key(self) -> &'static str {
        match self {
            TimeFeature::Mean => "mean",
            TimeFeature::Rms => "rms",
            TimeFeature::StandardDeviation => "std",
            TimeFeature::Variance => "variance",
            TimeFeature::Peak => "peak",
            TimeFeature::PeakToPeak => "peak_to_peak",
            TimeFeature::CrestFactor => "crest_factor",
            TimeFeature::Skewness => "skewness",
            TimeFeature::Kurtosis => "kurtosis",
            TimeFeature::ShapeFactor => "shape_factor",
            TimeFeature::ImpulseFactor => "impulse_factor",
            TimeFeature::ClearanceFactor => "clearance_factor",
            TimeFeature::LineIntegral => "line_integral",
            TimeFeature::ShannonEntropy => "shannon_entropy",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// One-line description for display by a host
    pub fn description(self) -> &'static str {
        match self {
            TimeFeature::Mean => "Arithmetic mean of the samples",
            TimeFeature::Rms => "Root mean square: magnitude of a varying signal",
            TimeFeature::StandardDeviation => "Population standard deviation",
            TimeFeature::Variance => "Population variance: spread of the sample values",
            TimeFeature::Peak => "Maximum absolute value",
            TimeFeature::PeakToPeak => "Difference between the maximum and minimum values",
            TimeFeature::CrestFactor => "Peak value divided by RMS",
            TimeFeature::Skewness => "Asymmetry of the sample distribution",
            TimeFeature::Kurtosis => "Excess kurtosis: tailedness of the sample distribution",
            TimeFeature::ShapeFactor => "RMS divided by the mean absolute value",
            TimeFeature::ImpulseFactor => "Peak value divided by the mean absolute value",
            TimeFeature::ClearanceFactor => "Peak value divided by the mean root-absolute value",
            TimeFeature::LineIntegral => {
                "Integral of the signal over time in seconds (Simpson's rule, spacing 1/fs); \
                 multiply by the sample rate for the integral over sample index"
            }
            TimeFeature::ShannonEntropy => "Entropy of the sample histogram in bits",
        }
    }
}

/// Time-domain extraction configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFeatureConfig {
    /// Features to compute, in output order
    pub features: Vec<TimeFeature>,

    /// Histogram bins for Shannon entropy
    pub entropy_bins: usize,

    /// Outcome for zero-denominator statistics
    pub policy: DegeneratePolicy,
}

impl Default for TimeFeatureConfig {
    fn default() -> Self {
        Self {
            features: TimeFeature::ALL.to_vec(),
            entropy_bins: DEFAULT_ENTROPY_BINS,
            policy: DegeneratePolicy::Fail,
        }
    }
}

impl TimeFeatureConfig {
    /// Only the given features, default parameters otherwise
    pub fn with_features(features: &[TimeFeature]) -> Self {
        Self {
            features: features.to_vec(),
            ..Self::default()
        }
    }
}

/// Quantities shared between several features, computed in one pass
struct Summary {
    moments: Moments,
    rms: f64,
    peak: f64,
    min: f64,
    max: f64,
    mean_abs: f64,
    mean_sqrt_abs: f64,
}

impl Summary {
    fn of(samples: &[f64]) -> Option<Self> {
        let moments = Moments::of(samples)?;
        let n = samples.len() as f64;

        let mut sum_sq = 0.0;
        let mut sum_abs = 0.0;
        let mut sum_sqrt_abs = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for &x in samples {
            sum_sq += x * x;
            sum_abs += x.abs();
            sum_sqrt_abs += x.abs().sqrt();
            min = min.min(x);
            max = max.max(x);
        }

        Some(Self {
            moments,
            rms: (sum_sq / n).sqrt(),
            peak: min.abs().max(max.abs()),
            min,
            max,
            mean_abs: sum_abs / n,
            mean_sqrt_abs: sum_sqrt_abs / n,
        })
    }
}

/// Compute the configured time-domain features of `signal`
///
/// # Errors
/// `DivisionByZero` for crest/shape/impulse/clearance factors of an all-zero
/// signal, or skewness/kurtosis of a constant one, under
/// [`DegeneratePolicy::Fail`]. `InvalidInput` for zero entropy bins.
pub fn extract_time_features(signal: &Signal, config: &TimeFeatureConfig) -> Result<FeatureSet> {
    let samples = signal.samples();
    let summary = Summary::of(samples)
        .ok_or_else(|| SignalError::invalid("signal must contain at least one sample"))?;
    let policy = config.policy;

    debug!(
        samples = samples.len(),
        features = config.features.len(),
        "extracting time-domain features"
    );

    let mut set = FeatureSet::new();
    for &feature in &config.features {
        let key = feature.key();
        let value = match feature {
            TimeFeature::Mean => summary.moments.mean,
            TimeFeature::Rms => summary.rms,
            TimeFeature::StandardDeviation => summary.moments.std_dev(),
            TimeFeature::Variance => summary.moments.variance(),
            TimeFeature::Peak => summary.peak,
            TimeFeature::PeakToPeak => summary.max - summary.min,
            TimeFeature::CrestFactor => policy.divide(key, summary.peak, summary.rms)?,
            TimeFeature::Skewness => summary.moments.skewness(policy, key)?,
            TimeFeature::Kurtosis => summary.moments.kurtosis(policy, key)?,
            TimeFeature::ShapeFactor => policy.divide(key, summary.rms, summary.mean_abs)?,
            TimeFeature::ImpulseFactor => policy.divide(key, summary.peak, summary.mean_abs)?,
            TimeFeature::ClearanceFactor => policy.divide(key, summary.peak, summary.mean_sqrt_abs)?,
            TimeFeature::LineIntegral => simpson(samples, 1.0 / signal.sample_rate()),
            TimeFeature::ShannonEntropy => shannon_entropy(samples, config.entropy_bins)?,
        };
        set.insert(key, value);
    }

    Ok(set)
}

/// RMS over sliding windows
///
/// A window longer than the signal is shrunk to the signal length and a
/// zero step advances by one sample.
pub fn moving_rms(signal: &Signal, window: usize, step: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(SignalError::invalid("RMS window must be at least 1 sample"));
    }

    let samples = signal.samples();
    let window = window.min(samples.len());
    let step = step.max(1);

    Ok((0..=samples.len() - window)
        .step_by(step)
        .map(|start| {
            let frame = &samples[start..start + window];
            (frame.iter().map(|x| x * x).sum::<f64>() / window as f64).sqrt()
        })
        .collect())
}

/// Composite Simpson integral of equally spaced samples
///
/// An even sample count integrates the last interval with a quadratic
/// through the final three points.
pub fn simpson(y: &[f64], dx: f64) -> f64 {
    let n = y.len();
    match n {
        0 | 1 => 0.0,
        2 => dx * (y[0] + y[1]) / 2.0,
        _ if n % 2 == 1 => {
            let interior: f64 = y[1..n - 1]
                .iter()
                .enumerate()
                .map(|(i, &v)| if i % 2 == 0 { 4.0 * v } else { 2.0 * v })
                .sum();
            dx / 3.0 * (y[0] + interior + y[n - 1])
        }
        _ => {
            let head = simpson(&y[..n - 1], dx);
            let tail = dx * (5.0 / 12.0 * y[n - 1] + 2.0 / 3.0 * y[n - 2] - 1.0 / 12.0 * y[n - 3]);
            head + tail
        }
    }
}

/// Shannon entropy (bits) of a density-normalized histogram
pub fn shannon_entropy(samples: &[f64], bins: usize) -> Result<f64> {
    if bins == 0 {
        return Err(SignalError::invalid("entropy histogram needs at least one bin"));
    }
    if samples.is_empty() {
        return Err(SignalError::invalid("signal must contain at least one sample"));
    }

    let mut lo = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &x in samples {
        let idx = (((x - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let norm = samples.len() as f64 * width;
    Ok(-counts
        .iter()
        .map(|&c| {
            let density = c as f64 / norm;
            density * (density + f64::EPSILON).log2()
        })
        .sum::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_signal() -> Signal {
        Signal::new(vec![0.0, 1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0], 8.0).unwrap()
    }

    #[test]
    fn test_reference_sequence() {
        let set = extract_time_features(&reference_signal(), &TimeFeatureConfig::default()).unwrap();

        assert_eq!(set.len(), TimeFeature::ALL.len());
        assert!((set.get("rms").unwrap() - 0.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(set.get("peak"), Some(1.0));
        assert!((set.get("crest_factor").unwrap() - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(set.get("mean"), Some(0.0));
        assert_eq!(set.get("peak_to_peak"), Some(2.0));
        assert!((set.get("variance").unwrap() - 0.5).abs() < 1e-12);
        assert!(set.get("skewness").unwrap().abs() < 1e-12);
        // m4 / m2² = 0.5 / 0.25 = 2
        assert!((set.get("kurtosis").unwrap() + 1.0).abs() < 1e-12);
        assert!((set.get("impulse_factor").unwrap() - 2.0).abs() < 1e-12);
        assert!((set.get("shape_factor").unwrap() - 2f64.sqrt()).abs() < 1e-12);
        // peak / mean(sqrt|x|) = 1 / 0.5
        assert!((set.get("clearance_factor").unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_signal() {
        let config = TimeFeatureConfig::with_features(&[
            TimeFeature::Rms,
            TimeFeature::CrestFactor,
            TimeFeature::StandardDeviation,
        ]);

        for c in [2.5, -3.0] {
            let signal = Signal::new(vec![c; 64], 10.0).unwrap();
            let set = extract_time_features(&signal, &config).unwrap();

            assert!((set.get("rms").unwrap() - c.abs()).abs() < 1e-12);
            assert!((set.get("crest_factor").unwrap() - 1.0).abs() < 1e-12);
            assert!(set.get("std").unwrap().abs() < 1e-12);
            assert_eq!(set.len(), 3);
        }
    }

    #[test]
    fn test_zero_signal_degenerate_policy() {
        let signal = Signal::new(vec![0.0; 16], 1.0).unwrap();

        let strict = TimeFeatureConfig::with_features(&[TimeFeature::Rms, TimeFeature::CrestFactor]);
        let err = extract_time_features(&signal, &strict).unwrap_err();
        assert_eq!(
            err,
            SignalError::DivisionByZero {
                feature: "crest_factor".into()
            }
        );

        let lenient = TimeFeatureConfig {
            policy: DegeneratePolicy::Nan,
            ..TimeFeatureConfig::default()
        };
        let set = extract_time_features(&signal, &lenient).unwrap();
        assert_eq!(set.get("rms"), Some(0.0));
        for key in ["crest_factor", "shape_factor", "impulse_factor", "clearance_factor", "skewness", "kurtosis"] {
            assert!(set.get(key).unwrap().is_nan(), "{} should be NaN", key);
        }
    }

    #[test]
    fn test_constant_signal_skewness_fails_strictly() {
        let signal = Signal::new(vec![1.0; 16], 1.0).unwrap();
        let config = TimeFeatureConfig::with_features(&[TimeFeature::Skewness]);
        assert!(matches!(
            extract_time_features(&signal, &config),
            Err(SignalError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_simpson_exact_for_quadratics() {
        let odd: Vec<f64> = (0..5).map(|x| (x * x) as f64).collect();
        assert!((simpson(&odd, 1.0) - 64.0 / 3.0).abs() < 1e-12);

        let even: Vec<f64> = (0..4).map(|x| (x * x) as f64).collect();
        assert!((simpson(&even, 1.0) - 9.0).abs() < 1e-12);

        assert_eq!(simpson(&[3.0], 1.0), 0.0);
        assert_eq!(simpson(&[1.0, 3.0], 0.5), 1.0);
    }

    #[test]
    fn test_clearance_factor_is_peak_over_mean_root() {
        // sqrt|x| = [1, 2, 3] → mean 2, peak 9
        let signal = Signal::new(vec![1.0, -4.0, 9.0], 1.0).unwrap();
        let config = TimeFeatureConfig::with_features(&[TimeFeature::ClearanceFactor]);
        let set = extract_time_features(&signal, &config).unwrap();

        assert!((set.get("clearance_factor").unwrap() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_line_integral_scales_with_sample_rate() {
        let config = TimeFeatureConfig::with_features(&[TimeFeature::LineIntegral]);
        let samples: Vec<f64> = (0..5).map(|x| (x * x) as f64).collect();

        let per_index = extract_time_features(&Signal::new(samples.clone(), 1.0).unwrap(), &config)
            .unwrap()
            .get("line_integral")
            .unwrap();
        let per_second = extract_time_features(&Signal::new(samples, 4.0).unwrap(), &config)
            .unwrap()
            .get("line_integral")
            .unwrap();

        assert!((per_index - 64.0 / 3.0).abs() < 1e-12);
        assert!((per_second * 4.0 - per_index).abs() < 1e-12);
        assert!(TimeFeature::LineIntegral.description().contains("1/fs"));
    }

    #[test]
    fn test_line_integral_uses_sample_spacing() {
        let signal = Signal::new(vec![2.0; 101], 100.0).unwrap();
        let config = TimeFeatureConfig::with_features(&[TimeFeature::LineIntegral]);
        let set = extract_time_features(&signal, &config).unwrap();

        // 2.0 over one second
        assert!((set.get("line_integral").unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_shannon_entropy() {
        // Two equally populated bins of width 0.5 → densities 1.0 → entropy ≈ 0
        let two_level = [0.0, 0.0, 1.0, 1.0];
        assert!(shannon_entropy(&two_level, 2).unwrap().abs() < 1e-9);

        // Uniform over 4 bins of width 0.25: density 1 everywhere → entropy ≈ 0
        let spread = [0.0, 0.3, 0.6, 1.0];
        assert!(shannon_entropy(&spread, 4).unwrap().abs() < 1e-9);

        // Concentrated mass has negative differential entropy
        let peaked = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        assert!(shannon_entropy(&peaked, 10).unwrap() < 0.0);

        assert!(shannon_entropy(&two_level, 0).is_err());
        assert!(shannon_entropy(&[5.0; 4], 10).unwrap().is_finite());
    }

    #[test]
    fn test_moving_rms() {
        let signal = Signal::new(vec![1.0, -1.0, 3.0, -3.0, 0.0, 0.0], 1.0).unwrap();

        let rms = moving_rms(&signal, 2, 2).unwrap();
        assert_eq!(rms, vec![1.0, 3.0, 0.0]);

        // Oversized window shrinks to the whole signal
        let whole = moving_rms(&signal, 100, 1).unwrap();
        assert_eq!(whole.len(), 1);
        assert!((whole[0] - (20.0f64 / 6.0).sqrt()).abs() < 1e-12);

        // Zero step behaves as one
        assert_eq!(moving_rms(&signal, 5, 0).unwrap().len(), 2);
        assert!(moving_rms(&signal, 0, 1).is_err());
    }

    #[test]
    fn test_feature_keys_round_trip() {
        for feature in TimeFeature::ALL {
            assert_eq!(TimeFeature::from_key(feature.key()), Some(feature));
            assert!(!feature.description().is_empty());
        }
        assert_eq!(TimeFeature::from_key("bogus"), None);
    }
}
