//! Spectral features tracked over STFT windows

use super::frequency_domain::{spectral_features, FrequencyFeatureConfig};
use super::FeatureSeries;
use crate::error::Result;
use crate::signal::Signal;
use crate::spectrum::stft::{compute_stft_with, StftConfig};
use tracing::debug;

/// Apply the frequency-domain formulas to every STFT window
///
/// Returns one sequence per feature key aligned to the window centre times.
/// `psd_total` has no per-window meaning and is never emitted here.
pub fn extract_time_frequency_features(
    signal: &Signal,
    stft: &StftConfig,
    config: &FrequencyFeatureConfig,
) -> Result<FeatureSeries> {
    config.validate()?;

    let grid = compute_stft_with(signal, stft)?;
    debug!(
        windows = grid.num_windows(),
        bins = grid.num_bins(),
        "extracting time-frequency features"
    );

    let windows = grid
        .magnitudes()
        .rows()
        .into_iter()
        .map(|row| spectral_features(grid.frequencies(), &row.to_vec(), config))
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureSeries::from_windows(grid.times().to_vec(), windows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SignalError;
    use crate::features::{FrequencyBand, SpectralFeature};
    use std::f64::consts::PI;

    /// 100 Hz for the first half, 250 Hz for the second
    fn chirp_step(fs: f64, n: usize) -> Signal {
        let samples = (0..n)
            .map(|i| {
                let freq = if i < n / 2 { 100.0 } else { 250.0 };
                (2.0 * PI * freq * i as f64 / fs).sin()
            })
            .collect();
        Signal::new(samples, fs).unwrap()
    }

    #[test]
    fn test_peak_frequency_tracks_tone_change() {
        let signal = chirp_step(1000.0, 2000);
        let config = FrequencyFeatureConfig::with_features(&[
            SpectralFeature::PeakFrequency,
            SpectralFeature::Centroid,
        ]);

        let series =
            extract_time_frequency_features(&signal, &StftConfig::new(200, 0.0), &config).unwrap();

        assert_eq!(series.num_windows(), 10);
        let peaks = series.get("peak_frequency").unwrap();
        assert!(peaks[..5].iter().all(|&f| f == 100.0));
        assert!(peaks[5..].iter().all(|&f| f == 250.0));

        let centroids = series.get("spectral_centroid").unwrap();
        assert!((centroids[0] - 100.0).abs() < 10.0);
        assert!((centroids[9] - 250.0).abs() < 10.0);

        assert!((series.times()[0] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_welch_total_skipped_per_window() {
        let signal = chirp_step(1000.0, 1000);
        let config = FrequencyFeatureConfig {
            welch_segment: Some(100),
            ..FrequencyFeatureConfig::with_features(&[SpectralFeature::Energy])
        }
        .with_bands(vec![FrequencyBand::new("upper", 200.0, 300.0)]);

        let series =
            extract_time_frequency_features(&signal, &StftConfig::new(100, 0.5), &config).unwrap();

        assert_eq!(
            series.keys().collect::<Vec<_>>(),
            vec!["spectral_energy", "band_energy_upper"]
        );
        assert_eq!(series.get("band_energy_upper").unwrap().len(), series.num_windows());
    }

    #[test]
    fn test_invalid_parameters() {
        let signal = chirp_step(1000.0, 500);
        let config = FrequencyFeatureConfig::default();

        assert!(matches!(
            extract_time_frequency_features(&signal, &StftConfig::new(1000, 0.0), &config),
            Err(SignalError::InvalidInput(_))
        ));
        assert!(matches!(
            extract_time_frequency_features(&signal, &StftConfig::new(100, 1.0), &config),
            Err(SignalError::InvalidInput(_))
        ));

        let inverted = config.with_bands(vec![FrequencyBand::new("bad", 50.0, 10.0)]);
        assert!(matches!(
            extract_time_frequency_features(&signal, &StftConfig::new(100, 0.0), &inverted),
            Err(SignalError::InvalidInput(_))
        ));
    }
}
