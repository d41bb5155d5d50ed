//! Short-time Fourier transform
//!
//! Slides a window over the signal and stacks the amplitude spectrum of each
//! frame into a (time window, frequency bin) grid.

use super::fft::{bin_frequencies, FftEngine};
use super::windowing::{apply_window, coherent_gain};
use crate::error::{Result, SignalError};
use crate::filters::windows::{generate_window, WindowType};
use crate::signal::Signal;
use ndarray::{Array2, ArrayView1};
use tracing::debug;

/// STFT configuration
#[derive(Debug, Clone, PartialEq)]
pub struct StftConfig {
    /// Frame length in samples
    pub window_length: usize,

    /// Fraction of a frame shared with the next one, `[0, 1)`
    pub overlap: f64,

    /// Analysis window
    pub window_type: WindowType,
}

impl Default for StftConfig {
    fn default() -> Self {
        Self {
            window_length: 256,
            overlap: 0.5,
            window_type: WindowType::Hann,
        }
    }
}

impl StftConfig {
    pub fn new(window_length: usize, overlap: f64) -> Self {
        Self {
            window_length,
            overlap,
            ..Self::default()
        }
    }

    /// Hop between consecutive frames in samples (never 0)
    pub fn hop(&self) -> usize {
        ((self.window_length as f64 * (1.0 - self.overlap)) as usize).max(1)
    }

    /// Number of complete frames that fit a signal of `signal_len` samples
    ///
    /// 0 when the frame is empty or longer than the signal.
    pub fn num_windows(&self, signal_len: usize) -> usize {
        if self.window_length == 0 {
            return 0;
        }
        signal_len
            .checked_sub(self.window_length)
            .map_or(0, |spare| spare / self.hop() + 1)
    }

    fn validate(&self, signal_len: usize) -> Result<()> {
        if !(0.0..1.0).contains(&self.overlap) {
            return Err(SignalError::invalid(format!(
                "overlap fraction must be in [0, 1), got {}",
                self.overlap
            )));
        }
        if self.window_length == 0 {
            return Err(SignalError::invalid("window length must be at least 1 sample"));
        }
        if self.window_length > signal_len {
            return Err(SignalError::invalid(format!(
                "window length {} exceeds signal length {}",
                self.window_length, signal_len
            )));
        }
        Ok(())
    }
}

/// Magnitudes over (time window, frequency bin)
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFrequencyGrid {
    magnitudes: Array2<f64>,
    times: Vec<f64>,
    frequencies: Vec<f64>,
}

impl TimeFrequencyGrid {
    /// Magnitude grid, rows are time windows, columns frequency bins
    pub fn magnitudes(&self) -> &Array2<f64> {
        &self.magnitudes
    }

    /// Window centre times in seconds
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Bin frequencies in Hz
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn num_windows(&self) -> usize {
        self.magnitudes.nrows()
    }

    pub fn num_bins(&self) -> usize {
        self.magnitudes.ncols()
    }

    /// Amplitude spectrum of one time window
    pub fn window_spectrum(&self, index: usize) -> ArrayView1<'_, f64> {
        self.magnitudes.row(index)
    }
}

/// Compute the STFT with a Hann window
///
/// # Arguments
/// * `signal` - Input signal
/// * `window_length` - Frame length in samples, at most the signal length
/// * `overlap` - Overlap fraction in `[0, 1)`
pub fn compute_stft(signal: &Signal, window_length: usize, overlap: f64) -> Result<TimeFrequencyGrid> {
    compute_stft_with(signal, &StftConfig::new(window_length, overlap))
}

/// Compute the STFT with an explicit configuration
pub fn compute_stft_with(signal: &Signal, config: &StftConfig) -> Result<TimeFrequencyGrid> {
    config.validate(signal.len())?;

    let length = config.window_length;
    let hop = config.hop();
    let num_windows = config.num_windows(signal.len());
    let sample_rate = signal.sample_rate();

    debug!(
        samples = signal.len(),
        window_length = length,
        hop,
        num_windows,
        window = ?config.window_type,
        "computing STFT"
    );

    let window = generate_window(config.window_type, length);
    let window_sum = coherent_gain(&window);
    if window_sum <= 0.0 {
        return Err(SignalError::invalid(format!(
            "{:?} window of length {} has zero gain",
            config.window_type, length
        )));
    }

    let mut engine = FftEngine::new(length);
    let mut magnitudes = Array2::zeros((num_windows, engine.num_bins()));
    let mut times = Vec::with_capacity(num_windows);

    for (w, mut row) in magnitudes.rows_mut().into_iter().enumerate() {
        let start = w * hop;
        let frame = apply_window(&signal.samples()[start..start + length], &window);
        let amplitude = engine.compute_amplitude(&frame, window_sum)?;

        for (cell, value) in row.iter_mut().zip(amplitude) {
            *cell = value;
        }
        times.push((start as f64 + length as f64 / 2.0) / sample_rate);
    }

    Ok(TimeFrequencyGrid {
        magnitudes,
        times,
        frequencies: bin_frequencies(length, sample_rate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone(freq: f64, fs: f64, n: usize) -> Signal {
        let samples = (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / fs).sin())
            .collect();
        Signal::new(samples, fs).unwrap()
    }

    #[test]
    fn test_num_windows_without_room() {
        let config = StftConfig::new(256, 0.5);
        assert_eq!(config.num_windows(100), 0);
        assert_eq!(config.num_windows(256), 1);
        assert_eq!(config.num_windows(384), 2);
        assert_eq!(StftConfig::new(0, 0.0).num_windows(10), 0);
    }

    #[test]
    fn test_window_count_without_overlap() {
        let n = 1024;
        let signal = tone(50.0, 1000.0, n);
        let grid = compute_stft(&signal, n / 4, 0.0).unwrap();

        assert_eq!(grid.num_windows(), 4);
        assert_eq!(grid.num_bins(), n / 8 + 1);
        assert_eq!(grid.times().len(), 4);
        assert_eq!(grid.frequencies().len(), grid.num_bins());
    }

    #[test]
    fn test_window_count_with_overlap() {
        let signal = tone(50.0, 1000.0, 1000);
        let grid = compute_stft(&signal, 200, 0.5).unwrap();

        // hop 100: starts 0, 100, ..., 800
        assert_eq!(grid.num_windows(), 9);
        assert!((grid.times()[0] - 0.1).abs() < 1e-12);
        assert!((grid.times()[1] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_peak_bin_tracks_tone() {
        let fs = 1024.0;
        let signal = tone(64.0, fs, 2048);
        let grid = compute_stft(&signal, 256, 0.5).unwrap();

        // 4 Hz bins: the 64 Hz tone sits on bin 16
        for w in 0..grid.num_windows() {
            let row = grid.window_spectrum(w);
            let (peak, &mag) = row
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
                .unwrap();
            assert_eq!(peak, 16);
            assert!((mag - 1.0).abs() < 1e-6, "amplitude {}", mag);
        }
    }

    #[test]
    fn test_gaussian_window_variant() {
        let signal = tone(64.0, 1024.0, 1024);
        let config = StftConfig {
            window_length: 128,
            overlap: 0.25,
            window_type: WindowType::Gaussian,
        };
        let grid = compute_stft_with(&signal, &config).unwrap();
        assert_eq!(grid.num_windows(), (1024 - 128) / 96 + 1);
    }

    #[test]
    fn test_invalid_parameters() {
        let signal = tone(10.0, 100.0, 64);

        assert!(matches!(
            compute_stft(&signal, 65, 0.0),
            Err(SignalError::InvalidInput(_))
        ));
        assert!(compute_stft(&signal, 0, 0.0).is_err());
        assert!(compute_stft(&signal, 16, 1.0).is_err());
        assert!(compute_stft(&signal, 16, -0.1).is_err());
    }

    #[test]
    fn test_zero_gain_window_rejected() {
        let signal = tone(10.0, 100.0, 64);
        // A one-sample periodic Hann window is identically zero
        assert!(compute_stft(&signal, 1, 0.0).is_err());
    }
}
