//! FFT engine using realfft for real-valued signals
//!
//! Produces the one-sided amplitude spectrum every frequency-domain feature
//! is computed from.

use crate::error::{Result, SignalError};
use crate::signal::Signal;
use num_complex::Complex64;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;
use tracing::trace;

/// One-sided spectrum of a real signal
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Bin frequencies in Hz, k * fs / N
    frequencies: Vec<f64>,

    /// Single-sided amplitude per bin
    magnitudes: Vec<f64>,

    /// Phase per bin in radians
    phases: Vec<f64>,
}

impl Spectrum {
    pub(crate) fn new(frequencies: Vec<f64>, magnitudes: Vec<f64>, phases: Vec<f64>) -> Self {
        debug_assert_eq!(frequencies.len(), magnitudes.len());
        debug_assert_eq!(frequencies.len(), phases.len());
        Self {
            frequencies,
            magnitudes,
            phases,
        }
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    pub fn phases(&self) -> &[f64] {
        &self.phases
    }

    /// Number of frequency bins
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Iterate over (frequency, magnitude) pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies
            .iter()
            .copied()
            .zip(self.magnitudes.iter().copied())
    }
}

/// FFT engine for real-valued signals
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Reusable input buffer (scratch, clobbered by each transform)
    input_buffer: Vec<f64>,

    /// Reusable output buffer (complex spectrum)
    output_buffer: Vec<Complex64>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples), at least 1
    pub fn new(fft_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        let input_buffer = r2c.make_input_vec();
        let output_buffer = r2c.make_output_vec();

        Self {
            fft_size,
            r2c,
            input_buffer,
            output_buffer,
        }
    }

    /// Compute the raw (unnormalized) one-sided transform
    ///
    /// # Arguments
    /// * `signal` - Input samples (zero-padded if shorter than fft_size,
    ///   truncated if longer)
    ///
    /// # Returns
    /// X[k] for k = 0..fft_size/2
    pub fn process(&mut self, signal: &[f64]) -> Result<&[Complex64]> {
        let copy_len = signal.len().min(self.fft_size);
        self.input_buffer[..copy_len].copy_from_slice(&signal[..copy_len]);
        self.input_buffer[copy_len..].fill(0.0);

        self.r2c
            .process(&mut self.input_buffer, &mut self.output_buffer)
            .map_err(|e| SignalError::invalid(format!("FFT processing failed: {e}")))?;

        Ok(&self.output_buffer)
    }

    /// Compute the single-sided amplitude spectrum
    ///
    /// `norm` is the amplitude normalization: `fft_size` for a plain
    /// transform, the window sum for a windowed one.
    pub fn compute_amplitude(&mut self, signal: &[f64], norm: f64) -> Result<Vec<f64>> {
        let fft_size = self.fft_size;
        let bins = self.process(signal)?;
        Ok(single_sided_amplitude(bins, fft_size, norm))
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Get number of frequency bins (fft_size/2 + 1 for real FFT)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Get frequency axis in Hz
    pub fn frequency_axis(&self, sample_rate: f64) -> Vec<f64> {
        bin_frequencies(self.fft_size, sample_rate)
    }
}

/// Bin centre frequencies of a one-sided spectrum of `fft_size` samples
pub fn bin_frequencies(fft_size: usize, sample_rate: f64) -> Vec<f64> {
    let bin_width = sample_rate / fft_size as f64;
    (0..fft_size / 2 + 1)
        .map(|bin| bin as f64 * bin_width)
        .collect()
}

/// Scale one-sided FFT bins to single-sided amplitudes
///
/// Every bin except DC and (for even sizes) Nyquist stands for a pair of
/// conjugate bins, so its magnitude is doubled.
pub(crate) fn single_sided_amplitude(bins: &[Complex64], fft_size: usize, norm: f64) -> Vec<f64> {
    let nyquist_bin = if fft_size % 2 == 0 {
        Some(fft_size / 2)
    } else {
        None
    };

    bins.iter()
        .enumerate()
        .map(|(k, c)| {
            let mag = c.norm() / norm;
            if k == 0 || Some(k) == nyquist_bin {
                mag
            } else {
                2.0 * mag
            }
        })
        .collect()
}

/// Compute the one-sided spectrum of a signal
///
/// Magnitudes are normalized by the signal length, so a sine of amplitude A
/// centred on a bin reports A regardless of N.
pub fn compute_fft(signal: &Signal) -> Result<Spectrum> {
    let n = signal.len();
    trace!(samples = n, sample_rate = signal.sample_rate(), "computing FFT");

    let mut engine = FftEngine::new(n);
    let bins = engine.process(signal.samples())?;

    let magnitudes = single_sided_amplitude(bins, n, n as f64);
    let phases = bins.iter().map(|c| c.arg()).collect();
    let frequencies = bin_frequencies(n, signal.sample_rate());

    Ok(Spectrum::new(frequencies, magnitudes, phases))
}
