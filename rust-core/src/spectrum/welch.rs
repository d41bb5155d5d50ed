//! Welch power spectral density estimate
//!
//! Averages Hann-windowed periodograms of half-overlapping segments.

use super::fft::{bin_frequencies, FftEngine};
use super::windowing::window_power;
use crate::error::{Result, SignalError};
use crate::filters::windows::{generate_window, WindowType};
use crate::signal::Signal;
use tracing::trace;

/// One-sided power spectral density
#[derive(Debug, Clone, PartialEq)]
pub struct Psd {
    /// Bin frequencies in Hz
    pub frequencies: Vec<f64>,

    /// Power density per bin (units²/Hz)
    pub density: Vec<f64>,
}

impl Psd {
    /// Sum of the density over all bins
    pub fn total(&self) -> f64 {
        self.density.iter().sum()
    }
}

/// Estimate the PSD with Welch's method
///
/// # Arguments
/// * `signal` - Input signal
/// * `segment_length` - Samples per segment; clamped to the signal length
pub fn welch_psd(signal: &Signal, segment_length: usize) -> Result<Psd> {
    if segment_length == 0 {
        return Err(SignalError::invalid("Welch segment length must be at least 1"));
    }

    let nperseg = segment_length.min(signal.len());
    let step = nperseg - nperseg / 2;
    let num_segments = (signal.len() - nperseg) / step + 1;

    let window = generate_window(WindowType::Hann, nperseg);
    let power = window_power(&window);
    if power <= 0.0 {
        return Err(SignalError::invalid(format!(
            "Welch segment of {nperseg} samples has a zero-power window"
        )));
    }
    let scale = 1.0 / (signal.sample_rate() * power);

    trace!(nperseg, step, num_segments, "Welch PSD");

    let mut engine = FftEngine::new(nperseg);
    let mut density = vec![0.0; engine.num_bins()];
    let mut frame = vec![0.0; nperseg];

    for s in 0..num_segments {
        let segment = &signal.samples()[s * step..s * step + nperseg];
        let mean = segment.iter().sum::<f64>() / nperseg as f64;

        for ((f, &x), &w) in frame.iter_mut().zip(segment).zip(&window) {
            *f = (x - mean) * w;
        }

        let bins = engine.process(&frame)?;
        for (d, c) in density.iter_mut().zip(bins) {
            *d += c.norm_sqr();
        }
    }

    let nyquist_bin = (nperseg % 2 == 0).then_some(nperseg / 2);
    for (k, d) in density.iter_mut().enumerate() {
        *d *= scale / num_segments as f64;
        if k != 0 && Some(k) != nyquist_bin {
            *d *= 2.0;
        }
    }

    Ok(Psd {
        frequencies: bin_frequencies(nperseg, signal.sample_rate()),
        density,
    })
}
