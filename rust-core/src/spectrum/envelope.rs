//! Hilbert-transform envelope and envelope analysis
//!
//! The analytic signal is formed in the frequency domain: negative
//! frequencies are zeroed and positive ones doubled, then transformed back.

use super::fft::{compute_fft, Spectrum};
use crate::error::{Result, SignalError};
use crate::signal::Signal;
use rustfft::{num_complex::Complex, FftPlanner};
use tracing::debug;

/// Compute the analytic signal x + j·H{x}
pub fn analytic_signal(samples: &[f64]) -> Vec<Complex<f64>> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    let ifft = planner.plan_fft_inverse(n);

    let mut buffer: Vec<Complex<f64>> = samples.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft.process(&mut buffer);

    // h[0] = 1, h[N/2] = 1 (even N), positive bins 2, negative bins 0
    let positive_end = (n + 1) / 2;
    for (k, bin) in buffer.iter_mut().enumerate() {
        let weight = if k == 0 || (n % 2 == 0 && k == n / 2) {
            1.0
        } else if k < positive_end {
            2.0
        } else {
            0.0
        };
        *bin *= weight;
    }

    ifft.process(&mut buffer);

    // IFFT normalization
    let scale = 1.0 / n as f64;
    for value in buffer.iter_mut() {
        *value *= scale;
    }

    buffer
}

/// Compute the amplitude envelope |x + j·H{x}|
///
/// Output has the same length and sample rate as the input.
pub fn compute_envelope(signal: &Signal) -> Result<Signal> {
    let envelope = analytic_signal(signal.samples())
        .iter()
        .map(|c| c.norm())
        .collect();
    signal.with_samples(envelope)
}

/// Keep only the spectral content between `low` and `high` Hz
///
/// Bins `floor(low/Δf) ..= floor(high/Δf)` and their negative-frequency
/// mirrors survive; the real part of the inverse transform is returned.
pub fn band_limit(signal: &Signal, low: f64, high: f64) -> Result<Signal> {
    validate_band(signal, low, high)?;

    let n = signal.len();
    let bin_width = signal.sample_rate() / n as f64;
    let idx_low = (low / bin_width) as usize;
    let idx_high = ((high / bin_width) as usize).min(n / 2);

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    let ifft = planner.plan_fft_inverse(n);

    let mut buffer: Vec<Complex<f64>> = signal
        .samples()
        .iter()
        .map(|&x| Complex::new(x, 0.0))
        .collect();
    fft.process(&mut buffer);

    let mut kept = vec![Complex::new(0.0, 0.0); n];
    for k in idx_low..=idx_high {
        kept[k] = buffer[k];
        if k > 0 {
            kept[n - k] = buffer[n - k];
        }
    }

    ifft.process(&mut kept);

    let scale = 1.0 / n as f64;
    signal.with_samples(kept.iter().map(|c| c.re * scale).collect())
}

/// Envelope analysis: spectrum of the envelope of an optionally band-limited signal
///
/// # Arguments
/// * `signal` - Input signal
/// * `band` - Optional `(low, high)` Hz band isolated before demodulation
pub fn envelope_spectrum(signal: &Signal, band: Option<(f64, f64)>) -> Result<Spectrum> {
    debug!(samples = signal.len(), ?band, "envelope analysis");

    let source = match band {
        Some((low, high)) => band_limit(signal, low, high)?,
        None => signal.clone(),
    };

    let envelope = compute_envelope(&source)?;
    compute_fft(&envelope)
}

fn validate_band(signal: &Signal, low: f64, high: f64) -> Result<()> {
    if !(low >= 0.0) || !(low < high) || !(high <= signal.nyquist()) {
        return Err(SignalError::invalid(format!(
            "band [{low}, {high}] Hz must satisfy 0 <= low < high <= {} Hz",
            signal.nyquist()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_envelope_of_pure_tone_is_flat() {
        let fs = 1000.0;
        let samples: Vec<f64> = (0..1000)
            .map(|n| 2.0 * (2.0 * PI * 50.0 * n as f64 / fs).cos())
            .collect();
        let signal = Signal::new(samples, fs).unwrap();

        let envelope = compute_envelope(&signal).unwrap();

        assert_eq!(envelope.len(), signal.len());
        assert_eq!(envelope.sample_rate(), fs);
        assert!(envelope.samples().iter().all(|&e| (e - 2.0).abs() < 1e-9));
    }

    #[test]
    fn test_analytic_signal_real_part_is_input() {
        let samples = vec![0.3, -1.2, 4.0, 0.0, 2.5, -0.7, 1.1];
        let analytic = analytic_signal(&samples);

        for (x, z) in samples.iter().zip(analytic.iter()) {
            assert!((x - z.re).abs() < 1e-12);
        }
    }

    #[test]
    fn test_envelope_spectrum_recovers_modulation() {
        // 200 Hz carrier amplitude-modulated at 10 Hz
        let fs = 1000.0;
        let samples: Vec<f64> = (0..1000)
            .map(|n| {
                let t = n as f64 / fs;
                (1.0 + 0.5 * (2.0 * PI * 10.0 * t).cos()) * (2.0 * PI * 200.0 * t).cos()
            })
            .collect();
        let signal = Signal::new(samples, fs).unwrap();

        let spectrum = envelope_spectrum(&signal, Some((150.0, 250.0))).unwrap();

        // DC carries the mean envelope, bin 10 the modulation depth
        assert!((spectrum.magnitudes()[0] - 1.0).abs() < 1e-6);
        assert!((spectrum.magnitudes()[10] - 0.5).abs() < 1e-6);
        assert!(spectrum.magnitudes()[200] < 1e-6);
    }

    #[test]
    fn test_band_limit_removes_out_of_band_tone() {
        let fs = 1000.0;
        let samples: Vec<f64> = (0..1000)
            .map(|n| {
                let t = n as f64 / fs;
                (2.0 * PI * 20.0 * t).sin() + (2.0 * PI * 300.0 * t).sin()
            })
            .collect();
        let signal = Signal::new(samples, fs).unwrap();

        let limited = band_limit(&signal, 250.0, 350.0).unwrap();
        let spectrum = compute_fft(&limited).unwrap();

        assert!(spectrum.magnitudes()[20] < 1e-9);
        assert!((spectrum.magnitudes()[300] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_band() {
        let signal = Signal::new(vec![0.0; 100], 100.0).unwrap();

        assert!(matches!(
            envelope_spectrum(&signal, Some((20.0, 10.0))),
            Err(SignalError::InvalidInput(_))
        ));
        assert!(envelope_spectrum(&signal, Some((10.0, 10.0))).is_err());
        assert!(envelope_spectrum(&signal, Some((-1.0, 10.0))).is_err());
        assert!(envelope_spectrum(&signal, Some((10.0, 60.0))).is_err());
    }
}
