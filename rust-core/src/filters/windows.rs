//! Window functions for spectral analysis
//!
//! All windows are generated DFT-even (periodic): the sample that would close
//! the symmetric window is left off, which is what the STFT and Welch
//! estimators expect of a window that tiles the signal.

use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/M)
    /// Sidelobe attenuation: ~31 dB, falls off quickly
    #[default]
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/M)
    /// Sidelobe attenuation: ~43 dB
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/M) + 0.08*cos(4πn/M)
    /// Sidelobe attenuation: ~58 dB, wide mainlobe
    Blackman,

    /// Gaussian window with σ = M/3 samples
    Gaussian,

    /// Rectangular window (no windowing)
    Rectangular,
}

impl WindowType {
    /// Standard deviation, in samples, of the Gaussian window of length `length`
    pub fn gaussian_std(length: usize) -> f64 {
        length as f64 / 3.0
    }
}

/// Generate window coefficients
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (M)
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..M-1
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    let m = length as f64;

    match window_type {
        WindowType::Hann => (0..length)
            .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f64 / m).cos())
            .collect(),

        WindowType::Hamming => (0..length)
            .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f64 / m).cos())
            .collect(),

        WindowType::Blackman => (0..length)
            .map(|n| {
                let angle = 2.0 * PI * n as f64 / m;
                0.42 - 0.5 * angle.cos() + 0.08 * (2.0 * angle).cos()
            })
            .collect(),

        WindowType::Gaussian => {
            let sigma = WindowType::gaussian_std(length);
            let center = m / 2.0;
            (0..length)
                .map(|n| {
                    let x = (n as f64 - center) / sigma;
                    (-0.5 * x * x).exp()
                })
                .collect()
        }

        WindowType::Rectangular => vec![1.0; length],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_generation() {
        let length = 160;

        for window_type in [
            WindowType::Hann,
            WindowType::Hamming,
            WindowType::Blackman,
            WindowType::Gaussian,
        ] {
            let window = generate_window(window_type, length);
            assert_eq!(window.len(), length);

            // Peak of a periodic window sits at M/2
            let center = length / 2;
            assert!((window[center] - 1.0).abs() < 1e-10, "{:?}", window_type);

            // Periodic symmetry: w[n] == w[M-n]
            for n in 1..length / 2 {
                let diff = (window[n] - window[length - n]).abs();
                assert!(diff < 1e-10, "{:?} not symmetric at {}", window_type, n);
            }
        }
    }

    #[test]
    fn test_hann_starts_at_zero() {
        let hann = generate_window(WindowType::Hann, 64);
        assert!(hann[0].abs() < 1e-12);

        // Hamming should have non-zero endpoints (0.08)
        let hamming = generate_window(WindowType::Hamming, 64);
        assert!(hamming[0] > 0.07 && hamming[0] < 0.09);
    }

    #[test]
    fn test_rectangular_window() {
        let window = generate_window(WindowType::Rectangular, 100);
        assert_eq!(window.len(), 100);
        assert!(window.iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_single_sample_window_is_finite() {
        for window_type in [WindowType::Hann, WindowType::Gaussian] {
            let window = generate_window(window_type, 1);
            assert_eq!(window.len(), 1);
            assert!(window[0].is_finite());
        }
    }
}
