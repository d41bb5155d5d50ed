//! Windowing applied to time-domain frames before the FFT

/// Multiply a frame by a precomputed window of the same length
///
/// Extra samples on either side are dropped.
pub fn apply_window(frame: &[f64], window: &[f64]) -> Vec<f64> {
    frame.iter().zip(window).map(|(&s, &w)| s * w).collect()
}

/// Sum of window coefficients
///
/// A bin-centred unit tone windowed by `window` reports this raw FFT
/// magnitude, so dividing by it restores the tone amplitude.
pub fn coherent_gain(window: &[f64]) -> f64 {
    window.iter().sum()
}

/// Sum of squared window coefficients (power normalization for PSD estimates)
pub fn window_power(window: &[f64]) -> f64 {
    window.iter().map(|&w| w * w).sum()
}
