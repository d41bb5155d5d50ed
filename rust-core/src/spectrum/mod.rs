//! Spectral transforms: FFT, STFT, envelope and Welch PSD

pub mod envelope;
pub mod fft;
pub mod stft;
pub mod welch;
pub mod windowing;

pub use envelope::{compute_envelope, envelope_spectrum};
pub use fft::{compute_fft, FftEngine, Spectrum};
pub use stft::{compute_stft, compute_stft_with, StftConfig, TimeFrequencyGrid};
pub use welch::{welch_psd, Psd};
pub use windowing::apply_window;
