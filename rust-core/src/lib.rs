//! Signal Features - Time-Series Transform and Feature Extraction Core
//!
//! FFT, STFT, Hilbert envelope, Butterworth filtering and time, frequency and
//! time-frequency feature extraction over sampled signals, with optional
//! Python bindings.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod adapter;
pub mod error;
pub mod features;
pub mod filters;
pub mod signal;
pub mod spectrum;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use error::{Result, SignalError};
pub use features::{DegeneratePolicy, FeatureSeries, FeatureSet};
pub use filters::{FilterSpec, WindowType};
pub use signal::{SegmentConfig, Signal};
pub use spectrum::{Spectrum, TimeFrequencyGrid};
