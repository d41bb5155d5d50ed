//! Window functions, Butterworth IIR design and zero-phase filtering

pub mod butterworth;
pub mod filtfilt;
pub mod windows;

pub use butterworth::{design_butterworth, FilterCoefficients, FilterKind, FilterSpec};
pub use filtfilt::{apply_filter, butterworth_filter, lfilter};
pub use windows::{generate_window, WindowType};
