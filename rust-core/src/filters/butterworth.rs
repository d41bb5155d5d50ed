//! Butterworth IIR filter design
//!
//! Analog prototype → frequency transformation → pre-warped bilinear
//! transform → transfer function, all in zero-pole-gain form until the end.
//! Frequencies are normalized so that Nyquist = 1 during design.

use crate::error::{Result, SignalError};
use num_complex::Complex64;
use std::f64::consts::PI;
use tracing::debug;

/// Sample rate of the normalized design domain (Nyquist = 1)
const DESIGN_FS: f64 = 2.0;

/// Filter response type and its cutoff frequencies in Hz
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    LowPass { cutoff: f64 },
    HighPass { cutoff: f64 },
    BandPass { low: f64, high: f64 },
}

/// Butterworth filter specification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    /// Response type and cutoffs (Hz)
    pub kind: FilterKind,

    /// Filter order (prototype pole count); a band-pass doubles it
    pub order: usize,

    /// Sample rate in Hz
    pub sample_rate: f64,
}

impl FilterSpec {
    pub fn lowpass(order: usize, cutoff: f64, sample_rate: f64) -> Self {
        Self {
            kind: FilterKind::LowPass { cutoff },
            order,
            sample_rate,
        }
    }

    pub fn highpass(order: usize, cutoff: f64, sample_rate: f64) -> Self {
        Self {
            kind: FilterKind::HighPass { cutoff },
            order,
            sample_rate,
        }
    }

    pub fn bandpass(order: usize, low: f64, high: f64, sample_rate: f64) -> Self {
        Self {
            kind: FilterKind::BandPass { low, high },
            order,
            sample_rate,
        }
    }

    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    /// Check order, sample rate and cutoffs
    pub fn validate(&self) -> Result<()> {
        if self.order < 1 {
            return Err(SignalError::invalid("filter order must be at least 1"));
        }
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(SignalError::invalid(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }

        match self.kind {
            FilterKind::LowPass { cutoff } | FilterKind::HighPass { cutoff } => {
                self.check_cutoff(cutoff)
            }
            FilterKind::BandPass { low, high } => {
                self.check_cutoff(low)?;
                self.check_cutoff(high)?;
                if low >= high {
                    return Err(SignalError::invalid(format!(
                        "band-pass low cutoff {low} Hz must be below high cutoff {high} Hz"
                    )));
                }
                Ok(())
            }
        }
    }

    fn check_cutoff(&self, cutoff: f64) -> Result<()> {
        let nyquist = self.nyquist();
        if !(cutoff > 0.0 && cutoff < nyquist) {
            return Err(SignalError::invalid(format!(
                "cutoff {cutoff} Hz must lie strictly between 0 and Nyquist ({nyquist} Hz)"
            )));
        }
        Ok(())
    }

    /// Cutoff normalized to Nyquist and pre-warped to the analog domain
    fn warp(&self, cutoff: f64) -> f64 {
        let normalized = cutoff / self.nyquist();
        2.0 * DESIGN_FS * (PI * normalized / DESIGN_FS).tan()
    }
}

/// Transfer function coefficients, `a[0] == 1`
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCoefficients {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl FilterCoefficients {
    /// Create from numerator and denominator, normalizing so `a[0] == 1`
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Result<Self> {
        let a0 = match a.first() {
            Some(&a0) if a0 != 0.0 && a0.is_finite() => a0,
            _ => return Err(SignalError::invalid("denominator must start with a non-zero coefficient")),
        };
        if b.is_empty() {
            return Err(SignalError::invalid("numerator must not be empty"));
        }

        Ok(Self {
            b: b.iter().map(|&c| c / a0).collect(),
            a: a.iter().map(|&c| c / a0).collect(),
        })
    }

    /// Numerator (feed-forward) coefficients
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Denominator (feedback) coefficients
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Filter order (degree of the longer polynomial)
    pub fn order(&self) -> usize {
        self.b.len().max(self.a.len()) - 1
    }

    /// Complex response H(e^jω) at `frequency` Hz
    pub fn frequency_response(&self, frequency: f64, sample_rate: f64) -> Complex64 {
        let omega = 2.0 * PI * frequency / sample_rate;
        let eval = |coeffs: &[f64]| {
            coeffs
                .iter()
                .enumerate()
                .fold(Complex64::new(0.0, 0.0), |acc, (k, &c)| {
                    acc + c * Complex64::from_polar(1.0, -omega * k as f64)
                })
        };
        eval(&self.b) / eval(&self.a)
    }

    /// |H(e^jω)| at `frequency` Hz
    pub fn magnitude_response(&self, frequency: f64, sample_rate: f64) -> f64 {
        self.frequency_response(frequency, sample_rate).norm()
    }
}

/// Zero-pole-gain representation used during design
struct Zpk {
    zeros: Vec<Complex64>,
    poles: Vec<Complex64>,
    gain: f64,
}

/// Design a digital Butterworth filter
///
/// # Errors
/// `InvalidInput` if the order is 0 or a cutoff is not strictly between
/// 0 and Nyquist (or the band is inverted).
pub fn design_butterworth(spec: &FilterSpec) -> Result<FilterCoefficients> {
    spec.validate()?;

    let prototype = analog_prototype(spec.order);
    let analog = match spec.kind {
        FilterKind::LowPass { cutoff } => lowpass_to_lowpass(prototype, spec.warp(cutoff)),
        FilterKind::HighPass { cutoff } => lowpass_to_highpass(prototype, spec.warp(cutoff)),
        FilterKind::BandPass { low, high } => {
            let (wl, wh) = (spec.warp(low), spec.warp(high));
            lowpass_to_bandpass(prototype, (wl * wh).sqrt(), wh - wl)
        }
    };

    let digital = bilinear(analog);
    let b: Vec<f64> = poly(&digital.zeros)
        .iter()
        .map(|c| c.re * digital.gain)
        .collect();
    let a: Vec<f64> = poly(&digital.poles).iter().map(|c| c.re).collect();

    debug!(kind = ?spec.kind, order = spec.order, taps = b.len(), "designed Butterworth filter");

    FilterCoefficients::new(b, a)
}

/// Unit-cutoff analog Butterworth prototype: N poles on the left unit half-circle
fn analog_prototype(order: usize) -> Zpk {
    let n = order as f64;
    let poles = (0..order)
        .map(|k| {
            let m = -n + 1.0 + 2.0 * k as f64;
            -Complex64::from_polar(1.0, PI * m / (2.0 * n))
        })
        .collect();

    Zpk {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    }
}

fn lowpass_to_lowpass(proto: Zpk, wo: f64) -> Zpk {
    let degree = (proto.poles.len() - proto.zeros.len()) as i32;
    Zpk {
        zeros: proto.zeros.iter().map(|&z| z * wo).collect(),
        poles: proto.poles.iter().map(|&p| p * wo).collect(),
        gain: proto.gain * wo.powi(degree),
    }
}

fn lowpass_to_highpass(proto: Zpk, wo: f64) -> Zpk {
    let degree = proto.poles.len() - proto.zeros.len();

    let num: Complex64 = proto.zeros.iter().map(|&z| -z).product();
    let den: Complex64 = proto.poles.iter().map(|&p| -p).product();

    let mut zeros: Vec<Complex64> = proto.zeros.iter().map(|&z| wo / z).collect();
    zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));

    Zpk {
        zeros,
        poles: proto.poles.iter().map(|&p| wo / p).collect(),
        gain: proto.gain * (num / den).re,
    }
}

fn lowpass_to_bandpass(proto: Zpk, wo: f64, bw: f64) -> Zpk {
    let degree = (proto.poles.len() - proto.zeros.len()) as i32;

    let split = |roots: &[Complex64]| -> Vec<Complex64> {
        let scaled: Vec<Complex64> = roots.iter().map(|&r| r * bw / 2.0).collect();
        let offset: Vec<Complex64> = scaled.iter().map(|&r| (r * r - wo * wo).sqrt()).collect();
        scaled
            .iter()
            .zip(&offset)
            .map(|(&r, &d)| r + d)
            .chain(scaled.iter().zip(&offset).map(|(&r, &d)| r - d))
            .collect()
    };

    let mut zeros = split(&proto.zeros);
    zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree as usize));

    Zpk {
        zeros,
        poles: split(&proto.poles),
        gain: proto.gain * bw.powi(degree),
    }
}

/// Bilinear transform s → 2·fs·(z − 1)/(z + 1); excess poles get zeros at z = −1
fn bilinear(analog: Zpk) -> Zpk {
    let fs2 = Complex64::new(2.0 * DESIGN_FS, 0.0);
    let degree = analog.poles.len() - analog.zeros.len();

    let mut zeros: Vec<Complex64> = analog.zeros.iter().map(|&z| (fs2 + z) / (fs2 - z)).collect();
    zeros.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(degree));

    let num: Complex64 = analog.zeros.iter().map(|&z| fs2 - z).product();
    let den: Complex64 = analog.poles.iter().map(|&p| fs2 - p).product();

    Zpk {
        zeros,
        poles: analog.poles.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect(),
        gain: analog.gain * (num / den).re,
    }
}

/// Monic polynomial with the given roots, highest power first
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        let mut next = coeffs.clone();
        next.push(Complex64::new(0.0, 0.0));
        for (i, &c) in coeffs.iter().enumerate() {
            next[i + 1] -= root * c;
        }
        coeffs = next;
    }
    coeffs
}
