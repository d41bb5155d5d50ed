//! IIR filtering: direct form II transposed, and forward-backward
//! (zero-phase) application with odd-extension padding

use super::butterworth::{design_butterworth, FilterCoefficients, FilterSpec};
use crate::error::{Result, SignalError};
use crate::signal::Signal;
use tracing::debug;

/// Filter `input` through b/a (normalized, `a[0] == 1`)
///
/// # Arguments
/// * `b`, `a` - Transfer function coefficients; the shorter is zero-extended
/// * `input` - Input samples
/// * `initial_state` - Optional delay-line state (length `max(len a, len b) - 1`)
pub fn lfilter(b: &[f64], a: &[f64], input: &[f64], initial_state: Option<&[f64]>) -> Vec<f64> {
    let taps = b.len().max(a.len());
    let coeff = |c: &[f64], i: usize| c.get(i).copied().unwrap_or(0.0);

    let mut state = vec![0.0; taps - 1];
    if let Some(zi) = initial_state {
        for (s, &z) in state.iter_mut().zip(zi) {
            *s = z;
        }
    }

    let mut output = Vec::with_capacity(input.len());
    for &x in input {
        let y = coeff(b, 0) * x + state.first().copied().unwrap_or(0.0);

        for i in 0..state.len() {
            let carry = state.get(i + 1).copied().unwrap_or(0.0);
            state[i] = coeff(b, i + 1) * x + carry - coeff(a, i + 1) * y;
        }

        output.push(y);
    }

    output
}

/// Steady-state delay-line values for a unit step input
///
/// Scaling by the first input sample starts the filter as if that value had
/// been applied forever, which suppresses the start-up transient.
pub fn lfilter_zi(coefficients: &FilterCoefficients) -> Result<Vec<f64>> {
    let (b, a) = (coefficients.b(), coefficients.a());
    let taps = b.len().max(a.len());
    if taps < 2 {
        return Ok(Vec::new());
    }

    let coeff = |c: &[f64], i: usize| c.get(i).copied().unwrap_or(0.0);

    let a_sum: f64 = a.iter().sum();
    if a_sum == 0.0 {
        return Err(SignalError::invalid("filter has a pole at z = 1 and no steady state"));
    }

    let b0 = coeff(b, 0);
    let forced: f64 = (1..taps).map(|k| coeff(b, k) - coeff(a, k) * b0).sum();

    let mut zi = vec![0.0; taps - 1];
    zi[0] = forced / a_sum;

    let mut partial_a = 1.0;
    let mut partial_forced = 0.0;
    for k in 1..taps - 1 {
        partial_a += coeff(a, k);
        partial_forced += coeff(b, k) - coeff(a, k) * b0;
        zi[k] = partial_a * zi[0] - partial_forced;
    }

    Ok(zi)
}

/// Number of samples mirrored onto each end before forward-backward filtering
pub fn padding_length(coefficients: &FilterCoefficients) -> usize {
    3 * coefficients.b().len().max(coefficients.a().len())
}

/// Zero-phase filtering: filter forward, then backward
///
/// The signal is extended on both ends by odd reflection so the edges start
/// in steady state. Output length and sample rate match the input.
///
/// # Errors
/// `InvalidInput` if the signal is not longer than [`padding_length`].
pub fn apply_filter(signal: &Signal, coefficients: &FilterCoefficients) -> Result<Signal> {
    let x = signal.samples();
    let n = x.len();
    let pad = padding_length(coefficients);

    if n <= pad {
        return Err(SignalError::invalid(format!(
            "signal of {n} samples is too short for a filter of order {} (needs more than {pad})",
            coefficients.order()
        )));
    }

    debug!(samples = n, order = coefficients.order(), pad, "zero-phase filtering");

    let zi = lfilter_zi(coefficients)?;
    let (b, a) = (coefficients.b(), coefficients.a());

    let extended = odd_extension(x, pad);
    let scaled = |z0: f64| zi.iter().map(|&z| z * z0).collect::<Vec<f64>>();

    let mut forward = lfilter(b, a, &extended, Some(&scaled(extended[0])));
    forward.reverse();

    let mut backward = lfilter(b, a, &forward, Some(&scaled(forward[0])));
    backward.reverse();

    signal.with_samples(backward[pad..pad + n].to_vec())
}

/// Design a Butterworth filter and apply it with zero phase
pub fn butterworth_filter(signal: &Signal, spec: &FilterSpec) -> Result<Signal> {
    if (spec.sample_rate - signal.sample_rate()).abs() > f64::EPSILON * signal.sample_rate() {
        return Err(SignalError::invalid(format!(
            "filter designed for {} Hz applied to a {} Hz signal",
            spec.sample_rate,
            signal.sample_rate()
        )));
    }

    let coefficients = design_butterworth(spec)?;
    apply_filter(signal, &coefficients)
}

/// Extend by `pad` samples at each end, reflecting through the end points
fn odd_extension(x: &[f64], pad: usize) -> Vec<f64> {
    let n = x.len();
    let (first, last) = (x[0], x[n - 1]);

    let mut extended = Vec::with_capacity(n + 2 * pad);
    extended.extend((1..=pad).rev().map(|i| 2.0 * first - x[i]));
    extended.extend_from_slice(x);
    extended.extend((1..=pad).map(|i| 2.0 * last - x[n - 1 - i]));
    extended
}
