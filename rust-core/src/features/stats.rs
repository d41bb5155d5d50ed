//! Central moments shared by the time- and frequency-domain extractors
//!
//! Skewness and kurtosis are the biased (population) estimators; kurtosis is
//! reported as excess kurtosis (0 for a normal distribution).

use super::DegeneratePolicy;
use crate::error::Result;

/// Spread, relative to the value scale, below which a distribution is a single point
pub const FLAT_TOLERANCE: f64 = 1e-10;

/// Mean and central moments 2..=4 of a (weighted) distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub m2: f64,
    pub m3: f64,
    pub m4: f64,

    /// Largest absolute value on the axis the moments were taken over
    pub scale: f64,
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

impl Moments {
    /// Unweighted moments of `values`; `None` for an empty slice
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for &x in values {
            let d = x - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }

        Some(Self {
            mean,
            m2: m2 / n,
            m3: m3 / n,
            m4: m4 / n,
            scale: max_abs(values),
        })
    }

    /// Moments of `values` weighted by `weights`; `None` if the weights sum to zero
    pub fn weighted(values: &[f64], weights: &[f64]) -> Option<Self> {
        let total: f64 = weights.iter().sum();
        if total == 0.0 || values.is_empty() {
            return None;
        }

        let mean = values
            .iter()
            .zip(weights)
            .map(|(&x, &w)| x * w)
            .sum::<f64>()
            / total;

        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for (&x, &w) in values.iter().zip(weights) {
            let d = x - mean;
            let d2 = d * d;
            m2 += w * d2;
            m3 += w * d2 * d;
            m4 += w * d2 * d2;
        }

        Some(Self {
            mean,
            m2: m2 / total,
            m3: m3 / total,
            m4: m4 / total,
            scale: max_abs(values),
        })
    }

    pub fn variance(&self) -> f64 {
        self.m2
    }

    pub fn std_dev(&self) -> f64 {
        self.m2.sqrt()
    }

    /// Spread negligible against the value scale
    ///
    /// Rounding in the mean leaves a constant distribution with a spread of
    /// a few ulps, so exact zero is not required.
    pub fn is_flat(&self) -> bool {
        self.std_dev() <= FLAT_TOLERANCE * self.scale
    }

    pub fn skewness(&self, policy: DegeneratePolicy, feature: &str) -> Result<f64> {
        if self.is_flat() {
            return policy.degenerate(feature);
        }
        Ok(self.m3 / self.m2.powf(1.5))
    }

    pub fn kurtosis(&self, policy: DegeneratePolicy, feature: &str) -> Result<f64> {
        if self.is_flat() {
            return policy.degenerate(feature);
        }
        Ok(self.m4 / (self.m2 * self.m2) - 3.0)
    }
}
