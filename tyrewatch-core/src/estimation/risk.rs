//! Cliff Risk Mapping
//!
//! Maps a degradation estimate onto the probability that the tyre is about
//! to fall off its performance cliff:
//!
//! ```text
//! p = 1 / (1 + exp(-k·(x - x₀)))
//! ```
//!
//! `x₀` is the cliff threshold (p = 0.5 there) and `k > 0` the steepness.
//! Far from the threshold `exp` saturates: an overflow to infinity yields
//! exactly 0.0, an underflow to zero yields exactly 1.0. Both are accepted
//! outputs, never errors.
//!
//! The mapping is pure. Identical inputs give bit-identical outputs.

use crate::{
    constants::risk::{DEFAULT_CLIFF_STEEPNESS, DEFAULT_CLIFF_THRESHOLD_S},
    errors::{require_finite, require_positive, EstimatorError, EstimatorResult},
};

/// Immutable logistic curve parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RiskParameters {
    threshold: f64,
    steepness: f64,
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CLIFF_THRESHOLD_S,
            steepness: DEFAULT_CLIFF_STEEPNESS,
        }
    }
}

impl RiskParameters {
    /// Validate and create a risk curve
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `steepness <= 0` or either value is not finite.
    /// A non-positive steepness would flatten or invert the curve.
    pub fn new(threshold: f64, steepness: f64) -> EstimatorResult<Self> {
        Ok(Self {
            threshold: require_finite("threshold", threshold)?,
            steepness: require_positive("steepness", steepness)?,
        })
    }

    /// Degradation value where the probability crosses 0.5
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Sharpness of the transition
    #[inline]
    pub fn steepness(&self) -> f64 {
        self.steepness
    }

    /// Cliff probability for a degradation estimate
    ///
    /// # Errors
    ///
    /// `InvalidMeasurement` if `mean` is NaN. Infinite means saturate to
    /// 0.0 or 1.0.
    pub fn probability(&self, mean: f64) -> EstimatorResult<f64> {
        if mean.is_nan() {
            return Err(EstimatorError::InvalidMeasurement { value: mean });
        }
        Ok(logistic(self.steepness * (mean - self.threshold)))
    }
}

/// Cliff probability with one-off parameters
///
/// Validates `threshold` and `steepness` on every call; prefer
/// [`RiskParameters::probability`] inside a loop.
pub fn risk_probability(mean: f64, threshold: f64, steepness: f64) -> EstimatorResult<f64> {
    RiskParameters::new(threshold, steepness)?.probability(mean)
}

// Monotone in z: exp, the addition and the reciprocal all round monotonically.
#[inline]
fn logistic(z: f64) -> f64 {
    1.0 / (1.0 + libm::exp(-z))
}
