//! Scalar Kalman Filter for Tyre Degradation
//!
//! ## Overview
//!
//! The hidden quantity is the lap-time loss caused by tyre wear. It drifts
//! upward by a known amount per lap and is observed through noisy lap-time
//! deltas. A one-dimensional Kalman filter keeps a Gaussian belief
//! `(mean, variance)` about it and refines that belief every lap.
//!
//! ### 1. Prediction Step
//! ```text
//! State prediction:      x̂ₖ|ₖ₋₁ = xₖ₋₁ + d
//! Variance prediction:   Pₖ|ₖ₋₁ = Pₖ₋₁ + Q
//! ```
//!
//! ### 2. Update Step
//! ```text
//! Kalman gain:     Kₖ = Pₖ|ₖ₋₁ / (Pₖ|ₖ₋₁ + R)
//! State update:    x̂ₖ = x̂ₖ|ₖ₋₁ + Kₖ·(zₖ - x̂ₖ|ₖ₋₁)
//! Variance:        Pₖ = (1 - Kₖ)·Pₖ|ₖ₋₁
//! ```
//!
//! Where `d` is the drift rate (wear per lap), `Q` the process noise and `R`
//! the measurement noise.
//!
//! ## Ownership
//!
//! [`FilterParameters`] is validated once and never changes. The arithmetic
//! lives in [`FilterParameters::step`], which takes the mutable
//! [`FilterState`] by exclusive reference. [`Estimator`] bundles the two for
//! the common one-filter-per-tyre case.
//!
//! ## Usage Example
//!
//! ```rust
//! use tyrewatch_core::Estimator;
//!
//! let mut estimator = Estimator::new(0.0, 1.0, 0.01, 0.5, 0.05)?;
//!
//! for delta in [0.04, 0.12, 0.09] {
//!     let smoothed = estimator.update(delta)?;
//!     assert!(smoothed.is_finite());
//! }
//! assert!(estimator.variance() < 1.0);
//! # Ok::<(), tyrewatch_core::EstimatorError>(())
//! ```

use crate::{
    constants::filter::{
        CONVERGED_VARIANCE, DEFAULT_DRIFT_RATE_S_PER_LAP, DEFAULT_INITIAL_MEAN_S,
        DEFAULT_INITIAL_VARIANCE, DEFAULT_MEASUREMENT_NOISE, DEFAULT_PROCESS_NOISE,
        MIN_CONVERGENCE_UPDATES,
    },
    errors::{require_finite, require_non_negative, require_positive, EstimatorError, EstimatorResult},
};

/// Belief about the hidden degradation value
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterState {
    /// Current best estimate
    pub mean: f64,
    /// Uncertainty of `mean`, never negative
    pub variance: f64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            mean: DEFAULT_INITIAL_MEAN_S,
            variance: DEFAULT_INITIAL_VARIANCE,
        }
    }
}

impl FilterState {
    /// Create a validated initial belief
    pub fn new(mean: f64, variance: f64) -> EstimatorResult<Self> {
        Ok(Self {
            mean: require_finite("initial_mean", mean)?,
            variance: require_non_negative("initial_variance", variance)?,
        })
    }

    /// Check a belief built field by field
    pub fn validate(&self) -> EstimatorResult<()> {
        Self::new(self.mean, self.variance).map(|_| ())
    }
}

/// Immutable noise model of the filter
///
/// Fields are private so a value of this type is always valid:
/// `process_noise >= 0`, `measurement_noise > 0`, everything finite.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FilterParameters {
    process_noise: f64,
    measurement_noise: f64,
    drift_rate: f64,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            process_noise: DEFAULT_PROCESS_NOISE,
            measurement_noise: DEFAULT_MEASUREMENT_NOISE,
            drift_rate: DEFAULT_DRIFT_RATE_S_PER_LAP,
        }
    }
}

impl FilterParameters {
    /// Validate and create a noise model
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `process_noise < 0`, `measurement_noise <= 0`,
    /// or any value is NaN or infinite.
    pub fn new(process_noise: f64, measurement_noise: f64, drift_rate: f64) -> EstimatorResult<Self> {
        Ok(Self {
            process_noise: require_non_negative("process_noise", process_noise)?,
            measurement_noise: require_positive("measurement_noise", measurement_noise)?,
            drift_rate: require_finite("drift_rate", drift_rate)?,
        })
    }

    /// Process noise (Q)
    #[inline]
    pub fn process_noise(&self) -> f64 {
        self.process_noise
    }

    /// Measurement noise (R)
    #[inline]
    pub fn measurement_noise(&self) -> f64 {
        self.measurement_noise
    }

    /// Expected degradation added per step
    #[inline]
    pub fn drift_rate(&self) -> f64 {
        self.drift_rate
    }

    /// Prior for the next step, without touching `state`
    #[inline]
    pub fn predict(&self, state: &FilterState) -> FilterState {
        FilterState {
            mean: state.mean + self.drift_rate,
            variance: state.variance + self.process_noise,
        }
    }

    /// Kalman gain for a predicted variance
    ///
    /// A zero denominator can only come from a zero prior with zero noise;
    /// the measurement is then trusted fully.
    #[inline]
    pub fn gain(&self, variance_pred: f64) -> f64 {
        let denominator = variance_pred + self.measurement_noise;
        if denominator > 0.0 {
            variance_pred / denominator
        } else {
            1.0
        }
    }

    /// Predict, then fuse `measurement` into `state`. Returns the gain used.
    ///
    /// # Errors
    ///
    /// `InvalidMeasurement` for NaN or infinite input, `NumericOverflow` if
    /// the fused belief is not finite. `state` is left untouched in both
    /// cases.
    pub fn step(&self, state: &mut FilterState, measurement: f64) -> EstimatorResult<f64> {
        if !measurement.is_finite() {
            return Err(EstimatorError::InvalidMeasurement { value: measurement });
        }

        let prior = self.predict(state);
        let gain = self.gain(prior.variance);

        let mean = prior.mean + gain * (measurement - prior.mean);
        let variance = (1.0 - gain) * prior.variance;
        if !(mean.is_finite() && variance.is_finite()) {
            return Err(EstimatorError::NumericOverflow { mean, variance });
        }

        state.mean = mean;
        state.variance = variance;
        Ok(gain)
    }
}

/// Tyre degradation estimator
///
/// One instance per tracked tyre set. Mutation requires `&mut self`, so
/// concurrent callers must serialise access themselves.
///
/// # Performance
///
/// - O(1) per update, no history stored
/// - No allocation
#[derive(Debug, Clone, Default)]
pub struct Estimator {
    /// Current belief
    state: FilterState,
    /// Noise model, fixed for the lifetime of the estimator
    params: FilterParameters,
    /// Gain applied by the most recent update
    last_gain: Option<f64>,
    /// Accepted measurements since construction or reset
    update_count: u32,
}

impl Estimator {
    /// Create an estimator from an initial belief and noise model
    ///
    /// # Arguments
    ///
    /// * `initial_mean` - Starting degradation estimate (0.0 on fresh tyres)
    /// * `initial_variance` - Confidence in that start, `>= 0`
    /// * `process_noise` - Q, per-step unpredictability of the wear, `>= 0`
    /// * `measurement_noise` - R, variance of one lap delta, `> 0`
    /// * `drift_rate` - Expected wear added per lap
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if any constraint is violated.
    pub fn new(
        initial_mean: f64,
        initial_variance: f64,
        process_noise: f64,
        measurement_noise: f64,
        drift_rate: f64,
    ) -> EstimatorResult<Self> {
        let state = FilterState::new(initial_mean, initial_variance)?;
        let params = FilterParameters::new(process_noise, measurement_noise, drift_rate)?;
        Self::from_parts(state, params)
    }

    /// Create an estimator from a belief and a validated noise model
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `state` has a non-finite mean or a negative
    /// variance.
    pub fn from_parts(state: FilterState, params: FilterParameters) -> EstimatorResult<Self> {
        state.validate()?;
        Ok(Self {
            state,
            params,
            last_gain: None,
            update_count: 0,
        })
    }

    /// Fuse one measurement and return the new mean
    ///
    /// # Errors
    ///
    /// `InvalidMeasurement` for NaN or infinite input; the belief is
    /// unchanged and the next measurement can be fed normally.
    /// `NumericOverflow` if the fused belief would not be finite; the belief
    /// is unchanged as well.
    pub fn update(&mut self, measurement: f64) -> EstimatorResult<f64> {
        self.update_with_gain(measurement).map(|(mean, _)| mean)
    }

    /// `update`, also returning the gain it applied
    pub(crate) fn update_with_gain(&mut self, measurement: f64) -> EstimatorResult<(f64, f64)> {
        let gain = self.params.step(&mut self.state, measurement)?;
        self.last_gain = Some(gain);
        self.update_count = self.update_count.saturating_add(1);
        Ok((self.state.mean, gain))
    }

    /// Prior the next update will start from
    pub fn predict(&self) -> FilterState {
        self.params.predict(&self.state)
    }

    /// Current degradation estimate
    #[inline]
    pub fn mean(&self) -> f64 {
        self.state.mean
    }

    /// Current estimation uncertainty
    ///
    /// Lower values mean higher confidence in [`mean`](Self::mean).
    #[inline]
    pub fn variance(&self) -> f64 {
        self.state.variance
    }

    /// Current belief
    #[inline]
    pub fn state(&self) -> FilterState {
        self.state
    }

    /// Noise model
    #[inline]
    pub fn parameters(&self) -> &FilterParameters {
        &self.params
    }

    /// Gain of the most recent update, `None` before the first one
    #[inline]
    pub fn last_gain(&self) -> Option<f64> {
        self.last_gain
    }

    /// Number of accepted measurements
    #[inline]
    pub fn update_count(&self) -> u32 {
        self.update_count
    }

    /// Check if the estimate has settled
    ///
    /// Requires at least `MIN_CONVERGENCE_UPDATES` updates and a variance
    /// under `CONVERGED_VARIANCE`.
    pub fn has_converged(&self) -> bool {
        self.update_count >= MIN_CONVERGENCE_UPDATES && self.state.variance < CONVERGED_VARIANCE
    }

    /// Restart from a new belief, keeping the noise model
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for an invalid `state`; the estimator is unchanged.
    pub fn reset(&mut self, state: FilterState) -> EstimatorResult<()> {
        state.validate()?;
        self.restart(state);
        Ok(())
    }

    /// Restart from a belief that has already been validated
    pub(crate) fn restart(&mut self, state: FilterState) {
        self.state = state;
        self.last_gain = None;
        self.update_count = 0;
    }
}
