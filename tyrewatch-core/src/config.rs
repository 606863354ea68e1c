//! Tracker configuration
//!
//! [`TrackerConfig`] is the plain, editable form of the tuning for one tyre
//! set. It is validated once, when a tracker is built, into the immutable
//! [`FilterState`], [`FilterParameters`] and [`RiskParameters`].
//!
//! ```rust
//! use tyrewatch_core::TrackerConfig;
//!
//! let config = TrackerConfig::default()
//!     .with_measurement_noise(0.8)
//!     .with_cliff(0.75, 12.0);
//!
//! let (state, filter, risk) = config.validate()?;
//! assert_eq!(filter.measurement_noise(), 0.8);
//! assert_eq!(risk.threshold(), 0.75);
//! # let _ = state;
//! # Ok::<(), tyrewatch_core::EstimatorError>(())
//! ```

use crate::{
    constants::{
        filter::{
            DEFAULT_DRIFT_RATE_S_PER_LAP, DEFAULT_INITIAL_MEAN_S, DEFAULT_INITIAL_VARIANCE,
            DEFAULT_MEASUREMENT_NOISE, DEFAULT_PROCESS_NOISE,
        },
        risk::{DEFAULT_CLIFF_STEEPNESS, DEFAULT_CLIFF_THRESHOLD_S},
    },
    errors::EstimatorResult,
    estimation::{FilterParameters, FilterState, RiskParameters},
};

/// Tuning for one tracked tyre set
///
/// Missing fields fall back to the defaults when deserialized.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrackerConfig {
    /// Initial degradation estimate (seconds)
    pub initial_mean: f64,
    /// Initial variance of the estimate
    pub initial_variance: f64,
    /// Process noise (Q)
    pub process_noise: f64,
    /// Measurement noise (R)
    pub measurement_noise: f64,
    /// Expected wear per lap (seconds)
    pub drift_rate: f64,
    /// Degradation at which the cliff probability is 0.5
    pub cliff_threshold: f64,
    /// Logistic steepness of the cliff
    pub steepness: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            initial_mean: DEFAULT_INITIAL_MEAN_S,
            initial_variance: DEFAULT_INITIAL_VARIANCE,
            process_noise: DEFAULT_PROCESS_NOISE,
            measurement_noise: DEFAULT_MEASUREMENT_NOISE,
            drift_rate: DEFAULT_DRIFT_RATE_S_PER_LAP,
            cliff_threshold: DEFAULT_CLIFF_THRESHOLD_S,
            steepness: DEFAULT_CLIFF_STEEPNESS,
        }
    }
}

impl TrackerConfig {
    /// Set the initial belief
    pub fn with_initial_belief(mut self, mean: f64, variance: f64) -> Self {
        self.initial_mean = mean;
        self.initial_variance = variance;
        self
    }

    /// Set process noise (higher = faster adaptation, noisier estimate)
    pub fn with_process_noise(mut self, noise: f64) -> Self {
        self.process_noise = noise;
        self
    }

    /// Set measurement noise (higher = smoother, slower estimate)
    pub fn with_measurement_noise(mut self, noise: f64) -> Self {
        self.measurement_noise = noise;
        self
    }

    /// Set expected wear per lap
    pub fn with_drift_rate(mut self, drift_rate: f64) -> Self {
        self.drift_rate = drift_rate;
        self
    }

    /// Set the cliff curve
    pub fn with_cliff(mut self, threshold: f64, steepness: f64) -> Self {
        self.cliff_threshold = threshold;
        self.steepness = steepness;
        self
    }

    /// Validate into the immutable parts used by the estimator
    ///
    /// # Errors
    ///
    /// `InvalidParameter` naming the first field that violates its constraint.
    pub fn validate(&self) -> EstimatorResult<(FilterState, FilterParameters, RiskParameters)> {
        let state = FilterState::new(self.initial_mean, self.initial_variance)?;
        let filter = FilterParameters::new(self.process_noise, self.measurement_noise, self.drift_rate)?;
        let risk = RiskParameters::new(self.cliff_threshold, self.steepness)?;
        Ok((state, filter, risk))
    }

    /// Parse a JSON configuration
    ///
    /// Fields absent from the document keep their defaults. The result is not
    /// validated; call [`validate`](Self::validate) or build a tracker.
    #[cfg(feature = "telemetry")]
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
