//! Cliff tracker: estimator plus risk curve for one tyre set
//!
//! The tracker is the per-lap entry point. It owns one [`Estimator`] and one
//! [`RiskParameters`], feeds each lap delta to the filter, maps the fused
//! mean onto the cliff probability and hands back a [`CliffReport`].
//!
//! This is the only layer of the core that logs: `debug` per accepted lap,
//! `warn` for rejected measurements and when the cliff probability first
//! reaches [`CLIFF_ALERT_PROBABILITY`].
//!
//! ```rust
//! use tyrewatch_core::{CliffTracker, TrackerConfig};
//!
//! let mut tracker = CliffTracker::from_config(&TrackerConfig::default())?;
//! let report = tracker.observe(0.04)?;
//!
//! assert_eq!(report.step, 1);
//! assert!(report.cliff_probability < 0.5);
//! # Ok::<(), tyrewatch_core::EstimatorError>(())
//! ```

use crate::{
    config::TrackerConfig,
    constants::risk::CLIFF_ALERT_PROBABILITY,
    errors::EstimatorResult,
    estimation::{Estimator, FilterState, RiskParameters},
};

/// Per-lap output of the tracker
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CliffReport {
    /// 1-based count of accepted measurements
    pub step: u32,
    /// Raw lap delta fed to the filter
    pub measurement: f64,
    /// Smoothed degradation estimate
    pub mean: f64,
    /// Uncertainty of `mean`
    pub variance: f64,
    /// Gain applied for this lap
    pub gain: f64,
    /// Probability of the cliff being imminent
    pub cliff_probability: f64,
}

impl CliffReport {
    /// True once the cliff probability reaches the alert level
    #[inline]
    pub fn is_cliff_imminent(&self) -> bool {
        self.cliff_probability >= CLIFF_ALERT_PROBABILITY
    }
}

/// Estimator and risk curve for one tracked tyre set
#[derive(Debug, Clone)]
pub struct CliffTracker {
    estimator: Estimator,
    risk: RiskParameters,
    /// Belief restored by `reset`
    initial: FilterState,
    last_report: Option<CliffReport>,
}

impl Default for CliffTracker {
    fn default() -> Self {
        Self::new(Estimator::default(), RiskParameters::default())
    }
}

impl CliffTracker {
    /// Wrap an estimator and a risk curve
    ///
    /// The estimator's current belief becomes the one restored by
    /// [`reset`](Self::reset).
    pub fn new(estimator: Estimator, risk: RiskParameters) -> Self {
        Self {
            initial: estimator.state(),
            estimator,
            risk,
            last_report: None,
        }
    }

    /// Build a tracker from a configuration
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if the configuration does not validate.
    pub fn from_config(config: &TrackerConfig) -> EstimatorResult<Self> {
        let (state, filter, risk) = config.validate()?;
        Ok(Self::new(Estimator::from_parts(state, filter)?, risk))
    }

    /// Feed one lap delta
    ///
    /// # Errors
    ///
    /// `InvalidMeasurement` for a non-finite delta. The tracker is unchanged
    /// and the next lap can be observed normally. `NumericOverflow` if the
    /// fused belief would leave the `f64` range; the tracker is unchanged too.
    pub fn observe(&mut self, measurement: f64) -> EstimatorResult<CliffReport> {
        let (mean, gain) = match self.estimator.update_with_gain(measurement) {
            Ok(fused) => fused,
            Err(err) => {
                log_warn!("Skipping lap delta {}: {}", measurement, err);
                return Err(err);
            }
        };
        // Finite after a successful update, so the mapping cannot fail
        let cliff_probability = self.risk.probability(mean)?;

        let report = CliffReport {
            step: self.estimator.update_count(),
            measurement,
            mean,
            variance: self.estimator.variance(),
            gain,
            cliff_probability,
        };

        log_debug!(
            "Lap {}: delta {:.3}s -> degradation {:.3}s (var {:.4}, gain {:.3}), cliff {:.1}%",
            report.step,
            measurement,
            mean,
            report.variance,
            report.gain,
            cliff_probability * 100.0
        );

        let was_imminent = self.last_report.map_or(false, |r| r.is_cliff_imminent());
        if report.is_cliff_imminent() && !was_imminent {
            log_warn!(
                "Cliff imminent at step {}: degradation {:.3}s past threshold {:.3}s ({:.1}%)",
                report.step,
                mean,
                self.risk.threshold(),
                cliff_probability * 100.0
            );
        }

        self.last_report = Some(report);
        Ok(report)
    }

    /// Most recent report, `None` before the first accepted lap
    #[inline]
    pub fn last_report(&self) -> Option<&CliffReport> {
        self.last_report.as_ref()
    }

    /// Current cliff probability for the current belief
    pub fn cliff_probability(&self) -> EstimatorResult<f64> {
        self.risk.probability(self.estimator.mean())
    }

    /// Underlying estimator
    #[inline]
    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    /// Risk curve
    #[inline]
    pub fn risk(&self) -> &RiskParameters {
        &self.risk
    }

    /// Restart from the initial belief, keeping all parameters
    pub fn reset(&mut self) {
        // `initial` was valid when the estimator was built
        self.estimator.restart(self.initial);
        self.last_report = None;
    }
}
