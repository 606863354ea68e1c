//! Constants for Tyrewatch Core
//!
//! Centralised defaults and thresholds used by the estimator, the risk
//! mapper and the tracker. The defaults reproduce the reference tuning used
//! for a dry race stint: deltas in seconds per lap.
//!
//! ## Organization
//!
//! - **Filter**: initial belief and noise model of the degradation filter
//! - **Risk**: cliff threshold and logistic steepness

/// Degradation filter defaults and convergence thresholds.
pub mod filter;

/// Cliff-risk mapping defaults.
pub mod risk;

// Re-export commonly used constants for convenience
pub use filter::{
    DEFAULT_INITIAL_MEAN_S, DEFAULT_INITIAL_VARIANCE, DEFAULT_PROCESS_NOISE,
    DEFAULT_MEASUREMENT_NOISE, DEFAULT_DRIFT_RATE_S_PER_LAP,
    CONVERGED_VARIANCE, MIN_CONVERGENCE_UPDATES,
};

pub use risk::{
    DEFAULT_CLIFF_THRESHOLD_S, DEFAULT_CLIFF_STEEPNESS, CLIFF_ALERT_PROBABILITY,
};
