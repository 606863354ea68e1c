//! Degradation Filter Constants
//!
//! Defaults for the scalar Kalman filter that tracks tyre degradation.
//! Units: the tracked quantity is a lap-time delta in seconds, so variances
//! are in seconds squared.

// ===== INITIAL BELIEF =====

/// Initial degradation estimate on fresh tyres.
///
/// A new stint starts with no measurable time loss.
pub const DEFAULT_INITIAL_MEAN_S: f64 = 0.0;

/// Initial variance of the degradation estimate.
///
/// Deliberately wide (1 s²) so the first few laps dominate the belief.
pub const DEFAULT_INITIAL_VARIANCE: f64 = 1.0;

// ===== NOISE MODEL =====

/// Process noise (Q): per-lap unpredictability of the wear itself.
pub const DEFAULT_PROCESS_NOISE: f64 = 0.01;

/// Measurement noise (R): variance of a single lap delta.
///
/// Lap times carry traffic, wind and driver variation, so R is large
/// compared to Q.
pub const DEFAULT_MEASUREMENT_NOISE: f64 = 0.5;

/// Expected wear added per lap, in seconds.
pub const DEFAULT_DRIFT_RATE_S_PER_LAP: f64 = 0.05;

// ===== CONVERGENCE =====

/// Variance below which the estimate is considered settled.
///
/// With the default noise model the steady-state variance is about 0.066 s²,
/// which sits under this bound from the sixth lap on.
pub const CONVERGED_VARIANCE: f64 = 0.1;

/// Minimum updates required before declaring convergence.
///
/// Prevents a tight initial variance from reporting convergence on lap one.
pub const MIN_CONVERGENCE_UPDATES: u32 = 5;
