//! Cliff Risk Constants

/// Degradation delta (seconds) at which the cliff probability is 0.5.
pub const DEFAULT_CLIFF_THRESHOLD_S: f64 = 0.60;

/// Logistic steepness: how sudden the cliff is.
///
/// At 15.0 the probability moves from roughly 5% to 95% across
/// ±0.2 s around the threshold.
pub const DEFAULT_CLIFF_STEEPNESS: f64 = 15.0;

/// Probability at which the tracker reports the cliff as imminent.
pub const CLIFF_ALERT_PROBABILITY: f64 = 0.5;
