//! Common test utilities for integration tests
//!
//! This module provides:
//! - The reference stint used throughout the test suite
//! - A deterministic lap-delta generator for wearing tyres
//! - Assertion helpers for floating point comparisons

#![allow(dead_code)]

use tyrewatch_core::{Estimator, TrackerConfig};

/// Raw lap deltas of the reference stint (seconds)
pub const REFERENCE_STINT: [f64; 10] = [0.04, 0.12, 0.09, 0.25, 0.18, 0.35, 0.30, 0.55, 0.48, 0.70];

/// Cliff threshold used with the reference stint
pub const REFERENCE_THRESHOLD: f64 = 0.60;

/// Cliff steepness used with the reference stint
pub const REFERENCE_STEEPNESS: f64 = 15.0;

/// Estimator tuned like the reference stint
pub fn reference_estimator() -> Estimator {
    Estimator::new(0.0, 1.0, 0.01, 0.5, 0.05).expect("reference tuning is valid")
}

/// Configuration tuned like the reference stint
pub fn reference_config() -> TrackerConfig {
    TrackerConfig::default()
        .with_initial_belief(0.0, 1.0)
        .with_process_noise(0.01)
        .with_measurement_noise(0.5)
        .with_drift_rate(0.05)
        .with_cliff(REFERENCE_THRESHOLD, REFERENCE_STEEPNESS)
}

/// Deterministic pseudo-random generator (xorshift)
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    pub fn next_f64(&mut self) -> f64 {
        (self.next_u32() >> 8) as f64 / 16_777_216.0
    }

    pub fn gen_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}

/// Lap deltas for tyres wearing at `wear_per_lap` with uniform noise
pub fn wearing_stint(laps: usize, wear_per_lap: f64, noise: f64, seed: u32) -> Vec<f64> {
    let mut rng = TestRng::new(seed);
    (0..laps)
        .map(|lap| (lap as f64 + 1.0) * wear_per_lap + rng.gen_range(-noise, noise))
        .collect()
}

/// Assert two floats are within tolerance
macro_rules! assert_within_tolerance {
    ($actual:expr, $expected:expr, $tolerance:expr) => {
        let (actual, expected, tolerance) = ($actual, $expected, $tolerance);
        assert!(
            (actual - expected).abs() <= tolerance,
            "Expected {} ± {}, got {}",
            expected,
            tolerance,
            actual
        );
    };
}
