//! Core estimation engine for Tyrewatch
//!
//! Tracks tyre degradation from noisy lap-time deltas with a scalar Kalman
//! filter and maps the fused estimate onto a "cliff" probability: the chance
//! that the tyre is about to fall off its performance cliff.
//!
//! Key constraints:
//! - Constant time per lap, no heap allocation in the estimator
//! - `no_std` compatible core (`libm` for `exp`)
//! - Every invalid input is rejected, never clamped
//!
//! ```
//! use tyrewatch_core::{Estimator, RiskParameters};
//!
//! let mut estimator = Estimator::new(0.0, 1.0, 0.01, 0.5, 0.05)?;
//! let risk = RiskParameters::new(0.60, 15.0)?;
//!
//! let mean = estimator.update(0.04)?;
//! let cliff = risk.probability(mean)?;
//! assert!(cliff < 0.5);
//! # Ok::<(), tyrewatch_core::EstimatorError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod config;
pub mod constants;
pub mod errors;
pub mod estimation;
pub mod tracker;

#[cfg(feature = "telemetry")]
pub mod telemetry;

// Public API
pub use config::TrackerConfig;
pub use errors::{EstimatorError, EstimatorResult};
pub use estimation::{
    fuse_step,
    risk_probability,
    Estimator,
    FilterParameters,
    FilterState,
    RiskParameters,
    StepOutcome,
};
pub use tracker::{CliffReport, CliffTracker};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
