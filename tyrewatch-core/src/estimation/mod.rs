//! Degradation Estimation and Cliff Risk
//!
//! ## Overview
//!
//! Two pieces, one per tracked tyre set:
//!
//! ```text
//! lap delta ──→ Estimator (predict + update) ──→ mean ──→ Risk Mapper ──→ cliff p
//!                     ↑                                        ↑
//!              FilterParameters                         RiskParameters
//! ```
//!
//! - [`kalman`]: the scalar Kalman filter holding `(mean, variance)`
//! - [`risk`]: the logistic mapping from mean to cliff probability
//!
//! Neither piece performs I/O, logging or allocation. Both finish in a
//! handful of floating point operations.
//!
//! ## One-Shot Form
//!
//! Callers that keep the belief themselves (for instance across a process
//! boundary) can use [`fuse_step`]: it takes the previous state by value and
//! returns the next state and the cliff probability in one call, running the
//! same arithmetic as [`Estimator::update`].

pub mod kalman;
pub mod risk;

pub use kalman::{Estimator, FilterParameters, FilterState};
pub use risk::{risk_probability, RiskParameters};

use crate::errors::EstimatorResult;

/// Result of a single stateless fusion step
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StepOutcome {
    /// Belief after fusing the measurement
    pub state: FilterState,
    /// Gain applied in this step
    pub gain: f64,
    /// Cliff probability for the new mean
    pub cliff_probability: f64,
}

/// Fuse one measurement into a caller-held belief
///
/// # Errors
///
/// `InvalidMeasurement` for a non-finite measurement, `InvalidParameter`
/// for an invalid `state`, `NumericOverflow` if the fused belief is not
/// finite.
pub fn fuse_step(
    state: FilterState,
    filter: &FilterParameters,
    risk: &RiskParameters,
    measurement: f64,
) -> EstimatorResult<StepOutcome> {
    state.validate()?;

    let mut next = state;
    let gain = filter.step(&mut next, measurement)?;
    let cliff_probability = risk.probability(next.mean)?;

    Ok(StepOutcome {
        state: next,
        gain,
        cliff_probability,
    })
}
