//! Error Types for Estimation and Risk Mapping
//!
//! ## Design
//!
//! Errors are returned from the lap-by-lap hot path, so they follow the same
//! rules as the rest of the core:
//!
//! 1. **Small Size**: Each variant carries at most a name, a value and a
//!    static reason.
//!
//! 2. **No Heap Allocation**: Only `&'static str` for messages.
//!
//! 3. **Copy Semantics**: Errors implement `Copy` and can be stored in
//!    reports or queues freely.
//!
//! ## Error Categories
//!
//! ### Configuration
//! - `InvalidParameter`: a construction or risk-mapping argument violates its
//!   constraint (negative variance or noise, non-positive measurement noise,
//!   non-positive steepness, non-finite value). Not retryable; the caller
//!   must fix the configuration.
//!
//! ### Input
//! - `InvalidMeasurement`: a non-finite lap delta reached `update`. The filter
//!   state is untouched, so the next valid lap can be fed to the same
//!   estimator.
//!
//! ### Numeric
//! - `NumericOverflow`: the fused belief would not be finite, for instance
//!   when the drift pushes the mean past `f64::MAX`. The filter state is
//!   untouched. Not retryable; the tuning or the initial belief is out of
//!   range for `f64`.
//!
//! ## Handling Strategy
//!
//! ```rust
//! use tyrewatch_core::{Estimator, EstimatorError};
//!
//! let mut estimator = Estimator::new(0.0, 1.0, 0.01, 0.5, 0.05).unwrap();
//!
//! match estimator.update(f64::NAN) {
//!     Ok(_mean) => {}
//!     Err(EstimatorError::InvalidMeasurement { .. }) => {
//!         // Timing glitch on this lap - skip it and keep tracking
//!     }
//!     Err(err) => panic!("estimator out of range: {}", err),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for estimator and risk operations
pub type EstimatorResult<T> = Result<T, EstimatorError>;

/// Estimation errors - kept small and `Copy`
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EstimatorError {
    /// Configuration value violates its constraint
    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter
        name: &'static str,
        /// The rejected value
        value: f64,
        /// Constraint that was violated
        reason: &'static str,
    },

    /// Measurement is NaN or infinite
    #[error("Invalid measurement {value}: not a finite number")]
    InvalidMeasurement {
        /// The rejected reading
        value: f64,
    },

    /// Fused belief is not representable as a finite `f64`
    #[error("Numeric overflow: fused mean {mean}, variance {variance}")]
    NumericOverflow {
        /// Mean the step would have produced
        mean: f64,
        /// Variance the step would have produced
        variance: f64,
    },
}

impl EstimatorError {
    /// True for errors the caller can recover from on the next step
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidMeasurement { .. })
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for EstimatorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidParameter { name, value, reason } =>
                defmt::write!(fmt, "Parameter {} = {}: {}", name, value, reason),
            Self::InvalidMeasurement { value } =>
                defmt::write!(fmt, "Invalid measurement {}", value),
            Self::NumericOverflow { mean, variance } =>
                defmt::write!(fmt, "Numeric overflow: mean {}, variance {}", mean, variance),
        }
    }
}

/// Reject non-finite values
pub(crate) fn require_finite(name: &'static str, value: f64) -> EstimatorResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EstimatorError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        })
    }
}

/// Reject negative (or non-finite) values
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> EstimatorResult<f64> {
    require_finite(name, value)?;
    if value < 0.0 {
        return Err(EstimatorError::InvalidParameter {
            name,
            value,
            reason: "must be >= 0",
        });
    }
    Ok(value)
}

/// Reject zero, negative (or non-finite) values
pub(crate) fn require_positive(name: &'static str, value: f64) -> EstimatorResult<f64> {
    require_finite(name, value)?;
    if value <= 0.0 {
        return Err(EstimatorError::InvalidParameter {
            name,
            value,
            reason: "must be > 0",
        });
    }
    Ok(value)
}
