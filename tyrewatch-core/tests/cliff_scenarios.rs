//! Integration tests for the estimator, risk mapper and tracker together
//!
//! Each test is a race situation: a clean stint, a stint running into the
//! cliff, a timing glitch mid-stint, a pit stop.

#[macro_use]
mod common;

use common::{
    reference_config, reference_estimator, wearing_stint, REFERENCE_STEEPNESS, REFERENCE_STINT,
    REFERENCE_THRESHOLD,
};
use tyrewatch_core::{
    fuse_step, risk_probability, CliffTracker, EstimatorError, FilterParameters, FilterState,
    RiskParameters,
};

#[test]
fn reference_stint_rises_toward_late_laps() {
    let mut estimator = reference_estimator();
    let mut means = Vec::new();

    for delta in REFERENCE_STINT {
        means.push(estimator.update(delta).unwrap());
    }

    for pair in means.windows(2) {
        assert!(pair[1] >= pair[0], "means must not fall: {:?}", means);
    }

    // Smoothed value ends near the last readings but lags them
    let last = *means.last().unwrap();
    assert_within_tolerance!(last, 0.544, 0.005);

    // Cliff probability stays below half while the mean is under the threshold
    let risk = risk_probability(last, REFERENCE_THRESHOLD, REFERENCE_STEEPNESS).unwrap();
    assert!(last < REFERENCE_THRESHOLD);
    assert!(risk < 0.5);
}

#[test]
fn cliff_probability_passes_half_with_the_mean() {
    let mut tracker = CliffTracker::from_config(&reference_config()).unwrap();
    for delta in REFERENCE_STINT {
        tracker.observe(delta).unwrap();
    }

    // Keep lapping at the pace of the last reading
    let mut crossed = false;
    for _ in 0..15 {
        let report = tracker.observe(0.70).unwrap();
        assert_eq!(report.mean > REFERENCE_THRESHOLD, report.cliff_probability > 0.5);
        crossed |= report.mean > REFERENCE_THRESHOLD;
    }
    assert!(crossed, "mean never passed {}", REFERENCE_THRESHOLD);
}

#[test]
fn timing_glitch_is_skipped() {
    let mut clean = reference_estimator();
    let mut glitched = reference_estimator();

    for (lap, delta) in REFERENCE_STINT.iter().enumerate() {
        clean.update(*delta).unwrap();

        if lap == 4 {
            let before = glitched.state();
            let err = glitched.update(f64::NAN).unwrap_err();
            assert!(err.is_recoverable());
            assert_eq!(glitched.state(), before);
        }
        glitched.update(*delta).unwrap();
    }

    assert_eq!(clean.state(), glitched.state());
}

#[test]
fn pit_stop_starts_a_new_estimator() {
    let config = reference_config();
    let mut first_set = CliffTracker::from_config(&config).unwrap();
    for delta in wearing_stint(25, 0.04, 0.1, 7) {
        first_set.observe(delta).unwrap();
    }
    assert!(first_set.last_report().unwrap().is_cliff_imminent());

    // Fresh tyres: new tracker, same tuning
    let mut second_set = CliffTracker::from_config(&config).unwrap();
    let report = second_set.observe(0.02).unwrap();
    assert_eq!(report.step, 1);
    assert!(!report.is_cliff_imminent());
}

#[test]
fn noisy_stint_tracks_true_wear() {
    let mut estimator = reference_estimator();
    let deltas = wearing_stint(40, 0.05, 0.15, 42);

    for delta in &deltas {
        estimator.update(*delta).unwrap();
    }

    // True wear after 40 laps is 2.0s; the drift model matches it
    assert_within_tolerance!(estimator.mean(), 2.0, 0.2);
    assert!(estimator.has_converged());
}

#[test]
fn one_shot_and_tracker_agree() {
    let filter = FilterParameters::new(0.01, 0.5, 0.05).unwrap();
    let risk = RiskParameters::new(REFERENCE_THRESHOLD, REFERENCE_STEEPNESS).unwrap();
    let mut tracker = CliffTracker::from_config(&reference_config()).unwrap();
    let mut state = FilterState::new(0.0, 1.0).unwrap();

    for delta in REFERENCE_STINT {
        let outcome = fuse_step(state, &filter, &risk, delta).unwrap();
        let report = tracker.observe(delta).unwrap();

        assert_eq!(outcome.state.mean, report.mean);
        assert_eq!(outcome.state.variance, report.variance);
        assert_eq!(outcome.cliff_probability, report.cliff_probability);
        state = outcome.state;
    }
}

#[test]
fn misconfiguration_is_not_retryable() {
    let err = CliffTracker::from_config(&reference_config().with_measurement_noise(0.0)).unwrap_err();
    assert!(matches!(err, EstimatorError::InvalidParameter { .. }));
    assert!(!err.is_recoverable());
}
