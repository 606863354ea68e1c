//! Tyre Cliff Watch Example
//!
//! Feeds a simulated stint of noisy lap-time deltas through the degradation
//! filter and prints the smoothed wear next to the cliff probability.
//!
//! ## What You'll Learn
//!
//! - Building an estimator from the default tuning
//! - Reading the fused estimate and its uncertainty per lap
//! - Mapping the estimate onto the cliff probability
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_cliff_watch
//! ```

use tyrewatch_core::{CliffTracker, EstimatorError, TrackerConfig};

fn main() -> Result<(), EstimatorError> {
    println!("Tyrewatch Cliff Watch Example");
    println!("=============================\n");

    // 0.0s initial wear, 1.0 initial variance, Q = 0.01, R = 0.5,
    // 0.05s expected wear per lap, cliff at 0.60s with steepness 15
    let config = TrackerConfig::default();
    let mut tracker = CliffTracker::from_config(&config)?;

    // Simulated noisy telemetry (raw lap time degradation deltas)
    let noisy_telemetry = [0.04, 0.12, 0.09, 0.25, 0.18, 0.35, 0.30, 0.55, 0.48, 0.70];

    println!("Lap\tRaw Delta\tSmoothed Deg\tVariance\tCliff Probability");
    println!("---------------------------------------------------------------------");

    for delta in noisy_telemetry {
        let report = tracker.observe(delta)?;
        println!(
            "{}\t{:.3}s\t\t{:.3}s\t\t{:.4}\t\t{:.1}%{}",
            report.step,
            report.measurement,
            report.mean,
            report.variance,
            report.cliff_probability * 100.0,
            if report.is_cliff_imminent() { "  << BOX" } else { "" }
        );
    }

    let estimator = tracker.estimator();
    println!(
        "\nConverged: {} after {} laps",
        estimator.has_converged(),
        estimator.update_count()
    );

    Ok(())
}
