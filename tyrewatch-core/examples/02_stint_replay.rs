//! Stint Replay Example
//!
//! Replays an exported lap CSV through one tracker per stint and prints the
//! peak cliff probability of each tyre set.
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_stint_replay -- data/sample_stints.csv
//! cargo run --example 02_stint_replay -- laps.csv reports.jsonl
//! ```
//!
//! The optional second argument writes every lap report as JSON Lines.

use std::env;
use std::fs::File;
use std::io::BufWriter;

use tyrewatch_core::{
    telemetry::{write_json_lines, LapTelemetry, TelemetryError},
    TrackerConfig,
};

fn main() -> Result<(), TelemetryError> {
    let mut args = env::args().skip(1);
    let input = args
        .next()
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/data/sample_stints.csv").to_string());

    let telemetry = LapTelemetry::from_path(&input)?;
    let stats = telemetry.stats();
    println!(
        "Loaded {} laps from {} ({} rows skipped)\n",
        stats.laps_read, input, stats.rows_skipped
    );

    let replays = telemetry.replay(&TrackerConfig::default())?;

    println!("Stint\tCompound\tLaps\tFinal Deg\tPeak Cliff\tBox Lap");
    println!("-------------------------------------------------------------");
    for stint in &replays {
        println!(
            "{}\t{:<8}\t{}\t{:.3}s\t\t{:.1}%\t\t{}",
            stint.stint,
            stint.compound,
            stint.laps.len(),
            stint.final_degradation().unwrap_or(0.0),
            stint.peak_probability() * 100.0,
            stint
                .first_imminent_lap()
                .map_or_else(|| "-".to_string(), |lap| lap.to_string())
        );
    }

    if let Some(output) = args.next() {
        let writer = BufWriter::new(File::create(&output)?);
        write_json_lines(writer, replays.iter().flat_map(|stint| stint.laps.iter()))?;
        println!("\nWrote lap reports to {}", output);
    }

    Ok(())
}
