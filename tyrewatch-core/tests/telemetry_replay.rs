//! Integration tests for replaying exported lap telemetry from disk

#![cfg(feature = "telemetry")]

mod common;

use std::io::Write;

use common::{reference_config, wearing_stint};
use tempfile::NamedTempFile;
use tyrewatch_core::telemetry::{write_json_lines, LapReport, LapTelemetry, TelemetryError};

const HEADER: &str = "LapNumber,Stint,Compound,TyreLife,TrackTemp,LapTime_Sec,Degradation_Delta";

/// Write a two-stint race in the exporter's format
fn race_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();

    let base = 106.0;
    let mut lap_number = 2;
    for (stint, compound, laps, wear) in [(1, "MEDIUM", 14, 0.06), (2, "HARD", 20, 0.03)] {
        for (life, delta) in wearing_stint(laps, wear, 0.05, 11 + stint).into_iter().enumerate() {
            // Exporter leaves the delta column for the reader to recompute
            writeln!(
                file,
                "{}.0,{}.0,{},{}.0,41.5,{:.3},",
                lap_number,
                stint,
                compound,
                life + 1,
                base + delta
            )
            .unwrap();
            lap_number += 1;
        }
    }

    file.flush().unwrap();
    file
}

#[test]
fn replays_each_stint_from_file() {
    let file = race_file();
    let telemetry = LapTelemetry::from_path(file.path()).unwrap();

    assert_eq!(telemetry.laps().len(), 34);
    assert_eq!(telemetry.stints(), vec![1, 2]);

    let replays = telemetry.replay(&reference_config()).unwrap();
    assert_eq!(replays.len(), 2);

    let medium = &replays[0];
    let hard = &replays[1];
    assert_eq!(medium.compound, "MEDIUM");
    assert_eq!(hard.compound, "HARD");
    assert_eq!(medium.laps.len(), 14);
    assert_eq!(hard.laps.len(), 20);
    assert_eq!(medium.laps_rejected, 0);

    // Lap numbering continues across the pit stop, step counters restart
    assert_eq!(hard.laps[0].lap_number, 16);
    assert_eq!(hard.laps[0].report.step, 1);

    for replay in &replays {
        assert!(replay.peak_probability() > 0.0 && replay.peak_probability() < 1.0);
        assert!(replay.final_degradation().unwrap() > 0.0);
    }
}

#[test]
fn deltas_are_never_negative() {
    let file = race_file();
    let telemetry = LapTelemetry::from_path(file.path()).unwrap();

    let deltas = telemetry.degradation_deltas();
    assert_eq!(deltas.len(), telemetry.laps().len());
    assert!(deltas.iter().all(|d| *d >= 0.0));

    // Exactly one zero (the fastest lap) per stint
    assert_eq!(deltas.iter().filter(|d| **d == 0.0).count(), 2);
}

#[test]
fn exported_reports_round_trip_as_json_lines() {
    let file = race_file();
    let telemetry = LapTelemetry::from_path(file.path()).unwrap();
    let replays = telemetry.replay(&reference_config()).unwrap();

    let mut out = NamedTempFile::new().unwrap();
    let all_laps = replays.iter().flat_map(|stint| stint.laps.iter());
    write_json_lines(out.as_file_mut(), all_laps).unwrap();

    let text = std::fs::read_to_string(out.path()).unwrap();
    let parsed: Vec<LapReport> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(parsed.len(), 34);
    assert_eq!(parsed[0], replays[0].laps[0]);
    assert_eq!(parsed[33], replays[1].laps[19]);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = LapTelemetry::from_path("/nonexistent/laps.csv").unwrap_err();
    assert!(matches!(err, TelemetryError::Io(_)));
}
