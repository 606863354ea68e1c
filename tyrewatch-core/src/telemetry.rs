//! Lap telemetry replay
//!
//! Reads the per-lap CSV exported by the timing extraction step, turns lap
//! times into degradation deltas and replays every stint through its own
//! [`CliffTracker`].
//!
//! ## CSV Format
//!
//! ```csv
//! LapNumber,Stint,Compound,TyreLife,TrackTemp,LapTime_Sec,Degradation_Delta
//! 2.0,1.0,MEDIUM,2.0,38.1,110.234,0.000
//! 3.0,1.0,MEDIUM,3.0,38.2,110.512,0.278
//! ```
//!
//! Columns are located by header name, so order does not matter. Required:
//! `LapNumber`, `Stint`, `LapTime_Sec`. Optional: `Compound`, `TyreLife`,
//! `TrackTemp`, `Degradation_Delta`. Blank lines are ignored and rows
//! without a lap time are skipped and counted.
//!
//! ## Degradation Delta
//!
//! The measurement for a lap is its time loss against the fastest lap of the
//! same stint:
//!
//! ```text
//! delta = lap_time - min(lap_time over the stint)
//! ```
//!
//! A stint is one set of tyres. Each stint starts a fresh tracker, so a pit
//! stop never carries wear from the old set into the new one.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tyrewatch_core::{telemetry::LapTelemetry, TrackerConfig};
//!
//! let telemetry = LapTelemetry::from_path("belgian_gp_HAM_telemetry.csv")?;
//! for stint in telemetry.replay(&TrackerConfig::default())? {
//!     println!("stint {} peak cliff {:.1}%", stint.stint, stint.peak_probability() * 100.0);
//! }
//! # Ok::<(), tyrewatch_core::telemetry::TelemetryError>(())
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use thiserror_no_std::Error;

use crate::{
    config::TrackerConfig,
    errors::EstimatorError,
    tracker::{CliffReport, CliffTracker},
};

/// Upper bound on CSV columns per row
pub const MAX_COLUMNS: usize = 16;

/// Errors raised while reading or replaying telemetry
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Underlying reader or writer failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Row could not be parsed
    #[error("Line {line}: {reason}")]
    Format {
        /// 1-based line number in the input
        line: usize,
        /// What was wrong with the row
        reason: &'static str,
    },

    /// Header lacks a required column
    #[error("Missing required column {0}")]
    MissingColumn(&'static str),

    /// Report serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tracker configuration was rejected
    #[error("Estimator error: {0}")]
    Estimator(#[from] EstimatorError),
}

/// Counters collected while parsing
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TelemetryStats {
    /// Lines read, header and blank lines included
    pub lines_processed: usize,
    /// Laps kept
    pub laps_read: usize,
    /// Rows dropped for a missing lap time
    pub rows_skipped: usize,
}

/// One row of the lap CSV
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LapRecord {
    /// Lap number within the race
    pub lap_number: u32,
    /// Stint (tyre set) index
    pub stint: u32,
    /// Tyre compound, empty when unknown
    pub compound: String,
    /// Laps already driven on this set
    pub tyre_life: Option<f64>,
    /// Track temperature in °C
    pub track_temp: Option<f64>,
    /// Lap time in seconds
    pub lap_time_sec: f64,
    /// Delta precomputed by the exporter, if present
    pub degradation_delta: Option<f64>,
}

/// Tracker output for one replayed lap
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LapReport {
    /// Stint the lap belongs to
    pub stint: u32,
    /// Lap number within the race
    pub lap_number: u32,
    /// Tyre compound
    pub compound: String,
    /// Filter and risk output
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub report: CliffReport,
}

/// All replayed laps of one stint
#[derive(Debug, Clone, PartialEq)]
pub struct StintReplay {
    /// Stint index
    pub stint: u32,
    /// Compound of the first lap in the stint
    pub compound: String,
    /// Per-lap reports in input order
    pub laps: Vec<LapReport>,
    /// Laps whose delta the tracker rejected
    pub laps_rejected: usize,
}

impl StintReplay {
    /// Highest cliff probability reached during the stint
    pub fn peak_probability(&self) -> f64 {
        self.laps
            .iter()
            .map(|lap| lap.report.cliff_probability)
            .fold(0.0, f64::max)
    }

    /// First lap at which the cliff became imminent
    pub fn first_imminent_lap(&self) -> Option<u32> {
        self.laps
            .iter()
            .find(|lap| lap.report.is_cliff_imminent())
            .map(|lap| lap.lap_number)
    }

    /// Degradation estimate after the last lap
    pub fn final_degradation(&self) -> Option<f64> {
        self.laps.last().map(|lap| lap.report.mean)
    }
}

/// Column positions resolved from the header
#[derive(Debug, Clone, Copy)]
struct Columns {
    count: usize,
    lap_number: usize,
    stint: usize,
    lap_time: usize,
    compound: Option<usize>,
    tyre_life: Option<usize>,
    track_temp: Option<usize>,
    degradation_delta: Option<usize>,
}

impl Columns {
    fn from_header(fields: &[&str]) -> Result<Self, TelemetryError> {
        let find = |name: &str| fields.iter().position(|f| *f == name);
        let require = |name: &'static str| find(name).ok_or(TelemetryError::MissingColumn(name));

        Ok(Self {
            count: fields.len(),
            lap_number: require("LapNumber")?,
            stint: require("Stint")?,
            lap_time: require("LapTime_Sec")?,
            compound: find("Compound"),
            tyre_life: find("TyreLife"),
            track_temp: find("TrackTemp"),
            degradation_delta: find("Degradation_Delta"),
        })
    }
}

/// Parsed lap telemetry for one driver
#[derive(Debug, Clone, Default)]
pub struct LapTelemetry {
    laps: Vec<LapRecord>,
    stats: TelemetryStats,
}

impl LapTelemetry {
    /// Build from already parsed laps
    pub fn from_laps(laps: Vec<LapRecord>) -> Self {
        let stats = TelemetryStats {
            laps_read: laps.len(),
            ..TelemetryStats::default()
        };
        Self { laps, stats }
    }

    /// Open and parse a CSV file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TelemetryError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse CSV from any buffered reader
    ///
    /// # Errors
    ///
    /// `MissingColumn` for an incomplete header, `Format` for a malformed
    /// row, `Io` if the reader fails.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, TelemetryError> {
        let mut columns: Option<Columns> = None;
        let mut laps = Vec::new();
        let mut stats = TelemetryStats::default();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;
            stats.lines_processed += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let fields = split_fields(trimmed).ok_or(TelemetryError::Format {
                line: line_no,
                reason: "Too many CSV fields",
            })?;

            let cols = match columns {
                Some(cols) => cols,
                None => {
                    columns = Some(Columns::from_header(&fields)?);
                    continue;
                }
            };

            if fields.len() < cols.count {
                return Err(TelemetryError::Format {
                    line: line_no,
                    reason: "Not enough CSV fields",
                });
            }

            if fields[cols.lap_time].is_empty() {
                log_warn!("Line {}: no lap time, skipping row", line_no);
                stats.rows_skipped += 1;
                continue;
            }

            let lap_time_sec = parse_number(fields[cols.lap_time], line_no, "Invalid lap time")?;
            if !lap_time_sec.is_finite() {
                return Err(TelemetryError::Format {
                    line: line_no,
                    reason: "Lap time is not finite",
                });
            }

            let optional = |col: Option<usize>, reason: &'static str| -> Result<Option<f64>, TelemetryError> {
                match col.map(|c| fields[c]) {
                    Some(raw) if !raw.is_empty() => parse_number(raw, line_no, reason).map(Some),
                    _ => Ok(None),
                }
            };

            laps.push(LapRecord {
                lap_number: parse_count(fields[cols.lap_number], line_no, "Invalid lap number")?,
                stint: parse_count(fields[cols.stint], line_no, "Invalid stint")?,
                compound: cols.compound.map(|c| String::from(fields[c])).unwrap_or_default(),
                tyre_life: optional(cols.tyre_life, "Invalid tyre life")?,
                track_temp: optional(cols.track_temp, "Invalid track temperature")?,
                lap_time_sec,
                degradation_delta: optional(cols.degradation_delta, "Invalid degradation delta")?,
            });
            stats.laps_read += 1;
        }

        if columns.is_none() {
            return Err(TelemetryError::Format {
                line: 0,
                reason: "Missing CSV header",
            });
        }

        log_debug!(
            "Read {} laps ({} rows skipped, {} lines)",
            stats.laps_read,
            stats.rows_skipped,
            stats.lines_processed
        );

        Ok(Self { laps, stats })
    }

    /// Parsed laps in input order
    pub fn laps(&self) -> &[LapRecord] {
        &self.laps
    }

    /// Parse counters
    pub fn stats(&self) -> &TelemetryStats {
        &self.stats
    }

    /// Stint indices in order of first appearance
    pub fn stints(&self) -> Vec<u32> {
        let mut stints = Vec::new();
        for lap in &self.laps {
            if !stints.contains(&lap.stint) {
                stints.push(lap.stint);
            }
        }
        stints
    }

    /// Lap time minus the fastest lap of the same stint, one per lap
    pub fn degradation_deltas(&self) -> Vec<f64> {
        let mut fastest: BTreeMap<u32, f64> = BTreeMap::new();
        for lap in &self.laps {
            fastest
                .entry(lap.stint)
                .and_modify(|best| *best = best.min(lap.lap_time_sec))
                .or_insert(lap.lap_time_sec);
        }

        self.laps
            .iter()
            .map(|lap| lap.lap_time_sec - fastest[&lap.stint])
            .collect()
    }

    /// Replay every stint through a fresh tracker
    ///
    /// Uses the exporter's `Degradation_Delta` when the row has one and the
    /// computed delta otherwise.
    ///
    /// # Errors
    ///
    /// `Estimator` if `config` does not validate.
    pub fn replay(&self, config: &TrackerConfig) -> Result<Vec<StintReplay>, TelemetryError> {
        // Fail on a bad config even for empty telemetry
        config.validate()?;

        let deltas = self.degradation_deltas();
        let mut replays = Vec::new();

        for stint in self.stints() {
            let mut tracker = CliffTracker::from_config(config)?;
            let mut replay = StintReplay {
                stint,
                compound: String::new(),
                laps: Vec::new(),
                laps_rejected: 0,
            };

            for (lap, computed) in self.laps.iter().zip(&deltas).filter(|(lap, _)| lap.stint == stint) {
                if replay.laps.is_empty() {
                    replay.compound = lap.compound.clone();
                }

                let delta = lap.degradation_delta.unwrap_or(*computed);
                match tracker.observe(delta) {
                    Ok(report) => replay.laps.push(LapReport {
                        stint,
                        lap_number: lap.lap_number,
                        compound: lap.compound.clone(),
                        report,
                    }),
                    Err(err) if err.is_recoverable() => replay.laps_rejected += 1,
                    Err(err) => return Err(err.into()),
                }
            }

            log_debug!(
                "Stint {} ({}): {} laps, peak cliff {:.1}%",
                stint,
                replay.compound,
                replay.laps.len(),
                replay.peak_probability() * 100.0
            );
            replays.push(replay);
        }

        Ok(replays)
    }
}

/// Write reports as JSON Lines, one lap per line
pub fn write_json_lines<'a, W, I>(mut writer: W, reports: I) -> Result<(), TelemetryError>
where
    W: Write,
    I: IntoIterator<Item = &'a LapReport>,
{
    for report in reports {
        serde_json::to_writer(&mut writer, report)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

fn split_fields(line: &str) -> Option<heapless::Vec<&str, MAX_COLUMNS>> {
    let mut fields = heapless::Vec::new();
    for field in line.split(',') {
        fields.push(field.trim().trim_matches('"')).ok()?;
    }
    Some(fields)
}

fn parse_number(raw: &str, line: usize, reason: &'static str) -> Result<f64, TelemetryError> {
    raw.parse::<f64>().map_err(|_| TelemetryError::Format { line, reason })
}

// Exporters write integer columns as floats ("12.0").
fn parse_count(raw: &str, line: usize, reason: &'static str) -> Result<u32, TelemetryError> {
    let value = parse_number(raw, line, reason)?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Ok(value as u32)
    } else {
        Err(TelemetryError::Format { line, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
LapNumber,Stint,Compound,TyreLife,TrackTemp,LapTime_Sec
2.0,1.0,MEDIUM,2.0,38.1,110.50
3.0,1.0,MEDIUM,3.0,38.2,110.20
4.0,1.0,MEDIUM,4.0,38.2,110.45

15.0,2.0,HARD,1.0,39.0,109.90
16.0,2.0,HARD,2.0,,110.00
17.0,2.0,HARD,3.0,39.1,
";

    fn sample() -> LapTelemetry {
        LapTelemetry::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn parses_rows_and_skips_missing_lap_times() {
        let telemetry = sample();
        assert_eq!(telemetry.laps().len(), 5);
        assert_eq!(telemetry.stats().rows_skipped, 1);
        assert_eq!(telemetry.stats().lines_processed, 8);

        let lap = &telemetry.laps()[4];
        assert_eq!(lap.lap_number, 16);
        assert_eq!(lap.stint, 2);
        assert_eq!(lap.compound, "HARD");
        assert_eq!(lap.track_temp, None);
        assert_eq!(lap.degradation_delta, None);
    }

    #[test]
    fn deltas_are_relative_to_stint_best() {
        let deltas = sample().degradation_deltas();
        let expected = [0.30, 0.0, 0.25, 0.0, 0.10];
        for (got, want) in deltas.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "got {}, want {}", got, want);
        }
    }

    #[test]
    fn each_stint_gets_a_fresh_tracker() {
        let replays = sample().replay(&TrackerConfig::default()).unwrap();
        assert_eq!(replays.len(), 2);

        assert_eq!(replays[0].stint, 1);
        assert_eq!(replays[0].compound, "MEDIUM");
        assert_eq!(replays[0].laps.len(), 3);

        // Step counter restarts with the new tyre set
        assert_eq!(replays[1].laps[0].report.step, 1);
        assert_eq!(replays[1].laps[0].lap_number, 15);
    }

    #[test]
    fn exporter_delta_takes_precedence() {
        let csv = "LapNumber,Stint,LapTime_Sec,Degradation_Delta\n1,1,100.0,0.5\n2,1,99.0,\n";
        let telemetry = LapTelemetry::from_reader(csv.as_bytes()).unwrap();
        let replays = telemetry.replay(&TrackerConfig::default()).unwrap();

        assert_eq!(replays[0].laps[0].report.measurement, 0.5);
        assert_eq!(replays[0].laps[1].report.measurement, 0.0);
    }

    #[test]
    fn missing_column_reported() {
        let err = LapTelemetry::from_reader("LapNumber,Compound\n1,SOFT\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TelemetryError::MissingColumn("Stint")));
    }

    #[test]
    fn malformed_rows_reported_with_line() {
        let csv = "LapNumber,Stint,LapTime_Sec\n1,1,100.0\n2.5,1,101.0\n";
        let err = LapTelemetry::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, TelemetryError::Format { line: 3, .. }));

        let csv = "LapNumber,Stint,LapTime_Sec\n1,1\n";
        let err = LapTelemetry::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, TelemetryError::Format { line: 2, .. }));
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = LapTelemetry::from_reader("\n\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TelemetryError::Format { line: 0, .. }));
    }

    #[test]
    fn bad_config_rejected() {
        let config = TrackerConfig::default().with_measurement_noise(0.0);
        let err = sample().replay(&config).unwrap_err();
        assert!(matches!(err, TelemetryError::Estimator(_)));
    }

    #[test]
    fn json_lines_one_object_per_lap() {
        let replays = sample().replay(&TrackerConfig::default()).unwrap();
        let mut out = Vec::new();
        write_json_lines(&mut out, &replays[0].laps).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["lap_number"], 2);
        assert_eq!(first["step"], 1);
        assert!(first["cliff_probability"].as_f64().unwrap() < 0.5);
    }
}
