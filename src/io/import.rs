//! CSV ingestion of raw irradiance samples.
//!
//! Expected layout: a header row, then one record per measurement with a
//! timestamp in the first column and one or more irradiance component
//! columns (W/m²) after it. Component columns are summed per record, so a
//! `direct,diffuse` split and a single `total` column read the same way.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::profile::IrradianceSample;
use crate::sim::types::Warning;

/// Malformed input that aborts the import.
///
/// Unresolvable daylight-saving timestamps are not errors; those records
/// are skipped with a [`Warning`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportError {
    /// 1-based line number of the offending record, 0 if unknown.
    pub line: usize,
    /// What was wrong with it.
    pub message: String,
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "import error: {}", self.message)
        } else {
            write!(f, "import error: line {}: {}", self.line, self.message)
        }
    }
}

impl std::error::Error for ImportError {}

/// Reads samples from a CSV file.
///
/// # Errors
///
/// Returns an `ImportError` if the file cannot be opened or a record is
/// malformed.
pub fn read_samples_file(
    path: &Path,
    tz: Tz,
) -> Result<(Vec<IrradianceSample>, Vec<Warning>), ImportError> {
    let file = File::open(path).map_err(|e| ImportError {
        line: 0,
        message: format!("cannot open \"{}\": {e}", path.display()),
    })?;
    read_samples(file, tz)
}

/// Reads samples from any CSV reader.
///
/// Timestamps with an explicit UTC offset (RFC 3339) are taken as-is;
/// naive timestamps are interpreted as local time in `tz`. Naive times
/// that are ambiguous or non-existent under a daylight-saving transition
/// are dropped with a warning rather than guessed.
///
/// # Errors
///
/// Returns an `ImportError` for unreadable input, missing columns, or
/// unparseable timestamp/magnitude fields.
pub fn read_samples<R: Read>(
    reader: R,
    tz: Tz,
) -> Result<(Vec<IrradianceSample>, Vec<Warning>), ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);
    let mut samples = Vec::new();
    let mut warnings = Vec::new();

    for (index, record) in csv_reader.records().enumerate() {
        let line = index + 2; // header occupies line 1
        let record = record.map_err(|e| ImportError {
            line,
            message: e.to_string(),
        })?;

        if record.len() < 2 {
            return Err(ImportError {
                line,
                message: "expected a timestamp and at least one irradiance column".to_string(),
            });
        }

        let raw_timestamp = record[0].trim();
        let mut total_w_m2 = 0.0_f32;
        for column in 1..record.len() {
            let value: f32 = record[column].trim().parse().map_err(|_| ImportError {
                line,
                message: format!("not a number: \"{}\"", &record[column]),
            })?;
            total_w_m2 += value;
        }

        match parse_timestamp(raw_timestamp, tz) {
            ParsedTimestamp::Instant(timestamp) => samples.push(IrradianceSample {
                timestamp,
                irradiance_w_m2: total_w_m2,
            }),
            ParsedTimestamp::Ambiguous(naive) => {
                warnings.push(Warning::AmbiguousLocalTime { timestamp: naive });
            }
            ParsedTimestamp::Nonexistent(naive) => {
                warnings.push(Warning::NonexistentLocalTime { timestamp: naive });
            }
            ParsedTimestamp::Unparseable => {
                return Err(ImportError {
                    line,
                    message: format!("not a timestamp: \"{raw_timestamp}\""),
                });
            }
        }
    }

    Ok((samples, warnings))
}

enum ParsedTimestamp {
    Instant(DateTime<Utc>),
    Ambiguous(NaiveDateTime),
    Nonexistent(NaiveDateTime),
    Unparseable,
}

fn parse_timestamp(raw: &str, tz: Tz) -> ParsedTimestamp {
    if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
        return ParsedTimestamp::Instant(aware.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"));
    let Ok(naive) = naive else {
        return ParsedTimestamp::Unparseable;
    };

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => ParsedTimestamp::Instant(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(..) => ParsedTimestamp::Ambiguous(naive),
        LocalResult::None => ParsedTimestamp::Nonexistent(naive),
    }
}
