//! Nearest-row lookup and bounded windowed aggregation over a finished
//! timeline.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;

use crate::config::ConfigError;

use super::types::SimulationRow;

/// Selector for the numeric fields of a [`SimulationRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    /// Mean irradiance (kW/m²).
    Irradiance,
    /// Generated energy (kWh).
    Generation,
    /// Consumed energy (kWh).
    Load,
    /// Battery level at interval start (kWh).
    BatteryLevel,
    /// Battery flow during the interval (kWh).
    BatteryFlow,
}

impl RowField {
    /// Reads the selected field from a row.
    pub fn value(&self, row: &SimulationRow) -> f32 {
        match self {
            RowField::Irradiance => row.irradiance_kw_m2,
            RowField::Generation => row.generation_kwh,
            RowField::Load => row.load_kwh,
            RowField::BatteryLevel => row.battery_level_kwh,
            RowField::BatteryFlow => row.battery_flow_kwh,
        }
    }
}

/// Result of a nearest-timestamp lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestRow {
    /// Index of the matched row.
    pub index: usize,
    /// Timestamp of the matched row.
    pub timestamp: DateTime<Tz>,
    /// The query fell outside the simulated horizon and was clamped to a
    /// boundary row.
    pub clamped: bool,
}

/// Read-only index over an immutable, strictly ordered timeline.
///
/// Lookups binary-search the sorted timestamps; nothing here ever mutates
/// the rows.
#[derive(Debug, Clone, Copy)]
pub struct TimelineIndex<'a> {
    rows: &'a [SimulationRow],
}

impl<'a> TimelineIndex<'a> {
    /// Builds an index over the given rows.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the timeline is empty (an empty timeline
    /// is not queryable) or if the timestamps are not strictly increasing.
    pub fn new(rows: &'a [SimulationRow]) -> Result<Self, ConfigError> {
        if rows.is_empty() {
            return Err(ConfigError {
                field: "timeline".to_string(),
                message: "must contain at least one row to be queryable".to_string(),
            });
        }
        for pair in rows.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(ConfigError {
                    field: "timeline".to_string(),
                    message: format!(
                        "timestamps must be strictly increasing, found {} after {}",
                        pair[1].timestamp, pair[0].timestamp
                    ),
                });
            }
        }
        Ok(Self { rows })
    }

    /// The indexed rows.
    pub fn rows(&self) -> &'a [SimulationRow] {
        self.rows
    }

    /// Returns the row whose timestamp is closest to `query`.
    ///
    /// Queries before the first or after the last timestamp clamp to the
    /// boundary row with the `clamped` flag set. Equidistant interior
    /// queries resolve to the earlier row.
    pub fn nearest(&self, query: DateTime<Tz>) -> NearestRow {
        let first = self.rows[0].timestamp;
        let last_index = self.rows.len() - 1;
        let last = self.rows[last_index].timestamp;

        if query < first {
            return NearestRow {
                index: 0,
                timestamp: first,
                clamped: true,
            };
        }
        if query > last {
            return NearestRow {
                index: last_index,
                timestamp: last,
                clamped: true,
            };
        }

        // First row at or after the query.
        let upper = self.rows.partition_point(|r| r.timestamp < query);
        let index = if upper == 0 {
            0
        } else {
            let before = upper - 1;
            let dist_before = query - self.rows[before].timestamp;
            let dist_after = self.rows[upper].timestamp - query;
            // Ties resolve toward the earlier row.
            if dist_after < dist_before { upper } else { before }
        };

        NearestRow {
            index,
            timestamp: self.rows[index].timestamp,
            clamped: false,
        }
    }

    /// Sums `field` over rows with timestamp in `[end - hours, end]`,
    /// both boundaries inclusive.
    ///
    /// A window containing no rows (for example one entirely before the
    /// timeline start) sums to 0.0 rather than failing.
    pub fn window_sum(&self, field: RowField, end: DateTime<Tz>, hours: f32) -> f32 {
        let span_ms = (f64::from(hours.max(0.0)) * 3_600_000.0).round() as i64;
        let start = end - Duration::milliseconds(span_ms);

        let lo = self.rows.partition_point(|r| r.timestamp < start);
        let hi = self.rows.partition_point(|r| r.timestamp <= end);

        self.rows[lo..hi].iter().map(|r| field.value(r)).sum()
    }
}
