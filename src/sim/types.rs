//! Core simulation types: timeline rows and accumulated warnings.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;

/// Complete record of one fixed-cadence simulation interval.
///
/// `battery_level_kwh` is the level at the start of the interval;
/// `battery_flow_kwh` is the energy the battery actually absorbs (positive)
/// or releases (negative) during it, so consecutive rows satisfy
/// `level[i] == level[i-1] + flow[i-1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRow {
    /// Interval start in the simulation timezone.
    pub timestamp: DateTime<Tz>,
    /// Mean irradiance looked up for this interval (kW/m²).
    pub irradiance_kw_m2: f32,
    /// Energy generated by the array during the interval (kWh, >= 0).
    pub generation_kwh: f32,
    /// Energy drawn by the scheduled load during the interval (kWh, >= 0).
    pub load_kwh: f32,
    /// Battery level at the start of the interval (kWh).
    pub battery_level_kwh: f32,
    /// Energy absorbed/released by the battery during the interval (kWh).
    pub battery_flow_kwh: f32,
    /// Flow exceeds the dead-band (net charging).
    pub charging: bool,
    /// Flow is below the negative dead-band (net discharging).
    pub discharging: bool,
}

impl SimulationRow {
    /// Battery state label derived from the charge/discharge flags.
    pub fn state(&self) -> &'static str {
        if self.charging {
            "charging"
        } else if self.discharging {
            "discharging"
        } else {
            "idle"
        }
    }
}

impl fmt::Display for SimulationRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | irr={:.3} kW/m2  gen={:.3} kWh  load={:.3} kWh | \
             level={:.3} kWh  flow={:+.3} kWh [{}]",
            self.timestamp.format("%Y-%m-%d %H:%M %Z"),
            self.irradiance_kw_m2,
            self.generation_kwh,
            self.load_kwh,
            self.battery_level_kwh,
            self.battery_flow_kwh,
            self.state(),
        )
    }
}

/// Recoverable data-quality condition accumulated during a pipeline run.
///
/// Warnings never abort a partially-good simulation; they are returned
/// alongside the result and the presentation layer decides how to show
/// them.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A naive local timestamp fell into a daylight-saving fall-back and
    /// maps to two instants; the sample was dropped rather than guessed.
    AmbiguousLocalTime {
        /// The unresolvable local timestamp.
        timestamp: NaiveDateTime,
    },
    /// A naive local timestamp fell into a daylight-saving gap and maps
    /// to no instant; the sample was dropped.
    NonexistentLocalTime {
        /// The unresolvable local timestamp.
        timestamp: NaiveDateTime,
    },
    /// The configured initial battery level was outside the valid range
    /// and was clamped before the first interval.
    InitialLevelClamped {
        /// Level requested by the configuration (kWh).
        requested_kwh: f32,
        /// Level actually used (kWh).
        applied_kwh: f32,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::AmbiguousLocalTime { timestamp } => write!(
                f,
                "dropped sample at ambiguous local time {timestamp} (daylight-saving fall-back)"
            ),
            Warning::NonexistentLocalTime { timestamp } => write!(
                f,
                "dropped sample at non-existent local time {timestamp} (daylight-saving gap)"
            ),
            Warning::InitialLevelClamped {
                requested_kwh,
                applied_kwh,
            } => write!(
                f,
                "initial battery level {requested_kwh:.3} kWh out of range, clamped to {applied_kwh:.3} kWh"
            ),
        }
    }
}
