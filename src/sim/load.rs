//! Deterministic daily load schedule projection.

use std::collections::BTreeMap;

use chrono::{DateTime, Timelike};
use chrono_tz::Tz;

/// Fixed daily consumption schedule.
///
/// Each entry maps an hour of day to a fractional multiplier of the base
/// load, so arbitrary daily shapes (including partial-hour activity such
/// as a half-weight final hour) are representable without new code. Hours
/// without an entry consume nothing.
///
/// # Examples
///
/// ```
/// use pv_sim::sim::load::LoadSchedule;
///
/// let schedule = LoadSchedule::new(0.3, [(16, 1.0), (20, 0.5)]);
/// assert_eq!(schedule.weight(16), 1.0);
/// assert_eq!(schedule.weight(3), 0.0);
/// assert!((schedule.demand_kw(20) - 0.15).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct LoadSchedule {
    /// Base load magnitude (kW).
    pub base_kw: f32,
    weights: BTreeMap<u32, f32>,
}

impl LoadSchedule {
    /// Creates a schedule from (hour, weight) pairs.
    ///
    /// A later pair for the same hour replaces the earlier one.
    pub fn new(base_kw: f32, entries: impl IntoIterator<Item = (u32, f32)>) -> Self {
        Self {
            base_kw,
            weights: entries.into_iter().collect(),
        }
    }

    /// Fractional multiplier for the given hour of day; 0.0 if absent.
    pub fn weight(&self, hour_of_day: u32) -> f32 {
        self.weights.get(&hour_of_day).copied().unwrap_or(0.0)
    }

    /// Instantaneous demand (kW) during the given hour of day.
    pub fn demand_kw(&self, hour_of_day: u32) -> f32 {
        self.base_kw * self.weight(hour_of_day)
    }

    /// Per-interval consumed energy (kWh) for every timeline timestamp.
    pub fn project(&self, timeline: &[DateTime<Tz>], dt_hours: f32) -> Vec<f32> {
        timeline
            .iter()
            .map(|t| self.demand_kw(t.hour()) * dt_hours)
            .collect()
    }
}
