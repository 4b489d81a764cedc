//! Shared test fixtures for integration tests.

use chrono::{Duration, TimeZone, Utc};
use pv_sim::config::ScenarioConfig;
use pv_sim::profile::IrradianceSample;

/// The reference installation: Asia/Kolkata, 1.3 kWp at 0.18 efficiency,
/// 7.2 kWh battery with a 1.44 kWh floor starting full, hourly cadence
/// over two days, evening load 0.3 kW (hours 16-19) and 0.15 kW (hour 20).
pub fn reference_scenario() -> ScenarioConfig {
    ScenarioConfig::baseline()
}

/// Hourly samples at a constant magnitude covering the reference horizon.
///
/// The first sample lands on 2025-06-01 00:00 IST (2025-05-31 18:30 UTC)
/// so every (day-of-year, hour-of-day) key of the two-day horizon is
/// observed exactly once.
pub fn constant_samples(w_m2: f32) -> Vec<IrradianceSample> {
    let start = Utc.with_ymd_and_hms(2025, 5, 31, 18, 30, 0).unwrap();
    (0..48)
        .map(|i| IrradianceSample {
            timestamp: start + Duration::hours(i),
            irradiance_w_m2: w_m2,
        })
        .collect()
}
