//! Pipeline orchestration: configuration to immutable simulation rows.
//!
//! One forward pass: profile lookup, generation and load projection, then
//! the battery fold. The output is rebuilt from scratch for every
//! configuration; rows are never patched in place, which keeps the
//! energy-conservation chain auditable.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::config::{ConfigError, ScenarioConfig, SimulationConfig};
use crate::profile::{IrradianceProfile, IrradianceSample};

use super::battery::BatterySimulator;
use super::generation::GenerationModel;
use super::load::LoadSchedule;
use super::types::{SimulationRow, Warning};

/// Immutable result of a pipeline run.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    /// One row per timeline interval, strictly ordered.
    pub rows: Vec<SimulationRow>,
    /// Data-quality conditions accumulated along the way.
    pub warnings: Vec<Warning>,
    /// Total generation lost to a full battery (kWh).
    pub curtailed_kwh: f32,
    /// Total demand unserved at the battery floor (kWh).
    pub unmet_kwh: f32,
}

/// Resolves a naive local datetime in `tz`, rejecting DST edge cases.
fn resolve_local(
    tz: Tz,
    naive: NaiveDateTime,
    field: &str,
) -> Result<DateTime<Tz>, ConfigError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(..) => Err(ConfigError {
            field: field.to_string(),
            message: format!("{naive} is ambiguous in {tz} (daylight-saving fall-back)"),
        }),
        LocalResult::None => Err(ConfigError {
            field: field.to_string(),
            message: format!("{naive} does not exist in {tz} (daylight-saving gap)"),
        }),
    }
}

/// Resolves the configured horizon into absolute start and end instants.
///
/// # Errors
///
/// Returns a `ConfigError` for an invalid timezone, malformed datetimes,
/// DST-unresolvable boundaries, or an end at or before the start.
pub fn resolve_horizon(sim: &SimulationConfig) -> Result<(DateTime<Tz>, DateTime<Tz>), ConfigError> {
    let tz = sim.tz()?;
    let start = resolve_local(tz, sim.start_naive()?, "simulation.start")?;
    let end = resolve_local(tz, sim.end_naive()?, "simulation.end")?;
    if end <= start {
        return Err(ConfigError {
            field: "simulation.end".to_string(),
            message: format!("must be after simulation.start, got {end} vs {start}"),
        });
    }
    Ok((start, end))
}

/// Builds the fixed-cadence timeline covering `[start, end)`.
///
/// Timestamps are strictly increasing with no gaps or duplicates; the
/// horizon always yields at least one row.
///
/// # Errors
///
/// Returns a `ConfigError` for a non-positive cadence or an unresolvable
/// horizon.
pub fn build_timeline(sim: &SimulationConfig) -> Result<Vec<DateTime<Tz>>, ConfigError> {
    if sim.cadence_minutes == 0 {
        return Err(ConfigError {
            field: "simulation.cadence_minutes".to_string(),
            message: "must be > 0".to_string(),
        });
    }
    let (start, end) = resolve_horizon(sim)?;
    let step = Duration::minutes(i64::from(sim.cadence_minutes));

    let mut timeline = Vec::new();
    let mut t = start;
    while t < end {
        timeline.push(t);
        t += step;
    }
    Ok(timeline)
}

/// Runs the full pipeline for one scenario.
///
/// Configuration errors stop construction before any simulation step;
/// data-quality conditions are accumulated as warnings on the outcome
/// instead of aborting a partially-good run.
///
/// # Errors
///
/// Returns the first `ConfigError` found by validation (callers wanting
/// the complete list should run [`ScenarioConfig::validate`] first).
pub fn run(
    samples: &[IrradianceSample],
    cfg: &ScenarioConfig,
) -> Result<SimulationOutcome, ConfigError> {
    if let Some(error) = cfg.validate().into_iter().next() {
        return Err(error);
    }

    let tz = cfg.simulation.tz()?;
    let timeline = build_timeline(&cfg.simulation)?;
    let dt_hours = cfg.simulation.dt_hours();

    let profile = IrradianceProfile::build(samples, tz);
    let model = GenerationModel::new(cfg.panel.capacity_kwp, cfg.panel.efficiency);
    let generation = model.project(&profile, &timeline, dt_hours);

    let schedule = LoadSchedule::new(
        cfg.load.base_kw,
        cfg.load.schedule.iter().map(|e| (e.hour, e.weight)),
    );
    let load = schedule.project(&timeline, dt_hours);

    let battery = BatterySimulator::new(
        cfg.battery.capacity_kwh,
        cfg.battery.min_level_kwh,
        cfg.battery.flow_deadband_kwh,
    )?;
    let (steps, warnings) = battery.simulate(cfg.battery.initial_level_kwh, &generation, &load);

    let mut rows = Vec::with_capacity(timeline.len());
    let mut curtailed_kwh = 0.0;
    let mut unmet_kwh = 0.0;
    for (i, timestamp) in timeline.iter().enumerate() {
        let step = &steps[i];
        curtailed_kwh += step.curtailed_kwh;
        unmet_kwh += step.unmet_kwh;
        rows.push(SimulationRow {
            timestamp: *timestamp,
            irradiance_kw_m2: profile.query_at(timestamp),
            generation_kwh: generation[i],
            load_kwh: load[i],
            battery_level_kwh: step.level_kwh,
            battery_flow_kwh: step.flow_kwh,
            charging: step.charging,
            discharging: step.discharging,
        });
    }

    Ok(SimulationOutcome {
        rows,
        warnings,
        curtailed_kwh,
        unmet_kwh,
    })
}
