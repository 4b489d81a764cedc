//! Integration tests for the full simulation pipeline.

mod common;

use pv_sim::io::export::write_csv;
use pv_sim::sim::engine;
use pv_sim::sim::summary::SimulationSummary;
use pv_sim::sim::types::Warning;

#[test]
fn full_run_produces_one_row_per_interval() {
    let outcome = engine::run(&common::constant_samples(500.0), &common::reference_scenario())
        .expect("reference scenario runs");
    assert_eq!(outcome.rows.len(), 48);
}

#[test]
fn timestamps_are_strictly_increasing_at_fixed_cadence() {
    let outcome = engine::run(&common::constant_samples(500.0), &common::reference_scenario())
        .expect("reference scenario runs");
    for pair in outcome.rows.windows(2) {
        let gap = pair[1].timestamp - pair[0].timestamp;
        assert_eq!(gap.num_minutes(), 60);
    }
}

#[test]
fn battery_level_stays_within_bounds_in_every_row() {
    let scenario = common::reference_scenario();
    let outcome = engine::run(&common::constant_samples(500.0), &scenario)
        .expect("reference scenario runs");

    for row in &outcome.rows {
        assert!(
            row.battery_level_kwh >= scenario.battery.min_level_kwh - 1e-5,
            "level below floor at {}",
            row.timestamp
        );
        assert!(
            row.battery_level_kwh <= scenario.battery.capacity_kwh + 1e-5,
            "level above capacity at {}",
            row.timestamp
        );
    }
}

#[test]
fn per_step_conservation_links_levels_through_applied_flow() {
    let outcome = engine::run(&common::constant_samples(500.0), &common::reference_scenario())
        .expect("reference scenario runs");

    for i in 1..outcome.rows.len() {
        let prev = &outcome.rows[i - 1];
        let expected = prev.battery_level_kwh + prev.battery_flow_kwh;
        let got = outcome.rows[i].battery_level_kwh;
        assert!(
            (got - expected).abs() < 1e-5,
            "row {i}: level {got} != {expected}"
        );
    }
}

#[test]
fn evening_drawdown_matches_hand_computed_values() {
    // Constant 0.5 kW/m2: generation is 0.5 * 1.3 * 0.18 = 0.117 kWh/h.
    let outcome = engine::run(&common::constant_samples(500.0), &common::reference_scenario())
        .expect("reference scenario runs");

    for row in &outcome.rows {
        assert!((row.generation_kwh - 0.117).abs() < 1e-5);
    }

    // Hour 16 starts at the full 7.2 kWh; net is 0.117 - 0.3 = -0.183,
    // proposed 7.017 is within bounds, so the whole net flows.
    let hour16 = &outcome.rows[16];
    assert!((hour16.battery_level_kwh - 7.2).abs() < 1e-5);
    assert!((hour16.battery_flow_kwh - (-0.183)).abs() < 1e-5);
    assert!(hour16.discharging && !hour16.charging);

    let hour17 = &outcome.rows[17];
    assert!((hour17.battery_level_kwh - 7.017).abs() < 1e-5);
}

#[test]
fn morning_surplus_is_curtailed_at_full_battery() {
    // Hours 0-15 start full with positive net generation; every one of
    // those intervals curtails the entire 0.117 kWh surplus.
    let outcome = engine::run(&common::constant_samples(500.0), &common::reference_scenario())
        .expect("reference scenario runs");

    let hour0 = &outcome.rows[0];
    assert!((hour0.battery_level_kwh - 7.2).abs() < 1e-5);
    assert!(hour0.battery_flow_kwh.abs() < 1e-5);
    assert!(!hour0.charging && !hour0.discharging);
    assert!(outcome.curtailed_kwh > 0.0);
}

#[test]
fn horizon_energy_balance_closes() {
    let scenario = common::reference_scenario();
    let outcome = engine::run(&common::constant_samples(500.0), &scenario)
        .expect("reference scenario runs");

    let generation: f32 = outcome.rows.iter().map(|r| r.generation_kwh).sum();
    let load: f32 = outcome.rows.iter().map(|r| r.load_kwh).sum();
    let last = outcome.rows.last().expect("48 rows");
    let final_level = last.battery_level_kwh + last.battery_flow_kwh;
    let initial_level = outcome.rows[0].battery_level_kwh;

    let net = generation - load;
    let accounted = (final_level - initial_level) + outcome.curtailed_kwh - outcome.unmet_kwh;
    assert!(
        (net - accounted).abs() < 1e-4,
        "net {net} vs accounted {accounted}"
    );
}

#[test]
fn two_identical_runs_export_byte_identical_csv() {
    let scenario = common::reference_scenario();
    let samples = common::constant_samples(500.0);

    let run_a = engine::run(&samples, &scenario).expect("first run");
    let run_b = engine::run(&samples, &scenario).expect("second run");

    let mut out_a = Vec::new();
    write_csv(&run_a.rows, &mut out_a).expect("first export should succeed");
    let mut out_b = Vec::new();
    write_csv(&run_b.rows, &mut out_b).expect("second export should succeed");

    assert_eq!(out_a, out_b);
}

#[test]
fn out_of_range_initial_level_is_clamped_and_reported() {
    let mut scenario = common::reference_scenario();
    scenario.battery.initial_level_kwh = 12.0;

    let outcome = engine::run(&common::constant_samples(500.0), &scenario)
        .expect("clamping is recoverable");
    assert_eq!(outcome.rows[0].battery_level_kwh, 7.2);
    assert!(
        outcome
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::InitialLevelClamped { .. }))
    );
}

#[test]
fn floor_above_capacity_is_rejected_before_simulation() {
    let mut scenario = common::reference_scenario();
    scenario.battery.min_level_kwh = 9.0;

    let err = engine::run(&common::constant_samples(500.0), &scenario).unwrap_err();
    assert_eq!(err.field, "battery.min_level_kwh");
}

#[test]
fn summary_totals_match_row_recomputation() {
    let scenario = common::reference_scenario();
    let outcome = engine::run(&common::constant_samples(500.0), &scenario)
        .expect("reference scenario runs");
    let summary = SimulationSummary::from_outcome(&outcome, scenario.battery.capacity_kwh);

    let generation: f32 = outcome.rows.iter().map(|r| r.generation_kwh).sum();
    let load: f32 = outcome.rows.iter().map(|r| r.load_kwh).sum();
    let throughput: f32 = outcome.rows.iter().map(|r| r.battery_flow_kwh.abs()).sum();

    assert!((summary.total_generation_kwh - generation).abs() < 1e-5);
    assert!((summary.total_load_kwh - load).abs() < 1e-5);
    assert!((summary.battery_throughput_kwh - throughput).abs() < 1e-5);
    // Two days of evening load: 2 * (4 * 0.3 + 0.15) = 2.7 kWh.
    assert!((summary.total_load_kwh - 2.7).abs() < 1e-4);
}

#[test]
fn synthetic_history_drives_a_clean_run() {
    let scenario = common::reference_scenario();
    let tz = scenario.simulation.tz().expect("valid timezone");
    let (_, end) = pv_sim::sim::engine::resolve_horizon(&scenario.simulation)
        .expect("valid horizon");
    let samples = pv_sim::synthetic::generate(&scenario.synthetic, tz, end);

    let outcome = engine::run(&samples, &scenario).expect("synthetic scenario runs");
    assert_eq!(outcome.rows.len(), 48);
    // Daylight must produce generation somewhere in the horizon.
    assert!(outcome.rows.iter().any(|r| r.generation_kwh > 0.0));
    // Night rows stay dark.
    assert!(
        outcome
            .rows
            .iter()
            .filter(|r| r.irradiance_kw_m2 == 0.0)
            .all(|r| r.generation_kwh == 0.0)
    );
}
