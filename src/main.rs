//! Simulator entry point: CLI wiring and config-driven pipeline runs.

use std::path::Path;
use std::process;

use pv_sim::config::ScenarioConfig;
use pv_sim::io::export::export_csv;
use pv_sim::io::import::read_samples_file;
use pv_sim::profile::IrradianceSample;
use pv_sim::sim::engine;
use pv_sim::sim::summary::SimulationSummary;
use pv_sim::sim::timeline::{RowField, TimelineIndex};
use pv_sim::sim::types::Warning;
use pv_sim::synthetic;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    samples_path: Option<String>,
    out_path: Option<String>,
    window_hours: f32,
}

fn print_help() {
    eprintln!("pv-sim — rooftop photovoltaic installation simulator");
    eprintln!();
    eprintln!("Usage: pv-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>       Load scenario from TOML config file");
    eprintln!("  --preset <name>         Use a built-in preset (baseline)");
    eprintln!("  --samples <path>        Read irradiance samples from CSV");
    eprintln!("  --out <path>            Export the timeline to CSV");
    eprintln!("  --window-hours <f32>    Trailing window for the report (default: 24)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
    eprintln!("If no --samples is given, a seeded synthetic history is generated.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        samples_path: None,
        out_path: None,
        window_hours: 24.0,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--samples" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --samples requires a path argument");
                    process::exit(1);
                }
                cli.samples_path = Some(args[i].clone());
            }
            "--out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --out requires a path argument");
                    process::exit(1);
                }
                cli.out_path = Some(args[i].clone());
            }
            "--window-hours" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --window-hours requires a number argument");
                    process::exit(1);
                }
                match args[i].parse::<f32>() {
                    Ok(h) if h >= 0.0 => cli.window_hours = h,
                    _ => {
                        eprintln!(
                            "error: --window-hours value \"{}\" is not a non-negative number",
                            args[i]
                        );
                        process::exit(1);
                    }
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Obtains raw samples from a CSV file or the seeded synthetic source.
fn load_samples(
    cli: &CliArgs,
    scenario: &ScenarioConfig,
) -> (Vec<IrradianceSample>, Vec<Warning>) {
    if let Some(ref path) = cli.samples_path {
        let tz = match scenario.simulation.tz() {
            Ok(tz) => tz,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        };
        match read_samples_file(Path::new(path), tz) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        let (tz, end) = match scenario
            .simulation
            .tz()
            .and_then(|tz| engine::resolve_horizon(&scenario.simulation).map(|(_, end)| (tz, end)))
        {
            Ok(pair) => pair,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        };
        (synthetic::generate(&scenario.synthetic, tz, end), Vec::new())
    }
}

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline
    let scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    // Validate, reporting every offending field at once
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let (samples, import_warnings) = load_samples(&cli, &scenario);

    let outcome = match engine::run(&samples, &scenario) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Print per-interval rows
    for row in &outcome.rows {
        println!("{row}");
    }

    // Surface accumulated warnings without aborting the run
    for warning in import_warnings.iter().chain(&outcome.warnings) {
        eprintln!("warning: {warning}");
    }

    // Print the summary report
    let summary = SimulationSummary::from_outcome(&outcome, scenario.battery.capacity_kwh);
    println!("\n{summary}");

    // Headline metrics over the trailing window, dashboard-style
    let index = match TimelineIndex::new(&outcome.rows) {
        Ok(index) => index,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let latest = &outcome.rows[outcome.rows.len() - 1];
    let window_generation =
        index.window_sum(RowField::Generation, latest.timestamp, cli.window_hours);
    let window_load = index.window_sum(RowField::Load, latest.timestamp, cli.window_hours);
    println!("\n--- Latest Interval ---");
    println!("{latest}");
    println!(
        "Trailing {:.0} h: generation {:.3} kWh, load {:.3} kWh",
        cli.window_hours, window_generation, window_load
    );

    // Export CSV if requested
    if let Some(ref path) = cli.out_path {
        if let Err(e) = export_csv(&outcome.rows, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Timeline written to {path}");
    }
}
