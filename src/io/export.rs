//! CSV export for finished simulation timelines.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::SimulationRow;

/// Schema v1 column header for CSV timeline export.
const HEADER: &str = "timestamp,irradiance_kw_m2,generation_kwh,load_kwh,\
                      battery_level_kwh,battery_flow_kwh,charging,discharging";

/// Exports simulation rows to a CSV file at the given path.
///
/// Writes a header row followed by one data row per interval using the
/// schema v1 column layout. Produces deterministic output for identical
/// inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(rows: &[SimulationRow], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(rows, buf)
}

/// Writes simulation rows as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(rows: &[SimulationRow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    // Header
    wtr.write_record(HEADER.split(',').map(str::trim))?;

    // Data rows
    for r in rows {
        wtr.write_record(&[
            r.timestamp.to_rfc3339(),
            format!("{:.4}", r.irradiance_kw_m2),
            format!("{:.4}", r.generation_kwh),
            format!("{:.4}", r.load_kwh),
            format!("{:.4}", r.battery_level_kwh),
            format!("{:.4}", r.battery_flow_kwh),
            r.charging.to_string(),
            r.discharging.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
