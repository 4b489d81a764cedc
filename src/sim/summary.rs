//! Post-hoc summary report computed from a finished simulation run.

use std::fmt;

use super::engine::SimulationOutcome;

/// Aggregate figures derived from a complete run.
///
/// Computed post-hoc from the immutable rows to ensure consistency
/// between the timeline and the reported numbers.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    /// Total generated energy over the horizon (kWh).
    pub total_generation_kwh: f32,
    /// Total scheduled consumption over the horizon (kWh).
    pub total_load_kwh: f32,
    /// Generation lost to a full battery (kWh).
    pub curtailed_kwh: f32,
    /// Demand unserved at the battery floor (kWh).
    pub unmet_kwh: f32,
    /// Total battery energy throughput (kWh, sum of |flow|).
    pub battery_throughput_kwh: f32,
    /// Battery equivalent full cycles (throughput / 2*capacity).
    pub equivalent_full_cycles: f32,
    /// Lowest battery level touched, final level included (kWh).
    pub min_level_kwh: f32,
    /// Highest battery level touched, final level included (kWh).
    pub max_level_kwh: f32,
    /// Battery level after the final interval's flow (kWh).
    pub final_level_kwh: f32,
}

impl SimulationSummary {
    /// Computes the summary from a finished outcome.
    pub fn from_outcome(outcome: &SimulationOutcome, battery_capacity_kwh: f32) -> Self {
        if outcome.rows.is_empty() {
            return Self {
                total_generation_kwh: 0.0,
                total_load_kwh: 0.0,
                curtailed_kwh: 0.0,
                unmet_kwh: 0.0,
                battery_throughput_kwh: 0.0,
                equivalent_full_cycles: 0.0,
                min_level_kwh: 0.0,
                max_level_kwh: 0.0,
                final_level_kwh: 0.0,
            };
        }

        let mut generation = 0.0_f32;
        let mut load = 0.0_f32;
        let mut throughput = 0.0_f32;
        let mut min_level = f32::INFINITY;
        let mut max_level = f32::NEG_INFINITY;

        for row in &outcome.rows {
            generation += row.generation_kwh;
            load += row.load_kwh;
            throughput += row.battery_flow_kwh.abs();
            min_level = min_level.min(row.battery_level_kwh);
            max_level = max_level.max(row.battery_level_kwh);
        }

        let last = &outcome.rows[outcome.rows.len() - 1];
        let final_level = last.battery_level_kwh + last.battery_flow_kwh;
        min_level = min_level.min(final_level);
        max_level = max_level.max(final_level);

        let cycles = if battery_capacity_kwh > 0.0 {
            throughput / (2.0 * battery_capacity_kwh)
        } else {
            0.0
        };

        Self {
            total_generation_kwh: generation,
            total_load_kwh: load,
            curtailed_kwh: outcome.curtailed_kwh,
            unmet_kwh: outcome.unmet_kwh,
            battery_throughput_kwh: throughput,
            equivalent_full_cycles: cycles,
            min_level_kwh: min_level,
            max_level_kwh: max_level,
            final_level_kwh: final_level,
        }
    }
}

impl fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Simulation Summary ---")?;
        writeln!(f, "Generation:          {:.3} kWh", self.total_generation_kwh)?;
        writeln!(f, "Load:                {:.3} kWh", self.total_load_kwh)?;
        writeln!(f, "Curtailed:           {:.3} kWh", self.curtailed_kwh)?;
        writeln!(f, "Unmet load:          {:.3} kWh", self.unmet_kwh)?;
        writeln!(
            f,
            "Battery throughput:  {:.3} kWh ({:.2} equiv. cycles)",
            self.battery_throughput_kwh, self.equivalent_full_cycles
        )?;
        writeln!(
            f,
            "Battery level range: {:.3} to {:.3} kWh",
            self.min_level_kwh, self.max_level_kwh
        )?;
        write!(f, "Final level:         {:.3} kWh", self.final_level_kwh)
    }
}
