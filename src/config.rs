//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use serde::Deserialize;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline installation. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation horizon, timezone, and cadence.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Panel array parameters.
    #[serde(default)]
    pub panel: PanelConfig,
    /// Battery storage parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Daily load schedule parameters.
    #[serde(default)]
    pub load: LoadConfig,
    /// Synthetic irradiance source parameters.
    #[serde(default)]
    pub synthetic: SyntheticConfig,
}

/// Simulation horizon, timezone, and cadence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// IANA timezone name for grouping and the timeline (e.g. `"Asia/Kolkata"`).
    pub timezone: String,
    /// Horizon start as a local datetime, ISO 8601 (`"2025-06-01T00:00:00"`).
    pub start: String,
    /// Horizon end as a local datetime, exclusive.
    pub end: String,
    /// Fixed interval between simulation rows in minutes (must be > 0).
    pub cadence_minutes: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Kolkata".to_string(),
            start: "2025-06-01T00:00:00".to_string(),
            end: "2025-06-03T00:00:00".to_string(),
            cadence_minutes: 60,
        }
    }
}

impl SimulationConfig {
    /// Parses the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the name is not a valid IANA timezone.
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone.parse::<Tz>().map_err(|_| ConfigError {
            field: "simulation.timezone".to_string(),
            message: format!("not a valid IANA timezone name: \"{}\"", self.timezone),
        })
    }

    /// Parses the configured horizon start.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the datetime string is malformed.
    pub fn start_naive(&self) -> Result<NaiveDateTime, ConfigError> {
        parse_local_datetime("simulation.start", &self.start)
    }

    /// Parses the configured horizon end.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the datetime string is malformed.
    pub fn end_naive(&self) -> Result<NaiveDateTime, ConfigError> {
        parse_local_datetime("simulation.end", &self.end)
    }

    /// Interval duration in hours, derived from `cadence_minutes`.
    pub fn dt_hours(&self) -> f32 {
        self.cadence_minutes as f32 / 60.0
    }
}

fn parse_local_datetime(field: &str, value: &str) -> Result<NaiveDateTime, ConfigError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| ConfigError {
            field: field.to_string(),
            message: format!("not an ISO 8601 local datetime: \"{value}\""),
        })
}

/// Panel array parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    /// Installed peak capacity (kWp).
    pub capacity_kwp: f32,
    /// Overall conversion efficiency factor (0.0, 1.0].
    pub efficiency: f32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            capacity_kwp: 1.3,
            efficiency: 0.18,
        }
    }
}

/// Battery storage parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Total usable capacity (kWh).
    pub capacity_kwh: f32,
    /// Minimum allowed level, the discharge floor (kWh).
    pub min_level_kwh: f32,
    /// Level at the start of the horizon (kWh); clamped into range with a warning.
    pub initial_level_kwh: f32,
    /// Dead-band for classifying an interval as charging/discharging (kWh).
    pub flow_deadband_kwh: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 7.2,
            min_level_kwh: 1.44,
            initial_level_kwh: 7.2,
            flow_deadband_kwh: 0.01,
        }
    }
}

/// One load schedule entry: a fractional weight applied for one hour of day.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleEntry {
    /// Hour of day (0-23).
    pub hour: u32,
    /// Fraction of the base load drawn during this hour (>= 0).
    pub weight: f32,
}

/// Daily load schedule parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// Base load magnitude (kW) scaled by each schedule entry's weight.
    pub base_kw: f32,
    /// Hour-to-weight entries; hours without an entry consume nothing.
    pub schedule: Vec<ScheduleEntry>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            base_kw: 0.3,
            schedule: vec![
                ScheduleEntry { hour: 16, weight: 1.0 },
                ScheduleEntry { hour: 17, weight: 1.0 },
                ScheduleEntry { hour: 18, weight: 1.0 },
                ScheduleEntry { hour: 19, weight: 1.0 },
                ScheduleEntry { hour: 20, weight: 0.5 },
            ],
        }
    }
}

/// Synthetic irradiance source parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticConfig {
    /// Peak clear-sky irradiance (W/m²).
    pub peak_w_m2: f32,
    /// First daylight hour (inclusive).
    pub sunrise_hour: u32,
    /// First dark hour after daylight (exclusive bound).
    pub sunset_hour: u32,
    /// Standard deviation of multiplicative Gaussian noise.
    pub noise_std: f32,
    /// Days of history generated before the horizon end.
    pub history_days: u32,
    /// Random seed for reproducible sample generation.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            peak_w_m2: 850.0,
            sunrise_hour: 7,
            sunset_hour: 19,
            noise_std: 0.08,
            history_days: 30,
            seed: 42,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.min_level_kwh"`).
    pub field: String,
    /// Human-readable constraint description including the offending value.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ScenarioConfig {
    /// Returns the baseline scenario (the original rooftop installation).
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            panel: PanelConfig::default(),
            battery: BatteryConfig::default(),
            load: LoadConfig::default(),
            synthetic: SyntheticConfig::default(),
        }
    }

    /// Returns the overcast preset: weak irradiance against the same load.
    pub fn overcast() -> Self {
        Self {
            synthetic: SyntheticConfig {
                peak_w_m2: 280.0,
                noise_std: 0.2,
                ..SyntheticConfig::default()
            },
            battery: BatteryConfig {
                initial_level_kwh: 3.6,
                ..BatteryConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the evening-peak preset: heavier, longer evening load.
    pub fn evening_peak() -> Self {
        Self {
            load: LoadConfig {
                base_kw: 0.6,
                schedule: vec![
                    ScheduleEntry { hour: 15, weight: 0.5 },
                    ScheduleEntry { hour: 16, weight: 1.0 },
                    ScheduleEntry { hour: 17, weight: 1.0 },
                    ScheduleEntry { hour: 18, weight: 1.0 },
                    ScheduleEntry { hour: 19, weight: 1.0 },
                    ScheduleEntry { hour: 20, weight: 1.0 },
                    ScheduleEntry { hour: 21, weight: 0.5 },
                ],
            },
            battery: BatteryConfig {
                initial_level_kwh: 5.0,
                ..BatteryConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "overcast", "evening_peak"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "overcast" => Ok(Self::overcast()),
            "evening_peak" => Ok(Self::evening_peak()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. An out-of-range
    /// initial battery level is not an error here; it is clamped with a
    /// warning when the simulation starts.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if let Err(e) = s.tz() {
            errors.push(e);
        }
        if s.cadence_minutes == 0 {
            errors.push(ConfigError {
                field: "simulation.cadence_minutes".into(),
                message: "must be > 0".into(),
            });
        }
        match (s.start_naive(), s.end_naive()) {
            (Ok(start), Ok(end)) => {
                if end <= start {
                    errors.push(ConfigError {
                        field: "simulation.end".into(),
                        message: format!(
                            "must be after simulation.start, got \"{}\" vs \"{}\"",
                            s.end, s.start
                        ),
                    });
                }
            }
            (start, end) => {
                errors.extend(start.err());
                errors.extend(end.err());
            }
        }

        let p = &self.panel;
        if p.capacity_kwp <= 0.0 {
            errors.push(ConfigError {
                field: "panel.capacity_kwp".into(),
                message: format!("must be > 0, got {}", p.capacity_kwp),
            });
        }
        if !(p.efficiency > 0.0 && p.efficiency <= 1.0) {
            errors.push(ConfigError {
                field: "panel.efficiency".into(),
                message: format!("must be in (0.0, 1.0], got {}", p.efficiency),
            });
        }

        let b = &self.battery;
        if b.capacity_kwh <= 0.0 {
            errors.push(ConfigError {
                field: "battery.capacity_kwh".into(),
                message: format!("must be > 0, got {}", b.capacity_kwh),
            });
        }
        if b.min_level_kwh < 0.0 {
            errors.push(ConfigError {
                field: "battery.min_level_kwh".into(),
                message: format!("must be >= 0, got {}", b.min_level_kwh),
            });
        }
        if b.min_level_kwh > b.capacity_kwh {
            errors.push(ConfigError {
                field: "battery.min_level_kwh".into(),
                message: format!(
                    "must be <= battery.capacity_kwh ({}), got {}",
                    b.capacity_kwh, b.min_level_kwh
                ),
            });
        }
        if b.flow_deadband_kwh < 0.0 {
            errors.push(ConfigError {
                field: "battery.flow_deadband_kwh".into(),
                message: format!("must be >= 0, got {}", b.flow_deadband_kwh),
            });
        }

        let l = &self.load;
        if l.base_kw < 0.0 {
            errors.push(ConfigError {
                field: "load.base_kw".into(),
                message: format!("must be >= 0, got {}", l.base_kw),
            });
        }
        if l.schedule.is_empty() {
            errors.push(ConfigError {
                field: "load.schedule".into(),
                message: "must contain at least one entry".into(),
            });
        }
        let mut seen_hours = [false; 24];
        for (i, entry) in l.schedule.iter().enumerate() {
            if entry.hour > 23 {
                errors.push(ConfigError {
                    field: format!("load.schedule[{i}].hour"),
                    message: format!("must be in 0..=23, got {}", entry.hour),
                });
                continue;
            }
            if entry.weight < 0.0 {
                errors.push(ConfigError {
                    field: format!("load.schedule[{i}].weight"),
                    message: format!("must be >= 0, got {}", entry.weight),
                });
            }
            if seen_hours[entry.hour as usize] {
                errors.push(ConfigError {
                    field: format!("load.schedule[{i}].hour"),
                    message: format!("duplicate entry for hour {}", entry.hour),
                });
            }
            seen_hours[entry.hour as usize] = true;
        }

        let syn = &self.synthetic;
        if syn.sunrise_hour >= syn.sunset_hour {
            errors.push(ConfigError {
                field: "synthetic.sunrise_hour".into(),
                message: "must be < synthetic.sunset_hour".into(),
            });
        }
        if syn.sunset_hour > 24 {
            errors.push(ConfigError {
                field: "synthetic.sunset_hour".into(),
                message: format!("must be <= 24, got {}", syn.sunset_hour),
            });
        }
        if syn.peak_w_m2 < 0.0 {
            errors.push(ConfigError {
                field: "synthetic.peak_w_m2".into(),
                message: format!("must be >= 0, got {}", syn.peak_w_m2),
            });
        }
        if syn.noise_std < 0.0 {
            errors.push(ConfigError {
                field: "synthetic.noise_std".into(),
                message: format!("must be >= 0, got {}", syn.noise_std),
            });
        }
        if syn.history_days == 0 {
            errors.push(ConfigError {
                field: "synthetic.history_days".into(),
                message: "must be > 0".into(),
            });
        }

        errors
    }
}
