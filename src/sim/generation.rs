//! Projection of the irradiance profile onto a simulation timeline.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::profile::IrradianceProfile;

/// Panel generation model: installed capacity times an efficiency factor.
///
/// Projection is a pure function of the profile and the timeline; the same
/// inputs always produce the same output, with no hidden state.
#[derive(Debug, Clone, Copy)]
pub struct GenerationModel {
    /// Installed peak capacity (kWp).
    pub capacity_kwp: f32,
    /// Overall conversion efficiency factor.
    pub efficiency_factor: f32,
}

impl GenerationModel {
    /// Creates a generation model with the given capacity and efficiency.
    pub fn new(capacity_kwp: f32, efficiency_factor: f32) -> Self {
        Self {
            capacity_kwp,
            efficiency_factor,
        }
    }

    /// Per-interval generated energy (kWh) for every timeline timestamp.
    ///
    /// Each value is `irradiance * capacity * efficiency * dt_hours`,
    /// floored at zero so interpolation artifacts can never produce
    /// negative generation.
    pub fn project(
        &self,
        profile: &IrradianceProfile,
        timeline: &[DateTime<Tz>],
        dt_hours: f32,
    ) -> Vec<f32> {
        timeline
            .iter()
            .map(|t| {
                let irradiance = profile.query_at(t);
                (irradiance * self.capacity_kwp * self.efficiency_factor * dt_hours).max(0.0)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::IrradianceSample;
    use chrono::{Duration, TimeZone, Utc};
    use chrono_tz::Asia::Kolkata;

    fn constant_profile(w_m2: f32) -> IrradianceProfile {
        // One sample per hour over two days, all at the same magnitude.
        let start = Utc.with_ymd_and_hms(2025, 5, 31, 18, 30, 0).unwrap();
        let samples: Vec<IrradianceSample> = (0..48)
            .map(|i| IrradianceSample {
                timestamp: start + Duration::hours(i),
                irradiance_w_m2: w_m2,
            })
            .collect();
        IrradianceProfile::build(&samples, Kolkata)
    }

    fn hourly_timeline(hours: i64) -> Vec<chrono::DateTime<chrono_tz::Tz>> {
        let start = Kolkata.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        (0..hours).map(|i| start + Duration::hours(i)).collect()
    }

    #[test]
    fn constant_irradiance_yields_expected_energy() {
        let profile = constant_profile(500.0);
        let model = GenerationModel::new(1.3, 0.18);
        let energy = model.project(&profile, &hourly_timeline(24), 1.0);

        assert_eq!(energy.len(), 24);
        for e in &energy {
            // 0.5 kW/m2 * 1.3 kWp * 0.18 = 0.117 kWh per hour
            assert!((e - 0.117).abs() < 1e-5, "got {e}");
        }
    }

    #[test]
    fn dt_scales_interval_energy() {
        let profile = constant_profile(500.0);
        let model = GenerationModel::new(1.3, 0.18);
        let energy = model.project(&profile, &hourly_timeline(4), 0.5);
        for e in &energy {
            assert!((e - 0.0585).abs() < 1e-5);
        }
    }

    #[test]
    fn unseen_days_generate_nothing() {
        let profile = constant_profile(500.0);
        let model = GenerationModel::new(1.3, 0.18);
        let far = Kolkata.with_ymd_and_hms(2025, 12, 1, 12, 0, 0).unwrap();
        let energy = model.project(&profile, &[far], 1.0);
        assert_eq!(energy, vec![0.0]);
    }

    #[test]
    fn negative_products_are_floored() {
        let profile = constant_profile(500.0);
        let model = GenerationModel::new(-1.3, 0.18);
        let energy = model.project(&profile, &hourly_timeline(3), 1.0);
        assert!(energy.iter().all(|e| *e == 0.0));
    }

    #[test]
    fn projection_is_deterministic() {
        let profile = constant_profile(712.0);
        let model = GenerationModel::new(2.0, 0.2);
        let timeline = hourly_timeline(48);
        assert_eq!(
            model.project(&profile, &timeline, 1.0),
            model.project(&profile, &timeline, 1.0)
        );
    }
}
