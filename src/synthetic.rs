//! Seeded synthetic irradiance source.
//!
//! Stands in for the live data feed during demos and tests: a daylight
//! half-sine shape with multiplicative Gaussian noise, deterministic per
//! seed. The pipeline itself never draws randomness; only this source
//! does.

use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::SyntheticConfig;
use crate::profile::IrradianceSample;

/// Daylight fraction for an hour of day: a half-sine arc between sunrise
/// and sunset, zero outside it. The half-hour offset centers each sample
/// within its hour.
fn daylight_frac(hour: u32, sunrise: u32, sunset: u32) -> f32 {
    if sunset <= sunrise || hour < sunrise || hour >= sunset {
        return 0.0;
    }
    let span = (sunset - sunrise) as f32;
    let position = (hour - sunrise) as f32 + 0.5;
    (std::f32::consts::PI * position / span).sin().max(0.0)
}

/// Gaussian noise via the Box-Muller transform.
fn gaussian_noise(rng: &mut StdRng, std_dev: f32) -> f32 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f32 = rng.random::<f32>().clamp(1e-6, 1.0);
    let u2: f32 = rng.random::<f32>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
    z0 * std_dev
}

/// Generates hourly samples for `history_days` days ending at `end`.
///
/// Daylight hours follow a half-sine profile scaled by `peak_w_m2` with
/// multiplicative noise; night hours are zero. Output is non-negative and
/// identical for identical configuration and seed.
pub fn generate(cfg: &SyntheticConfig, tz: Tz, end: DateTime<Tz>) -> Vec<IrradianceSample> {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let hours = i64::from(cfg.history_days) * 24;
    let start = end - Duration::hours(hours);

    (0..hours)
        .map(|i| {
            let instant = start + Duration::hours(i);
            let local_hour = instant.with_timezone(&tz).hour();
            let frac = daylight_frac(local_hour, cfg.sunrise_hour, cfg.sunset_hour);
            let irradiance_w_m2 = if frac > 0.0 {
                let noise_mult = 1.0 + gaussian_noise(&mut rng, cfg.noise_std);
                (cfg.peak_w_m2 * frac * noise_mult).max(0.0)
            } else {
                0.0
            };
            IrradianceSample {
                timestamp: instant.with_timezone(&Utc),
                irradiance_w_m2,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Kolkata;

    fn cfg() -> SyntheticConfig {
        SyntheticConfig::default()
    }

    fn horizon_end() -> DateTime<Tz> {
        Kolkata.with_ymd_and_hms(2025, 6, 3, 0, 0, 0).unwrap()
    }

    #[test]
    fn sample_count_matches_history_days() {
        let samples = generate(&cfg(), Kolkata, horizon_end());
        assert_eq!(samples.len(), 30 * 24);
    }

    #[test]
    fn night_hours_are_dark() {
        let samples = generate(&cfg(), Kolkata, horizon_end());
        for s in &samples {
            let hour = s.timestamp.with_timezone(&Kolkata).hour();
            if !(7..19).contains(&hour) {
                assert_eq!(s.irradiance_w_m2, 0.0, "hour {hour} should be dark");
            }
        }
    }

    #[test]
    fn midday_outshines_dawn() {
        let quiet = SyntheticConfig {
            noise_std: 0.0,
            ..cfg()
        };
        let samples = generate(&quiet, Kolkata, horizon_end());
        let at_hour = |h: u32| {
            samples
                .iter()
                .find(|s| s.timestamp.with_timezone(&Kolkata).hour() == h)
                .map(|s| s.irradiance_w_m2)
                .unwrap_or(0.0)
        };
        assert!(at_hour(12) > at_hour(7));
    }

    #[test]
    fn output_is_non_negative() {
        let noisy = SyntheticConfig {
            noise_std: 2.0,
            ..cfg()
        };
        let samples = generate(&noisy, Kolkata, horizon_end());
        assert!(samples.iter().all(|s| s.irradiance_w_m2 >= 0.0));
    }

    #[test]
    fn same_seed_reproduces_samples() {
        let a = generate(&cfg(), Kolkata, horizon_end());
        let b = generate(&cfg(), Kolkata, horizon_end());
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let other = SyntheticConfig { seed: 7, ..cfg() };
        let a = generate(&cfg(), Kolkata, horizon_end());
        let b = generate(&other, Kolkata, horizon_end());
        assert_ne!(a, b);
    }
}
