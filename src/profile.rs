//! Climatological irradiance profile built from raw sample history.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// A single timestamped irradiance measurement.
///
/// The timestamp is an absolute instant; conversion into the profile's
/// timezone happens during [`IrradianceProfile::build`]. Raw input may
/// carry several irradiance components (direct, diffuse, reflected) for
/// the same instant as separate samples; the profile only requires their
/// sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrradianceSample {
    /// Measurement instant.
    pub timestamp: DateTime<Utc>,
    /// Irradiance on the panel plane in W/m² (non-negative).
    pub irradiance_w_m2: f32,
}

/// Mean irradiance lookup table keyed by (day-of-year, hour-of-day).
///
/// Samples from different years sharing the same calendar key are averaged
/// into one climatological entry. This intentionally aliases all observed
/// years (including leap-day offsets) onto a single 366-day profile; the
/// aliasing is a documented simplification of the upstream data source,
/// not an artifact to correct.
///
/// # Examples
///
/// ```
/// use pv_sim::profile::IrradianceProfile;
///
/// let profile = IrradianceProfile::build(&[], chrono_tz::Asia::Kolkata);
/// assert_eq!(profile.query(150, 12), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct IrradianceProfile {
    tz: Tz,
    entries: HashMap<(u32, u32), f32>,
}

impl IrradianceProfile {
    /// Builds the profile from raw samples, grouping in the given timezone.
    ///
    /// Samples sharing an identical instant are summed first (irradiance
    /// components), then the per-instant totals are averaged within each
    /// (day-of-year, hour-of-day) bucket across all observed years.
    /// Negative magnitudes are floored at zero before aggregation.
    pub fn build(samples: &[IrradianceSample], tz: Tz) -> Self {
        let mut per_instant: BTreeMap<DateTime<Utc>, f32> = BTreeMap::new();
        for sample in samples {
            *per_instant.entry(sample.timestamp).or_insert(0.0) +=
                sample.irradiance_w_m2.max(0.0);
        }

        let mut buckets: HashMap<(u32, u32), (f32, u32)> = HashMap::new();
        for (instant, total_w_m2) in per_instant {
            let local = instant.with_timezone(&tz);
            let bucket = buckets
                .entry((local.ordinal(), local.hour()))
                .or_insert((0.0, 0));
            bucket.0 += total_w_m2;
            bucket.1 += 1;
        }

        let entries = buckets
            .into_iter()
            .map(|(key, (sum_w_m2, count))| (key, sum_w_m2 / count as f32 / 1000.0))
            .collect();

        Self { tz, entries }
    }

    /// Mean irradiance in kW/m² for the given calendar key.
    ///
    /// Unseen keys answer 0.0; this never fails.
    pub fn query(&self, day_of_year: u32, hour_of_day: u32) -> f32 {
        self.entries
            .get(&(day_of_year, hour_of_day))
            .copied()
            .unwrap_or(0.0)
    }

    /// Mean irradiance in kW/m² at an absolute instant.
    ///
    /// The instant is converted into the profile's timezone before the
    /// calendar key is derived.
    pub fn query_at<T: TimeZone>(&self, instant: &DateTime<T>) -> f32 {
        let local = instant.with_timezone(&self.tz);
        self.query(local.ordinal(), local.hour())
    }

    /// Number of distinct (day-of-year, hour-of-day) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the profile holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Kolkata;

    fn sample(y: i32, m: u32, d: u32, h: u32, w_m2: f32) -> IrradianceSample {
        IrradianceSample {
            timestamp: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
            irradiance_w_m2: w_m2,
        }
    }

    #[test]
    fn multi_year_samples_average_into_one_entry() {
        // Same calendar slot (June 1, 06:30 IST) in two non-leap years.
        let samples = vec![
            sample(2023, 6, 1, 1, 400.0),
            sample(2025, 6, 1, 1, 600.0),
        ];
        let profile = IrradianceProfile::build(&samples, Kolkata);

        assert_eq!(profile.len(), 1);
        let probe = Utc.with_ymd_and_hms(2023, 6, 1, 1, 0, 0).unwrap();
        assert!((profile.query_at(&probe) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn leap_year_offset_lands_in_a_different_bucket() {
        // June 1 is ordinal 152 in 2023 but 153 in leap-year 2024; the
        // profile keeps the ordinal aliasing rather than correcting it.
        let samples = vec![
            sample(2023, 6, 1, 1, 400.0),
            sample(2024, 6, 1, 1, 600.0),
        ];
        let profile = IrradianceProfile::build(&samples, Kolkata);
        assert_eq!(profile.len(), 2);
    }

    #[test]
    fn components_at_same_instant_are_summed_before_averaging() {
        let samples = vec![
            sample(2023, 6, 1, 6, 300.0),
            sample(2023, 6, 1, 6, 200.0),
            sample(2025, 6, 1, 6, 1000.0),
        ];
        let profile = IrradianceProfile::build(&samples, Kolkata);

        // Instants: (300 + 200) = 500 and 1000, averaged to 750 W/m².
        let probe = Utc.with_ymd_and_hms(2023, 6, 1, 6, 0, 0).unwrap();
        assert!((profile.query_at(&probe) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn grouping_uses_profile_timezone_hour() {
        // 20:00 UTC on June 1 is 01:30 IST on June 2.
        let samples = vec![sample(2023, 6, 1, 20, 500.0)];
        let profile = IrradianceProfile::build(&samples, Kolkata);

        let local = Utc
            .with_ymd_and_hms(2023, 6, 1, 20, 0, 0)
            .unwrap()
            .with_timezone(&Kolkata);
        assert_eq!(local.hour(), 1);
        assert!((profile.query(local.ordinal(), 1) - 0.5).abs() < 1e-6);
        assert_eq!(profile.query(local.ordinal(), 20), 0.0);
    }

    #[test]
    fn unseen_key_answers_zero() {
        let profile = IrradianceProfile::build(&[sample(2023, 6, 1, 6, 500.0)], Kolkata);
        assert_eq!(profile.query(1, 0), 0.0);
        assert_eq!(profile.query(366, 23), 0.0);
    }

    #[test]
    fn negative_magnitudes_are_floored() {
        let samples = vec![sample(2023, 6, 1, 6, -250.0)];
        let profile = IrradianceProfile::build(&samples, Kolkata);
        let probe = Utc.with_ymd_and_hms(2023, 6, 1, 6, 0, 0).unwrap();
        assert_eq!(profile.query_at(&probe), 0.0);
    }

    #[test]
    fn empty_input_builds_empty_profile() {
        let profile = IrradianceProfile::build(&[], Kolkata);
        assert!(profile.is_empty());
        assert_eq!(profile.query(100, 12), 0.0);
    }
}
