//! Day/night texture selection from real-world time and location.
//!
//! With a known location the decision uses true sunrise and sunset for that
//! point, computed with the NOAA sunrise equation. Without one it falls back
//! to the viewer's local clock. A force flag overrides both.

use chrono::{DateTime, FixedOffset, TimeDelta, Timelike, Utc};
use tracing::debug;

use crate::target::GeoCoordinate;
use crate::tuning::DayNightSettings;

/// Julian date of the Unix epoch.
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Julian date of the J2000.0 epoch.
const J2000_JD: f64 = 2_451_545.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;
/// Obliquity of the ecliptic in degrees.
const EARTH_OBLIQUITY_DEG: f64 = 23.4397;
/// Solar altitude at sunrise/sunset: refraction plus the solar disc radius.
const SUNRISE_ALTITUDE_DEG: f64 = -0.833;

/// Sun events for the solar day nearest a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolarDay {
    /// The sun rises and sets.
    Normal {
        /// Upper limb crosses the horizon in the morning.
        sunrise: DateTime<Utc>,
        /// Upper limb crosses the horizon in the evening.
        sunset: DateTime<Utc>,
    },
    /// The sun never sets (midnight sun).
    PolarDay,
    /// The sun never rises.
    PolarNight,
}

impl SolarDay {
    /// Whether `instant` falls outside daylight for this solar day.
    pub fn is_night_at(&self, instant: DateTime<Utc>) -> bool {
        match *self {
            SolarDay::Normal { sunrise, sunset } => instant < sunrise || instant > sunset,
            SolarDay::PolarDay => false,
            SolarDay::PolarNight => true,
        }
    }
}

fn julian_date(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / MILLIS_PER_DAY + UNIX_EPOCH_JD
}

fn offset_by_days(instant: DateTime<Utc>, days: f64) -> DateTime<Utc> {
    instant + TimeDelta::milliseconds((days * MILLIS_PER_DAY).round() as i64)
}

/// Sunrise and sunset at `coord` for the solar day whose mean noon is
/// closest to `instant`.
pub fn solar_events(coord: GeoCoordinate, instant: DateTime<Utc>) -> SolarDay {
    let jd_now = julian_date(instant);

    // Mean solar noon at this longitude, in days since J2000.
    let day_number = (jd_now - J2000_JD + coord.longitude / 360.0).round();
    let mean_noon = day_number - coord.longitude / 360.0;

    let mean_anomaly = (357.5291 + 0.985_600_28 * mean_noon).rem_euclid(360.0);
    let m = mean_anomaly.to_radians();
    let center = 1.9148 * m.sin() + 0.0200 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin();
    let ecliptic_longitude = (mean_anomaly + center + 180.0 + 102.9372).rem_euclid(360.0);
    let lambda = ecliptic_longitude.to_radians();

    let transit = J2000_JD + mean_noon + 0.0053 * m.sin() - 0.0069 * (2.0 * lambda).sin();

    let sin_declination = lambda.sin() * EARTH_OBLIQUITY_DEG.to_radians().sin();
    let cos_declination = (1.0 - sin_declination * sin_declination).sqrt();
    let phi = coord.latitude.to_radians();

    let cos_hour_angle = (SUNRISE_ALTITUDE_DEG.to_radians().sin() - phi.sin() * sin_declination)
        / (phi.cos() * cos_declination);

    if cos_hour_angle < -1.0 {
        return SolarDay::PolarDay;
    }
    if cos_hour_angle > 1.0 || cos_hour_angle.is_nan() {
        return SolarDay::PolarNight;
    }

    let half_day = cos_hour_angle.acos().to_degrees() / 360.0;
    SolarDay::Normal {
        sunrise: offset_by_days(instant, transit - half_day - jd_now),
        sunset: offset_by_days(instant, transit + half_day - jd_now),
    }
}

/// Clock-only fallback: night before `night_end_hour` or from
/// `night_start_hour` on, in `now`'s own offset.
pub fn is_night_by_clock(now: DateTime<FixedOffset>, settings: &DayNightSettings) -> bool {
    let hour = now.hour();
    hour < settings.night_end_hour || hour >= settings.night_start_hour
}

/// Whether the night texture should be shown.
///
/// `now` carries the viewer's local offset, which the clock fallback uses
/// when no location is known.
pub fn is_night(
    force_night: bool,
    location: Option<GeoCoordinate>,
    now: DateTime<FixedOffset>,
    settings: &DayNightSettings,
) -> bool {
    if force_night {
        return true;
    }
    match location {
        Some(coord) => {
            let instant = now.with_timezone(&Utc);
            solar_events(coord, instant).is_night_at(instant)
        }
        None => is_night_by_clock(now, settings),
    }
}

/// Memoized night flag keyed by the force flag and location, with an
/// optional periodic refresh driven by accumulated frame time.
#[derive(Clone, Debug, Default)]
pub struct DayNightCache {
    key: Option<(bool, Option<GeoCoordinate>)>,
    night: bool,
    since_evaluation_s: f64,
    evaluations: u32,
}

impl DayNightCache {
    /// Current flag, re-derived if the inputs changed or the refresh interval
    /// has elapsed. `elapsed_s` is the frame time since the previous call.
    pub fn evaluate(
        &mut self,
        force_night: bool,
        location: Option<GeoCoordinate>,
        now: DateTime<FixedOffset>,
        elapsed_s: f64,
        settings: &DayNightSettings,
    ) -> bool {
        self.since_evaluation_s += elapsed_s.max(0.0);

        let key = (force_night, location);
        let stale = settings.recheck_interval_s > 0.0
            && self.since_evaluation_s >= settings.recheck_interval_s;

        if self.key != Some(key) || stale {
            let night = is_night(force_night, location, now, settings);
            if self.key.is_some() && night != self.night {
                debug!(night, ?location, force_night, "Day/night flag changed");
            }
            self.night = night;
            self.key = Some(key);
            self.since_evaluation_s = 0.0;
            self.evaluations += 1;
        }
        self.night
    }

    /// Force the next [`evaluate`](Self::evaluate) to re-derive the flag.
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    /// Last derived flag.
    pub fn is_night(&self) -> bool {
        self.night
    }

    /// How many times the flag has been derived.
    pub fn evaluations(&self) -> u32 {
        self.evaluations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const LONDON: GeoCoordinate = GeoCoordinate::new_unchecked(51.5074, -0.1278);
    const TROMSO: GeoCoordinate = GeoCoordinate::new_unchecked(69.6496, 18.9560);
    const SYDNEY: GeoCoordinate = GeoCoordinate::new_unchecked(-33.8688, 151.2093);
    const TOKYO: GeoCoordinate = GeoCoordinate::new_unchecked(35.6762, 139.6503);
    const LOS_ANGELES: GeoCoordinate = GeoCoordinate::new_unchecked(34.0522, -118.2437);

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn local(offset_hours: i32, y: i32, mo: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset_hours * 3600)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, 0, 0)
            .unwrap()
    }

    fn minutes_apart(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
        (a - b).num_minutes().abs()
    }

    #[test]
    fn test_london_midsummer_sun_times() {
        // Published: sunrise 03:43 UTC, sunset 20:21 UTC.
        match solar_events(LONDON, utc(2024, 6, 21, 12, 0)) {
            SolarDay::Normal { sunrise, sunset } => {
                assert!(
                    minutes_apart(sunrise, utc(2024, 6, 21, 3, 43)) <= 5,
                    "sunrise {sunrise}"
                );
                assert!(
                    minutes_apart(sunset, utc(2024, 6, 21, 20, 21)) <= 5,
                    "sunset {sunset}"
                );
            }
            other => panic!("expected normal day, got {other:?}"),
        }
    }

    fn assert_sun_times(day: SolarDay, rise: DateTime<Utc>, set: DateTime<Utc>) {
        match day {
            SolarDay::Normal { sunrise, sunset } => {
                assert!(minutes_apart(sunrise, rise) <= 5, "sunrise {sunrise}, expected {rise}");
                assert!(minutes_apart(sunset, set) <= 5, "sunset {sunset}, expected {set}");
            }
            other => panic!("expected normal day, got {other:?}"),
        }
    }

    #[test]
    fn test_far_east_sun_times() {
        // Tokyo, local noon: sunrise 04:25 JST is 19:25 UTC the day before,
        // sunset 19:00 JST is 10:00 UTC.
        assert_sun_times(
            solar_events(TOKYO, utc(2024, 6, 21, 3, 0)),
            utc(2024, 6, 20, 19, 25),
            utc(2024, 6, 21, 10, 0),
        );
    }

    #[test]
    fn test_far_west_sun_times() {
        // Los Angeles, early afternoon: sunrise 05:42 PDT is 12:42 UTC,
        // sunset 20:07 PDT is 03:07 UTC the next day.
        assert_sun_times(
            solar_events(LOS_ANGELES, utc(2024, 6, 21, 20, 0)),
            utc(2024, 6, 21, 12, 42),
            utc(2024, 6, 22, 3, 7),
        );
    }

    #[test]
    fn test_events_track_the_nearest_solar_day() {
        // Just before midnight UTC, Sydney's nearest local noon is the next
        // UTC day (local morning); sunrise must already be behind us.
        let now = utc(2024, 1, 15, 23, 30);
        match solar_events(SYDNEY, now) {
            SolarDay::Normal { sunrise, sunset } => {
                assert!(sunrise < now, "sunrise {sunrise} should precede {now}");
                assert!(sunset > now);
            }
            other => panic!("expected normal day, got {other:?}"),
        }
    }

    #[test]
    fn test_london_day_and_night_instants() {
        let settings = DayNightSettings::default();
        let noon = utc(2024, 6, 21, 12, 0).fixed_offset();
        let late = utc(2024, 6, 21, 23, 30).fixed_offset();
        let early = utc(2024, 6, 21, 2, 0).fixed_offset();
        assert!(!is_night(false, Some(LONDON), noon, &settings));
        assert!(is_night(false, Some(LONDON), late, &settings));
        assert!(is_night(false, Some(LONDON), early, &settings));
    }

    #[test]
    fn test_polar_day_and_night() {
        assert_eq!(solar_events(TROMSO, utc(2024, 6, 21, 0, 0)), SolarDay::PolarDay);
        assert_eq!(
            solar_events(TROMSO, utc(2024, 12, 21, 12, 0)),
            SolarDay::PolarNight
        );
        let settings = DayNightSettings::default();
        let midnight = utc(2024, 6, 21, 23, 0).fixed_offset();
        assert!(!is_night(false, Some(TROMSO), midnight, &settings));
    }

    #[test]
    fn test_force_night_overrides_everything() {
        let settings = DayNightSettings::default();
        let noon = utc(2024, 6, 21, 12, 0).fixed_offset();
        assert!(is_night(true, Some(LONDON), noon, &settings));
        assert!(is_night(true, None, local(0, 2024, 6, 21, 12), &settings));
    }

    #[test]
    fn test_clock_fallback_without_location() {
        let settings = DayNightSettings::default();
        assert!(is_night(false, None, local(2, 2024, 3, 1, 3), &settings));
        assert!(!is_night(false, None, local(2, 2024, 3, 1, 12), &settings));
        assert!(is_night(false, None, local(-5, 2024, 3, 1, 18), &settings));
        assert!(!is_night(false, None, local(-5, 2024, 3, 1, 6), &settings));
        assert!(!is_night(false, None, local(0, 2024, 3, 1, 17), &settings));
    }

    #[test]
    fn test_clock_fallback_uses_local_offset() {
        let settings = DayNightSettings::default();
        // 12:00 UTC is 21:00 in UTC+9.
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let tokyo_evening = utc(2024, 3, 1, 12, 0).with_timezone(&tokyo);
        assert!(is_night(false, None, tokyo_evening, &settings));
    }

    #[test]
    fn test_cache_memoizes_until_inputs_change() {
        let settings = DayNightSettings {
            recheck_interval_s: 0.0,
            ..Default::default()
        };
        let mut cache = DayNightCache::default();
        let noon = local(0, 2024, 3, 1, 12);
        let night = local(0, 2024, 3, 1, 23);

        assert!(!cache.evaluate(false, None, noon, 0.016, &settings));
        // Same key: the stale answer is kept even though the clock moved.
        assert!(!cache.evaluate(false, None, night, 1000.0, &settings));
        assert_eq!(cache.evaluations(), 1);

        assert!(cache.evaluate(true, None, noon, 0.016, &settings));
        assert_eq!(cache.evaluations(), 2);
    }

    #[test]
    fn test_cache_rechecks_after_interval() {
        let settings = DayNightSettings {
            recheck_interval_s: 60.0,
            ..Default::default()
        };
        let mut cache = DayNightCache::default();
        assert!(!cache.evaluate(false, None, local(0, 2024, 3, 1, 17), 0.0, &settings));
        assert!(!cache.evaluate(false, None, local(0, 2024, 3, 1, 18), 30.0, &settings));
        assert!(cache.evaluate(false, None, local(0, 2024, 3, 1, 18), 30.0, &settings));
        assert!(cache.is_night());
        assert_eq!(cache.evaluations(), 2);
    }

    #[test]
    fn test_cache_reacts_to_location_arrival() {
        let settings = DayNightSettings::default();
        let mut cache = DayNightCache::default();
        // The clock fallback says night at 23:00; once London is known the
        // flag is re-derived from its sun times.
        let late = utc(2024, 6, 21, 23, 0).fixed_offset();
        assert!(cache.evaluate(false, None, late, 0.0, &settings));

        let noon = utc(2024, 6, 21, 12, 0).fixed_offset();
        assert!(!cache.evaluate(false, Some(LONDON), noon, 0.0, &settings));
        assert_eq!(cache.evaluations(), 2);
    }
}
