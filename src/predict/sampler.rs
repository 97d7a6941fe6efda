use chrono::{DateTime, Duration, Utc};

use crate::predict::ephemeris::Ephemeris;
use crate::predict::observer::ObserverLocation;
use crate::predict::propagation::{
    dot, geodetic, gmst, look_angles, norm, observer_inertial_km, sub, teme_to_ecef, topocentric,
    OrbitSource,
};
use crate::predict::types::{round2, Direction, PassWindow, SamplePoint};

/// Spacing between samples and the look-ahead used for the direction test.
pub const SAMPLE_INTERVAL_SECONDS: i64 = 2;

/// Number of ticks for a window: one at RISE, then every cadence until the
/// SET instant is reached or passed.
pub fn tick_count(window: &PassWindow, cadence: Duration) -> usize {
    let span = (window.set - window.rise).num_microseconds().unwrap_or(0).max(0);
    let step = cadence.num_microseconds().unwrap_or(1).max(1);
    ((span + step - 1) / step) as usize + 1
}

/// Sample the geometry of one pass at a fixed cadence.
///
/// Ticks where either the current or the look-ahead elevation cannot be
/// computed are skipped.
pub fn sample_pass<S: OrbitSource + ?Sized>(
    source: &S,
    observer: &ObserverLocation,
    ephemeris: &dyn Ephemeris,
    window: &PassWindow,
) -> Vec<SamplePoint> {
    let cadence = Duration::seconds(SAMPLE_INTERVAL_SECONDS);
    let count = tick_count(window, cadence);
    let mut points = Vec::with_capacity(count);
    let mut skipped = 0usize;

    for i in 0..count {
        let t = window.rise + cadence * i as i32;
        match sample_at(source, observer, ephemeris, t) {
            Some(point) => points.push(point),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!(
            "pass at {}: skipped {} of {} ticks with no elevation",
            window.rise,
            skipped,
            count
        );
    }

    points
}

fn sample_at<S: OrbitSource + ?Sized>(
    source: &S,
    observer: &ObserverLocation,
    ephemeris: &dyn Ephemeris,
    t: DateTime<Utc>,
) -> Option<SamplePoint> {
    let state = source.state_at(t).ok()?;
    let sidereal = gmst(t);
    let sat_ecef = teme_to_ecef(state.position_km, sidereal);
    let look = look_angles(observer, sat_ecef);

    let later = topocentric(
        source,
        observer,
        t + Duration::seconds(SAMPLE_INTERVAL_SECONDS),
    )
    .ok()?;

    let direction = classify(look.elevation_deg, later.elevation_deg);

    let obs = observer_inertial_km(observer, t);
    let sat = state.position_km;

    Some(SamplePoint {
        time: t,
        elevation_deg: round2(look.elevation_deg),
        azimuth_deg: look.azimuth_deg,
        distance_km: round2(look.range_km),
        direction,
        sun_angle_deg: separation_deg(obs, sat, ephemeris.sun_position_km(t)),
        moon_angle_deg: separation_deg(obs, sat, ephemeris.moon_position_km(t)),
        sub_point: geodetic(sat_ecef),
    })
}

/// Forward finite difference: rising only if strictly higher two seconds later.
pub fn classify(now_deg: f64, later_deg: f64) -> Direction {
    if later_deg > now_deg {
        Direction::Ascending
    } else {
        Direction::Descending
    }
}

/// Angle at the observer between the satellite and `body`, normalised by the
/// geocentric magnitudes of the satellite and body vectors.
pub fn separation_deg(obs: [f64; 3], sat: [f64; 3], body: [f64; 3]) -> f64 {
    let cos = dot(sub(sat, obs), sub(body, obs)) / (norm(sat) * norm(body));
    cos.acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::error::PredictError;
    use crate::predict::events::tests::{zero_observer, SyntheticPasses};
    use crate::predict::propagation::OrbitState;
    use chrono::TimeZone;

    struct FixedSky;

    impl Ephemeris for FixedSky {
        fn sun_position_km(&self, _t: DateTime<Utc>) -> [f64; 3] {
            [1.0e8, 0.0, 0.0]
        }
        fn moon_position_km(&self, _t: DateTime<Utc>) -> [f64; 3] {
            [0.0, 3.8e5, 0.0]
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 31, 0, 0, 0).unwrap()
    }

    fn window(seconds: i64, micros: i64) -> PassWindow {
        PassWindow {
            rise_index: 0,
            set_index: 2,
            rise: t0(),
            set: t0() + Duration::seconds(seconds) + Duration::microseconds(micros),
        }
    }

    fn source() -> SyntheticPasses {
        SyntheticPasses {
            epoch: t0() + Duration::seconds(30),
            period_s: 6000.0,
            peak_deg: 80.0,
        }
    }

    #[test]
    fn tick_count_is_ceiling_plus_one() {
        let cadence = Duration::seconds(2);
        assert_eq!(tick_count(&window(0, 0), cadence), 1);
        assert_eq!(tick_count(&window(4, 0), cadence), 3);
        assert_eq!(tick_count(&window(5, 0), cadence), 4);
        assert_eq!(tick_count(&window(4, 1), cadence), 4);
        assert_eq!(tick_count(&window(61, 500_000), cadence), 32);
    }

    #[test]
    fn samples_follow_cadence_and_may_overshoot() {
        let w = window(9, 0);
        let points = sample_pass(&source(), &zero_observer(), &FixedSky, &w);
        assert_eq!(points.len(), 6);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.time, t0() + Duration::seconds(2 * i as i64));
        }
        let last = points.last().unwrap().time;
        assert!(last > w.set && last - w.set < Duration::seconds(2));
    }

    #[test]
    fn direction_flips_at_culmination() {
        // Culmination of the synthetic source is at t0 + 30 s.
        let w = window(60, 0);
        let points = sample_pass(&source(), &zero_observer(), &FixedSky, &w);
        for p in &points {
            let offset = (p.time - t0()).num_seconds();
            let expected = if offset < 30 {
                Direction::Ascending
            } else {
                Direction::Descending
            };
            assert_eq!(p.direction, expected, "tick at +{offset}s");
        }
    }

    #[test]
    fn equal_elevations_classify_descending() {
        assert_eq!(classify(45.0, 45.0), Direction::Descending);
        assert_eq!(classify(45.0, 45.000001), Direction::Ascending);
        assert_eq!(classify(45.0, 44.9), Direction::Descending);
    }

    #[test]
    fn source_that_never_propagates_yields_no_samples() {
        struct Decayed;
        impl OrbitSource for Decayed {
            fn state_at(&self, _t: DateTime<Utc>) -> Result<OrbitState, PredictError> {
                Err(PredictError::Propagation("decayed".into()))
            }
        }
        assert!(sample_pass(&Decayed, &zero_observer(), &FixedSky, &window(4, 0)).is_empty());
    }

    #[test]
    fn unavailable_ticks_are_skipped() {
        // Fails at every instant whose whole second is a multiple of 6, which
        // also knocks out the tick two seconds earlier via the look-ahead.
        struct Flaky(SyntheticPasses);
        impl OrbitSource for Flaky {
            fn state_at(&self, t: DateTime<Utc>) -> Result<OrbitState, PredictError> {
                if t.timestamp() % 6 == 0 && t.timestamp_subsec_micros() == 0 {
                    return Err(PredictError::Propagation("decayed".into()));
                }
                self.0.state_at(t)
            }
        }
        let w = window(12, 0);
        let points = sample_pass(&Flaky(source()), &zero_observer(), &FixedSky, &w);
        let offsets: Vec<i64> = points.iter().map(|p| (p.time - t0()).num_seconds()).collect();
        assert_eq!(offsets, vec![2, 8]);
    }

    #[test]
    fn elevation_and_range_are_rounded_angles_are_not() {
        let points = sample_pass(&source(), &zero_observer(), &FixedSky, &window(20, 0));
        assert!(!points.is_empty());
        for p in &points {
            assert_eq!(p.elevation_deg, round2(p.elevation_deg));
            assert_eq!(p.distance_km, round2(p.distance_km));
            assert!(p.sun_angle_deg.is_finite());
            assert!(p.moon_angle_deg.is_finite());
        }
        assert!(points.iter().any(|p| p.sun_angle_deg != round2(p.sun_angle_deg)));
    }

    #[test]
    fn separation_uses_geocentric_magnitudes() {
        let obs = [6378.0, 0.0, 0.0];
        let sat = [6378.0, 0.0, 500.0];
        let body = [6378.0, 1.0e6, 0.0];
        // (sat-obs)·(body-obs) = 0, so the angle is 90° regardless of normaliser.
        assert!((separation_deg(obs, sat, body) - 90.0).abs() < 1e-12);

        let body = [6378.0, 0.0, 1.0e6];
        let expected = ((500.0 * 1.0e6) / (norm(sat) * norm(body))).acos().to_degrees();
        assert_eq!(separation_deg(obs, sat, body), expected);
        // A true separation would be 0° here.
        assert!(expected > 80.0);
    }
}
