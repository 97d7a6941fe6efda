use chrono::Duration;

use crate::predict::error::PredictError;
use crate::predict::observer::ObserverLocation;
use crate::predict::propagation::{topocentric, OrbitSource};
use crate::predict::types::{EventKind, EventSeries, TimeRange};

const COARSE_STEP_US: i64 = 60_000_000; // 1 minute for the initial scan
const REFINE_TOLERANCE_US: i64 = 1_000; // 1 ms
const GOLDEN: f64 = 0.618_033_988_749_895;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Breakpoint {
    Edge,
    Maximum,
    Minimum,
}

/// Find every rise, culmination and set of `source` above `threshold_deg`
/// within `range`, as seen from `observer`.
///
/// Elevation is scanned every minute; local extrema are refined with a
/// golden-section search and threshold crossings between consecutive extrema
/// by bisection. A pass already in progress at the start of the range yields
/// no RISE, and one still in progress at the end yields no SET.
pub fn find_events<S: OrbitSource + ?Sized>(
    source: &S,
    observer: &ObserverLocation,
    range: &TimeRange,
    threshold_deg: f64,
) -> Result<EventSeries, PredictError> {
    let start = range.start();
    let span_us = (range.end() - start)
        .num_microseconds()
        .ok_or_else(|| PredictError::Propagation("time range too long".into()))?;

    let elevation = |offset_us: i64| -> Result<f64, PredictError> {
        let t = start + Duration::microseconds(offset_us);
        Ok(topocentric(source, observer, t)?.elevation_deg)
    };

    let mut scan = Vec::new();
    let mut offset = 0;
    while offset < span_us {
        scan.push((offset, elevation(offset)?));
        offset += COARSE_STEP_US;
    }
    scan.push((span_us, elevation(span_us)?));

    let mut breakpoints = vec![(scan[0].0, scan[0].1, Breakpoint::Edge)];

    // A peak between an edge and its neighbouring scan sample has no
    // three-sample bracket.
    if scan.len() > 1 {
        let (first, second) = (scan[0], scan[1]);
        if first.1 > second.1 {
            let (t, e) = refine_extremum(&elevation, first.0, second.0, true)?;
            if t - first.0 > REFINE_TOLERANCE_US && e > first.1 {
                breakpoints.push((t, e, Breakpoint::Maximum));
            }
        }
    }

    for w in scan.windows(3) {
        let (prev, cur, next) = (w[0], w[1], w[2]);
        if prev.1 < cur.1 && cur.1 >= next.1 {
            let (t, e) = refine_extremum(&elevation, prev.0, next.0, true)?;
            breakpoints.push((t, e, Breakpoint::Maximum));
        } else if prev.1 > cur.1 && cur.1 <= next.1 {
            let (t, e) = refine_extremum(&elevation, prev.0, next.0, false)?;
            breakpoints.push((t, e, Breakpoint::Minimum));
        }
    }
    if scan.len() > 1 {
        let (before, last) = (scan[scan.len() - 2], scan[scan.len() - 1]);
        if last.1 > before.1 {
            let (t, e) = refine_extremum(&elevation, before.0, last.0, true)?;
            if last.0 - t > REFINE_TOLERANCE_US && e > last.1 {
                breakpoints.push((t, e, Breakpoint::Maximum));
            }
        }
        breakpoints.push((last.0, last.1, Breakpoint::Edge));
    }
    breakpoints.sort_by_key(|b| b.0);

    let mut series = EventSeries::default();
    let at = |offset_us: i64| start + Duration::microseconds(offset_us);

    for w in breakpoints.windows(2) {
        let (a, b) = (w[0], w[1]);
        if a.1 < threshold_deg && b.1 >= threshold_deg {
            let t = bisect_crossing(&elevation, a.0, b.0, threshold_deg, true)?;
            series.push(at(t), EventKind::Rise);
        } else if a.1 >= threshold_deg && b.1 < threshold_deg {
            let t = bisect_crossing(&elevation, a.0, b.0, threshold_deg, false)?;
            series.push(at(t), EventKind::Set);
        }
        if b.2 == Breakpoint::Maximum && b.1 >= threshold_deg {
            series.push(at(b.0), EventKind::Culminate);
        }
    }

    log::debug!(
        "found {} events in {} scan samples above {:.2}°",
        series.len(),
        scan.len(),
        threshold_deg
    );

    Ok(series)
}

/// Golden-section search for the extremum bracketed by `[lo, hi]`.
fn refine_extremum<F>(f: &F, lo: i64, hi: i64, maximize: bool) -> Result<(i64, f64), PredictError>
where
    F: Fn(i64) -> Result<f64, PredictError>,
{
    let better = |a: f64, b: f64| if maximize { a > b } else { a < b };
    let mut a = lo;
    let mut b = hi;
    let mut c = b - ((b - a) as f64 * GOLDEN).round() as i64;
    let mut d = a + ((b - a) as f64 * GOLDEN).round() as i64;
    let mut fc = f(c)?;
    let mut fd = f(d)?;

    while b - a > REFINE_TOLERANCE_US {
        if better(fc, fd) {
            b = d;
            d = c;
            fd = fc;
            c = b - ((b - a) as f64 * GOLDEN).round() as i64;
            fc = f(c)?;
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + ((b - a) as f64 * GOLDEN).round() as i64;
            fd = f(d)?;
        }
    }

    let mid = a + (b - a) / 2;
    Ok((mid, f(mid)?))
}

/// Binary search for the instant elevation crosses `threshold` inside
/// `[before, after]`.
fn bisect_crossing<F>(
    f: &F,
    before: i64,
    after: i64,
    threshold: f64,
    rising: bool,
) -> Result<i64, PredictError>
where
    F: Fn(i64) -> Result<f64, PredictError>,
{
    let mut low = before;
    let mut high = after;

    while high - low > REFINE_TOLERANCE_US {
        let mid = low + (high - low) / 2;
        let above = f(mid)? >= threshold;
        if above == rising {
            high = mid;
        } else {
            low = mid;
        }
    }

    Ok(high)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::predict::propagation::OrbitState;
    use chrono::{DateTime, TimeZone, Utc};

    /// Elevation follows a smooth bump peaking at `peak_deg` every `period_s`,
    /// modelled as a satellite orbiting over the observer's zenith.
    pub struct SyntheticPasses {
        pub epoch: DateTime<Utc>,
        pub period_s: f64,
        pub peak_deg: f64,
    }

    impl SyntheticPasses {
        pub fn elevation_at(&self, t: DateTime<Utc>) -> f64 {
            let s = (t - self.epoch).num_microseconds().unwrap() as f64 / 1e6;
            let phase = (s / self.period_s) * std::f64::consts::TAU;
            // Cosine bump: peak at phase 0, bottoming at -90°.
            -90.0 + (self.peak_deg + 90.0) * (0.5 + 0.5 * phase.cos())
        }
    }

    impl OrbitSource for SyntheticPasses {
        fn state_at(&self, t: DateTime<Utc>) -> Result<OrbitState, PredictError> {
            // Point placed along the local ENU direction with the wanted elevation,
            // expressed in the inertial frame.
            let observer = ObserverLocation::from([0.0, 0.0, 0.0]);
            let el = self.elevation_at(t).to_radians();
            let range = 1000.0;
            let up = range * el.sin();
            let north = range * el.cos();
            // At lat = lon = 0, ENU up = +x, north = +z.
            let sta = observer.position_ecef_km();
            let ecef = [sta[0] + up, sta[1], sta[2] + north];
            let g = crate::predict::propagation::gmst(t);
            Ok(OrbitState {
                position_km: crate::predict::propagation::ecef_to_teme(ecef, g),
                velocity_km_s: [0.0; 3],
            })
        }
    }

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 31, 0, 0, 0).unwrap()
    }

    pub fn zero_observer() -> ObserverLocation {
        ObserverLocation::from([0.0, 0.0, 0.0])
    }

    #[test]
    fn emits_rise_culminate_set_triplets() {
        let source = SyntheticPasses {
            epoch: epoch(),
            period_s: 6000.0,
            peak_deg: 80.0,
        };
        // Start mid-way between peaks so every pass is complete.
        let range = TimeRange::new(
            epoch() + Duration::seconds(3000),
            epoch() + Duration::seconds(3000 + 3 * 6000),
        )
        .unwrap();

        let series = find_events(&source, &zero_observer(), &range, 30.0).unwrap();
        assert_eq!(series.len(), 9);
        for chunk in series.kinds.chunks(3) {
            assert_eq!(chunk, [EventKind::Rise, EventKind::Culminate, EventKind::Set]);
        }
        assert!(series.times.windows(2).all(|w| w[0] <= w[1]));

        // First culmination at t = 6000 s.
        let culm = series.times[1];
        assert!((culm - (epoch() + Duration::seconds(6000))).num_milliseconds().abs() < 50);

        // Rise/set land on the threshold.
        for (t, kind) in series.times.iter().zip(&series.kinds) {
            if *kind != EventKind::Culminate {
                assert!((source.elevation_at(*t) - 30.0).abs() < 0.01);
            }
        }
    }

    #[test]
    fn threshold_above_peak_yields_nothing() {
        let source = SyntheticPasses {
            epoch: epoch(),
            period_s: 6000.0,
            peak_deg: 60.0,
        };
        let range = TimeRange::new(epoch(), epoch() + Duration::days(1)).unwrap();
        let series = find_events(&source, &zero_observer(), &range, 88.0).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn pass_open_at_range_start_has_no_rise() {
        let source = SyntheticPasses {
            epoch: epoch(),
            period_s: 6000.0,
            peak_deg: 80.0,
        };
        // Range opens 5 minutes after a culmination, while still above 30°.
        let range = TimeRange::new(
            epoch() + Duration::seconds(300),
            epoch() + Duration::seconds(9000),
        )
        .unwrap();
        let series = find_events(&source, &zero_observer(), &range, 30.0).unwrap();
        assert_eq!(series.kinds[0], EventKind::Set);
        assert_eq!(
            &series.kinds[1..],
            [EventKind::Rise, EventKind::Culminate, EventKind::Set]
        );
    }

    fn short_peak() -> SyntheticPasses {
        SyntheticPasses {
            epoch: epoch(),
            period_s: 6000.0,
            peak_deg: 89.0,
        }
    }

    #[test]
    fn short_pass_peaking_just_after_range_start_is_found() {
        // Above 88.994° only for about ±11 s around the peak, and the range
        // opens 20 s before it, below the threshold.
        let range = TimeRange::new(
            epoch() - Duration::seconds(20),
            epoch() + Duration::seconds(2980),
        )
        .unwrap();
        let series = find_events(&short_peak(), &zero_observer(), &range, 88.994).unwrap();
        assert_eq!(
            series.kinds,
            [EventKind::Rise, EventKind::Culminate, EventKind::Set]
        );
        assert!(series.times.windows(2).all(|w| w[0] <= w[1]));
        assert!((series.times[1] - epoch()).num_milliseconds().abs() < 50);
    }

    #[test]
    fn short_pass_peaking_just_before_range_end_is_found() {
        let range = TimeRange::new(
            epoch() - Duration::seconds(2980),
            epoch() + Duration::seconds(20),
        )
        .unwrap();
        let series = find_events(&short_peak(), &zero_observer(), &range, 88.994).unwrap();
        assert_eq!(
            series.kinds,
            [EventKind::Rise, EventKind::Culminate, EventKind::Set]
        );
        assert!((series.times[1] - epoch()).num_milliseconds().abs() < 50);
    }

    #[test]
    fn falling_edge_segment_adds_no_culmination() {
        // Range opens right after the peak: elevation only falls in the first segment.
        let range = TimeRange::new(
            epoch() + Duration::seconds(5),
            epoch() + Duration::seconds(3000),
        )
        .unwrap();
        let series = find_events(&short_peak(), &zero_observer(), &range, 80.0).unwrap();
        assert_eq!(series.kinds, [EventKind::Set]);
    }

    #[test]
    fn empty_range_is_quiet() {
        let source = SyntheticPasses {
            epoch: epoch(),
            period_s: 6000.0,
            peak_deg: 80.0,
        };
        let range = TimeRange::new(epoch(), epoch()).unwrap();
        let series = find_events(&source, &zero_observer(), &range, 30.0).unwrap();
        assert!(series.is_empty());
    }
}
