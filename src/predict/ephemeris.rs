//! Sun and Moon positions for angular-separation checks.
//!
//! The default provider is the low-precision analytic series from the
//! Astronomical Almanac: about 0.01° for the Sun and 0.3° for the Moon
//! between 1950 and 2050, with no data files to load.

use chrono::{DateTime, Utc};

const AU_KM: f64 = 149_597_870.7;
const EARTH_RADIUS_KM: f64 = 6378.14;
const J2000_JD: f64 = 2_451_545.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Geocentric equatorial positions of the Sun and Moon in kilometres.
///
/// Built once per process and shared read-only between runs.
pub trait Ephemeris: Send + Sync {
    fn sun_position_km(&self, t: DateTime<Utc>) -> [f64; 3];
    fn moon_position_km(&self, t: DateTime<Utc>) -> [f64; 3];
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LowPrecisionEphemeris;

impl Ephemeris for LowPrecisionEphemeris {
    fn sun_position_km(&self, t: DateTime<Utc>) -> [f64; 3] {
        let n = days_since_j2000(t);
        let mean_lon = 280.460 + 0.985_647_4 * n;
        let g = (357.528 + 0.985_600_3 * n).to_radians();
        let lambda = (mean_lon + 1.915 * g.sin() + 0.020 * (2.0 * g).sin()).to_radians();
        let r = (1.000_14 - 0.016_71 * g.cos() - 0.000_14 * (2.0 * g).cos()) * AU_KM;
        let eps = (23.439 - 0.000_000_4 * n).to_radians();

        [
            r * lambda.cos(),
            r * eps.cos() * lambda.sin(),
            r * eps.sin() * lambda.sin(),
        ]
    }

    fn moon_position_km(&self, t: DateTime<Utc>) -> [f64; 3] {
        let tc = days_since_j2000(t) / 36_525.0;
        let s = |a: f64, b: f64| (a + b * tc).to_radians().sin();
        let c = |a: f64, b: f64| (a + b * tc).to_radians().cos();

        let lambda = (218.32 + 481_267.881 * tc + 6.29 * s(135.0, 477_198.87)
            - 1.27 * s(259.3, -413_335.36)
            + 0.66 * s(235.7, 890_534.22)
            + 0.21 * s(269.9, 954_397.74)
            - 0.19 * s(357.5, 35_999.05)
            - 0.11 * s(186.5, 966_404.03))
        .to_radians();
        let beta = (5.13 * s(93.3, 483_202.02) + 0.28 * s(228.2, 960_400.89)
            - 0.28 * s(318.3, 6_003.15)
            - 0.17 * s(217.6, -407_332.21))
        .to_radians();
        let parallax = (0.9508
            + 0.0518 * c(135.0, 477_198.87)
            + 0.0095 * c(259.3, -413_335.36)
            + 0.0078 * c(235.7, 890_534.22)
            + 0.0028 * c(269.9, 954_397.74))
        .to_radians();

        let r = EARTH_RADIUS_KM / parallax.sin();
        let (sin_b, cos_b) = beta.sin_cos();
        let (sin_l, cos_l) = lambda.sin_cos();
        [
            r * cos_b * cos_l,
            r * (0.9175 * cos_b * sin_l - 0.3978 * sin_b),
            r * (0.3978 * cos_b * sin_l + 0.9175 * sin_b),
        ]
    }
}

pub fn julian_date(t: DateTime<Utc>) -> f64 {
    let seconds = t.timestamp() as f64 + f64::from(t.timestamp_subsec_micros()) / 1e6;
    seconds / 86_400.0 + UNIX_EPOCH_JD
}

fn days_since_j2000(t: DateTime<Utc>) -> f64 {
    julian_date(t) - J2000_JD
}
