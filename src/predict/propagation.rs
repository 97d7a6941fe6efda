use chrono::{DateTime, Utc};

use crate::predict::elements::Satellite;
use crate::predict::error::PredictError;
use crate::predict::observer::{ObserverLocation, WGS84_A_KM, WGS84_E2};
use crate::predict::types::SubPoint;

/// Geocentric inertial (TEME) state of a satellite at an instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// Anything that can place a satellite in the inertial frame at a given instant.
pub trait OrbitSource {
    fn state_at(&self, t: DateTime<Utc>) -> Result<OrbitState, PredictError>;
}

impl OrbitSource for Satellite {
    fn state_at(&self, t: DateTime<Utc>) -> Result<OrbitState, PredictError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&t.naive_utc())
            .map_err(|e| PredictError::Propagation(e.to_string()))?;

        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(|e| PredictError::Propagation(e.to_string()))?;

        Ok(OrbitState {
            position_km: prediction.position,
            velocity_km_s: prediction.velocity,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
}

/// Greenwich mean sidereal angle in radians.
pub fn gmst(t: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&t.naive_utc()))
}

pub fn teme_to_ecef(pos: [f64; 3], gmst: f64) -> [f64; 3] {
    let (sin_g, cos_g) = gmst.sin_cos();
    [
        pos[0] * cos_g + pos[1] * sin_g,
        -pos[0] * sin_g + pos[1] * cos_g,
        pos[2],
    ]
}

pub fn ecef_to_teme(pos: [f64; 3], gmst: f64) -> [f64; 3] {
    let (sin_g, cos_g) = gmst.sin_cos();
    [
        pos[0] * cos_g - pos[1] * sin_g,
        pos[0] * sin_g + pos[1] * cos_g,
        pos[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

/// Alt-az of an Earth-fixed satellite position seen from the observer.
pub fn look_angles(observer: &ObserverLocation, sat_ecef: [f64; 3]) -> LookAngles {
    let sta = observer.position_ecef_km();
    let dr = sub(sat_ecef, sta);
    let range_km = norm(dr);

    let (east, north, up) = ecef_to_enu(dr, observer.lat_rad(), observer.lon_rad());
    let azimuth_deg = east.atan2(north).to_degrees().rem_euclid(360.0);
    let elevation_deg = if range_km > 0.0 {
        (up / range_km).asin().to_degrees()
    } else {
        90.0
    };

    LookAngles {
        azimuth_deg,
        elevation_deg,
        range_km,
    }
}

/// Observer position in the inertial frame used by the satellite states.
pub fn observer_inertial_km(observer: &ObserverLocation, t: DateTime<Utc>) -> [f64; 3] {
    ecef_to_teme(observer.position_ecef_km(), gmst(t))
}

/// Topocentric look angles of `source` from `observer` at `t`.
pub fn topocentric<S: OrbitSource + ?Sized>(
    source: &S,
    observer: &ObserverLocation,
    t: DateTime<Utc>,
) -> Result<LookAngles, PredictError> {
    let state = source.state_at(t)?;
    Ok(look_angles(observer, teme_to_ecef(state.position_km, gmst(t))))
}

/// Geodetic latitude, longitude and height of an Earth-fixed position.
pub fn geodetic(ecef: [f64; 3]) -> SubPoint {
    let [x, y, z] = ecef;
    let p = (x * x + y * y).sqrt();
    let lon = y.atan2(x);
    let mut lat = z.atan2(p * (1.0 - WGS84_E2));
    let mut height = 0.0;

    for _ in 0..10 {
        let sin_lat = lat.sin();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        height = if lat.cos().abs() > 1e-10 {
            p / lat.cos() - n
        } else {
            z.abs() - n * (1.0 - WGS84_E2)
        };
        let next = z.atan2(p * (1.0 - WGS84_E2 * n / (n + height)));
        if (next - lat).abs() < 1e-12 {
            lat = next;
            break;
        }
        lat = next;
    }

    SubPoint {
        latitude_deg: lat.to_degrees(),
        longitude_deg: lon.to_degrees(),
        height_km: height,
    }
}

pub fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::elements::{parse_all, tests::ISS};
    use chrono::TimeZone;

    #[test]
    fn teme_ecef_rotation_round_trips() {
        let p = [4000.0, -3000.0, 5000.0];
        let g = 1.234;
        let back = ecef_to_teme(teme_to_ecef(p, g), g);
        for i in 0..3 {
            assert!((back[i] - p[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn zenith_target_has_ninety_degree_elevation() {
        let observer = ObserverLocation::from([120.0, 40.0, 0.0]);
        let up = observer.position_ecef_km();
        let scale = (norm(up) + 500.0) / norm(up);
        // Radial, not ellipsoid-normal, so a fraction of a degree off zenith.
        let look = look_angles(&observer, [up[0] * scale, up[1] * scale, up[2] * scale]);
        assert!(look.elevation_deg > 89.5);
        assert!((look.range_km - 500.0).abs() < 1.0);
    }

    #[test]
    fn geodetic_inverts_observer_position() {
        let observer = ObserverLocation::from([-75.5, 33.25, 1200.0]);
        let sp = geodetic(observer.position_ecef_km());
        assert!((sp.latitude_deg - 33.25).abs() < 1e-8);
        assert!((sp.longitude_deg + 75.5).abs() < 1e-8);
        assert!((sp.height_km - 1.2).abs() < 1e-6);
    }

    #[test]
    fn sgp4_state_is_in_low_earth_orbit() {
        let sat = Satellite::from_set(parse_all(ISS).unwrap().remove(0)).unwrap();
        let t = Utc.with_ymd_and_hms(2025, 5, 31, 12, 0, 0).unwrap();
        let state = sat.state_at(t).unwrap();
        let r = norm(state.position_km);
        assert!(r > 6600.0 && r < 7000.0, "radius {r}");
        let v = norm(state.velocity_km_s);
        assert!(v > 7.0 && v < 8.0, "speed {v}");

        let sp = geodetic(teme_to_ecef(state.position_km, gmst(t)));
        assert!(sp.latitude_deg.abs() <= 52.0);
        assert!(sp.height_km > 300.0 && sp.height_km < 600.0);
    }
}
