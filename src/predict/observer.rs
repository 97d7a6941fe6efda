use serde::{Deserialize, Serialize};

pub const WGS84_A_KM: f64 = 6378.137;
pub const WGS84_E2: f64 = 0.00669437999014;

/// Fixed observer on the WGS-84 ellipsoid.
///
/// Serialized as the `[lon, lat, alt_m]` triple used by the run options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct ObserverLocation {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub elevation_m: f64,
}

impl Default for ObserverLocation {
    fn default() -> Self {
        Self {
            longitude_deg: 120.0,
            latitude_deg: 40.0,
            elevation_m: 0.0,
        }
    }
}

impl From<[f64; 3]> for ObserverLocation {
    fn from(lla: [f64; 3]) -> Self {
        Self {
            longitude_deg: lla[0],
            latitude_deg: lla[1],
            elevation_m: lla[2],
        }
    }
}

impl From<ObserverLocation> for [f64; 3] {
    fn from(o: ObserverLocation) -> Self {
        [o.longitude_deg, o.latitude_deg, o.elevation_m]
    }
}

impl ObserverLocation {
    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let alt_km = self.elevation_m / 1000.0;
        [
            (n + alt_km) * cos_lat * lon.cos(),
            (n + alt_km) * cos_lat * lon.sin(),
            (n * (1.0 - WGS84_E2) + alt_km) * sin_lat,
        ]
    }
}
