use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::predict::error::PredictError;

/// Closed UTC interval searched for passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, PredictError> {
        if start > end {
            return Err(PredictError::InvalidRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Rise,
    Culminate,
    Set,
}

/// Detector output: parallel, time-ordered sequences of event instants and kinds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSeries {
    pub times: Vec<DateTime<Utc>>,
    pub kinds: Vec<EventKind>,
}

impl EventSeries {
    pub fn push(&mut self, time: DateTime<Utc>, kind: EventKind) {
        self.times.push(time);
        self.kinds.push(kind);
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// A RISE..SET window accepted by the pass extractor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassWindow {
    pub rise_index: usize,
    pub set_index: usize,
    pub rise: DateTime<Utc>,
    pub set: DateTime<Utc>,
}

impl PassWindow {
    pub fn duration_seconds(&self) -> f64 {
        (self.set - self.rise)
            .num_microseconds()
            .map(|us| us as f64 / 1e6)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Ascending => "升轨",
            Direction::Descending => "降轨",
        }
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Geometry of one sampling tick inside a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplePoint {
    #[serde(serialize_with = "serialize_isoformat")]
    pub time: DateTime<Utc>,
    #[serde(rename = "elevation")]
    pub elevation_deg: f64,
    #[serde(skip)]
    pub azimuth_deg: f64,
    pub distance_km: f64,
    #[serde(rename = "status")]
    pub direction: Direction,
    #[serde(rename = "sunAngle")]
    pub sun_angle_deg: f64,
    #[serde(rename = "moonAngle")]
    pub moon_angle_deg: f64,
    #[serde(rename = "LLA")]
    pub sub_point: SubPoint,
}

/// Geodetic point beneath the satellite, serialized as `[lon, lat, height_km]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub height_km: f64,
}

impl Serialize for SubPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.longitude_deg, self.latitude_deg, self.height_km].serialize(serializer)
    }
}

/// A sampled pass; persisted as the bare array of its samples.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Pass {
    #[serde(skip)]
    pub window: PassWindow,
    pub samples: Vec<SamplePoint>,
}

/// Formats an instant the way the result consumers expect:
/// `2025-05-31T03:12:45+00:00`, or with six fractional digits when the
/// instant has sub-second precision.
pub fn isoformat(t: &DateTime<Utc>) -> String {
    if t.timestamp_subsec_micros() == 0 {
        t.format("%Y-%m-%dT%H:%M:%S+00:00").to_string()
    } else {
        t.format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
    }
}

fn serialize_isoformat<S: Serializer>(t: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&isoformat(t))
}

/// Two-decimal rounding of the exact binary value, ties to even.
pub fn round2(v: f64) -> f64 {
    format!("{:.2}", v).parse().unwrap_or(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn isoformat_drops_zero_fraction() {
        let t = Utc.with_ymd_and_hms(2025, 5, 31, 3, 12, 45).unwrap();
        assert_eq!(isoformat(&t), "2025-05-31T03:12:45+00:00");

        let t = t + chrono::Duration::microseconds(1500);
        assert_eq!(isoformat(&t), "2025-05-31T03:12:45.001500+00:00");
    }

    #[test]
    fn time_range_rejects_inverted_bounds() {
        let a = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2025, 5, 31, 0, 0, 0).unwrap();
        assert!(TimeRange::new(a, b).is_err());
        assert!(TimeRange::new(b, a).is_ok());
        assert!(TimeRange::new(a, a).is_ok());
    }

    #[test]
    fn sample_point_serializes_persisted_shape() {
        let point = SamplePoint {
            time: Utc.with_ymd_and_hms(2025, 5, 31, 0, 0, 2).unwrap(),
            elevation_deg: 88.12,
            azimuth_deg: 10.0,
            distance_km: 420.5,
            direction: Direction::Ascending,
            sun_angle_deg: 91.25,
            moon_angle_deg: 89.5,
            sub_point: SubPoint {
                latitude_deg: 40.1,
                longitude_deg: 120.2,
                height_km: 418.0,
            },
        };
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value["time"], "2025-05-31T00:00:02+00:00");
        assert_eq!(value["elevation"], 88.12);
        assert_eq!(value["distance_km"], 420.5);
        assert_eq!(value["status"], "升轨");
        assert_eq!(value["LLA"], serde_json::json!([120.2, 40.1, 418.0]));
        assert!(value.get("azimuth_deg").is_none());
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(-0.004), -0.0);
    }

    #[test]
    fn round2_decides_ties_on_the_stored_value() {
        // 2.675 is stored just below the tie; 0.125 and 88.125 are exact ties.
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(88.125), 88.12);
        assert_eq!(round2(0.375), 0.38);
    }
}
