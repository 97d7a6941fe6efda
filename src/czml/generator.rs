use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::czml::packet::{
    Cartesian2, Clock, Color, Description, IntervalBool, IntervalNumber, Label, Material, Packet,
    Path, Point, Position, SolidColor,
};
use crate::czml::{CzmlError, DocumentGenerator};
use crate::predict::{parse_all, OrbitSource, Satellite};

const DEFAULT_SPAN_HOURS: i64 = 24;
const POSITION_STEP_SECONDS: i64 = 300;
// Extra samples past the end keep the Lagrange interpolation well-conditioned.
const TRAILING_SAMPLES: i64 = 5;

/// Builds a replay document for every satellite in an elements file,
/// propagating its own trajectory from `start`.
#[derive(Debug, Clone)]
pub struct CzmlGenerator {
    pub span: Duration,
    pub step: Duration,
}

impl Default for CzmlGenerator {
    fn default() -> Self {
        Self {
            span: Duration::hours(DEFAULT_SPAN_HOURS),
            step: Duration::seconds(POSITION_STEP_SECONDS),
        }
    }
}

impl DocumentGenerator for CzmlGenerator {
    fn generate(&self, element_text: &str, start: DateTime<Utc>) -> Result<String, CzmlError> {
        let end = start
            .checked_add_signed(self.span)
            .ok_or(CzmlError::Range(start))?;
        let interval = format!("{}/{}", czml_time(start), czml_time(end));

        let mut packets = vec![Packet {
            id: "document".into(),
            name: Some("satellite passes".into()),
            version: Some("1.0".into()),
            clock: Some(Clock {
                interval: interval.clone(),
                current_time: czml_time(start),
                multiplier: 1.0,
                range: "LOOP_STOP",
                step: "SYSTEM_CLOCK_MULTIPLIER",
            }),
            ..Default::default()
        }];

        for set in parse_all(element_text)? {
            let satellite = Satellite::from_set(set)?;
            packets.push(self.satellite_packet(&satellite, start, end, &interval)?);
        }

        Ok(serde_json::to_string_pretty(&packets)?)
    }
}

impl CzmlGenerator {
    fn satellite_packet(
        &self,
        satellite: &Satellite,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: &str,
    ) -> Result<Packet, CzmlError> {
        let name = satellite.name().to_string();
        let color = color_for(&name);

        Ok(Packet {
            id: name.clone(),
            name: Some(name.clone()),
            availability: Some(interval.to_string()),
            description: Some(Description {
                string: format!("{} (NORAD {})", name, satellite.norad_id()),
            }),
            label: Some(Label {
                show: true,
                text: name,
                font: "11pt Lucida Console",
                fill_color: color,
                outline_width: 2,
                horizontal_origin: "LEFT",
                vertical_origin: "CENTER",
                pixel_offset: Cartesian2 {
                    cartesian2: [12.0, 0.0],
                },
            }),
            point: Some(Point {
                pixel_size: 6,
                color,
            }),
            path: Some(self.path(satellite, start, end, interval, color)),
            position: Some(self.position(satellite, start, end)?),
            ..Default::default()
        })
    }

    fn position(
        &self,
        satellite: &Satellite,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Position, CzmlError> {
        let step_s = self.step.num_seconds().max(1);
        let count = (end - start).num_seconds() / step_s + TRAILING_SAMPLES;
        let mut cartesian = Vec::with_capacity(count as usize * 4);

        for i in 0..count {
            let offset = i * step_s;
            let t = start
                .checked_add_signed(Duration::seconds(offset))
                .ok_or(CzmlError::Range(start))?;
            let state = satellite.state_at(t)?;
            cartesian.push(offset as f64);
            cartesian.extend(state.position_km.iter().map(|km| km * 1000.0));
        }

        Ok(Position {
            interpolation_algorithm: "LAGRANGE",
            interpolation_degree: 5,
            reference_frame: "INERTIAL",
            epoch: czml_time(start),
            cartesian,
        })
    }

    /// Orbit-long lead and trail tails, one interval per revolution.
    fn path(
        &self,
        satellite: &Satellite,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: &str,
        color: Color,
    ) -> Path {
        let period_s = (satellite.period_minutes() * 60.0).max(1.0);
        let period = Duration::milliseconds((period_s * 1000.0) as i64);

        let mut lead_time = Vec::new();
        let mut trail_time = Vec::new();
        let mut t0 = start;
        while t0 < end {
            let t1 = t0.checked_add_signed(period).map_or(end, |t| t.min(end));
            let span = format!("{}/{}", czml_time(t0), czml_time(t1));
            lead_time.push(IntervalNumber {
                interval: span.clone(),
                epoch: czml_time(t0),
                number: vec![0.0, period_s, period_s, 0.0],
            });
            trail_time.push(IntervalNumber {
                interval: span,
                epoch: czml_time(t0),
                number: vec![0.0, 0.0, period_s, period_s],
            });
            t0 = t1;
        }

        Path {
            show: vec![IntervalBool {
                interval: interval.to_string(),
                boolean: true,
            }],
            width: 1,
            material: Material {
                solid_color: SolidColor { color },
            },
            resolution: 120,
            lead_time,
            trail_time,
        }
    }
}

pub fn czml_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Stable per-name colour (FNV-1a), so repeated runs render identically.
fn color_for(name: &str) -> Color {
    let hash = name.bytes().fold(0x811c_9dc5u32, |h, b| {
        (h ^ u32::from(b)).wrapping_mul(0x0100_0193)
    });
    let [r, g, b, _] = hash.to_le_bytes();
    // Keep every channel bright enough to read on a dark globe.
    Color {
        rgba: [r | 0x40, g | 0x40, b | 0x40, 255],
    }
}
