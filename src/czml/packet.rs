use serde::Serialize;

/// A CZML document is a JSON array of packets; the first is the `document` packet.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Packet {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock: Option<Clock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Clock {
    pub interval: String,
    pub current_time: String,
    pub multiplier: f64,
    pub range: &'static str,
    pub step: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Description {
    pub string: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Color {
    pub rgba: [u8; 4],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub show: bool,
    pub text: String,
    pub font: &'static str,
    pub fill_color: Color,
    pub outline_width: u32,
    pub horizontal_origin: &'static str,
    pub vertical_origin: &'static str,
    pub pixel_offset: Cartesian2,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Cartesian2 {
    pub cartesian2: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub pixel_size: u32,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize)]
pub struct Material {
    #[serde(rename = "solidColor")]
    pub solid_color: SolidColor,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolidColor {
    pub color: Color,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntervalBool {
    pub interval: String,
    pub boolean: bool,
}

/// Time-varying scalar over one interval, sampled as `[offset, value, ...]`.
#[derive(Debug, Clone, Serialize)]
pub struct IntervalNumber {
    pub interval: String,
    pub epoch: String,
    pub number: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    pub show: Vec<IntervalBool>,
    pub width: u32,
    pub material: Material,
    pub resolution: u32,
    pub lead_time: Vec<IntervalNumber>,
    pub trail_time: Vec<IntervalNumber>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub interpolation_algorithm: &'static str,
    pub interpolation_degree: u32,
    pub reference_frame: &'static str,
    pub epoch: String,
    /// Flattened `[t, x, y, z, ...]` with `t` in seconds from `epoch`, xyz in metres.
    pub cartesian: Vec<f64>,
}
