use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::predict::{ObserverLocation, PredictError, TimeRange};
use crate::run::RunError;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Options posted alongside an elements file. Every field is optional.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    /// Seconds the replay starts before the first pass.
    #[serde(default = "default_time_offset")]
    pub time_offset: f64,
    /// Minimum elevation in degrees.
    #[serde(default = "default_altitude_degrees")]
    pub altitude_degrees: f64,
    /// UTC, `YYYY-MM-DD HH:MM:SS`.
    #[serde(default = "default_start_time")]
    pub start_time: String,
    /// UTC, `YYYY-MM-DD HH:MM:SS`.
    #[serde(default = "default_end_time")]
    pub end_time: String,
    /// Observer as `[lon_deg, lat_deg, alt_m]`.
    #[serde(rename = "LLA", default)]
    #[schema(value_type = Vec<f64>)]
    pub lla: ObserverLocation,
}

// One year either way.
const MAX_TIME_OFFSET_SECONDS: f64 = 31_536_000.0;

fn default_time_offset() -> f64 {
    20.0
}

fn default_altitude_degrees() -> f64 {
    88.0
}

fn default_start_time() -> String {
    "2025-05-31 00:00:00".to_string()
}

fn default_end_time() -> String {
    "2025-06-02 00:00:00".to_string()
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            time_offset: default_time_offset(),
            altitude_degrees: default_altitude_degrees(),
            start_time: default_start_time(),
            end_time: default_end_time(),
            lla: ObserverLocation::default(),
        }
    }
}

impl ConvertOptions {
    pub fn from_json(json: &str) -> Result<Self, RunError> {
        serde_json::from_str(json).map_err(|e| RunError::Options(e.to_string()))
    }

    pub fn into_run_config(self) -> Result<RunConfig, RunError> {
        if !self.time_offset.is_finite() || self.time_offset.abs() > MAX_TIME_OFFSET_SECONDS {
            return Err(RunError::Options(format!(
                "timeOffset must be within ±{} s, got {}",
                MAX_TIME_OFFSET_SECONDS, self.time_offset
            )));
        }
        let start = parse_time(&self.start_time)?;
        let end = parse_time(&self.end_time)?;
        let range = TimeRange::new(start, end).map_err(|e| match e {
            PredictError::InvalidRange { .. } => RunError::Options(e.to_string()),
            other => RunError::Predict(other),
        })?;

        Ok(RunConfig {
            range,
            observer: self.lla,
            visibility: VisibilityConfig {
                elevation_threshold_deg: self.altitude_degrees,
                time_offset_seconds: self.time_offset,
            },
        })
    }
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, RunError> {
    NaiveDateTime::parse_from_str(s.trim(), TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| RunError::Options(format!("invalid time '{}': {}", s, e)))
}

/// Threshold and replay offset for one run. The sampling cadence is fixed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityConfig {
    pub elevation_threshold_deg: f64,
    pub time_offset_seconds: f64,
}

/// Immutable inputs of a single run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunConfig {
    pub range: TimeRange,
    pub observer: ObserverLocation,
    pub visibility: VisibilityConfig,
}
