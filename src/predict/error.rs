use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("element set has {0} lines, expected a multiple of 3")]
    LineCount(usize),
    #[error("element set {index}: missing {slot}")]
    MissingLine { index: usize, slot: &'static str },
    #[error("Invalid TLE format for {name}: {message}")]
    InvalidTle { name: String, message: String },
    #[error("Propagation error: {0}")]
    Propagation(String),
    #[error("invalid time range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },
}
