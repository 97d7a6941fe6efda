mod generator;
mod packet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::predict::PredictError;

pub use generator::CzmlGenerator;

#[derive(Debug, Error)]
pub enum CzmlError {
    #[error("elements: {0}")]
    Elements(#[from] PredictError),
    #[error("serialization: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document window starting {0} is out of range")]
    Range(DateTime<Utc>),
}

/// Renders a time-tagged replay document for an elements file.
pub trait DocumentGenerator: Send + Sync {
    fn generate(&self, element_text: &str, start: DateTime<Utc>) -> Result<String, CzmlError>;
}
