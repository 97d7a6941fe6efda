use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::czml::{CzmlError, DocumentGenerator};
use crate::run::artifacts::{ArtifactStore, PersistenceError};
use crate::run::frontend::{CatalogEntry, FrontendConfig};

#[derive(Debug, Error)]
pub enum VisualizationGenerationError {
    #[error("document generation failed: {0}")]
    Generate(#[from] CzmlError),
    #[error(transparent)]
    Write(#[from] PersistenceError),
    #[error("cannot read {path}: {source}")]
    Catalog { path: String, source: io::Error },
    #[error("replay start {offset_seconds} s before {earliest} is out of range")]
    Start {
        earliest: DateTime<Utc>,
        offset_seconds: f64,
    },
}

/// Start of the replay: the earliest sampled instant moved back by `offset_seconds`.
pub fn visualization_start(
    earliest: DateTime<Utc>,
    offset_seconds: f64,
) -> Result<DateTime<Utc>, VisualizationGenerationError> {
    let out_of_range = VisualizationGenerationError::Start {
        earliest,
        offset_seconds,
    };
    let micros = (offset_seconds * 1e6).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return Err(out_of_range);
    }
    earliest
        .checked_sub_signed(Duration::microseconds(micros as i64))
        .ok_or(out_of_range)
}

/// Renders the uploaded element text into the run's replay document.
#[derive(Clone)]
pub struct VisualizationTrigger {
    generator: Arc<dyn DocumentGenerator>,
    store: ArtifactStore,
    file_name: String,
}

impl VisualizationTrigger {
    pub fn new(generator: Arc<dyn DocumentGenerator>, store: ArtifactStore, file_name: &str) -> Self {
        Self {
            generator,
            store,
            file_name: file_name.to_string(),
        }
    }

    /// Reference the front-end uses to fetch the document.
    pub fn reference(&self) -> String {
        format!("/output/{}", self.file_name)
    }

    /// Generate and write the document, returning its reference.
    pub fn render(
        &self,
        element_text: &str,
        start: DateTime<Utc>,
    ) -> Result<String, VisualizationGenerationError> {
        let document = self.generator.generate(element_text, start)?;
        let path = self.store.write_document(&self.file_name, &document)?;
        log::info!("Wrote visualization starting {} to {}", start, path.display());
        Ok(self.reference())
    }
}

/// Hook invoked once a satellite of the run has produced a replay document.
pub trait VisualizationObserver: Send + Sync {
    fn on_visualization_ready(
        &self,
        record: &mut FrontendConfig,
        earliest_pass: DateTime<Utc>,
    ) -> Result<(), VisualizationGenerationError>;
}

/// Renders every `*.tle` file in the catalog directory from the same start
/// as the uploaded set, and lists them under the record's `default` entries.
pub struct CatalogRenderer {
    generator: Arc<dyn DocumentGenerator>,
    catalog_dir: PathBuf,
    store: ArtifactStore,
    offset_seconds: f64,
}

impl CatalogRenderer {
    pub fn new(
        generator: Arc<dyn DocumentGenerator>,
        catalog_dir: PathBuf,
        store: ArtifactStore,
        offset_seconds: f64,
    ) -> Self {
        Self {
            generator,
            catalog_dir,
            store,
            offset_seconds,
        }
    }

    fn catalog_files(&self) -> Result<Vec<PathBuf>, VisualizationGenerationError> {
        let entries =
            fs::read_dir(&self.catalog_dir).map_err(|source| self.catalog_error(source))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|source| self.catalog_error(source))?.path();
            if path.is_file() && has_tle_extension(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn catalog_error(&self, source: io::Error) -> VisualizationGenerationError {
        VisualizationGenerationError::Catalog {
            path: self.catalog_dir.display().to_string(),
            source,
        }
    }
}

fn has_tle_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tle"))
}

impl VisualizationObserver for CatalogRenderer {
    fn on_visualization_ready(
        &self,
        record: &mut FrontendConfig,
        earliest_pass: DateTime<Utc>,
    ) -> Result<(), VisualizationGenerationError> {
        let start = visualization_start(earliest_pass, self.offset_seconds)?;
        let mut entries = Vec::new();

        for path in self.catalog_files()? {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let text = fs::read_to_string(&path).map_err(|source| {
                VisualizationGenerationError::Catalog {
                    path: path.display().to_string(),
                    source,
                }
            })?;
            let file_name = format!("{}.czml", stem);
            let document = self.generator.generate(&text, start)?;
            self.store.write_document(&file_name, &document)?;

            entries.push(CatalogEntry {
                name: stem.to_string(),
                load: false,
                show_label: false,
                path: format!("/output/{}", file_name),
            });
        }

        log::info!("Rendered {} catalog documents", entries.len());
        record.default = entries;
        Ok(())
    }
}
