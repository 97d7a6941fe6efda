mod artifacts;
mod frontend;
mod options;
mod visualization;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::predict::{
    extract_passes, find_events, parse_all, sample_pass, Ephemeris, OrbitSource, Pass,
    PredictError, Satellite,
};

pub use artifacts::{ArtifactStore, PersistenceError};
pub use frontend::{CatalogEntry, CzmlEntry, FrontendConfig};
pub use options::{ConvertOptions, RunConfig, TIME_FORMAT};
pub use visualization::{
    visualization_start, CatalogRenderer, VisualizationGenerationError, VisualizationObserver,
    VisualizationTrigger,
};

#[cfg(test)]
pub(crate) use artifacts::tests::scratch_dir;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid options: {0}")]
    Options(String),
    #[error(transparent)]
    Predict(#[from] PredictError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Passes of one satellite, in time order.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct SatellitePasses {
    #[serde(skip)]
    pub name: String,
    #[serde(skip)]
    pub norad_id: u64,
    pub passes: Vec<Pass>,
}

/// Per-satellite pass groups in input order. Serializes as a nested array.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PassResultSet {
    pub satellites: Vec<SatellitePasses>,
}

impl PassResultSet {
    pub fn pass_count(&self) -> usize {
        self.satellites.iter().map(|s| s.passes.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub results: PassResultSet,
    pub record: FrontendConfig,
    /// Reference of the replay document, if any satellite produced one.
    pub document: Option<String>,
}

/// One visibility computation over an uploaded elements file.
pub struct VisibilityRun {
    config: RunConfig,
    ephemeris: Arc<dyn Ephemeris>,
    store: ArtifactStore,
    trigger: VisualizationTrigger,
    observer: Option<Box<dyn VisualizationObserver>>,
}

impl VisibilityRun {
    pub fn new(
        config: RunConfig,
        ephemeris: Arc<dyn Ephemeris>,
        store: ArtifactStore,
        trigger: VisualizationTrigger,
    ) -> Self {
        Self {
            config,
            ephemeris,
            store,
            trigger,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn VisualizationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn execute(&self, element_text: &str) -> Result<RunReport, RunError> {
        let satellites = parse_all(element_text)?
            .into_iter()
            .map(Satellite::from_set)
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "Computing passes for {} satellites between {} and {}",
            satellites.len(),
            self.config.range.start(),
            self.config.range.end()
        );

        let mut results = PassResultSet::default();
        let mut record = FrontendConfig::default();
        let mut document = None;

        for satellite in &satellites {
            let passes = self.passes_for(satellite, satellite.name());
            if let Some(earliest) = earliest_sample(&passes) {
                match self.visualize(element_text, earliest, &mut record) {
                    Ok(reference) => document = Some(reference),
                    Err(e) => log::error!(
                        "Failed to render visualization for {}: {}",
                        satellite.name(),
                        e
                    ),
                }
            }
            results.satellites.push(SatellitePasses {
                name: satellite.name().to_string(),
                norad_id: satellite.norad_id(),
                passes,
            });
        }

        self.store.write_pass_results(&results)?;
        self.store.write_frontend_config(&record)?;
        log::info!(
            "Found {} passes, results written to {}",
            results.pass_count(),
            self.store.pass_results_path().display()
        );

        Ok(RunReport {
            results,
            record,
            document,
        })
    }

    /// Detect, extract and sample every qualifying pass of one source.
    ///
    /// A propagation failure while searching for events leaves the source
    /// without passes.
    pub fn passes_for<S: OrbitSource + ?Sized>(&self, source: &S, name: &str) -> Vec<Pass> {
        let events = match find_events(
            source,
            &self.config.observer,
            &self.config.range,
            self.config.visibility.elevation_threshold_deg,
        ) {
            Ok(events) => events,
            Err(e) => {
                log::warn!("Failed to find events for {}: {}", name, e);
                return Vec::new();
            }
        };

        if events.is_empty() {
            log::debug!("No events for {} above the threshold", name);
        }

        extract_passes(&events)
            .into_iter()
            .map(|window| Pass {
                samples: sample_pass(
                    source,
                    &self.config.observer,
                    self.ephemeris.as_ref(),
                    &window,
                ),
                window,
            })
            .collect()
    }

    fn visualize(
        &self,
        element_text: &str,
        earliest: DateTime<Utc>,
        record: &mut FrontendConfig,
    ) -> Result<String, VisualizationGenerationError> {
        let start = visualization_start(earliest, self.config.visibility.time_offset_seconds)?;
        let reference = self.trigger.render(element_text, start)?;
        record.czml.push(CzmlEntry::for_document(&reference));

        if let Some(observer) = &self.observer {
            // The uploaded document is already in place; a catalog failure only
            // loses the catalog entries.
            if let Err(e) = observer.on_visualization_ready(record, earliest) {
                log::error!("Visualization observer failed: {}", e);
            }
        }
        Ok(reference)
    }
}

/// First sampled instant among the passes.
pub fn earliest_sample(passes: &[Pass]) -> Option<DateTime<Utc>> {
    passes
        .iter()
        .find_map(|pass| pass.samples.first())
        .map(|sample| sample.time)
}
