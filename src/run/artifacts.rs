use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Serialize;
use thiserror::Error;

use crate::run::frontend::FrontendConfig;
use crate::run::PassResultSet;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("cannot write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("cannot read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("malformed {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Where a run leaves its durable output.
///
/// Every write replaces the previous file wholesale. Parent directories are
/// not created: a missing directory is reported as a failure.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
    pass_results: PathBuf,
    frontend_config: PathBuf,
}

impl ArtifactStore {
    pub fn new(output_dir: PathBuf, pass_results: PathBuf, frontend_config: PathBuf) -> Self {
        Self {
            output_dir,
            pass_results,
            frontend_config,
        }
    }

    pub fn pass_results_path(&self) -> &Path {
        &self.pass_results
    }

    pub fn write_pass_results(&self, results: &PassResultSet) -> Result<(), PersistenceError> {
        write_json(&self.pass_results, results)
    }

    pub fn write_frontend_config(&self, record: &FrontendConfig) -> Result<(), PersistenceError> {
        write_json(&self.frontend_config, record)
    }

    /// Last front-end record, or `None` if no run has completed yet.
    pub fn read_frontend_config(&self) -> Result<Option<FrontendConfig>, PersistenceError> {
        let content = match fs::read_to_string(&self.frontend_config) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.frontend_config.display().to_string(),
                    source,
                })
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| PersistenceError::Json {
                path: self.frontend_config.display().to_string(),
                source,
            })
    }

    /// Write a document into the output directory, returning its full path.
    pub fn write_document(&self, file_name: &str, content: &str) -> Result<PathBuf, PersistenceError> {
        let path = self.output_dir.join(file_name);
        fs::write(&path, content).map_err(|source| PersistenceError::Write {
            path: path.display().to_string(),
            source,
        })?;
        Ok(path)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| PersistenceError::Json {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, json).map_err(|source| PersistenceError::Write {
        path: path.display().to_string(),
        source,
    })
}
