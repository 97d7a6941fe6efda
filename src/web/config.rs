use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::run::ArtifactStore;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub visualization: VisualizationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

/// Locations served under `/tles` and `/output`, and the run artifacts.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_tles_dir")]
    pub tles_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_pass_results")]
    pub pass_results: PathBuf,
    #[serde(default = "default_frontend_config")]
    pub frontend_config: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tles_dir: default_tles_dir(),
            output_dir: default_output_dir(),
            pass_results: default_pass_results(),
            frontend_config: default_frontend_config(),
        }
    }
}

fn default_tles_dir() -> PathBuf {
    PathBuf::from("assets/tles")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("assets/output")
}

fn default_pass_results() -> PathBuf {
    PathBuf::from("assets/results/passes.json")
}

fn default_frontend_config() -> PathBuf {
    PathBuf::from("assets/frontendConfig.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualizationConfig {
    #[serde(default = "default_document_name")]
    pub document_name: String,
    /// Also render every catalog element file when a run finds a pass.
    #[serde(default)]
    pub render_catalog: bool,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            document_name: default_document_name(),
            render_catalog: false,
        }
    }
}

fn default_document_name() -> String {
    "outResult.czml".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Explicit file, or the built-in defaults when none is given.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn artifact_store(&self) -> ArtifactStore {
        ArtifactStore::new(
            self.storage.output_dir.clone(),
            self.storage.pass_results.clone(),
            self.storage.frontend_config.clone(),
        )
    }

    /// Create every directory the server reads from or writes into.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        let parents = [
            self.storage.pass_results.parent(),
            self.storage.frontend_config.parent(),
        ];
        let dirs = [
            Some(self.storage.tles_dir.as_path()),
            Some(self.storage.output_dir.as_path()),
        ]
        .into_iter()
        .chain(parents)
        .flatten()
        .filter(|d| !d.as_os_str().is_empty());

        for dir in dirs {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
