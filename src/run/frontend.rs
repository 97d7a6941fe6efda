use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Record the web front-end reads to know which replay documents exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FrontendConfig {
    pub default: Vec<CatalogEntry>,
    pub czml: Vec<CzmlEntry>,
}

/// A pre-rendered document for an element file kept in the catalog directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: String,
    pub load: bool,
    pub show_label: bool,
    pub path: String,
}

/// The document rendered for the uploaded element file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CzmlEntry {
    pub tle_file: String,
    #[serde(rename = "czmlFile")]
    pub czml_file: String,
}

impl CzmlEntry {
    pub fn for_document(path: &str) -> Self {
        Self {
            tle_file: String::new(),
            czml_file: path.to_string(),
        }
    }
}
