use utoipa::OpenApi;

use super::api::convert::{ConvertData, ConvertForm, ConvertResponse};
use super::api::error::ErrorResponse;
use super::api::history::HistoryResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::convert::convert,
        super::api::history::history,
    ),
    components(
        schemas(
            ConvertForm,
            ConvertResponse,
            ConvertData,
            HistoryResponse,
            ErrorResponse,
            crate::run::ConvertOptions,
            crate::run::FrontendConfig,
            crate::run::CatalogEntry,
            crate::run::CzmlEntry,
        )
    ),
    info(
        title = "Overpass API",
        description = "Satellite pass computation and replay documents",
        version = "0.1.0"
    ),
    tags(
        (name = "passes", description = "Pass computation and history")
    )
)]
pub struct ApiDoc;
