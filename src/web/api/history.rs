use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::run::FrontendConfig;
use crate::web::api::error::{ApiError, ApiResult};
use crate::web::server::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub data: FrontendConfig,
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/history",
    tag = "passes",
    responses(
        (status = 200, description = "Front-end record of the last completed run", body = HistoryResponse),
        (status = 404, description = "No run has completed yet"),
        (status = 500, description = "Record exists but cannot be read")
    )
)]
pub async fn history(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let record = state
        .config
        .artifact_store()
        .read_frontend_config()?
        .ok_or(ApiError::NotFound)?;

    Ok((
        StatusCode::OK,
        Json(HistoryResponse {
            data: record,
            status: "success".into(),
        }),
    ))
}
