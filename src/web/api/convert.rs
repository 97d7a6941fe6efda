use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::run::ConvertOptions;
use crate::web::api::error::{ApiError, ApiResult};
use crate::web::server::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ConvertResponse {
    pub status: String,
    pub data: ConvertData,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConvertData {
    pub code: u16,
    /// Where the replay document is served from.
    pub path: String,
}

/// Multipart form accepted by `/convert`, for the API document only.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct ConvertForm {
    /// Elements file, groups of three lines.
    #[schema(value_type = String, format = Binary)]
    pub tle_file: Vec<u8>,
    /// JSON-encoded `ConvertOptions`.
    pub convert_options: String,
}

struct Upload {
    file_name: Option<String>,
    content: Option<Vec<u8>>,
    options: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> ApiResult<Upload> {
    let mut upload = Upload {
        file_name: None,
        content: None,
        options: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        match field.name() {
            Some("tle_file") => {
                upload.file_name = Some(field.file_name().unwrap_or_default().to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                upload.content = Some(bytes.to_vec());
            }
            Some("convert_options") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                upload.options = Some(text);
            }
            _ => {}
        }
    }

    Ok(upload)
}

#[utoipa::path(
    post,
    path = "/convert",
    tag = "passes",
    request_body(content = ConvertForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Passes computed and replay rendered", body = ConvertResponse),
        (status = 400, description = "Missing file or options, or the run failed", body = crate::web::api::error::ErrorResponse)
    )
)]
pub async fn convert(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let upload = read_upload(multipart).await?;

    let (Some(file_name), Some(content)) = (upload.file_name, upload.content) else {
        return Err(ApiError::Validation("No file part".into()));
    };
    if file_name.is_empty() {
        return Err(ApiError::Validation("No selected file".into()));
    }
    let options = upload
        .options
        .ok_or_else(|| ApiError::Validation("Missing convert_options".into()))?;
    let config = ConvertOptions::from_json(&options)?.into_run_config()?;
    let text = String::from_utf8(content)
        .map_err(|e| ApiError::Validation(format!("Failed to read file: {}", e)))?;

    log::info!("Converting {} ({} bytes)", file_name, text.len());

    let _guard = state.run_lock.lock().await;
    let reference = state.trigger().reference();
    let run = state.visibility_run(config);
    let report = tokio::task::spawn_blocking(move || run.execute(&text))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok((
        StatusCode::OK,
        Json(ConvertResponse {
            status: "success".into(),
            data: ConvertData {
                code: 200,
                path: report.document.unwrap_or(reference),
            },
        }),
    ))
}
