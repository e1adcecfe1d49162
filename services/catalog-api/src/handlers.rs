//! HTTP handlers for the catalog API.

use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info, warn};

use geo_common::SourceType;
use ingestion::{dataset_name, IngestOptions, IngestOutcome};

use crate::state::AppState;

/// Response body for /upload-geotiff.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    fn ok(message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// POST /upload-geotiff - ingest a single uploaded raster.
///
/// Expects multipart form data with one `file` field. The raw upload is
/// archived to the object store first; the archive key becomes the
/// dataset's source identity.
pub async fn upload_geotiff_handler(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Multipart,
) -> (StatusCode, Json<UploadResponse>) {
    let (filename, data) = match read_file_field(multipart).await {
        Ok(found) => found,
        Err(message) => {
            warn!(%message, "Rejected upload");
            return (
                StatusCode::BAD_REQUEST,
                Json(UploadResponse::failed(message)),
            );
        }
    };

    info!(filename = %filename, size = data.len(), "Received upload");

    // Archive the original before processing, like any other source
    let source_key = match state
        .ingester
        .store()
        .store_source(&filename, data.clone())
        .await
    {
        Ok(key) => key,
        Err(e) => {
            error!(error = %e, "Failed to archive upload");
            return (
                status_for(e.http_status_code()),
                Json(UploadResponse::failed(e.to_string())),
            );
        }
    };

    let options = IngestOptions {
        name: Some(dataset_name(&filename)),
        category_id: None,
    };

    match state
        .ingester
        .ingest_bytes(data, &source_key, SourceType::Upload, options)
        .await
    {
        Ok(IngestOutcome::Done { dataset_id }) => {
            info!(dataset_id, filename = %filename, "Upload ingested");
            (
                StatusCode::OK,
                Json(UploadResponse::ok(format!(
                    "Dataset '{}' processed and saved",
                    dataset_name(&filename)
                ))),
            )
        }
        Ok(IngestOutcome::Skipped) => (
            StatusCode::OK,
            Json(UploadResponse::ok(
                "Dataset was already recorded".to_string(),
            )),
        ),
        Err(e) => {
            error!(error = %e, filename = %filename, "Upload ingestion failed");
            (
                status_for(e.http_status_code()),
                Json(UploadResponse::failed(e.to_string())),
            )
        }
    }
}

/// Pull the single `file` field out of the multipart body.
async fn read_file_field(mut multipart: Multipart) -> Result<(String, Bytes), String> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| format!("Malformed multipart body: {}", e))?;

        let Some(field) = field else {
            return Err("Request has no file field".to_string());
        };

        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| "No file selected".to_string())?;

        let data = field
            .bytes()
            .await
            .map_err(|e| format!("Failed to read upload: {}", e))?;

        if data.is_empty() {
            return Err("Uploaded file is empty".to_string());
        }

        return Ok((filename, data));
    }
}

/// GET /api/datasets - the catalog grouped by category.
pub async fn datasets_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    match state.ingester.catalog().list_grouped().await {
        Ok(groups) => Json(groups).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list datasets");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "error": "Could not retrieve datasets from the catalog",
                })),
            )
                .into_response()
        }
    }
}

/// GET /health - health check.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "catalog-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn status_for(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
