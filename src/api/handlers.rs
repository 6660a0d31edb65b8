//! HTTP request handlers.
//!
//! Each handler converts failures into a structured JSON body through
//! [`LensError`]'s `IntoResponse`; nothing escapes as a bare 500.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{LensError, Result};
use crate::query::response::AnalysisResponse;
use crate::state::{AppState, UploadSummary};

// ============================================================================
// Request Types
// ============================================================================

/// Analyze request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeRequest {
    /// Free-text question; absent means empty.
    #[serde(default)]
    pub query: String,
}

// ============================================================================
// Handler Functions
// ============================================================================

/// GET /test/ - Liveness check.
pub async fn test_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "message": format!("{} API is running!", state.service_name)
    }))
}

/// POST /upload/ - Replace the dataset with the multipart `file` field.
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadSummary>> {
    let multipart = multipart.map_err(|e| LensError::validation("file", e.body_text()))?;
    let (filename, bytes) = read_file_field(multipart).await?;
    log::info!("upload received: {filename} ({} bytes)", bytes.len());

    let summary = tokio::task::spawn_blocking(move || state.upload(&filename, bytes))
        .await
        .map_err(|e| LensError::Io(std::io::Error::other(e)))??;
    Ok(Json(summary))
}

/// POST /analyze/ - Answer a free-text query about the current dataset.
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    request: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>> {
    let Json(request) = request.map_err(|e| LensError::validation("query", e.body_text()))?;
    log::info!("analyze: {:?}", request.query);
    let response = tokio::task::spawn_blocking(move || state.analyze(&request.query))
        .await
        .map_err(|e| LensError::Io(std::io::Error::other(e)))??;
    Ok(Json(response))
}

/// Pull the `file` field out of a multipart body.
async fn read_file_field(mut multipart: Multipart) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| LensError::validation("file", format!("Failed to read multipart field: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            return Err(LensError::validation(
                "file",
                "The submitted data was not a file. Check the encoding type on the form.",
            ));
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| LensError::validation("file", format!("Failed to read file data: {e}")))?;
        if filename.is_empty() {
            return Err(LensError::validation("file", "No filename could be determined."));
        }
        if data.is_empty() {
            return Err(LensError::validation("file", "The submitted file is empty."));
        }
        return Ok((filename, data.to_vec()));
    }
    Err(LensError::validation("file", "No file was submitted."))
}
