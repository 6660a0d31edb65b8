//! Error types for the analysis service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for upload and query handling.
#[derive(Error, Debug)]
pub enum LensError {
    /// No dataset has been uploaded yet.
    #[error("Dataset not found. Please upload a file first.")]
    NotFound,

    /// A required column could not be located by the detection heuristics.
    #[error("{0}")]
    Schema(String),

    /// The stored file could not be parsed as a table.
    #[error("Error reading Excel: {0}")]
    Parse(String),

    /// Malformed or missing upload field.
    #[error("Invalid field '{field}': {}", .messages.join(" "))]
    Validation {
        field: String,
        messages: Vec<String>,
    },

    /// An upload that arrived intact but could not be read as a table.
    #[error("{0}")]
    InvalidUpload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, LensError>;

impl LensError {
    pub fn schema(msg: impl Into<String>) -> Self {
        LensError::Schema(msg.into())
    }

    /// Wrap a loader failure, keeping the full context chain.
    pub fn parse(err: anyhow::Error) -> Self {
        LensError::Parse(format!("{err:#}"))
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        LensError::Validation {
            field: field.into(),
            messages: vec![message.into()],
        }
    }

    /// HTTP status this error surfaces as.
    pub fn status(&self) -> StatusCode {
        match self {
            LensError::NotFound => StatusCode::NOT_FOUND,
            LensError::Validation { .. } | LensError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            LensError::Schema(_)
            | LensError::Parse(_)
            | LensError::Io(_)
            | LensError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LensError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            LensError::Validation { field, messages } => {
                let mut fields = serde_json::Map::new();
                fields.insert(field.clone(), json!(messages));
                serde_json::Value::Object(fields)
            }
            other => json!({ "error": other.to_string() }),
        };
        if status.is_server_error() {
            log::error!("request failed: {self}");
        } else {
            log::warn!("request rejected: {self}");
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(LensError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            LensError::schema("Location column not found.").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            LensError::validation("file", "No file was submitted.").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn parse_error_keeps_context_chain() {
        let inner = anyhow::anyhow!("bad zip").context("opening workbook");
        let err = LensError::parse(inner);
        assert_eq!(err.to_string(), "Error reading Excel: opening workbook: bad zip");
    }
}
