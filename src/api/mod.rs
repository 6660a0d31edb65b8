//! HTTP API router and configuration.

pub mod handlers;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServerConfig;
use crate::state::AppState;

use handlers::{analyze_handler, test_handler, upload_handler};

/// Create the API router.
///
/// Endpoints:
/// - GET  /test/     - Liveness check
/// - POST /upload/   - Replace the dataset (multipart field `file`)
/// - POST /analyze/  - Query the dataset (`{"query": "..."}`)
pub fn create_router(state: Arc<AppState>, server: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/test/", get(test_handler))
        .route(
            "/upload/",
            post(upload_handler).layer(DefaultBodyLimit::max(server.max_upload_bytes)),
        )
        .route("/analyze/", post(analyze_handler))
        .with_state(state);

    if server.enable_cors {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_origin(Any);

        router.layer(cors)
    } else {
        router
    }
}
