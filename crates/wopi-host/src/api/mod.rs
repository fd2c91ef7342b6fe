//! API module for the WOPI host

pub mod error;
pub mod handlers;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::HostConfig;
use error::ApiError;
use handlers::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".into(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Endpoint not found".into())
}

fn cors_layer(config: &HostConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Content-Security-Policy allowing the provider's viewer frame
pub fn content_security_policy(config: &HostConfig) -> String {
    let mut frame_src = vec!["'self'".to_string()];
    frame_src.extend(config.frame_sources.iter().cloned());

    format!(
        "default-src 'self'; frame-src {}; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'",
        frame_src.join(" ")
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let csp = HeaderValue::from_str(&content_security_policy(&state.config)).unwrap_or_else(|_| {
        warn!("Invalid frame_sources, falling back to a self-only CSP");
        HeaderValue::from_static("default-src 'self'")
    });

    Router::new()
        // Health endpoint
        .route("/health", get(health))
        // Access (front-end entry point)
        .route("/wopi/api/document/access", get(handlers::access_document))
        // WOPI protocol endpoints
        .route("/wopi/files/{file_id}", get(handlers::check_file_info))
        .route("/wopi/files/{file_id}/contents", get(handlers::get_file))
        .fallback(not_found)
        // Middleware
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            csp,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}
