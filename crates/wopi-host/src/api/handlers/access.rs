//! Document Access Handler
//!
//! Entry point used by the front-end. Mints a capability for the configured
//! document and returns the provider-facing viewer URL that embeds it.
//!
//! No caller authentication happens here; the deployment boundary is trusted
//! (see `HostConfig::trust_upstream_caller`).

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use url::Url;
use wopi_core::{CapabilitySigner, Clock, FileId, Subject};

use crate::api::error::ApiError;
use crate::config::HostConfig;
use crate::core::{CapabilityIssuer, CapabilityValidator};
use crate::documents::DocumentStore;
use crate::storage::CapabilityStore;

/// Application state shared across handlers
///
/// Holds no per-capability state; everything about an issued capability
/// lives in the capability store behind the issuer and validator.
pub struct AppState {
    /// Host configuration
    pub config: HostConfig,
    /// Mints capabilities
    pub issuer: CapabilityIssuer,
    /// Validates presented capabilities
    pub validator: CapabilityValidator,
    /// Document byte source
    pub documents: Arc<dyn DocumentStore>,
}

impl AppState {
    /// Wire issuer and validator around a shared store and clock
    pub fn new(
        config: HostConfig,
        signer: CapabilitySigner,
        store: Arc<dyn CapabilityStore>,
        documents: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let issuer = CapabilityIssuer::new(
            signer.clone(),
            store.clone(),
            documents.clone(),
            clock.clone(),
            config.token_ttl(),
        );
        let validator = CapabilityValidator::new(signer, store, clock);

        Self {
            config,
            issuer,
            validator,
            documents,
        }
    }
}

/// Optional parameters of the access call
#[derive(Debug, Default, Deserialize)]
pub struct AccessQuery {
    /// Subject to bind the capability to (defaults to anonymous)
    pub subject: Option<String>,
}

/// Response from the access call
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub success: bool,
    /// Viewer URL to embed in a frame
    pub document_url: String,
    /// Raw capability, for the caller's own use
    pub access_token: String,
    pub file_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Issue a capability for the hosted document
///
/// GET /wopi/api/document/access
pub async fn access_document(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AccessQuery>,
) -> Result<Json<AccessResponse>, ApiError> {
    let file_id = state.config.file_id();
    let subject = query
        .subject
        .filter(|s| !s.trim().is_empty())
        .map(Subject::new)
        .unwrap_or_default();

    let issued = state.issuer.issue(&file_id, subject).await?;
    let document_url = viewer_url(&state.config, &file_id, issued.capability.as_str())?;

    info!(
        file_id = %file_id,
        subject = %issued.subject,
        "Document access granted"
    );

    Ok(Json(AccessResponse {
        success: true,
        document_url,
        access_token: issued.capability.into_string(),
        file_id: file_id.to_string(),
        expires_at: issued.expires_at,
    }))
}

/// `{base}/wopi/files/{file_id}` as the provider should call it
pub fn wopi_src(config: &HostConfig, file_id: &FileId) -> String {
    format!("{}/wopi/files/{}", config.base_url(), file_id)
}

/// Provider viewer URL with the WOPI source and capability as query parameters
pub fn viewer_url(config: &HostConfig, file_id: &FileId, token: &str) -> Result<String, ApiError> {
    let url = Url::parse_with_params(
        &config.office_online_url,
        &[
            ("WOPISrc", wopi_src(config, file_id).as_str()),
            ("access_token", token),
            ("ui", "en-US"),
            ("rs", "en-US"),
        ],
    )
    .map_err(|e| ApiError::Internal(format!("Invalid office_online_url: {}", e)))?;

    Ok(url.into())
}
