//! WOPI File Handlers
//!
//! CheckFileInfo and GetFile. Both re-validate the presented capability on
//! every call; there is no cached "already validated" state between them and
//! they may arrive in any order.
//!
//! Order of checks:
//! 1. Capability validation (401)
//! 2. Capability file id equals path file id (401)
//! 3. Document exists and is non-empty (404)

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};
use url::Url;
use wopi_core::{CapabilityGrant, DocumentRecord, FileId};

use crate::api::error::ApiError;
use crate::api::handlers::access::{wopi_src, AppState};
use crate::config::HostConfig;

/// Capability presented by the provider
#[derive(Debug, Default, Deserialize)]
pub struct AccessTokenQuery {
    pub access_token: Option<String>,
}

/// A provider action advertised in CheckFileInfo
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WopiAction {
    pub action_type: String,
    pub url: String,
}

/// CheckFileInfo response
///
/// The permission block is fixed: this host is read-only and does not
/// support locking or updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CheckFileInfo {
    pub base_file_name: String,
    pub owner_id: String,
    pub size: u64,
    pub version: String,

    pub user_id: String,
    pub user_friendly_name: String,

    pub user_can_write: bool,
    pub user_can_not_write_relative: bool,
    pub supports_update: bool,
    pub supports_locks: bool,
    pub supports_get_lock: bool,
    pub read_only: bool,

    pub close_button_closes_window: bool,
    pub hide_export_option: bool,
    pub hide_save_option: bool,
    pub hide_print_option: bool,

    pub host_view_url: String,
    pub host_edit_url: String,
    pub actions: Vec<WopiAction>,

    pub company_timezone: String,
    pub is_anonymous_user: bool,
    pub is_edit_recommended: bool,

    pub breadcrumb_brand_name: String,
    pub breadcrumb_folder_name: String,
    pub breadcrumb_doc_name: String,
}

impl CheckFileInfo {
    fn read_only(config: &HostConfig, record: &DocumentRecord, grant: &CapabilityGrant, contents_url: String) -> Self {
        let access_url = format!("{}/wopi/api/document/access", config.base_url());

        Self {
            base_file_name: record.display_name.clone(),
            owner_id: config.document.owner_id.clone(),
            size: record.size,
            version: record.version(),

            user_id: grant.subject.to_string(),
            user_friendly_name: config.branding.user_friendly_name.clone(),

            user_can_write: false,
            user_can_not_write_relative: true,
            supports_update: false,
            supports_locks: false,
            supports_get_lock: false,
            read_only: true,

            close_button_closes_window: true,
            hide_export_option: true,
            hide_save_option: true,
            hide_print_option: false,

            host_view_url: access_url.clone(),
            host_edit_url: access_url,
            actions: vec![WopiAction {
                action_type: "view".into(),
                url: contents_url,
            }],

            company_timezone: config.branding.company_timezone.clone(),
            is_anonymous_user: grant.subject.is_anonymous(),
            is_edit_recommended: false,

            breadcrumb_brand_name: config.branding.brand_name.clone(),
            breadcrumb_folder_name: config.branding.folder_name.clone(),
            breadcrumb_doc_name: record.display_name.clone(),
        }
    }
}

/// Validate the presented capability and require it to cover `file_id`
async fn authorize(state: &AppState, file_id: &FileId, token: Option<&str>) -> Result<CapabilityGrant, ApiError> {
    let token = token.filter(|t| !t.is_empty()).ok_or_else(|| {
        warn!(file_id = %file_id, "Protocol call without access token");
        ApiError::Unauthorized
    })?;

    let grant = state.validator.validate(token).await?;

    if !grant.covers(file_id) {
        warn!(
            requested = %file_id,
            granted = %grant.file_id,
            "SECURITY: Capability presented for a different file"
        );
        return Err(ApiError::Unauthorized);
    }

    Ok(grant)
}

fn contents_url(config: &HostConfig, file_id: &FileId, token: &str) -> Result<String, ApiError> {
    let mut url = Url::parse(&format!("{}/contents", wopi_src(config, file_id)))
        .map_err(|e| ApiError::Internal(format!("Invalid wopi_base_url: {}", e)))?;
    url.query_pairs_mut().append_pair("access_token", token);
    Ok(url.into())
}

/// Quote-safe filename for Content-Disposition
fn disposition_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect()
}

/// CheckFileInfo
///
/// GET /wopi/files/{file_id}
pub async fn check_file_info(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
    Query(query): Query<AccessTokenQuery>,
) -> Result<Json<CheckFileInfo>, ApiError> {
    let file_id = FileId::new(file_id);
    let token = query.access_token.as_deref();
    let grant = authorize(&state, &file_id, token).await?;

    let record = state.documents.available(&file_id).await?;
    let contents_url = contents_url(&state.config, &file_id, token.unwrap_or_default())?;

    info!(file_id = %file_id, subject = %grant.subject, size = record.size, "CheckFileInfo");

    Ok(Json(CheckFileInfo::read_only(&state.config, &record, &grant, contents_url)))
}

/// GetFile
///
/// GET /wopi/files/{file_id}/contents
///
/// Streams the whole document. The capability store is not touched once
/// validation has finished; a client disconnect drops the stream and closes
/// the file.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
    Query(query): Query<AccessTokenQuery>,
) -> Result<Response, ApiError> {
    let file_id = FileId::new(file_id);
    let grant = authorize(&state, &file_id, query.access_token.as_deref()).await?;

    let record = state.documents.available(&file_id).await?;
    let reader = state.documents.open_read_stream(&file_id).await?;

    info!(file_id = %file_id, subject = %grant.subject, size = record.size, "GetFile");

    let headers = [
        (header::CONTENT_TYPE, state.config.document.content_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", disposition_filename(&record.display_name)),
        ),
        (header::CONTENT_LENGTH, record.size.to_string()),
    ];

    Ok((headers, Body::from_stream(ReaderStream::new(reader))).into_response())
}
