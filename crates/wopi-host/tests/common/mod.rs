//! Host test utilities.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use wopi_core::{CapabilitySigner, ManualClock};
use wopi_host::config::DocumentConfig;
use wopi_host::{create_router, AppState, FilesystemDocuments, HostConfig, MemoryCapabilityStore};

#[allow(dead_code)]
pub const TEST_SECRET: &[u8] = b"integration-test-secret-0123456789";

/// A test host with a temporary document directory and a manual clock.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestHost {
    pub router: axum::Router,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryCapabilityStore>,
    pub config: HostConfig,
    pub doc_path: PathBuf,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestHost {
    /// Host serving `sample-document` with the given initial content.
    pub fn with_content(content: &[u8]) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let doc_path = temp_dir.path().join("sample.docx");
        std::fs::write(&doc_path, content).expect("Failed to write document");

        let config = HostConfig {
            wopi_base_url: "http://wopi.test".into(),
            office_online_url: "https://viewer.test/frame.aspx".into(),
            document: DocumentConfig {
                path: doc_path.clone(),
                ..Default::default()
            },
            ..Default::default()
        };

        let clock = Arc::new(ManualClock::starting_now());
        let store = Arc::new(MemoryCapabilityStore::new());
        let documents = Arc::new(FilesystemDocuments::new(config.document_source()));
        let signer = CapabilitySigner::new(TEST_SECRET).with_leeway(config.signature_leeway());

        let state = Arc::new(AppState::new(
            config.clone(),
            signer,
            store.clone(),
            documents,
            clock.clone(),
        ));

        Self {
            router: create_router(state),
            clock,
            store,
            config,
            doc_path,
            _temp_dir: temp_dir,
        }
    }

    pub fn new() -> Self {
        Self::with_content(b"PK\x03\x04 sample docx body")
    }

    /// GET a URI and decode the body as JSON (Null when empty or not JSON).
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, _, bytes) = self.get(uri).await;
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// GET a URI and return status, headers and raw body.
    pub async fn get(&self, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, headers, bytes.to_vec())
    }

    /// Call the access endpoint and return the capability.
    pub async fn access_token(&self) -> String {
        let (status, body) = self.get_json("/wopi/api/document/access").await;
        assert_eq!(status, StatusCode::OK, "access failed: {body}");
        body["accessToken"].as_str().unwrap().to_string()
    }

    pub fn metadata_uri(file_id: &str, token: &str) -> String {
        format!("/wopi/files/{file_id}?access_token={token}")
    }

    pub fn contents_uri(file_id: &str, token: &str) -> String {
        format!("/wopi/files/{file_id}/contents?access_token={token}")
    }
}
