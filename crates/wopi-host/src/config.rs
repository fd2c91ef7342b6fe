//! Host configuration
//!
//! Loaded with figment: built-in defaults, then an optional TOML file, then
//! `WOPI_`-prefixed environment variables (nested keys split on `__`, e.g.
//! `WOPI_DOCUMENT__PATH=/srv/docs/report.docx`).

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use wopi_core::FileId;

use crate::documents::DocumentSource;

/// MIME type for Word documents
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Longest capability lifetime accepted (seven days)
pub const MAX_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Largest signature expiry leeway accepted (one hour)
pub const MAX_SIGNATURE_LEEWAY_SECS: u64 = 60 * 60;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level host configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind: String,
    /// Log level for the fmt subscriber.
    pub log_level: String,
    /// HMAC secret for capability signing. Generated at startup when unset.
    pub signing_secret: Option<String>,
    /// Capability lifetime in seconds.
    pub token_ttl_secs: u64,
    /// Interval between expiry sweeps in seconds.
    pub sweep_interval_secs: u64,
    /// Tolerance on the signed expiry claim, in seconds.
    pub signature_leeway_secs: u64,
    /// Externally reachable base URL of this host, as seen by the provider.
    pub wopi_base_url: String,
    /// Viewer frame URL of the document provider.
    pub office_online_url: String,
    /// The access endpoint performs no caller authentication. The deployment
    /// must restrict who can reach it. Must be `true`.
    pub trust_upstream_caller: bool,
    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,
    /// Frame sources allowed by the Content-Security-Policy header.
    pub frame_sources: Vec<String>,
    /// The hosted document.
    pub document: DocumentConfig,
    /// Presentation strings returned in file metadata.
    pub branding: BrandingConfig,
}

/// The single document this host serves.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub file_id: String,
    pub path: PathBuf,
    pub display_name: String,
    pub owner_id: String,
    pub content_type: String,
}

/// Presentation strings returned in file metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingConfig {
    pub user_friendly_name: String,
    pub brand_name: String,
    pub folder_name: String,
    pub company_timezone: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
            signing_secret: None,
            token_ttl_secs: 3600,
            sweep_interval_secs: 300,
            signature_leeway_secs: 60,
            wopi_base_url: "http://localhost:8080".to_string(),
            office_online_url: "https://word-view.officeapps.live.com/wv/wordviewerframe.aspx"
                .to_string(),
            trust_upstream_caller: true,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            frame_sources: vec![
                "*.officeapps.live.com".to_string(),
                "*.office.com".to_string(),
            ],
            document: DocumentConfig::default(),
            branding: BrandingConfig::default(),
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            file_id: "sample-document".to_string(),
            path: PathBuf::from("documents/sample.docx"),
            display_name: "sample.docx".to_string(),
            owner_id: "admin".to_string(),
            content_type: DOCX_CONTENT_TYPE.to_string(),
        }
    }
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            user_friendly_name: "DOCX Viewer User".to_string(),
            brand_name: "DOCX Viewer".to_string(),
            folder_name: "Documents".to_string(),
            company_timezone: "UTC".to_string(),
        }
    }
}

impl HostConfig {
    /// Load from defaults, an optional TOML file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(HostConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        Self::from_figment(figment.merge(Env::prefixed("WOPI_").split("__")))
    }

    /// Extract and validate from an assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: HostConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the host cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.trust_upstream_caller {
            return Err(ConfigError::Invalid(
                "trust_upstream_caller must be true: the access endpoint has no \
                 authentication mode, caller identity is assumed from the network boundary"
                    .into(),
            ));
        }
        if self.document.file_id.trim().is_empty() {
            return Err(ConfigError::Invalid("document.file_id cannot be empty".into()));
        }
        if self.token_ttl_secs == 0 {
            return Err(ConfigError::Invalid("token_ttl_secs must be greater than zero".into()));
        }
        if self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Invalid(format!(
                "token_ttl_secs must be at most {MAX_TOKEN_TTL_SECS}"
            )));
        }
        if self.signature_leeway_secs > MAX_SIGNATURE_LEEWAY_SECS {
            return Err(ConfigError::Invalid(format!(
                "signature_leeway_secs must be at most {MAX_SIGNATURE_LEEWAY_SECS}"
            )));
        }
        if matches!(&self.signing_secret, Some(secret) if secret.len() < 32) {
            return Err(ConfigError::Invalid(
                "signing_secret must be at least 32 bytes".into(),
            ));
        }
        Ok(())
    }

    /// Capability lifetime, clamped to [`MAX_TOKEN_TTL_SECS`]
    pub fn token_ttl(&self) -> chrono::Duration {
        bounded_seconds(self.token_ttl_secs, MAX_TOKEN_TTL_SECS)
    }

    /// Signature expiry leeway, clamped to [`MAX_SIGNATURE_LEEWAY_SECS`]
    pub fn signature_leeway(&self) -> chrono::Duration {
        bounded_seconds(self.signature_leeway_secs, MAX_SIGNATURE_LEEWAY_SECS)
    }

    /// Interval between sweeps.
    ///
    /// Zero falls back to the default of 300 seconds, since
    /// `tokio::time::interval` panics on a zero period.
    pub fn sweep_interval(&self) -> Duration {
        if self.sweep_interval_secs == 0 {
            tracing::warn!("sweep_interval_secs is 0, using default of 300 seconds");
            Duration::from_secs(300)
        } else {
            Duration::from_secs(self.sweep_interval_secs)
        }
    }

    pub fn file_id(&self) -> FileId {
        FileId::new(self.document.file_id.clone())
    }

    pub fn document_source(&self) -> DocumentSource {
        DocumentSource {
            file_id: self.file_id(),
            path: self.document.path.clone(),
            display_name: self.document.display_name.clone(),
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.wopi_base_url.trim_end_matches('/')
    }
}

fn bounded_seconds(secs: u64, max: u64) -> chrono::Duration {
    chrono::Duration::seconds(i64::try_from(secs.min(max)).unwrap_or_default())
}
