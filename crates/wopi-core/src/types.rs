//! Common types shared by the issuer, validator and protocol handlers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Identifier of a hosted document, as it appears in protocol paths
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identity a capability was issued to.
///
/// The host does not authenticate callers of the access endpoint, so the
/// subject is informational and defaults to [`Subject::ANONYMOUS`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    /// Subject used when the caller does not name one
    pub const ANONYMOUS: &'static str = "anonymous";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn anonymous() -> Self {
        Self::new(Self::ANONYMOUS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == Self::ANONYMOUS
    }
}

impl Default for Subject {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Subject {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// What a valid capability resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityGrant {
    pub file_id: FileId,
    pub subject: Subject,
}

impl CapabilityGrant {
    /// Whether this grant covers the file named in a request path
    pub fn covers(&self, file_id: &FileId) -> bool {
        &self.file_id == file_id
    }
}

/// Read-only view of a hosted document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub file_id: FileId,
    pub path: PathBuf,
    pub display_name: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

impl DocumentRecord {
    /// Zero-byte documents are treated as absent
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Version stamp derived from the modification time (unix millis)
    pub fn version(&self) -> String {
        self.last_modified.timestamp_millis().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_defaults_to_anonymous() {
        let subject = Subject::default();
        assert!(subject.is_anonymous());
        assert_eq!(subject.as_str(), "anonymous");
        assert!(!Subject::new("alice").is_anonymous());
    }

    #[test]
    fn test_grant_covers_only_its_file() {
        let grant = CapabilityGrant {
            file_id: FileId::new("sample-document"),
            subject: Subject::anonymous(),
        };

        assert!(grant.covers(&FileId::new("sample-document")));
        assert!(!grant.covers(&FileId::new("other-document")));
    }

    #[test]
    fn test_document_version_is_mtime_millis() {
        let record = DocumentRecord {
            file_id: FileId::new("doc"),
            path: PathBuf::from("documents/doc.docx"),
            display_name: "doc.docx".into(),
            size: 42,
            last_modified: DateTime::from_timestamp_millis(1_700_000_000_123).unwrap(),
        };

        assert_eq!(record.version(), "1700000000123");
        assert!(!record.is_empty());
    }
}
