//! Document store
//!
//! A passive, read-only byte source keyed by file id. The protocol handlers
//! only consult it after a capability has been validated (or, for the access
//! call, to decide whether a capability may be minted at all).

pub mod filesystem;

pub use filesystem::{DocumentSource, FilesystemDocuments};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use tokio::io::AsyncRead;
use wopi_core::{DocumentRecord, FileId};

/// Reader over a document's bytes
pub type DocumentReader = Box<dyn AsyncRead + Send + Unpin>;

/// Error type for document lookups
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Document not found: {0}")]
    NotFound(FileId),

    #[error("Document is empty: {0}")]
    Empty(FileId),

    #[error("I/O error reading {file_id}: {source}")]
    Io {
        file_id: FileId,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    /// Missing and zero-byte documents are reported identically to callers
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentError::NotFound(_) | DocumentError::Empty(_))
    }
}

/// Read-only document source
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Stat a document. `None` when the id is unknown or the file is absent.
    async fn stat(&self, file_id: &FileId) -> Result<Option<DocumentRecord>, DocumentError>;

    /// Open the document for a single full-body read
    async fn open_read_stream(&self, file_id: &FileId) -> Result<DocumentReader, DocumentError>;

    async fn exists(&self, file_id: &FileId) -> Result<bool, DocumentError> {
        Ok(self.stat(file_id).await?.is_some())
    }

    async fn size(&self, file_id: &FileId) -> Result<Option<u64>, DocumentError> {
        Ok(self.stat(file_id).await?.map(|r| r.size))
    }

    async fn last_modified(&self, file_id: &FileId) -> Result<Option<DateTime<Utc>>, DocumentError> {
        Ok(self.stat(file_id).await?.map(|r| r.last_modified))
    }

    /// Stat a document that must exist and be non-empty
    async fn available(&self, file_id: &FileId) -> Result<DocumentRecord, DocumentError> {
        match self.stat(file_id).await? {
            None => Err(DocumentError::NotFound(file_id.clone())),
            Some(record) if record.is_empty() => Err(DocumentError::Empty(file_id.clone())),
            Some(record) => Ok(record),
        }
    }
}
