//! Filesystem-backed document store
//!
//! Serves a single configured document from local disk. Size and
//! modification time are read fresh on every call so a document replaced on
//! disk is picked up without a restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use wopi_core::{DocumentRecord, FileId};

use super::{DocumentError, DocumentReader, DocumentStore};

/// Where a document lives and what it is called
#[derive(Debug, Clone)]
pub struct DocumentSource {
    pub file_id: FileId,
    pub path: PathBuf,
    pub display_name: String,
}

/// Filesystem document store
#[derive(Debug, Clone)]
pub struct FilesystemDocuments {
    source: DocumentSource,
}

impl FilesystemDocuments {
    pub fn new(source: DocumentSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// Create the directory holding the document if it is missing
    pub async fn prepare(&self) -> std::io::Result<()> {
        if let Some(dir) = self.source.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !tokio::fs::try_exists(dir).await? {
                tokio::fs::create_dir_all(dir).await?;
                info!(dir = %dir.display(), "Created documents directory");
            }
        }
        Ok(())
    }

    fn resolve(&self, file_id: &FileId) -> Option<&Path> {
        (&self.source.file_id == file_id).then_some(self.source.path.as_path())
    }

    fn io_error(file_id: &FileId, source: std::io::Error) -> DocumentError {
        DocumentError::Io {
            file_id: file_id.clone(),
            source,
        }
    }
}

#[async_trait]
impl DocumentStore for FilesystemDocuments {
    async fn stat(&self, file_id: &FileId) -> Result<Option<DocumentRecord>, DocumentError> {
        let Some(path) = self.resolve(file_id) else {
            debug!(file_id = %file_id, "Unknown document id");
            return Ok(None);
        };

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error(file_id, e)),
        };

        let modified = metadata.modified().map_err(|e| Self::io_error(file_id, e))?;

        Ok(Some(DocumentRecord {
            file_id: file_id.clone(),
            path: path.to_path_buf(),
            display_name: self.source.display_name.clone(),
            size: metadata.len(),
            last_modified: DateTime::<Utc>::from(modified),
        }))
    }

    async fn open_read_stream(&self, file_id: &FileId) -> Result<DocumentReader, DocumentError> {
        let path = self
            .resolve(file_id)
            .ok_or_else(|| DocumentError::NotFound(file_id.clone()))?;

        match tokio::fs::File::open(path).await {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DocumentError::NotFound(file_id.clone())),
            Err(e) => Err(Self::io_error(file_id, e)),
        }
    }
}
