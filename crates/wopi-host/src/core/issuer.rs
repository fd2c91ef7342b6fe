//! Capability issuance

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use wopi_core::{Capability, CapabilityClaims, CapabilityError, CapabilitySigner, Clock, FileId, Subject};

use crate::documents::{DocumentError, DocumentStore};
use crate::storage::{CapabilityEntry, CapabilityStore, StorageError};

/// Errors from minting a capability
#[derive(Error, Debug)]
pub enum IssueError {
    /// Target document is missing or empty
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Signing(#[from] CapabilityError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Issue time plus TTL falls outside the representable range
    #[error("Capability lifetime of {ttl} overflows from {issued_at}")]
    Lifetime { issued_at: DateTime<Utc>, ttl: Duration },
}

/// A freshly minted capability and its lifetime
#[derive(Debug, Clone)]
pub struct IssuedCapability {
    pub capability: Capability,
    pub file_id: FileId,
    pub subject: Subject,
    pub expires_at: DateTime<Utc>,
}

/// Mints capabilities bound to one document and one subject
#[derive(Clone)]
pub struct CapabilityIssuer {
    signer: CapabilitySigner,
    store: Arc<dyn CapabilityStore>,
    documents: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl CapabilityIssuer {
    pub fn new(
        signer: CapabilitySigner,
        store: Arc<dyn CapabilityStore>,
        documents: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            signer,
            store,
            documents,
            clock,
            ttl,
        }
    }

    /// Issue a capability for `file_id`
    ///
    /// The document must exist and be non-empty. Every call registers a new
    /// store entry; repeated calls for the same file and subject are never
    /// coalesced.
    pub async fn issue(&self, file_id: &FileId, subject: Subject) -> Result<IssuedCapability, IssueError> {
        self.documents.available(file_id).await?;

        // One instant feeds both the signed claims and the store entry.
        let issued_at = self.clock.now();
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or(IssueError::Lifetime { issued_at, ttl: self.ttl })?;

        let claims = CapabilityClaims::new(file_id.clone(), subject.clone(), issued_at, self.ttl);
        let capability = self.signer.sign(&claims)?;

        self.store
            .put(
                capability.clone(),
                CapabilityEntry {
                    file_id: file_id.clone(),
                    subject: subject.clone(),
                    created_at: issued_at,
                    expires_at,
                },
            )
            .await?;

        info!(
            file_id = %file_id,
            subject = %subject,
            expires_at = %expires_at,
            capability = %capability.fingerprint(),
            "Issued capability"
        );

        Ok(IssuedCapability {
            capability,
            file_id: file_id.clone(),
            subject,
            expires_at,
        })
    }
}

impl std::fmt::Debug for CapabilityIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityIssuer")
            .field("signer", &self.signer)
            .field("ttl", &self.ttl)
            .finish()
    }
}
