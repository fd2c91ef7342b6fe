//! Capability validation
//!
//! This module contains the gate every metadata and content call passes
//! through. Validation is read-only apart from lazy eviction of an entry
//! found to be expired; it never renews or extends a capability.

use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use wopi_core::{Capability, CapabilityError, CapabilityGrant, CapabilitySigner, Clock};

use crate::storage::{CapabilityStore, StorageError};

/// Outcome of a failed validation
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The capability was refused
    #[error("Capability rejected: {0}")]
    Rejected(#[from] CapabilityError),

    /// The store could not be consulted
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Validates presented capabilities against signature, store and expiry
#[derive(Clone)]
pub struct CapabilityValidator {
    signer: CapabilitySigner,
    store: Arc<dyn CapabilityStore>,
    clock: Arc<dyn Clock>,
}

impl CapabilityValidator {
    pub fn new(signer: CapabilitySigner, store: Arc<dyn CapabilityStore>, clock: Arc<dyn Clock>) -> Self {
        Self { signer, store, clock }
    }

    /// Validate a presented capability
    ///
    /// # Returns
    /// * `Ok(grant)` with the bound file id and subject
    /// * `Err(Rejected(Malformed | SignatureExpired))` if the signed token fails
    /// * `Err(Rejected(Unknown))` if it was never issued or has already been swept
    /// * `Err(Rejected(Expired))` if the store's expiry has passed (the entry is evicted)
    /// * `Err(Storage)` on a store fault
    ///
    /// Callers must additionally check the grant covers the requested file.
    pub async fn validate(&self, token: &str) -> Result<CapabilityGrant, ValidationError> {
        let now = self.clock.now();

        // Step 1: signature and embedded expiry
        let claims = self.signer.verify(token, now).map_err(|rejection| {
            warn!(reason = rejection.reason(), "SECURITY: Capability failed signature check");
            rejection
        })?;

        // Step 2: registry presence
        let key = Capability::new(token);
        let Some(entry) = self.store.get(&key).await? else {
            warn!(
                file_id = %claims.file_id,
                capability = %key.fingerprint(),
                "SECURITY: Capability not registered"
            );
            return Err(CapabilityError::Unknown.into());
        };

        // Step 3: authoritative expiry, lazily evicted
        if entry.is_expired_at(now) {
            self.store.evict_if_expired(&key, now).await?;
            warn!(
                file_id = %entry.file_id,
                expires_at = %entry.expires_at,
                "Capability expired"
            );
            return Err(CapabilityError::Expired(entry.expires_at.to_rfc3339()).into());
        }

        Ok(CapabilityGrant {
            file_id: entry.file_id,
            subject: entry.subject,
        })
    }
}

impl std::fmt::Debug for CapabilityValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityValidator")
            .field("signer", &self.signer)
            .finish()
    }
}
