//! In-memory storage backend
//!
//! Default (and only) capability store. Capabilities do not survive a
//! restart. Backed by a sharded concurrent map so issuance, validation and the
//! sweep never wait on each other for longer than one shard operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use tracing::{debug, info};
use wopi_core::Capability;

use super::{CapabilityEntry, CapabilityStore, StorageError};

/// In-memory capability store implementation
#[derive(Debug, Default)]
pub struct MemoryCapabilityStore {
    entries: DashMap<Capability, CapabilityEntry>,
}

impl MemoryCapabilityStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CapabilityStore for MemoryCapabilityStore {
    async fn put(&self, key: Capability, entry: CapabilityEntry) -> Result<(), StorageError> {
        match self.entries.entry(key) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists),
            Entry::Vacant(slot) => {
                debug!(
                    file_id = %entry.file_id,
                    subject = %entry.subject,
                    expires_at = %entry.expires_at,
                    "Registering capability"
                );
                slot.insert(entry);
                Ok(())
            }
        }
    }

    async fn get(&self, key: &Capability) -> Result<Option<CapabilityEntry>, StorageError> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    async fn delete(&self, key: &Capability) -> Result<bool, StorageError> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn evict_if_expired(&self, key: &Capability, now: DateTime<Utc>) -> Result<bool, StorageError> {
        let removed = self
            .entries
            .remove_if(key, |_, entry| entry.is_expired_at(now))
            .is_some();
        if removed {
            debug!(capability = %key.fingerprint(), "Lazily evicted expired capability");
        }
        Ok(removed)
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, StorageError> {
        let mut removed = 0usize;
        self.entries.retain(|_, entry| {
            let expired = entry.is_expired_at(now);
            if expired {
                removed += 1;
            }
            !expired
        });
        if removed > 0 {
            info!(removed = removed, remaining = self.entries.len(), "Swept expired capabilities");
        }
        Ok(removed)
    }

    async fn len(&self) -> Result<usize, StorageError> {
        Ok(self.entries.len())
    }
}
