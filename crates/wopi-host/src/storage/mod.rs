//! Capability store
//!
//! The store is the only shared mutable state in the host. Every issued
//! capability is recorded here; a capability that is absent from the store is
//! refused regardless of its signature, which is how removal (sweep or lazy
//! eviction) takes effect.
//!
//! Implementations must be thread-safe, hold their internal locks for no
//! longer than a single map operation, and treat deleting a missing key as a
//! no-op.

pub mod memory;

pub use memory::MemoryCapabilityStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use wopi_core::{Capability, FileId, Subject};

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Capability already registered")]
    AlreadyExists,
}

/// Metadata recorded for an issued capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityEntry {
    /// Bound document
    pub file_id: FileId,
    /// Subject the capability was issued to
    pub subject: Subject,
    /// When the capability was minted
    pub created_at: DateTime<Utc>,
    /// Authoritative expiry
    pub expires_at: DateTime<Utc>,
}

impl CapabilityEntry {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Storage backend trait for issued capabilities
#[async_trait]
pub trait CapabilityStore: Send + Sync + Debug {
    /// Register a freshly minted capability
    async fn put(&self, key: Capability, entry: CapabilityEntry) -> Result<(), StorageError>;

    /// Look up a capability by exact key
    async fn get(&self, key: &Capability) -> Result<Option<CapabilityEntry>, StorageError>;

    /// Remove a capability. Returns whether an entry was present.
    async fn delete(&self, key: &Capability) -> Result<bool, StorageError>;

    /// Remove the entry for `key` only if it has expired as of `now`.
    /// Returns whether an entry was removed.
    async fn evict_if_expired(&self, key: &Capability, now: DateTime<Utc>) -> Result<bool, StorageError>;

    /// Remove every entry expired as of `now`. Returns the number removed.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, StorageError>;

    /// Number of registered capabilities
    async fn len(&self) -> Result<usize, StorageError>;
}
