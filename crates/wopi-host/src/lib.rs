//! WOPI Host
//!
//! Lets a front-end hand a document to a WOPI viewing provider without
//! sharing stored credentials. The host mints a short-lived capability bound
//! to exactly one file; the provider presents it on every protocol call.
//!
//! ## Capability validity
//!
//! A presented capability is accepted only when:
//!
//! 1. **Signature**: the token verifies and its embedded expiry has not passed
//! 2. **Registration**: it is present in the capability store
//! 3. **Expiry**: the store's recorded expiry has not passed
//! 4. **Binding**: its file id equals the file id in the request path
//!
//! Expired entries leave the store either lazily (on the read that finds
//! them expired) or through the periodic sweep.
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /wopi/api/document/access` - Mint a capability, return the viewer URL
//! - `GET /wopi/files/{file_id}` - CheckFileInfo (read-only descriptor)
//! - `GET /wopi/files/{file_id}/contents` - GetFile (full-body stream)

pub mod api;
pub mod config;
pub mod core;
pub mod documents;
pub mod storage;

pub use api::create_router;
pub use api::handlers::AppState;
pub use config::HostConfig;
pub use core::{CapabilityIssuer, CapabilitySweeper, CapabilityValidator, SweepHandle};
pub use documents::{DocumentSource, DocumentStore, FilesystemDocuments};
pub use storage::{CapabilityEntry, CapabilityStore, MemoryCapabilityStore};
