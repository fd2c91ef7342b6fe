//! # WOPI Core
//!
//! Capability tokens and shared types for a WOPI (Web Application Open
//! Platform Interface) host that grants a viewing provider time-limited,
//! read-only access to exactly one document.
//!
//! ## Key Concepts
//!
//! - **Capability**: a signed, short-lived token bound to one file id and one
//!   subject. Presented by the provider on every protocol call.
//! - **Grant**: the `{file_id, subject}` pair a valid capability resolves to.
//! - **Clock**: the single time source used for minting and every expiry check.
//!
//! ## Validity
//!
//! A capability is valid only when all of the following hold:
//!
//! 1. Its signature verifies and its embedded expiry has not passed
//! 2. It is present in the host's capability store
//! 3. The store's recorded expiry has not passed
//!
//! This crate covers step 1. Steps 2 and 3 live with the store in `wopi-host`.

pub mod capability;
pub mod clock;
pub mod error;
pub mod types;

pub use capability::{Capability, CapabilityClaims, CapabilitySigner};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CapabilityError, Result};
pub use types::{CapabilityGrant, DocumentRecord, FileId, Subject};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
