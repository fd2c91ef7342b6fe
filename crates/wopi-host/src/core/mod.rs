//! Capability lifecycle for the WOPI host
//!
//! - [`CapabilityIssuer`] mints and registers capabilities
//! - [`CapabilityValidator`] checks a presented capability on every protocol call
//! - [`CapabilitySweeper`] removes expired entries on a fixed cadence

mod issuer;
mod sweep;
mod validator;

pub use issuer::{CapabilityIssuer, IssueError, IssuedCapability};
pub use sweep::{CapabilitySweeper, SweepHandle};
pub use validator::{CapabilityValidator, ValidationError};
