//! Error types for capability handling

use thiserror::Error;

/// Result type alias using CapabilityError
pub type Result<T> = std::result::Result<T, CapabilityError>;

/// Reasons a capability can be refused, plus minting failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// Token could not be decoded or its signature did not verify
    #[error("Malformed capability: {0}")]
    Malformed(String),

    /// The expiry embedded in the signed token has passed
    #[error("Capability signature expired at {0}")]
    SignatureExpired(String),

    /// Token verifies but is not in the store (never issued, or swept)
    #[error("Unknown capability")]
    Unknown,

    /// The store's recorded expiry has passed
    #[error("Capability expired at {0}")]
    Expired(String),

    /// Token could not be produced
    #[error("Failed to sign capability: {0}")]
    Signing(String),
}

impl CapabilityError {
    /// Short machine-readable reason, safe to log
    pub fn reason(&self) -> &'static str {
        match self {
            CapabilityError::Malformed(_) => "malformed",
            CapabilityError::SignatureExpired(_) => "signature_expired",
            CapabilityError::Unknown => "unknown",
            CapabilityError::Expired(_) => "expired",
            CapabilityError::Signing(_) => "signing",
        }
    }

    /// Whether this error is a refusal of a presented capability
    pub fn is_rejection(&self) -> bool {
        !matches!(self, CapabilityError::Signing(_))
    }
}

impl From<jsonwebtoken::errors::Error> for CapabilityError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        CapabilityError::Malformed(err.to_string())
    }
}
