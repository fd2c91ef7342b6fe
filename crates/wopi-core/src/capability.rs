//! Signed capability tokens
//!
//! A capability is an HS256 JWT carrying the bound file id, the subject, the
//! issue and expiry instants and a random nonce. The nonce makes two
//! issuances for the same file and subject in the same second distinct.
//!
//! Verification checks the signature and the embedded expiry against the
//! caller-supplied instant rather than the wall clock, so the embedded expiry
//! and the store's expiry are judged on the same timeline. The embedded
//! expiry is allowed a configurable leeway; the store's expiry is the exact
//! cutoff.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

use crate::error::{CapabilityError, Result};
use crate::types::{CapabilityGrant, FileId, Subject};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Default tolerance on the signed expiry claim
pub const DEFAULT_LEEWAY_SECS: i64 = 60;

/// An opaque capability string as handed to the viewing provider
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(String);

impl Capability {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Shortened form for log lines
    pub fn fingerprint(&self) -> &str {
        let tail = self.0.len().saturating_sub(12);
        self.0.get(tail..).unwrap_or("")
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Capability")
            .field(&format_args!("…{}", self.fingerprint()))
            .finish()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Claims carried inside a capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityClaims {
    /// Bound document
    pub file_id: FileId,
    /// Subject the capability was issued to
    pub sub: Subject,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Embedded expiry (unix seconds)
    pub exp: i64,
    /// Per-issuance random value
    pub nonce: String,
}

impl CapabilityClaims {
    /// Build claims for a fresh issuance
    ///
    /// An expiry past the representable range saturates at the latest instant.
    pub fn new(file_id: FileId, subject: Subject, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            file_id,
            sub: subject,
            iat: issued_at.timestamp(),
            exp: issued_at
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp(),
            nonce: Uuid::new_v4().to_string(),
        }
    }

    pub fn grant(&self) -> CapabilityGrant {
        CapabilityGrant {
            file_id: self.file_id.clone(),
            subject: self.sub.clone(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Mints and verifies capabilities with a shared HMAC secret
#[derive(Clone)]
pub struct CapabilitySigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    leeway: Duration,
}

impl fmt::Debug for CapabilitySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilitySigner")
            .field("algorithm", &ALGORITHM)
            .field("secret", &"[redacted]")
            .field("leeway", &self.leeway)
            .finish()
    }
}

impl CapabilitySigner {
    /// Create a signer from raw secret bytes
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            leeway: Duration::seconds(DEFAULT_LEEWAY_SECS),
        }
    }

    /// Set the tolerance applied to the embedded expiry
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn leeway(&self) -> Duration {
        self.leeway
    }

    /// Sign claims into a capability
    pub fn sign(&self, claims: &CapabilityClaims) -> Result<Capability> {
        let token = encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| CapabilityError::Signing(e.to_string()))?;
        Ok(Capability(token))
    }

    /// Verify signature integrity and the embedded expiry as of `now`
    ///
    /// # Returns
    /// * `Ok(claims)` if the signature verifies and `exp + leeway` is not before `now`
    /// * `Err(Malformed)` if the token does not decode or the signature fails
    /// * `Err(SignatureExpired)` if the embedded expiry has passed
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<CapabilityClaims> {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked below against the injected clock.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<CapabilityClaims>(token, &self.decoding_key, &validation)?.claims;

        if now.timestamp() > claims.exp + self.leeway.num_seconds() {
            debug!(file_id = %claims.file_id, exp = claims.exp, "Embedded capability expiry passed");
            return Err(CapabilityError::SignatureExpired(claims.expires_at().to_rfc3339()));
        }

        Ok(claims)
    }
}
