//! Error taxonomy for the authorization pipeline.
//!
//! Each variant tags the pipeline step that failed. Every non-fatal variant
//! collapses into a Deny decision at the entry point; [`AuthError::Config`]
//! is a startup failure and never reaches a decision.

use thiserror::Error;

/// Errors produced while authorizing a request.
///
/// Variants carry owned diagnostic values so the enum stays `Clone` and
/// `PartialEq` and tests can assert on exact failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No bearer token in the token field or the headers.
    #[error("no bearer token found in the request")]
    TokenNotFound,

    /// The token's protected header could not be decoded, or carries no kid.
    #[error("failed to decode token header: {0}")]
    HeaderDecode(String),

    /// The key set has no entry matching the token's kid.
    #[error("no key with kid {0:?} in the current key set")]
    KeyNotFound(String),

    /// Signature verification or claims decoding failed.
    #[error("token verification failed: {0}")]
    SignatureInvalid(String),

    /// The token's exp claim is in the past.
    #[error("token expired at {expires_at} (now {now})")]
    TokenExpired { expires_at: u64, now: u64 },

    /// The aud (or client_id) claim does not name the configured app client.
    #[error("token audience {found:?} does not match expected client {expected:?}")]
    AudienceMismatch { expected: String, found: String },

    /// The key set could not be fetched or parsed.
    #[error("failed to retrieve the key set: {0}")]
    Fetch(String),

    /// A required environment variable is missing.
    #[error("missing required configuration value {0}")]
    Config(&'static str),
}
