//! Token verification pipeline.
//!
//! Six steps, each a terminal state: header decode (kid), key resolution,
//! signature verification, claims decode, expiry, audience. The first
//! failure ends verification with the [`AuthError`] tagging that step.

use std::sync::Arc;

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use tracing::{debug, warn};

use crate::claims::TokenClaims;
use crate::clock::Clock;
use crate::error::AuthError;
use crate::jwks::KeySetCache;

/// Verifies bearer tokens against the user pool's published keys.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    key_cache: KeySetCache,
    expected_client_id: String,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    /// Create a verifier over `key_cache` expecting tokens issued for
    /// `expected_client_id`.
    pub fn new(
        key_cache: KeySetCache,
        expected_client_id: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            key_cache,
            expected_client_id: expected_client_id.into(),
            clock,
        }
    }

    /// The app client id tokens must be issued for.
    pub fn expected_client_id(&self) -> &str {
        &self.expected_client_id
    }

    /// Verify a token end to end and return its claims.
    ///
    /// # Errors
    ///
    /// One tagged [`AuthError`] per pipeline step:
    /// [`AuthError::HeaderDecode`] for a malformed header or missing kid,
    /// [`AuthError::Fetch`] / [`AuthError::KeyNotFound`] for key resolution,
    /// [`AuthError::SignatureInvalid`] for signature or claims decoding,
    /// [`AuthError::TokenExpired`] and [`AuthError::AudienceMismatch`] for
    /// the final claim checks.
    pub async fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let header = decode_header(token).map_err(|e| {
            debug!(error = %e, "Failed to decode token header");
            AuthError::HeaderDecode(e.to_string())
        })?;
        let kid = header.kid.ok_or_else(|| {
            debug!("Token header carries no kid");
            AuthError::HeaderDecode("token header carries no kid".to_string())
        })?;
        debug!(kid = %kid, "Resolved signing key id");

        let jwk = self.key_cache.find_key(&kid).await?;

        let claims = self.check_signature(token, &jwk, &kid)?;

        let now = self.clock.unix_seconds();
        if claims.is_expired(now) {
            warn!(kid = %kid, expires_at = claims.exp, now, "Token expired");
            return Err(AuthError::TokenExpired {
                expires_at: claims.exp,
                now,
            });
        }

        self.check_audience(&claims)?;

        debug!(sub = %claims.sub, kid = %kid, "Token verified");
        Ok(claims)
    }

    /// Verify the signature with the matched key and decode the claims.
    ///
    /// The library's expiry and audience enforcement is disabled here: both
    /// are checked by the caller against the injected clock and the
    /// configured client id.
    fn check_signature(&self, token: &str, jwk: &Jwk, kid: &str) -> Result<TokenClaims, AuthError> {
        let algorithm = verification_algorithm(jwk)?;
        let decoding_key = DecodingKey::from_jwk(jwk).map_err(|e| {
            warn!(kid = %kid, error = %e, "Failed to build a verification key from the JWK");
            AuthError::SignatureInvalid(format!("unusable key material: {e}"))
        })?;

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;

        let data = decode::<TokenClaims>(token, &decoding_key, &validation).map_err(|e| {
            warn!(kid = %kid, error = %e, "Signature verification failed");
            AuthError::SignatureInvalid(e.to_string())
        })?;

        debug!(kid = %kid, "Signature verified");
        Ok(data.claims)
    }

    /// Audience check: `aud` must match when present, else `client_id` must
    /// match when present. A token carrying neither claim is accepted with a
    /// warning (legacy permissive behavior).
    fn check_audience(&self, claims: &TokenClaims) -> Result<(), AuthError> {
        if let Some(aud) = claims.aud.as_deref() {
            if aud != self.expected_client_id {
                warn!(
                    expected = %self.expected_client_id,
                    found = %aud,
                    "Token audience does not match the app client"
                );
                return Err(AuthError::AudienceMismatch {
                    expected: self.expected_client_id.clone(),
                    found: aud.to_string(),
                });
            }
        } else if let Some(client_id) = claims.client_id.as_deref() {
            if client_id != self.expected_client_id {
                warn!(
                    expected = %self.expected_client_id,
                    found = %client_id,
                    "Token client_id does not match the app client"
                );
                return Err(AuthError::AudienceMismatch {
                    expected: self.expected_client_id.clone(),
                    found: client_id.to_string(),
                });
            }
        } else {
            warn!("Token carries neither aud nor client_id, accepting");
        }
        Ok(())
    }
}

/// Pick the verification algorithm from the key's own metadata, falling back
/// to the key family default. The attacker-controlled token header never
/// chooses the algorithm, and only asymmetric signing algorithms are
/// accepted.
fn verification_algorithm(jwk: &Jwk) -> Result<Algorithm, AuthError> {
    match jwk.common.key_algorithm {
        Some(KeyAlgorithm::RS256) => Ok(Algorithm::RS256),
        Some(KeyAlgorithm::RS384) => Ok(Algorithm::RS384),
        Some(KeyAlgorithm::RS512) => Ok(Algorithm::RS512),
        Some(KeyAlgorithm::PS256) => Ok(Algorithm::PS256),
        Some(KeyAlgorithm::PS384) => Ok(Algorithm::PS384),
        Some(KeyAlgorithm::PS512) => Ok(Algorithm::PS512),
        Some(KeyAlgorithm::ES256) => Ok(Algorithm::ES256),
        Some(KeyAlgorithm::ES384) => Ok(Algorithm::ES384),
        Some(other) => Err(AuthError::SignatureInvalid(format!(
            "key algorithm {other:?} is not a supported signing algorithm"
        ))),
        None => match &jwk.algorithm {
            AlgorithmParameters::RSA(_) => Ok(Algorithm::RS256),
            AlgorithmParameters::EllipticCurve(_) => Ok(Algorithm::ES256),
            _ => Err(AuthError::SignatureInvalid(
                "key material does not determine a signing algorithm".to_string(),
            )),
        },
    }
}
