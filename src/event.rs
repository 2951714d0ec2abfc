//! Gateway invocation events and bearer token extraction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// The invocation event handed to the authorizer by the gateway.
///
/// TOKEN-type authorizers put the credential in `authorizationToken`;
/// REQUEST-type authorizers forward the original HTTP headers. Both shapes
/// deserialize into this struct, and [`bearer_token`](Self::bearer_token)
/// resolves which carrier applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerRequest {
    /// Credential field of TOKEN-type events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_token: Option<String>,

    /// HTTP headers of REQUEST-type events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,

    /// ARN of the method the caller wants to invoke.
    pub method_arn: String,
}

/// Which carrier supplied the raw credential.
#[derive(Debug, Clone, Copy)]
enum TokenSource<'a> {
    /// The `authorizationToken` event field.
    TokenField(&'a str),
    /// The forwarded HTTP headers.
    Headers(&'a HashMap<String, String>),
}

impl AuthorizerRequest {
    /// Resolve the carrier once. The token field wins over the headers even
    /// when empty; the event shape is never re-inspected downstream.
    fn token_source(&self) -> Option<TokenSource<'_>> {
        if let Some(token) = self.authorization_token.as_deref() {
            return Some(TokenSource::TokenField(token));
        }
        self.headers.as_ref().map(TokenSource::Headers)
    }

    /// Extract the bearer token from the event.
    ///
    /// Looks at `authorizationToken` first, then the `Authorization` header
    /// (exact case, then all-lowercase). A leading `Bearer ` prefix is
    /// stripped; a value without the prefix is passed through unchanged for
    /// callers that send the bare token. Extraction is pure: the same event
    /// always yields the same token.
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenNotFound`] when neither carrier holds a value.
    pub fn bearer_token(&self) -> Result<&str, AuthError> {
        match self.token_source() {
            Some(TokenSource::TokenField(raw)) => {
                debug!("Token taken from the authorizationToken field");
                Ok(strip_bearer_prefix(raw))
            }
            Some(TokenSource::Headers(headers)) => {
                let raw = headers
                    .get("Authorization")
                    .or_else(|| headers.get("authorization"))
                    .ok_or(AuthError::TokenNotFound)?;
                debug!("Token taken from the Authorization header");
                Ok(strip_bearer_prefix(raw))
            }
            None => Err(AuthError::TokenNotFound),
        }
    }
}

/// Strip a `Bearer` scheme prefix: the literal `Bearer` followed by at least
/// one space or tab, then a non-empty token. Anything else (a bare token, a
/// lowercase scheme, `Bearer` with nothing after it) is returned unchanged.
fn strip_bearer_prefix(raw: &str) -> &str {
    let Some(rest) = raw.strip_prefix("Bearer") else {
        return raw;
    };
    let token = rest.trim_start_matches([' ', '\t']);
    if token.len() < rest.len() && !token.is_empty() {
        token
    } else {
        raw
    }
}
