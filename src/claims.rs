//! Verified token claims.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Claims carried by an accepted Cognito token.
///
/// Id tokens name their audience in `aud` and the user in `cognito:username`;
/// access tokens use `client_id` and `username` instead. Everything not
/// modeled explicitly is preserved in [`additional`](Self::additional).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user pool entry's stable identifier.
    pub sub: String,

    /// Username claim of access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Username claim of id tokens.
    #[serde(
        rename = "cognito:username",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cognito_username: Option<String>,

    /// Expiry as seconds since the Unix epoch.
    pub exp: u64,

    /// Audience claim of id tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    /// Client id claim of access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Claims not modeled above, preserved as-is.
    #[serde(flatten)]
    pub additional: HashMap<String, serde_json::Value>,
}

impl TokenClaims {
    /// Best display name for the principal: `username`, else
    /// `cognito:username`, else the subject.
    pub fn display_username(&self) -> &str {
        self.username
            .as_deref()
            .or(self.cognito_username.as_deref())
            .unwrap_or(&self.sub)
    }

    /// Whether the token is expired at `now` (epoch seconds).
    ///
    /// `now == exp` is still valid; expiry is strict.
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id_token_claims() -> TokenClaims {
        serde_json::from_value(json!({
            "sub": "7d8ca528-4931-4254-9273-ea297ad2b011",
            "cognito:username": "alice",
            "aud": "client-1",
            "exp": 1_700_003_600u64,
            "iat": 1_700_000_000u64,
            "token_use": "id",
        }))
        .expect("id token claims should deserialize")
    }

    #[test]
    fn deserializes_id_token_shape() {
        let claims = id_token_claims();
        assert_eq!(claims.cognito_username.as_deref(), Some("alice"));
        assert_eq!(claims.aud.as_deref(), Some("client-1"));
        assert_eq!(claims.client_id, None);
        assert_eq!(claims.additional.get("token_use"), Some(&json!("id")));
    }

    #[test]
    fn display_username_prefers_username_then_cognito_then_sub() {
        let mut claims = id_token_claims();
        assert_eq!(claims.display_username(), "alice");

        claims.username = Some("alice-access".to_string());
        assert_eq!(claims.display_username(), "alice-access");

        claims.username = None;
        claims.cognito_username = None;
        assert_eq!(claims.display_username(), claims.sub);
    }

    #[test]
    fn expiry_is_strict() {
        let claims = id_token_claims();
        assert!(!claims.is_expired(claims.exp - 1));
        assert!(!claims.is_expired(claims.exp));
        assert!(claims.is_expired(claims.exp + 1));
    }
}
