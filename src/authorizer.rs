//! Entry point orchestration: extract, verify, decide.
//!
//! [`Authorizer::authorize`] is infallible at its signature. Every failure
//! mode maps to a Deny decision carrying a diagnostic `message` in the
//! response context; the only fallible operation is construction, which
//! fails fast on missing configuration.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::AuthorizerConfig;
use crate::error::AuthError;
use crate::event::AuthorizerRequest;
use crate::jwks::{HttpKeyFetcher, KeySetCache};
use crate::policy::{AuthorizerResponse, Effect};
use crate::verifier::TokenVerifier;

/// Principal recorded on Deny decisions, where no identity is known.
const ANONYMOUS_PRINCIPAL: &str = "user";

/// Wires the verification pipeline and answers invocation events with
/// policy decisions.
///
/// # Example
///
/// ```rust,no_run
/// use cognito_authorizer::{Authorizer, AuthorizerRequest};
///
/// # tokio_test::block_on(async {
/// // Reads USER_POOL_ID, APP_CLIENT_ID and AWS_REGION
/// let authorizer = Authorizer::from_env()?;
///
/// let event: AuthorizerRequest = serde_json::from_str(
///     r#"{
///         "authorizationToken": "Bearer eyJraWQiOi...",
///         "methodArn": "arn:aws:execute-api:us-east-1:123456789012:api/prod/GET/items"
///     }"#,
/// )?;
///
/// let decision = authorizer.authorize(&event).await;
/// println!("effect: {:?}", decision.effect());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Authorizer {
    verifier: TokenVerifier,
    clock: Arc<dyn Clock>,
}

impl Authorizer {
    /// Build an authorizer from explicit configuration, wired with the
    /// system clock and an HTTPS fetcher for the pool's JWKS URL.
    pub fn new(config: &AuthorizerConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let fetcher = Arc::new(HttpKeyFetcher::new(config.jwks_url()));
        let key_cache = KeySetCache::new(fetcher, Arc::clone(&clock));
        let verifier = TokenVerifier::new(
            key_cache,
            config.app_client_id.clone(),
            Arc::clone(&clock),
        );
        Self { verifier, clock }
    }

    /// Build an authorizer from the process environment.
    ///
    /// # Errors
    ///
    /// [`AuthError::Config`] when a required variable is missing. This fails
    /// fast: a misconfigured authorizer never answers requests.
    pub fn from_env() -> Result<Self, AuthError> {
        Ok(Self::new(&AuthorizerConfig::from_env()?))
    }

    /// Build an authorizer over a pre-wired verifier, for custom fetchers or
    /// clocks.
    pub fn with_verifier(verifier: TokenVerifier, clock: Arc<dyn Clock>) -> Self {
        Self { verifier, clock }
    }

    /// Authorize one invocation event.
    ///
    /// Always returns a decision. Failures map to Deny with a `message`
    /// context entry: `"Unauthorized"` when no token was found, `"Token
    /// expired"`, `"Invalid token"` for verification failures, and
    /// `"Authorization error"` for anything else.
    pub async fn authorize(&self, request: &AuthorizerRequest) -> AuthorizerResponse {
        match self.try_authorize(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    error = %err,
                    method_arn = %request.method_arn,
                    "Denying request"
                );
                deny(&request.method_arn, deny_message(&err))
            }
        }
    }

    async fn try_authorize(
        &self,
        request: &AuthorizerRequest,
    ) -> Result<AuthorizerResponse, AuthError> {
        let token = request.bearer_token()?;
        let claims = self.verifier.verify(token).await?;

        // Decision-time expiry gate; verification time is not decision time.
        let now = self.clock.unix_seconds();
        if claims.is_expired(now) {
            return Err(AuthError::TokenExpired {
                expires_at: claims.exp,
                now,
            });
        }

        let username = claims.display_username().to_string();
        let context = HashMap::from([
            ("user_id".to_string(), claims.sub.clone()),
            ("username".to_string(), username.clone()),
        ]);

        info!(
            principal = %username,
            method_arn = %request.method_arn,
            "Allowing request"
        );
        Ok(AuthorizerResponse::new(
            username,
            Effect::Allow,
            &request.method_arn,
            Some(context),
        ))
    }
}

/// Deny `resource` with a diagnostic message in the context.
fn deny(resource: &str, message: &str) -> AuthorizerResponse {
    let context = HashMap::from([("message".to_string(), message.to_string())]);
    AuthorizerResponse::new(ANONYMOUS_PRINCIPAL, Effect::Deny, resource, Some(context))
}

/// Map a pipeline error to the denial message surfaced to the caller.
fn deny_message(err: &AuthError) -> &'static str {
    match err {
        AuthError::TokenNotFound => "Unauthorized",
        AuthError::TokenExpired { .. } => "Token expired",
        AuthError::HeaderDecode(_)
        | AuthError::KeyNotFound(_)
        | AuthError::SignatureInvalid(_)
        | AuthError::AudienceMismatch { .. }
        | AuthError::Fetch(_) => "Invalid token",
        AuthError::Config(_) => "Authorization error",
    }
}
