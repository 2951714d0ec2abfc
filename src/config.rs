//! Environment configuration.
//!
//! All three variables are required. A missing one is a startup error: the
//! authorizer refuses to construct rather than answering requests it cannot
//! verify.

use std::env;

use crate::error::AuthError;

/// Startup configuration for the authorizer.
#[derive(Debug, Clone)]
pub struct AuthorizerConfig {
    /// Cognito user pool whose tokens are accepted.
    pub user_pool_id: String,
    /// App client id tokens must be issued for.
    pub app_client_id: String,
    /// AWS region hosting the user pool.
    pub region: String,
}

impl AuthorizerConfig {
    /// Build a config from explicit values.
    pub fn new(
        user_pool_id: impl Into<String>,
        app_client_id: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            user_pool_id: user_pool_id.into(),
            app_client_id: app_client_id.into(),
            region: region.into(),
        }
    }

    /// Load the config from `USER_POOL_ID`, `APP_CLIENT_ID` and `AWS_REGION`.
    ///
    /// # Errors
    ///
    /// [`AuthError::Config`] naming the first missing variable.
    pub fn from_env() -> Result<Self, AuthError> {
        Ok(Self {
            user_pool_id: require_env("USER_POOL_ID")?,
            app_client_id: require_env("APP_CLIENT_ID")?,
            region: require_env("AWS_REGION")?,
        })
    }

    /// Well-known JWKS URL for the configured user pool.
    pub fn jwks_url(&self) -> String {
        format!(
            "https://cognito-idp.{}.amazonaws.com/{}/.well-known/jwks.json",
            self.region, self.user_pool_id
        )
    }
}

fn require_env(name: &'static str) -> Result<String, AuthError> {
    env::var(name).map_err(|_| AuthError::Config(name))
}
