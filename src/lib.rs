//! # Cognito Request Authorizer
//!
//! JWT bearer-token authorization for API gateway invocations, backed by an
//! Amazon Cognito user pool. Given an invocation event carrying a token and
//! a method ARN, the authorizer verifies the token against the pool's
//! published JWKS and answers with an IAM-style Allow or Deny policy
//! document. Authorization failures never escape as errors: every failure
//! mode collapses into an explicit Deny with a diagnostic message in the
//! response context.
//!
//! ## Architecture
//!
//! - [`event`] - Invocation events and bearer token extraction
//! - [`jwks`] - Key set fetching and TTL caching
//! - [`verifier`] - The six-step token verification pipeline
//! - [`policy`] - Allow/Deny policy documents
//! - [`authorizer`] - The entry point wiring extract, verify, decide
//! - [`config`] - Environment configuration
//! - [`clock`] - Injectable time source
//! - [`error`] - The pipeline error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cognito_authorizer::{Authorizer, AuthorizerRequest, Effect};
//!
//! # tokio_test::block_on(async {
//! // Reads USER_POOL_ID, APP_CLIENT_ID and AWS_REGION; fails fast when one
//! // is missing.
//! let authorizer = Authorizer::from_env()?;
//!
//! let event: AuthorizerRequest = serde_json::from_str(
//!     r#"{
//!         "authorizationToken": "Bearer eyJraWQiOi...",
//!         "methodArn": "arn:aws:execute-api:us-east-1:123456789012:api/prod/GET/items"
//!     }"#,
//! )?;
//!
//! let decision = authorizer.authorize(&event).await;
//! if decision.effect() == Effect::Allow {
//!     println!("allowed for {}", decision.principal_id);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

// Submodules
pub mod authorizer;
pub mod claims;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod jwks;
pub mod policy;
pub mod verifier;

pub use authorizer::Authorizer;
pub use claims::TokenClaims;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AuthorizerConfig;
pub use error::AuthError;
pub use event::AuthorizerRequest;
pub use jwks::{HttpKeyFetcher, KEY_SET_TTL, KeyFetcher, KeySetCache};
pub use policy::{AuthorizerResponse, Effect, PolicyDocument, PolicyStatement};
pub use verifier::TokenVerifier;
