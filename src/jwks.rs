//! Key set fetching and caching.
//!
//! The user pool publishes its signing keys as a JWKS document. The cache
//! holds one fetched set for a fixed TTL; once the TTL elapses the next
//! caller must fetch a fresh set, and a failed fetch is surfaced rather than
//! served stale. Concurrent callers may each fetch the same document: the
//! last write wins and no fetch lock is held, since every fetch of one
//! pool's JWKS returns an interchangeable set.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::error::AuthError;

/// How long a fetched key set stays valid.
pub const KEY_SET_TTL: Duration = Duration::from_secs(3600);

/// Bound on the JWKS HTTP round-trip.
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of key set documents.
///
/// Production wiring uses [`HttpKeyFetcher`]; tests inject canned sets and
/// failures.
#[async_trait]
pub trait KeyFetcher: fmt::Debug + Send + Sync {
    /// Fetch a fresh key set.
    async fn fetch_keys(&self) -> Result<JwkSet, AuthError>;
}

/// Fetches the key set over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpKeyFetcher {
    jwks_url: String,
    http_client: reqwest::Client,
}

impl HttpKeyFetcher {
    /// Create a fetcher for the given JWKS URL.
    ///
    /// The URL must use HTTPS; plain HTTP is accepted only for loopback
    /// addresses (local test servers).
    pub fn new(jwks_url: String) -> Self {
        Self {
            jwks_url,
            http_client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// The JWKS URL this fetcher reads.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }
}

#[async_trait]
impl KeyFetcher for HttpKeyFetcher {
    async fn fetch_keys(&self) -> Result<JwkSet, AuthError> {
        if !(self.jwks_url.starts_with("https://")
            || self.jwks_url.starts_with("http://localhost")
            || self.jwks_url.starts_with("http://127.0.0.1"))
        {
            return Err(AuthError::Fetch(
                "key set endpoint must use HTTPS (plain HTTP is allowed only for loopback)"
                    .to_string(),
            ));
        }

        info!(jwks_url = %self.jwks_url, "Fetching key set");

        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                error!(jwks_url = %self.jwks_url, error = %e, "Key set fetch failed");
                AuthError::Fetch(format!("key set fetch failed: {e}"))
            })?;

        if !response.status().is_success() {
            error!(
                jwks_url = %self.jwks_url,
                status = %response.status(),
                "Key set endpoint returned error status"
            );
            return Err(AuthError::Fetch(format!(
                "key set endpoint returned status {}",
                response.status()
            )));
        }

        let keys: JwkSet = response.json().await.map_err(|e| {
            error!(jwks_url = %self.jwks_url, error = %e, "Failed to parse key set JSON");
            AuthError::Fetch(format!("invalid key set format: {e}"))
        })?;

        info!(
            jwks_url = %self.jwks_url,
            key_count = keys.keys.len(),
            "Fetched key set"
        );

        Ok(keys)
    }
}

/// One cached key set with its expiry instant.
#[derive(Debug, Clone)]
struct CachedKeys {
    keys: JwkSet,
    expires_at: SystemTime,
}

/// TTL cache over a [`KeyFetcher`].
///
/// # Example
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use cognito_authorizer::{HttpKeyFetcher, KeySetCache, SystemClock};
/// # tokio_test::block_on(async {
/// let fetcher = Arc::new(HttpKeyFetcher::new(
///     "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_Example/.well-known/jwks.json"
///         .to_string(),
/// ));
/// let cache = KeySetCache::new(fetcher, Arc::new(SystemClock));
///
/// // Fetched once, then served from cache for an hour
/// let keys = cache.get_keys().await?;
/// if let Some(key) = keys.find("key-id-123") {
///     println!("resolved signing key {:?}", key.common.key_id);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct KeySetCache {
    cache: Arc<RwLock<Option<CachedKeys>>>,
    fetcher: Arc<dyn KeyFetcher>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl KeySetCache {
    /// Create a cache over `fetcher` with the fixed one hour TTL.
    pub fn new(fetcher: Arc<dyn KeyFetcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(None)),
            fetcher,
            clock,
            ttl: KEY_SET_TTL,
        }
    }

    /// Get the current key set, served from cache while unexpired.
    ///
    /// # Errors
    ///
    /// [`AuthError::Fetch`] when the cache is empty or expired and the fetch
    /// fails. The cache is left untouched in that case; expired keys are
    /// never served.
    pub async fn get_keys(&self) -> Result<JwkSet, AuthError> {
        let now = self.clock.now();

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref()
                && now < cached.expires_at
            {
                debug!("Using cached key set");
                return Ok(cached.keys.clone());
            }
        }

        // Expired or empty. Concurrent callers may all reach this point and
        // fetch the same document; the last write wins.
        let keys = self.fetcher.fetch_keys().await?;

        let mut cache = self.cache.write().await;
        *cache = Some(CachedKeys {
            keys: keys.clone(),
            expires_at: self.clock.now() + self.ttl,
        });

        Ok(keys)
    }

    /// Resolve one key from the current set by its kid.
    ///
    /// # Errors
    ///
    /// [`AuthError::KeyNotFound`] when no key matches; fetch failures
    /// propagate as [`AuthError::Fetch`].
    pub async fn find_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        let keys = self.get_keys().await?;
        keys.find(kid)
            .cloned()
            .ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))
    }

    /// Drop the cached set; the next call fetches fresh.
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
        debug!("Key set cache cleared");
    }
}
