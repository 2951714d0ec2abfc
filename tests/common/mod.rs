//! Shared helpers for the integration tests: a mock JWKS endpoint, RSA
//! keypair generation and token minting.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use cognito_authorizer::{
    Authorizer, Clock, HttpKeyFetcher, KeySetCache, TokenVerifier,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_KID: &str = "test-key-1";
pub const TEST_CLIENT_ID: &str = "test-app-client";

const JWKS_PATH: &str = "/test-pool/.well-known/jwks.json";

/// RSA keypair used to sign test tokens and publish the matching JWK.
pub struct TestKeypair {
    pub private_pem: Vec<u8>,
    pub modulus_b64: String,
    pub exponent_b64: String,
}

fn generate_keypair() -> TestKeypair {
    let mut rng = rand::thread_rng();
    let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("Failed to generate RSA key");
    let public_key = private_key.to_public_key();

    let private_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .expect("Failed to encode private key")
        .as_bytes()
        .to_vec();

    TestKeypair {
        private_pem,
        modulus_b64: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
        exponent_b64: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
    }
}

/// The keypair shared by the whole test binary.
pub fn test_keypair() -> &'static TestKeypair {
    static KEYPAIR: OnceLock<TestKeypair> = OnceLock::new();
    KEYPAIR.get_or_init(generate_keypair)
}

/// The shared public key as a JWK entry under [`TEST_KID`].
pub fn test_jwk() -> serde_json::Value {
    let keypair = test_keypair();
    json!({
        "kty": "RSA",
        "kid": TEST_KID,
        "use": "sig",
        "alg": "RS256",
        "n": keypair.modulus_b64,
        "e": keypair.exponent_b64,
    })
}

/// Mock server publishing a JWKS document at the pool's well-known path.
pub struct MockJwksServer {
    pub server: MockServer,
    pub jwks_url: String,
}

impl MockJwksServer {
    /// Start a server with the shared test key published.
    pub async fn start() -> Self {
        Self::start_with_keys(vec![test_jwk()]).await
    }

    /// Start a server answering the well-known path with `keys`.
    pub async fn start_with_keys(keys: Vec<serde_json::Value>) -> Self {
        let server = Self::start_unmounted().await;
        server.mock_jwks(keys).await;
        server
    }

    /// Start a server with no JWKS route mounted.
    pub async fn start_unmounted() -> Self {
        let server = MockServer::start().await;
        let jwks_url = format!("{}{}", server.uri(), JWKS_PATH);
        Self { server, jwks_url }
    }

    /// Publish `keys` at the well-known path.
    pub async fn mock_jwks(&self, keys: Vec<serde_json::Value>) {
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": keys })))
            .mount(&self.server)
            .await;
    }

    /// Make the well-known path answer with an error status.
    pub async fn mock_jwks_failure(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Number of requests the server has received.
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }
}

/// Verifier wired against `jwks_url` with the given clock, expecting
/// [`TEST_CLIENT_ID`].
pub fn test_verifier(jwks_url: &str, clock: Arc<dyn Clock>) -> TokenVerifier {
    let fetcher = Arc::new(HttpKeyFetcher::new(jwks_url.to_string()));
    let key_cache = KeySetCache::new(fetcher, Arc::clone(&clock));
    TokenVerifier::new(key_cache, TEST_CLIENT_ID, clock)
}

/// Authorizer wired against `jwks_url` with the given clock.
pub fn test_authorizer(jwks_url: &str, clock: Arc<dyn Clock>) -> Authorizer {
    Authorizer::with_verifier(test_verifier(jwks_url, Arc::clone(&clock)), clock)
}

/// Current Unix timestamp.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}

/// Sign `claims` with the shared test key under `kid`.
pub fn mint_token(claims: &serde_json::Value, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    mint_token_with_header(claims, &header)
}

/// Sign `claims` with the shared test key and an explicit header.
pub fn mint_token_with_header(claims: &serde_json::Value, header: &Header) -> String {
    let key = EncodingKey::from_rsa_pem(&test_keypair().private_pem).expect("Invalid RSA key");
    encode(header, claims, &key).expect("Failed to encode test JWT")
}

/// Id-token style claims: `aud` plus `cognito:username`.
pub fn id_token_claims(sub: &str, username: &str, exp: u64) -> serde_json::Value {
    json!({
        "sub": sub,
        "cognito:username": username,
        "aud": TEST_CLIENT_ID,
        "exp": exp,
        "iat": current_timestamp(),
        "token_use": "id",
    })
}

/// Access-token style claims: `client_id` plus `username`.
pub fn access_token_claims(sub: &str, username: &str, exp: u64) -> serde_json::Value {
    json!({
        "sub": sub,
        "username": username,
        "client_id": TEST_CLIENT_ID,
        "exp": exp,
        "iat": current_timestamp(),
        "token_use": "access",
    })
}
