// src/drive/auth.rs
// =============================================================================
// Credential provider: turns a Google service-account key file into OAuth2
// bearer tokens for the Drive API.
//
// How the service-account flow works:
// 1. Read the JSON key (client_email, private_key, token_uri)
// 2. Build a JWT assertion {iss, scope, aud, iat, exp} and sign it RS256
// 3. POST it to token_uri with the jwt-bearer grant type
// 4. Use the returned access_token until shortly before it expires
//
// A static token can be supplied instead (e.g. minted by gcloud) which skips
// all of the above.
// =============================================================================

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::Client;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::DownloadScope;
use crate::error::CredentialError;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
// Refresh this long before the token actually expires
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, CredentialError>;
}

/// A token obtained out of band.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, CredentialError> {
        Ok(self.0.clone())
    }
}

/// The fields of a service-account key file we actually use.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, CredentialError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CredentialError::ReadKeyFile {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| CredentialError::ParseKeyFile {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

pub struct ServiceAccountAuth {
    client: Client,
    key: ServiceAccountKey,
    signing_key: SigningKey<Sha256>,
    scope: DownloadScope,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// Loads and validates the key file. Any failure here is fatal for the run.
    pub fn from_file(
        client: Client,
        path: &Path,
        scope: DownloadScope,
    ) -> Result<Self, CredentialError> {
        let key = ServiceAccountKey::from_file(path)?;
        Self::new(client, key, scope)
    }

    pub fn new(
        client: Client,
        key: ServiceAccountKey,
        scope: DownloadScope,
    ) -> Result<Self, CredentialError> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(&key.private_key)
            .map_err(|e| CredentialError::PrivateKey(e.to_string()))?;

        Ok(Self {
            client,
            key,
            signing_key: SigningKey::<Sha256>::new(private_key),
            scope,
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Builds the signed `header.claims.signature` assertion.
    fn assertion(&self, issued_at: u64) -> Result<String, CredentialError> {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let claims = Claims {
            iss: &self.key.client_email,
            scope: self.scope.oauth_scope(),
            aud: &self.key.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };
        let claims = serde_json::to_vec(&claims)
            .map_err(|e| CredentialError::PrivateKey(e.to_string()))?;

        let signing_input = format!("{}.{}", header, URL_SAFE_NO_PAD.encode(claims));
        let signature = self.signing_key.sign(signing_input.as_bytes());

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        ))
    }

    async fn request_token(&self) -> Result<CachedToken, CredentialError> {
        let issued_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let assertion = self.assertion(issued_at)?;

        debug!(client_email = %self.key.client_email, "requesting access token");

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CredentialError::TokenRejected { status, body });
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS));

        Ok(CachedToken {
            token: token.access_token,
            expires_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, CredentialError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.request_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a JWT?
//    - Three base64url chunks joined by dots: header.claims.signature
//    - The signature proves the claims came from whoever holds the private key
//
// 2. Why a tokio Mutex around the cached token?
//    - access_token() takes &self but must update the cache
//    - A tokio Mutex can be held across .await (the token request)
// -----------------------------------------------------------------------------
