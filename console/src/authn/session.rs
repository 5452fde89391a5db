//! Session authentication state

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::errors::ConsoleError;

/// Claims read from a backend access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (username)
    pub sub: String,

    /// Expiration timestamp
    #[serde(default)]
    pub exp: Option<i64>,
}

/// A bearer token for the backend
#[derive(Debug, Clone)]
pub struct AccessToken {
    raw: SecretString,
    claims: Option<AccessTokenClaims>,
}

impl AccessToken {
    /// Wrap a raw token.
    ///
    /// JWTs have their claims decoded (the signature is the backend's
    /// business); anything else is kept as an opaque token with no expiry.
    pub fn from_raw(raw: String) -> Result<Self, ConsoleError> {
        let raw = raw.trim().to_string();
        if raw.is_empty() {
            return Err(ConsoleError::TokenError("Token is empty".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        let claims = match decode::<AccessTokenClaims>(&raw, &DecodingKey::from_secret(b""), &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!("Token is not a decodable JWT, treating as opaque: {}", e);
                None
            }
        };

        Ok(Self {
            raw: SecretString::from(raw),
            claims,
        })
    }

    pub fn expose(&self) -> &str {
        self.raw.expose_secret()
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims.as_ref().map(|c| c.sub.as_str())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims
            .as_ref()
            .and_then(|c| c.exp)
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at().is_some_and(|exp| exp <= Utc::now())
    }
}

/// Session trait for testability
#[async_trait]
pub trait SessionExt: Send + Sync {
    /// Whether requests can currently be authenticated
    async fn is_authenticated(&self) -> bool;

    /// The bearer token to send with backend requests
    async fn bearer_token(&self) -> Result<String, ConsoleError>;
}

/// In-memory session; nothing is persisted
pub struct Session {
    token: RwLock<Option<AccessToken>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            token: RwLock::new(None),
        }
    }

    pub fn with_token(token: AccessToken) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }

    pub async fn sign_in(&self, raw: String) -> Result<Option<String>, ConsoleError> {
        let token = AccessToken::from_raw(raw)?;
        if token.is_expired() {
            return Err(ConsoleError::TokenError("Token is expired".to_string()));
        }
        let subject = token.subject().map(str::to_string);
        info!("Signed in as {}", subject.as_deref().unwrap_or("<opaque token>"));

        let mut current = self.token.write().await;
        *current = Some(token);
        Ok(subject)
    }

    pub async fn sign_out(&self) {
        let mut current = self.token.write().await;
        if current.take().is_some() {
            info!("Signed out");
        }
    }

    pub async fn subject(&self) -> Option<String> {
        let current = self.token.read().await;
        current.as_ref().and_then(|t| t.subject().map(str::to_string))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionExt for Session {
    async fn is_authenticated(&self) -> bool {
        let current = self.token.read().await;
        current.as_ref().is_some_and(|t| !t.is_expired())
    }

    async fn bearer_token(&self) -> Result<String, ConsoleError> {
        let current = self.token.read().await;
        match current.as_ref() {
            Some(token) if !token.is_expired() => Ok(token.expose().to_string()),
            _ => Err(ConsoleError::Unauthenticated),
        }
    }
}
