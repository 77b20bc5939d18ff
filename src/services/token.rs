//! Session token codec.
//!
//! Stateless signed tokens: the secret and algorithm are fixed at
//! construction and never change for the lifetime of the codec.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{AuthConfig, MAX_ACCESS_TOKEN_EXPIRE_MINUTES};

/// Claim names owned by the codec; extra claims cannot override them.
const RESERVED_CLAIMS: &[&str] = &["sub", "user_id", "exp", "iat"];

/// Token decoding failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

/// Subject data carried by a token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectClaims {
    /// Account email
    pub sub: Option<String>,
    pub user_id: Option<Uuid>,
    pub extra: Map<String, Value>,
}

impl SubjectClaims {
    pub fn for_account(email: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            sub: Some(email.into()),
            user_id: Some(user_id),
            extra: Map::new(),
        }
    }
}

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub exp: i64,
    pub iat: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Issues and validates signed, time-limited session tokens.
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    default_ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            algorithm: config.algorithm,
            encoding_key: EncodingKey::from_secret(config.secret_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_bytes()),
            default_ttl: Duration::minutes(
                config
                    .access_token_ttl_minutes
                    .clamp(1, MAX_ACCESS_TOKEN_EXPIRE_MINUTES),
            ),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Sign a token for `subject`, expiring after `ttl` (or the configured default).
    pub fn issue(
        &self,
        subject: &SubjectClaims,
        ttl: Option<Duration>,
    ) -> Result<IssuedToken, TokenError> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Encoding("token expiry out of range".to_string()))?;

        let mut extra = subject.extra.clone();
        extra.retain(|key, _| !RESERVED_CLAIMS.contains(&key.as_str()));

        let claims = Claims {
            sub: subject.sub.clone(),
            user_id: subject.user_id,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            extra,
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at,
            expires_in: ttl.num_seconds(),
        })
    }

    /// Verify signature and algorithm, then expiry with zero leeway.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
