//! Application settings loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

use super::constants::{
    DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES, DEFAULT_APP_NAME, DEFAULT_AWS_REGION,
    DEFAULT_BUCKET_NAME, DEFAULT_CORS_ORIGINS, DEFAULT_DATABASE_URL, DEFAULT_JWT_ALGORITHM,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_STORAGE_PATH, DEVELOPMENT_JWT_SECRET,
    MAX_ACCESS_TOKEN_EXPIRE_MINUTES, MIN_JWT_SECRET_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// Token signing settings, fixed for the lifetime of the process.
#[derive(Clone)]
pub struct AuthConfig {
    secret: String,
    pub algorithm: Algorithm,
    pub access_token_ttl_minutes: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("access_token_ttl_minutes", &self.access_token_ttl_minutes)
            .finish()
    }
}

impl AuthConfig {
    /// Build and validate token settings.
    ///
    /// # Errors
    /// Returns a configuration error if the secret is shorter than
    /// `MIN_JWT_SECRET_LENGTH`, the algorithm is not an HMAC variant, or
    /// the ttl is outside `1..=MAX_ACCESS_TOKEN_EXPIRE_MINUTES`.
    pub fn new(
        secret: impl Into<String>,
        algorithm: &str,
        access_token_ttl_minutes: i64,
    ) -> AppResult<Self> {
        let secret = secret.into();
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::configuration(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        let algorithm = Algorithm::from_str(algorithm).map_err(|_| {
            AppError::configuration(format!("Unknown JWT algorithm: {}", algorithm))
        })?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(AppError::configuration(format!(
                "JWT algorithm {:?} requires a key pair; only HS256, HS384 and HS512 are supported",
                algorithm
            )));
        }

        if !(1..=MAX_ACCESS_TOKEN_EXPIRE_MINUTES).contains(&access_token_ttl_minutes) {
            return Err(AppError::configuration(format!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and {}",
                MAX_ACCESS_TOKEN_EXPIRE_MINUTES
            )));
        }

        Ok(Self {
            secret,
            algorithm,
            access_token_ttl_minutes,
        })
    }

    /// Get secret bytes for token signing/verification.
    pub fn secret_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

/// Object storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Local(PathBuf),
    S3,
}

/// Object storage settings.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (e.g. localstack); changes how file URLs are built
    pub endpoint_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            bucket: DEFAULT_BUCKET_NAME.to_string(),
            region: DEFAULT_AWS_REGION.to_string(),
            endpoint_url: None,
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub app_name: String,
    pub app_version: String,
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub auth: AuthConfig,
    /// Lower-case emails and usernames before lookup and insert
    pub case_insensitive_identities: bool,
    pub cors_origins: Vec<String>,
    pub storage: StorageConfig,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_name", &self.app_name)
            .field("app_version", &self.app_version)
            .field("database_url", &"[REDACTED]")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("auth", &self.auth)
            .field("case_insensitive_identities", &self.case_insensitive_identities)
            .field("cors_origins", &self.cors_origins)
            .field("storage", &self.storage)
            .finish()
    }
}

impl Default for Config {
    /// Development defaults. The signing secret is the insecure development
    /// secret; never use this in production.
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            auth: AuthConfig {
                secret: DEVELOPMENT_JWT_SECRET.to_string(),
                algorithm: Algorithm::HS256,
                access_token_ttl_minutes: DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
            },
            case_insensitive_identities: false,
            cors_origins: parse_list(DEFAULT_CORS_ORIGINS),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails if JWT_SECRET is missing in a release build, or if any token
    /// or storage setting is invalid.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                DEVELOPMENT_JWT_SECRET.to_string()
            }
            Err(_) => {
                return Err(AppError::configuration(
                    "JWT_SECRET environment variable must be set in production",
                ))
            }
        };

        let auth = AuthConfig::new(
            jwt_secret,
            &env::var("JWT_ALGORITHM").unwrap_or_else(|_| DEFAULT_JWT_ALGORITHM.to_string()),
            parse_var("ACCESS_TOKEN_EXPIRE_MINUTES").unwrap_or(DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES),
        )?;

        Ok(Self {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| DEFAULT_APP_NAME.to_string()),
            app_version: env::var("APP_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_var("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            auth,
            case_insensitive_identities: parse_var("IDENTITY_CASE_INSENSITIVE").unwrap_or(false),
            cors_origins: parse_list(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
            ),
            storage: StorageConfig {
                backend: storage_backend_from_env()?,
                bucket: env::var("S3_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET_NAME.to_string()),
                region: env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_AWS_REGION.to_string()),
                endpoint_url: env::var("AWS_ENDPOINT_URL").ok(),
            },
        })
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn storage_backend_from_env() -> AppResult<StorageBackend> {
    let backend = env::var("STORAGE_BACKEND").unwrap_or_else(|_| "memory".to_string());
    match backend.to_lowercase().as_str() {
        "memory" => Ok(StorageBackend::Memory),
        "local" => Ok(StorageBackend::Local(PathBuf::from(
            env::var("STORAGE_PATH").unwrap_or_else(|_| DEFAULT_STORAGE_PATH.to_string()),
        ))),
        "s3" => Ok(StorageBackend::S3),
        other => Err(AppError::configuration(format!(
            "Unknown STORAGE_BACKEND: {}",
            other
        ))),
    }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-testing-only-32chars";

    #[test]
    fn test_auth_config_accepts_hmac_algorithms() {
        for alg in ["HS256", "HS384", "HS512"] {
            assert!(AuthConfig::new(SECRET, alg, 30).is_ok(), "{alg} should be accepted");
        }
    }

    #[test]
    fn test_auth_config_rejects_asymmetric_algorithm() {
        let result = AuthConfig::new(SECRET, "RS256", 30);
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_auth_config_rejects_unknown_algorithm() {
        assert!(AuthConfig::new(SECRET, "none", 30).is_err());
    }

    #[test]
    fn test_auth_config_rejects_short_secret() {
        assert!(AuthConfig::new("too-short", "HS256", 30).is_err());
    }

    #[test]
    fn test_auth_config_rejects_non_positive_ttl() {
        assert!(AuthConfig::new(SECRET, "HS256", 0).is_err());
    }

    #[test]
    fn test_auth_config_rejects_oversized_ttl() {
        assert!(AuthConfig::new(SECRET, "HS256", MAX_ACCESS_TOKEN_EXPIRE_MINUTES).is_ok());
        assert!(AuthConfig::new(SECRET, "HS256", MAX_ACCESS_TOKEN_EXPIRE_MINUTES + 1).is_err());
        assert!(AuthConfig::new(SECRET, "HS256", 1_000_000_000_000).is_err());
        assert!(AuthConfig::new(SECRET, "HS256", i64::MAX).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config::default();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains(DEVELOPMENT_JWT_SECRET));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_parse_list_trims_and_skips_empty() {
        assert_eq!(
            parse_list(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
