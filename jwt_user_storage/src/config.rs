//! Configuration for the JWT user storage
//!
//! A [`StorageConfig`] is built once at startup and shared read-only by every
//! per-request [`JwtUserStorage`](crate::JwtUserStorage). Missing or unusable
//! key material is reported by [`StorageConfigBuilder::build`], never later.

use std::env;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use thiserror::Error;

use crate::session::{CookieOptions, ExpirationTime, SameSite};
use crate::token::{JsonWebTokenService, SigningKey, TokenError};

pub const DEFAULT_COOKIE_NAME: &str = "jwt_access_token";
pub const DEFAULT_EXPIRATION: &str = "20 days";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing signing key, set JWT_PRIVATE_KEY")]
    MissingKey,

    #[error("Missing signing algorithm, set JWT_ALGORITHM")]
    MissingAlgorithm,

    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

impl ConfigError {
    fn invalid(name: &str, value: &str) -> Self {
        ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Immutable settings shared by all session stores
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub(crate) key: SigningKey,
    pub(crate) algorithm: Algorithm,
    pub(crate) generate_iat: bool,
    pub(crate) generate_jti: bool,
    pub(crate) default_expiration: Option<ExpirationTime>,
    pub(crate) cookie: CookieOptions,
    pub(crate) leeway: u64,
}

impl StorageConfig {
    pub fn builder() -> StorageConfigBuilder {
        StorageConfigBuilder::new()
    }

    /// Reads the configuration from `JWT_*` environment variables.
    ///
    /// `JWT_PRIVATE_KEY` and `JWT_ALGORITHM` are required. When
    /// `JWT_PUBLIC_KEY` is also set the pair is treated as PEM keys,
    /// otherwise `JWT_PRIVATE_KEY` is a shared HMAC secret.
    pub fn from_env() -> Result<Self, ConfigError> {
        let private_key = env_value("JWT_PRIVATE_KEY").ok_or(ConfigError::MissingKey)?;
        let algorithm = env_value("JWT_ALGORITHM").ok_or(ConfigError::MissingAlgorithm)?;

        let key = match env_value("JWT_PUBLIC_KEY") {
            Some(public_key) => SigningKey::pem(private_key, public_key),
            None => SigningKey::secret(private_key),
        };

        let mut builder = Self::builder().key(key).algorithm_name(algorithm);

        if let Some(value) = env_value("JWT_GENERATE_IAT") {
            builder = builder.generate_iat(parse_bool("JWT_GENERATE_IAT", &value)?);
        }
        if let Some(value) = env_value("JWT_GENERATE_JTI") {
            builder = builder.generate_jti(parse_bool("JWT_GENERATE_JTI", &value)?);
        }
        if let Ok(value) = env::var("JWT_EXPIRATION") {
            builder = builder.default_expiration(parse_expiration(&value)?);
        }
        if let Some(name) = env_value("JWT_COOKIE_NAME") {
            builder = builder.cookie_name(name);
        }
        if let Some(path) = env_value("JWT_COOKIE_PATH") {
            builder = builder.cookie_path(Some(path));
        }
        if let Some(domain) = env_value("JWT_COOKIE_DOMAIN") {
            builder = builder.cookie_domain(Some(domain));
        }
        if let Some(value) = env_value("JWT_COOKIE_SECURE") {
            builder = builder.cookie_secure(parse_bool("JWT_COOKIE_SECURE", &value)?);
        }
        if let Some(value) = env_value("JWT_COOKIE_HTTP_ONLY") {
            builder = builder.cookie_http_only(parse_bool("JWT_COOKIE_HTTP_ONLY", &value)?);
        }
        if let Some(value) = env_value("JWT_COOKIE_SAME_SITE") {
            let same_site = SameSite::from_str(&value)
                .map_err(|_| ConfigError::invalid("JWT_COOKIE_SAME_SITE", &value))?;
            builder = builder.cookie_same_site(Some(same_site));
        }
        if let Some(value) = env_value("JWT_LEEWAY") {
            let leeway = value
                .parse()
                .map_err(|_| ConfigError::invalid("JWT_LEEWAY", &value))?;
            builder = builder.leeway(leeway);
        }

        builder.build()
    }

    pub fn key(&self) -> &SigningKey {
        &self.key
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn generate_iat(&self) -> bool {
        self.generate_iat
    }

    pub fn generate_jti(&self) -> bool {
        self.generate_jti
    }

    pub fn default_expiration(&self) -> Option<ExpirationTime> {
        self.default_expiration
    }

    pub fn cookie(&self) -> &CookieOptions {
        &self.cookie
    }

    pub fn leeway(&self) -> u64 {
        self.leeway
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfigBuilder {
    key: Option<SigningKey>,
    algorithm: Option<Algorithm>,
    algorithm_name: Option<String>,
    generate_iat: bool,
    generate_jti: bool,
    default_expiration: Option<ExpirationTime>,
    cookie: CookieOptions,
    leeway: u64,
}

impl Default for StorageConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageConfigBuilder {
    pub fn new() -> Self {
        Self {
            key: None,
            algorithm: None,
            algorithm_name: None,
            generate_iat: true,
            generate_jti: true,
            default_expiration: Some(ExpirationTime::default_session()),
            cookie: CookieOptions::default(),
            leeway: 0,
        }
    }

    #[must_use]
    pub fn key(mut self, key: SigningKey) -> Self {
        self.key = Some(key);
        self
    }

    #[must_use]
    pub fn secret(self, secret: impl AsRef<[u8]>) -> Self {
        self.key(SigningKey::secret(secret))
    }

    #[must_use]
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self.algorithm_name = None;
        self
    }

    /// Algorithm given by name, e.g. `"HS256"`; resolved in [`build`](Self::build).
    #[must_use]
    pub fn algorithm_name(mut self, name: impl Into<String>) -> Self {
        self.algorithm_name = Some(name.into());
        self.algorithm = None;
        self
    }

    #[must_use]
    pub fn generate_iat(mut self, enabled: bool) -> Self {
        self.generate_iat = enabled;
        self
    }

    #[must_use]
    pub fn generate_jti(mut self, enabled: bool) -> Self {
        self.generate_jti = enabled;
        self
    }

    /// `None` issues tokens without `exp` unless the store sets one.
    #[must_use]
    pub fn default_expiration(mut self, expiration: Option<ExpirationTime>) -> Self {
        self.default_expiration = expiration;
        self
    }

    #[must_use]
    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie.name = name.into();
        self
    }

    #[must_use]
    pub fn cookie_path(mut self, path: Option<String>) -> Self {
        self.cookie.path = path;
        self
    }

    #[must_use]
    pub fn cookie_domain(mut self, domain: Option<String>) -> Self {
        self.cookie.domain = domain;
        self
    }

    #[must_use]
    pub fn cookie_secure(mut self, secure: bool) -> Self {
        self.cookie.secure = secure;
        self
    }

    #[must_use]
    pub fn cookie_http_only(mut self, http_only: bool) -> Self {
        self.cookie.http_only = http_only;
        self
    }

    #[must_use]
    pub fn cookie_same_site(mut self, same_site: Option<SameSite>) -> Self {
        self.cookie.same_site = same_site;
        self
    }

    #[must_use]
    pub fn leeway(mut self, leeway: u64) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn build(self) -> Result<StorageConfig, ConfigError> {
        let key = self
            .key
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingKey)?;

        let algorithm = match (self.algorithm, self.algorithm_name) {
            (Some(algorithm), _) => algorithm,
            (None, Some(name)) => Algorithm::from_str(name.trim())
                .map_err(|_| ConfigError::UnknownAlgorithm(name.clone()))?,
            (None, None) => return Err(ConfigError::MissingAlgorithm),
        };

        // Parse the key material now so a bad key fails at startup.
        JsonWebTokenService::encoding_key(&key, algorithm).map_err(invalid_key)?;
        JsonWebTokenService::decoding_key(&key, algorithm).map_err(invalid_key)?;

        let cookie_name = self.cookie.name.trim();
        if cookie_name.is_empty() || cookie_name.contains([';', '=', ',', ' ']) {
            return Err(ConfigError::invalid("cookie name", &self.cookie.name));
        }

        tracing::debug!(
            "JWT user storage configured: algorithm={algorithm:?}, cookie={}",
            self.cookie.name
        );

        Ok(StorageConfig {
            key,
            algorithm,
            generate_iat: self.generate_iat,
            generate_jti: self.generate_jti,
            default_expiration: self.default_expiration,
            cookie: self.cookie,
            leeway: self.leeway,
        })
    }
}

fn invalid_key(err: TokenError) -> ConfigError {
    match err {
        TokenError::Key(msg) => ConfigError::InvalidKey(msg),
        other => ConfigError::InvalidKey(other.to_string()),
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(name, value)),
    }
}

/// Empty, `"0"`, `"none"` and `"false"` disable the default expiration.
fn parse_expiration(value: &str) -> Result<Option<ExpirationTime>, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "" | "0" | "none" | "false" => Ok(None),
        _ => ExpirationTime::from_str(value).map(Some),
    }
}
