//! Shared fixtures for unit tests across the crate

use std::sync::Arc;

use http::header::{COOKIE, HeaderMap, HeaderValue, SET_COOKIE};

use crate::claims::Claims;
use crate::config::{StorageConfig, StorageConfigBuilder};
use crate::token::{Algorithm, JsonWebTokenService, TokenService};

pub(crate) const TEST_SECRET: &str = "unit-test-secret-with-enough-length-0001";

fn base_builder() -> StorageConfigBuilder {
    StorageConfig::builder()
        .secret(TEST_SECRET)
        .algorithm(Algorithm::HS256)
}

pub(crate) fn test_config() -> Arc<StorageConfig> {
    test_config_with(|builder| builder)
}

/// HS256 config with `TEST_SECRET`, adjusted by `customize`
pub(crate) fn test_config_with(
    customize: impl FnOnce(StorageConfigBuilder) -> StorageConfigBuilder,
) -> Arc<StorageConfig> {
    Arc::new(
        customize(base_builder())
            .build()
            .expect("test config should be valid"),
    )
}

/// Request headers carrying `token` in the session cookie
pub(crate) fn request_with_token(config: &StorageConfig, token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_str(&format!("{}={token}", config.cookie().name))
            .expect("cookie header should be valid"),
    );
    headers
}

/// Full `Set-Cookie` value written for the session cookie, if any
pub(crate) fn set_cookie_header(config: &StorageConfig, headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{}=", config.cookie().name);
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&prefix))
        .map(str::to_string)
}

/// Token written to the session cookie, `None` when the cookie was deleted
pub(crate) fn token_from_response(config: &StorageConfig, headers: &HeaderMap) -> Option<String> {
    let header = set_cookie_header(config, headers)?;
    let pair = header.split(';').next()?;
    let (_, value) = pair.split_once('=')?;
    (!value.is_empty()).then(|| value.to_string())
}

pub(crate) fn encode_claims(config: &StorageConfig, claims: &Claims) -> String {
    JsonWebTokenService::new()
        .encode(claims, config.key(), config.algorithm())
        .expect("test claims should encode")
}

pub(crate) fn decode_claims(config: &StorageConfig, token: &str) -> Claims {
    JsonWebTokenService::new()
        .decode(token, config.key(), &[config.algorithm()])
        .expect("test token should decode")
}
