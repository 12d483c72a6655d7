use std::sync::Arc;

use chrono::{DateTime, Utc};
use http::HeaderMap;

use crate::claims::Claims;
use crate::config::StorageConfig;
use crate::identity::{IdentityCodec, UserIdentityCodec};
use crate::session::errors::SessionError;
use crate::session::types::{CookieExpiry, ExpirationFlags, ExpirationTime, LogoutReason};
use crate::token::{JsonWebTokenService, TokenService};
use crate::utils::{gen_random_string, sha256_hex};

use super::cookie::{RequestCookies, ResponseCookies};

/// Random bytes mixed into every `jti` digest
const JTI_ENTROPY_LEN: usize = 16;

/// Per-request user session carried in a signed cookie
///
/// The store reads the inbound cookie lazily, at most once, on the first
/// access. Every setter writes the whole session back to the outbound
/// cookie immediately, and later reads in the same request see the written
/// state without decoding the inbound cookie again.
///
/// ```no_run
/// use std::sync::Arc;
/// use http::HeaderMap;
/// use jwt_user_storage::{JwtUserStorage, StorageConfig, UserIdentity};
///
/// # fn handler(config: Arc<StorageConfig>, request: &HeaderMap) -> Result<HeaderMap, Box<dyn std::error::Error>> {
/// let mut storage = JwtUserStorage::new(config, request, HeaderMap::new());
/// storage.set_identity(Some(&UserIdentity::new("u1", vec!["admin".to_string()])))?;
/// storage.set_authenticated(true)?;
/// let response_headers = storage.into_response();
/// # Ok(response_headers)
/// # }
/// ```
pub struct JwtUserStorage<R = HeaderMap, I = UserIdentityCodec, T = JsonWebTokenService> {
    config: Arc<StorageConfig>,
    codec: I,
    token_service: T,
    inbound_token: Option<String>,
    response: R,
    claims: Claims,
    expiration: Option<ExpirationTime>,
    browser_closed: bool,
    logout_reason: Option<LogoutReason>,
    loaded: bool,
}

impl<R: ResponseCookies> JwtUserStorage<R> {
    pub fn new(config: Arc<StorageConfig>, request: &impl RequestCookies, response: R) -> Self {
        let token_service = JsonWebTokenService::new().with_leeway(config.leeway());
        Self::with_services(config, request, response, UserIdentityCodec, token_service)
    }
}

impl<R, I, T> JwtUserStorage<R, I, T>
where
    R: ResponseCookies,
    I: IdentityCodec,
    T: TokenService,
{
    pub fn with_services(
        config: Arc<StorageConfig>,
        request: &impl RequestCookies,
        response: R,
        codec: I,
        token_service: T,
    ) -> Self {
        let inbound_token = request
            .cookie(&config.cookie().name)
            .filter(|token| !token.is_empty());

        Self {
            expiration: config.default_expiration(),
            config,
            codec,
            token_service,
            inbound_token,
            response,
            claims: Claims::new(),
            browser_closed: false,
            logout_reason: None,
            loaded: false,
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Outbound cookies written so far
    pub fn response(&self) -> &R {
        &self.response
    }

    pub fn into_response(self) -> R {
        self.response
    }

    pub fn is_authenticated(&mut self) -> Result<bool, SessionError> {
        self.load()?;
        Ok(self.claims.is_authenticated().unwrap_or(false))
    }

    pub fn set_authenticated(&mut self, state: bool) -> Result<(), SessionError> {
        self.load_for_write();
        self.claims.set_authenticated(state);
        if !state {
            self.logout_reason = Some(LogoutReason::Manual);
        }
        self.save()
    }

    /// Identity stored in the session, independent of `is_authenticated`.
    pub fn get_identity(&mut self) -> Result<Option<I::Identity>, SessionError> {
        self.load()?;
        if self.claims.is_empty() {
            return Ok(None);
        }
        Ok(self.codec.deserialize(&self.claims))
    }

    /// `Some` merges the identity's fields into the session. `None` replaces
    /// the whole session with an unauthenticated one.
    pub fn set_identity(&mut self, identity: Option<&I::Identity>) -> Result<(), SessionError> {
        match identity {
            Some(identity) => {
                self.load_for_write();
                let fields = self.codec.serialize(identity);
                self.claims.merge(fields);
            }
            None => {
                self.loaded = true;
                self.claims = Claims::new();
                self.claims.set_authenticated(false);
            }
        }
        self.save()
    }

    /// Sets how long the session lives.
    ///
    /// With a time, the token gets an `exp` claim and the cookie the same
    /// expiry. `None` removes `exp`, so the token never expires by itself.
    /// The `exp` written here stays fixed; later saves do not slide it.
    ///
    /// The `browser_closed` flag issues a browser-session cookie. It only
    /// applies to this store instance, so a later request that writes the
    /// session must pass it again or the cookie becomes persistent.
    pub fn set_expiration(
        &mut self,
        time: Option<ExpirationTime>,
        flags: ExpirationFlags,
    ) -> Result<(), SessionError> {
        self.load_for_write();
        self.expiration = time;
        self.browser_closed = flags.browser_closed;

        match time {
            Some(time) => self
                .claims
                .set_expiration(time.resolve(Utc::now()).timestamp()),
            None => self.claims.clear_expiration(),
        }

        self.save()
    }

    /// Why the request has no authenticated session, if known
    pub fn get_logout_reason(&mut self) -> Result<Option<LogoutReason>, SessionError> {
        self.load()?;
        Ok(self.logout_reason)
    }

    /// Raw claims of the current session
    pub fn claims(&mut self) -> Result<&Claims, SessionError> {
        self.load()?;
        Ok(&self.claims)
    }

    #[tracing::instrument(skip_all)]
    fn load(&mut self) -> Result<(), SessionError> {
        if self.loaded {
            return Ok(());
        }
        self.loaded = true;

        let Some(token) = self.inbound_token.take() else {
            tracing::debug!("No session cookie {} in request", self.config.cookie.name);
            self.logout_reason = Some(LogoutReason::InactivityOrBrowserClosed);
            return Ok(());
        };

        match self
            .token_service
            .decode(&token, &self.config.key, &[self.config.algorithm])
        {
            Ok(claims) => {
                tracing::debug!("Loaded session with {} claims", claims.len());
                self.claims = claims;
                Ok(())
            }
            Err(e) if e.is_expired() => {
                tracing::debug!("Session token expired");
                self.logout_reason = Some(LogoutReason::Inactivity);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Rejected session token: {e}");
                Err(e.into())
            }
        }
    }

    fn load_for_write(&mut self) {
        if let Err(e) = self.load() {
            tracing::warn!("Discarding unreadable session before write: {e}");
        }
    }

    #[tracing::instrument(skip_all)]
    fn save(&mut self) -> Result<(), SessionError> {
        self.loaded = true;

        if self.claims.is_empty() {
            tracing::debug!("Session is empty, deleting cookie");
            return self.response.delete_cookie(&self.config.cookie);
        }

        let now = Utc::now();
        if self.config.generate_iat {
            self.claims.set_issued_at(now.timestamp());
        }
        if let (None, Some(time)) = (self.claims.expiration(), self.expiration) {
            self.claims.set_expiration(time.resolve(now).timestamp());
        }

        self.claims.clear_jti();
        if self.config.generate_jti {
            let jti = self.generate_jti()?;
            self.claims.set_jti(jti);
        }

        let (key, algorithm) = (&self.config.key, self.config.algorithm);
        let token = self.token_service.encode(&self.claims, key, algorithm)?;

        let expiry = self.cookie_expiry();
        let options = &self.config.cookie;
        self.response.set_cookie(options, &token, expiry)?;

        tracing::debug!("Saved session cookie, expiry: {expiry:?}");
        Ok(())
    }

    fn generate_jti(&self) -> Result<String, SessionError> {
        let mut payload = serde_json::to_vec(&self.claims)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;
        payload.extend_from_slice(gen_random_string(JTI_ENTROPY_LEN)?.as_bytes());
        Ok(sha256_hex(&payload))
    }

    /// The cookie never outlives the token it carries.
    fn cookie_expiry(&self) -> CookieExpiry {
        if self.browser_closed {
            return CookieExpiry::Session;
        }
        self.claims
            .expiration()
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
            .map_or(CookieExpiry::Session, CookieExpiry::At)
    }
}
