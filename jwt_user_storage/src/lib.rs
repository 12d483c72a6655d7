//! jwt_user_storage - Stateless user sessions carried in a signed JWT cookie
//!
//! Instead of keeping sessions on the server, the whole session (authentication
//! flag, user identity, expiration) is encoded into a signed token that lives
//! in a single cookie. [`JwtUserStorage`] loads it lazily from the request,
//! and every change writes a fresh token to the response.

mod claims;
mod config;
mod identity;
mod session;
mod token;
mod utils;

#[cfg(test)]
mod test_utils;

pub use claims::{ClaimValue, Claims, EXPIRATION, IS_AUTHENTICATED, ISSUED_AT, TOKEN_ID};

pub use config::{
    ConfigError, DEFAULT_COOKIE_NAME, DEFAULT_EXPIRATION, StorageConfig, StorageConfigBuilder,
};

pub use identity::{IdentityCodec, ROLES_CLAIM, UID_CLAIM, UserIdentity, UserIdentityCodec};

pub use session::{
    CookieExpiry, CookieOptions, ExpirationFlags, ExpirationTime, JwtUserStorage, LogoutReason,
    RequestCookies, ResponseCookies, SameSite, SessionError,
};

pub use token::{Algorithm, JsonWebTokenService, SigningKey, TokenError, TokenService};

pub use utils::UtilError;
