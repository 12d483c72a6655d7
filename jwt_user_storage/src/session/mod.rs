mod errors;
mod main;
mod types;

pub use errors::SessionError;
pub use main::{JwtUserStorage, RequestCookies, ResponseCookies};
pub use types::{
    CookieExpiry, CookieOptions, ExpirationFlags, ExpirationTime, LogoutReason, SameSite,
};
