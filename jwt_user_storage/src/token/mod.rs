//! Signing and verification of session tokens
//!
//! The session store only depends on the [`TokenService`] contract.
//! [`JsonWebTokenService`] is the default implementation on top of the
//! `jsonwebtoken` crate.

mod errors;
mod jwt;
mod types;

pub use errors::TokenError;
pub use jsonwebtoken::Algorithm;
pub use jwt::JsonWebTokenService;
pub use types::{SigningKey, TokenService};
