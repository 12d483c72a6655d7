use thiserror::Error;

use crate::token::TokenError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// Inbound token rejected for a reason other than expiry, or encoding failed
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}
