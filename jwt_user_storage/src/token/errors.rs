use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token is not valid yet")]
    NotYetValid,

    #[error("Token expired")]
    Expired,

    #[error("Key error: {0}")]
    Key(String),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl TokenError {
    /// True for the only failure the session store recovers from locally.
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::Expired)
    }
}

impl From<JwtError> for TokenError {
    fn from(err: JwtError) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm => {
                TokenError::Malformed("Algorithm not allowed".to_string())
            }
            ErrorKind::InvalidKeyFormat
            | ErrorKind::InvalidRsaKey(_)
            | ErrorKind::InvalidEcdsaKey => TokenError::Key(err.to_string()),
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}
