use std::fmt;

use jsonwebtoken::Algorithm;

use crate::claims::Claims;

use super::errors::TokenError;

/// Key material used to sign and verify session tokens.
#[derive(Clone)]
pub enum SigningKey {
    /// Shared secret for the HMAC family (HS256, HS384, HS512).
    Secret(Vec<u8>),
    /// PEM encoded key pair for RSA, ECDSA and EdDSA algorithms.
    Pem {
        private_pem: Vec<u8>,
        public_pem: Vec<u8>,
    },
}

impl SigningKey {
    pub fn secret(secret: impl AsRef<[u8]>) -> Self {
        SigningKey::Secret(secret.as_ref().to_vec())
    }

    pub fn pem(private_pem: impl AsRef<[u8]>, public_pem: impl AsRef<[u8]>) -> Self {
        SigningKey::Pem {
            private_pem: private_pem.as_ref().to_vec(),
            public_pem: public_pem.as_ref().to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SigningKey::Secret(secret) => secret.is_empty(),
            SigningKey::Pem {
                private_pem,
                public_pem,
            } => private_pem.is_empty() || public_pem.is_empty(),
        }
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningKey::Secret(_) => f.debug_tuple("Secret").field(&"[REDACTED]").finish(),
            SigningKey::Pem { .. } => f
                .debug_struct("Pem")
                .field("private_pem", &"[REDACTED]")
                .field("public_pem", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Produces and verifies compact signed tokens carrying a [`Claims`] bag.
pub trait TokenService {
    fn encode(
        &self,
        claims: &Claims,
        key: &SigningKey,
        algorithm: Algorithm,
    ) -> Result<String, TokenError>;

    /// Verifies `token` against `key`, accepting only the `allowed` algorithms.
    fn decode(
        &self,
        token: &str,
        key: &SigningKey,
        allowed: &[Algorithm],
    ) -> Result<Claims, TokenError>;
}
