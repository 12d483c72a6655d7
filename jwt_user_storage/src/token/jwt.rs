use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::{Claims, EXPIRATION};

use super::errors::TokenError;
use super::types::{SigningKey, TokenService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
    Ed,
}

fn key_family(algorithm: Algorithm) -> KeyFamily {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => KeyFamily::Hmac,
        Algorithm::ES256 | Algorithm::ES384 => KeyFamily::Ec,
        Algorithm::EdDSA => KeyFamily::Ed,
        _ => KeyFamily::Rsa,
    }
}

/// [`TokenService`] backed by the `jsonwebtoken` crate
///
/// `exp` is optional in session tokens: it is enforced when present and
/// ignored otherwise. `nbf` and `iat` in the future make a token
/// [`TokenError::NotYetValid`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWebTokenService {
    leeway: u64,
}

impl JsonWebTokenService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock skew tolerance in seconds for `exp`, `nbf` and `iat`.
    #[must_use]
    pub fn with_leeway(mut self, leeway: u64) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn leeway(&self) -> u64 {
        self.leeway
    }

    pub(crate) fn encoding_key(
        key: &SigningKey,
        algorithm: Algorithm,
    ) -> Result<EncodingKey, TokenError> {
        match (key_family(algorithm), key) {
            (KeyFamily::Hmac, SigningKey::Secret(secret)) => Ok(EncodingKey::from_secret(secret)),
            (KeyFamily::Rsa, SigningKey::Pem { private_pem, .. }) => {
                Ok(EncodingKey::from_rsa_pem(private_pem)?)
            }
            (KeyFamily::Ec, SigningKey::Pem { private_pem, .. }) => {
                Ok(EncodingKey::from_ec_pem(private_pem)?)
            }
            (KeyFamily::Ed, SigningKey::Pem { private_pem, .. }) => {
                Ok(EncodingKey::from_ed_pem(private_pem)?)
            }
            (family, _) => Err(mismatch(family, algorithm)),
        }
    }

    pub(crate) fn decoding_key(
        key: &SigningKey,
        algorithm: Algorithm,
    ) -> Result<DecodingKey, TokenError> {
        match (key_family(algorithm), key) {
            (KeyFamily::Hmac, SigningKey::Secret(secret)) => Ok(DecodingKey::from_secret(secret)),
            (KeyFamily::Rsa, SigningKey::Pem { public_pem, .. }) => {
                Ok(DecodingKey::from_rsa_pem(public_pem)?)
            }
            (KeyFamily::Ec, SigningKey::Pem { public_pem, .. }) => {
                Ok(DecodingKey::from_ec_pem(public_pem)?)
            }
            (KeyFamily::Ed, SigningKey::Pem { public_pem, .. }) => {
                Ok(DecodingKey::from_ed_pem(public_pem)?)
            }
            (family, _) => Err(mismatch(family, algorithm)),
        }
    }
}

fn mismatch(family: KeyFamily, algorithm: Algorithm) -> TokenError {
    let expected = match family {
        KeyFamily::Hmac => "a shared secret",
        KeyFamily::Rsa | KeyFamily::Ec | KeyFamily::Ed => "a PEM key pair",
    };
    TokenError::Key(format!("{algorithm:?} requires {expected}"))
}

impl TokenService for JsonWebTokenService {
    fn encode(
        &self,
        claims: &Claims,
        key: &SigningKey,
        algorithm: Algorithm,
    ) -> Result<String, TokenError> {
        let encoding_key = Self::encoding_key(key, algorithm)?;
        jsonwebtoken::encode(&Header::new(algorithm), claims, &encoding_key).map_err(|e| {
            match TokenError::from(e) {
                TokenError::Key(msg) => TokenError::Key(msg),
                other => TokenError::Encoding(other.to_string()),
            }
        })
    }

    fn decode(
        &self,
        token: &str,
        key: &SigningKey,
        allowed: &[Algorithm],
    ) -> Result<Claims, TokenError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        if !allowed.contains(&header.alg) {
            tracing::debug!("Rejecting token signed with {:?}", header.alg);
            return Err(TokenError::Malformed("Algorithm not allowed".to_string()));
        }

        let decoding_key = Self::decoding_key(key, header.alg)?;

        let mut validation = Validation::new(header.alg);
        validation.algorithms = allowed.to_vec();
        validation.required_spec_claims.clear();
        validation.leeway = self.leeway;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;

        let claims = jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation)?.claims;

        let now = Utc::now().timestamp();

        // jsonwebtoken skips an exp that is not a u64
        if claims.contains_key(EXPIRATION) {
            let Some(exp) = claims.expiration() else {
                return Err(TokenError::Malformed("exp is not an integer".to_string()));
            };
            if exp < now.saturating_sub_unsigned(self.leeway) {
                tracing::debug!("Token expired: exp={exp}, now={now}");
                return Err(TokenError::Expired);
            }
        }

        // jsonwebtoken does not look at iat
        if let Some(iat) = claims.issued_at() {
            if iat > now.saturating_add_unsigned(self.leeway) {
                tracing::debug!("Token issued in the future: iat={iat}, now={now}");
                return Err(TokenError::NotYetValid);
            }
        }

        Ok(claims)
    }
}
