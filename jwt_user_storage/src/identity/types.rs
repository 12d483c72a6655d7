use serde::{Deserialize, Serialize};

use crate::claims::Claims;

/// Application-level principal stored in the session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub roles: Vec<String>,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            id: id.into(),
            roles,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Converts an identity to and from the flat claims embedded in the token.
///
/// `deserialize` returns `None` when the claims carry no identity, which is a
/// valid "no identity" session rather than an error.
pub trait IdentityCodec {
    type Identity;

    fn serialize(&self, identity: &Self::Identity) -> Claims;

    fn deserialize(&self, claims: &Claims) -> Option<Self::Identity>;
}
