use crate::claims::{ClaimValue, Claims};

use super::types::{IdentityCodec, UserIdentity};

pub const UID_CLAIM: &str = "uid";
pub const ROLES_CLAIM: &str = "roles";

/// Stores a [`UserIdentity`] as `{uid: id, roles: [..]}`
#[derive(Debug, Clone, Copy, Default)]
pub struct UserIdentityCodec;

impl IdentityCodec for UserIdentityCodec {
    type Identity = UserIdentity;

    fn serialize(&self, identity: &UserIdentity) -> Claims {
        let roles = identity
            .roles
            .iter()
            .map(|role| ClaimValue::from(role.as_str()))
            .collect::<Vec<_>>();

        let mut claims = Claims::new();
        claims.insert(UID_CLAIM, identity.id.as_str());
        claims.insert(ROLES_CLAIM, roles);
        claims
    }

    fn deserialize(&self, claims: &Claims) -> Option<UserIdentity> {
        let id = match claims.get(UID_CLAIM)? {
            ClaimValue::String(id) => id.clone(),
            ClaimValue::Int(id) => id.to_string(),
            other => {
                tracing::debug!("Ignoring identity with unsupported uid claim: {other:?}");
                return None;
            }
        };

        let roles = claims
            .get(ROLES_CLAIM)?
            .as_list()?
            .iter()
            .map(|role| role.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>();

        let Some(roles) = roles else {
            tracing::debug!("Ignoring identity with non-string roles for uid {id}");
            return None;
        };

        Some(UserIdentity { id, roles })
    }
}
