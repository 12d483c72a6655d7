mod codec;
mod types;

pub use codec::{ROLES_CLAIM, UID_CLAIM, UserIdentityCodec};
pub use types::{IdentityCodec, UserIdentity};
