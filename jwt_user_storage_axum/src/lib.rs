//! jwt_user_storage_axum - Axum extractors for JWT cookie sessions
//!
//! [`JwtSession`] gives a handler the per-request
//! [`JwtUserStorage`](jwt_user_storage::JwtUserStorage) and, when returned
//! from the handler, writes the updated cookie. [`AuthUser`] only admits
//! requests carrying an authenticated session.

mod config;
mod error;
mod session;

pub use config::JWT_REDIRECT_ANON;
pub use error::IntoResponseError;
pub use session::{AuthRedirect, AuthUser, JwtSession};

pub use jwt_user_storage::{StorageConfig, UserIdentity};
