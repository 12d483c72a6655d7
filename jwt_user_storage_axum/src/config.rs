//! Central configuration for the jwt_user_storage_axum crate

use std::sync::LazyLock;

/// Where anonymous GET requests to protected routes are sent
/// Default: "/"
pub static JWT_REDIRECT_ANON: LazyLock<String> =
    LazyLock::new(|| std::env::var("JWT_REDIRECT_ANON").unwrap_or_else(|_| "/".to_string()));
