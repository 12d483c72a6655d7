use std::sync::{Arc, Once};

use jwt_user_storage::StorageConfig;

/// Loads `.env_test` (falling back to `.env`) once per test binary
pub fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(concat!(env!("CARGO_MANIFEST_DIR"), "/.env_test")).is_err() {
            dotenvy::dotenv().ok();
        }
    });
}

/// Configuration read from the test environment
pub fn test_config() -> Arc<StorageConfig> {
    init_test_environment();
    Arc::new(StorageConfig::from_env().expect("JWT_* test settings should be valid"))
}
