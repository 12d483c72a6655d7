use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use jwt_user_storage_axum::StorageConfig;

mod handlers;
mod server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    server::init_tracing("demo_session");

    // A bad key or algorithm stops the server here, not on the first request
    let config = Arc::new(StorageConfig::from_env()?);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    let app = Router::new()
        .route("/", get(handlers::index))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/forget", post(handlers::forget))
        .route("/protected", get(handlers::protected))
        .route("/session", get(handlers::session_info))
        .with_state(config);

    server::serve(port, app).await?;
    Ok(())
}
