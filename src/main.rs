//! Library Backend - user accounts and bearer-token auth for the lending service
//! Mission: Serve login/refresh and guard every protected route

use anyhow::{Context, Result};
use library_backend::{
    auth::{AuthState, JwtHandler, SigningSecret, UserStore},
    build_router,
    config::{self, Config},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    config::load_env();
    init_tracing();

    // Parsed once; nothing below re-reads the environment
    let config = Config::load().context("Invalid configuration")?;

    info!("🚀 Library backend starting");

    let user_store = Arc::new(UserStore::new(&config.auth_db_path)?);
    let signing_secret =
        SigningSecret::new(&config.jwt_secret).context("Failed to load signing secret")?;
    let jwt_handler = Arc::new(JwtHandler::new(signing_secret));
    let auth_state = AuthState::new(user_store, jwt_handler, config.bcrypt_cost)
        .context("Failed to initialize authentication")?;

    info!(
        db = %config.auth_db_path,
        bcrypt_cost = config.bcrypt_cost,
        "🔐 Authentication initialized"
    );

    let app = build_router(auth_state);

    // Start server
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with env-filter support
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
