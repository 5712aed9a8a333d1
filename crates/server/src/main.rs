mod seed;

use anyhow::Context;
use api::AppState;
use auth::AuthService;
use authgate_core::AppConfig;
use std::sync::Arc;
use store::SqliteUserStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("Loading configuration...");
    let (config, overrides) = AppConfig::load_with_env().context("failed to load configuration")?;
    if !overrides.is_empty() {
        info!("Environment overrides: {}", overrides.join(", "));
    }
    config.validate().context("invalid configuration")?;
    info!("Running in {:?} mode", config.environment);

    info!("Connecting to database: {}", config.database.url);
    let store = SqliteUserStore::connect(&config.database.url).await?;
    store.migrate().await?;
    info!("Migrations complete");

    let auth_service = AuthService::new(
        Arc::new(store),
        config.auth.jwt_secret.clone(),
        config.auth.token_expiry_seconds,
    );

    seed::seed_admin(&auth_service, &config.seed)
        .await
        .context("failed to seed admin account")?;

    let app = api::router(Arc::new(AppState::new(auth_service)));

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
