use std::sync::Arc;

use shortcut_cache::{
    config::AppConfig,
    db::{self, SqliteShortcutStore},
    ShortcutCache,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ── Shared application state ───────────────────────────────────────────────

/// Handles owned for the lifetime of the process and passed to whatever
/// surface serves shortcuts.
pub struct AppState {
    pub config: AppConfig,
    pub shortcuts: ShortcutCache<SqliteShortcutStore>,
}

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent; env vars may already be set)
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shortcut_cache=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("Opening shortcut store at {}", config.database_url);

    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;
    tracing::info!("Database migrations applied");

    // The cache must be warm before anything reads from it.
    let shortcuts = ShortcutCache::new(SqliteShortcutStore::new(pool));
    shortcuts.init().await?;

    let state = Arc::new(AppState { config, shortcuts });
    tracing::info!(
        "Shortcut cache ready with {} record(s) from {}; waiting for shutdown signal",
        state.shortcuts.len().await,
        state.config.database_url
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    state.shortcuts.store().pool().close().await;
    Ok(())
}
