use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use harvest_archive::{
    CacheStore, Fetchers, FingerprintCache, Harvester, MemoryCacheStore, PgCacheStore,
};
use harvest_common::config::{load_config, FileConfig};
use harvest_common::AppConfig;
use tracing_subscriber::EnvFilter;

use harvest_server::routes::{build_router, AppState};

#[derive(Parser)]
#[command(name = "harvest-server", about = "SERP collection and site fetching service")]
struct Cli {
    /// Path to config TOML file
    #[arg(long, default_value = "./config/harvest.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting harvest-server");

    let cli = Cli::parse();
    let file_config = if cli.config.exists() {
        tracing::info!(config = %cli.config.display(), "Loading config");
        load_config(&cli.config)?
    } else {
        tracing::warn!(
            config = %cli.config.display(),
            "Config file not found, using defaults"
        );
        FileConfig::default()
    };

    // Secrets from env vars
    let config = AppConfig::from_env()?;

    let store: Arc<dyn CacheStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("Failed to connect to DATABASE_URL")?;
            tracing::info!("Connected to database");

            let store = PgCacheStore::new(pool);
            store.migrate().await.context("Failed to run migrations")?;
            tracing::info!("Migrations complete");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, cache is in-memory and lost on restart");
            Arc::new(MemoryCacheStore::new())
        }
    };

    let fetchers = Fetchers::browserless(&config, &file_config.gateway, &file_config.serp)
        .context("Failed to build browserless fetchers")?;
    let cache = FingerprintCache::new(store, file_config.cache.ttl());
    let harvester = Harvester::new(
        cache,
        fetchers,
        file_config.limits.clone(),
        file_config.serp.clone(),
    );

    spawn_sweeper(harvester.clone(), file_config.cache.sweep_interval());

    let app = build_router(AppState::new(harvester, &config.api_token));

    let addr = format!("{}:{}", file_config.server.host, file_config.server.port);
    tracing::info!("harvest-server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically delete expired cache rows, off the request path.
fn spawn_sweeper(harvester: Harvester, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // First tick fires immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = harvester.sweep_expired().await {
                tracing::error!(error = %e, "cache: sweep failed");
            }
        }
    });
}
