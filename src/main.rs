//! BudgetDesk Server: accounts, dual-token sessions and budget certificates.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use budgetdesk_api::{AppState, build_app, serve};
use budgetdesk_cache::provider::CacheManager;
use budgetdesk_core::config::AppConfig;
use budgetdesk_core::error::AppError;
use budgetdesk_database::connection::DatabasePool;
use budgetdesk_database::migration::run_migrations;
use budgetdesk_database::repositories::{
    BudgetStore, MemoryBudgetStore, MemoryUserDirectory, PgBudgetStore, PgUserDirectory,
    UserDirectory,
};

#[tokio::main]
async fn main() {
    let env = std::env::var("BUDGETDESK_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Starting BudgetDesk"
    );

    // ── Step 1: Persistence ──────────────────────────────────────
    let (directory, store, pool) = open_stores(&config).await?;

    // ── Step 2: Cache ────────────────────────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = Arc::new(CacheManager::new(&config.cache).await?);

    // ── Step 3: Auth and services ────────────────────────────────
    let bootstrap = config.auth.bootstrap_admin.clone();
    let (host, port) = (config.server.host.clone(), config.server.port);
    let state = AppState::new(config, cache, directory, store)?;

    if let Some(admin) = bootstrap {
        state.authority.ensure_admin(&admin).await?;
    }

    // ── Step 4: Serve ────────────────────────────────────────────
    let result = serve(build_app(state), &host, port).await;

    if let Some(pool) = pool {
        pool.close().await;
    }
    result
}

/// Postgres-backed stores when a database URL is configured, in-memory
/// stores otherwise.
async fn open_stores(
    config: &AppConfig,
) -> Result<
    (
        Arc<dyn UserDirectory>,
        Arc<dyn BudgetStore>,
        Option<DatabasePool>,
    ),
    AppError,
> {
    if config.database.url.trim().is_empty() {
        tracing::warn!("No database URL configured; using in-memory stores");
        return Ok((
            Arc::new(MemoryUserDirectory::new()),
            Arc::new(MemoryBudgetStore::new()),
            None,
        ));
    }

    let pool = DatabasePool::connect(&config.database).await?;
    tracing::info!("Running database migrations");
    run_migrations(pool.pool()).await?;

    Ok((
        Arc::new(PgUserDirectory::new(pool.pool().clone())),
        Arc::new(PgBudgetStore::new(pool.pool().clone())),
        Some(pool),
    ))
}
