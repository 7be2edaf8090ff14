//! Engine entry-point: loads settings, migrates the schema, and verifies the
//! store is reachable.
//!
//! The binary is a start-up and connectivity check. It wires the engine over
//! the PostgreSQL adapters to confirm the configuration is complete, then
//! exits; callers embed [`noteshare::NotesEngine`] through the library.

use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use noteshare::outbound::persistence::{DbPool, run_pending_migrations};
use noteshare::{NoteshareSettings, PostgresNotesEngine};

/// Application bootstrap.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = NoteshareSettings::load_from_iter(std::env::args_os())
        .wrap_err("failed to load settings")?;
    let database_url = settings
        .database_url()
        .map(str::to_owned)
        .ok_or_else(|| eyre!("NOTESHARE_DATABASE_URL must be set"))?;

    if settings.run_migrations {
        let url = database_url.clone();
        let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
            .await
            .wrap_err("migration task panicked")?
            .wrap_err("failed to apply migrations")?;
        info!(applied, "schema migrations complete");
    } else {
        info!("schema migrations skipped");
    }

    let pool = DbPool::new(settings.pool_config(&database_url))
        .await
        .wrap_err("failed to build connection pool")?;
    pool.ping().await.wrap_err("database is unreachable")?;

    let _engine = PostgresNotesEngine::from_pool(pool, &settings);
    info!(
        text_search_config = settings.text_search_config(),
        search_max_chars = settings.search_max_chars(),
        request_timeout = ?settings.request_timeout(),
        "note engine ready"
    );
    Ok(())
}
