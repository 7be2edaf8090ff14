//! Engine configuration loaded via OrthoConfig.
//!
//! Values layer from command-line flags, `NOTESHARE_*` environment
//! variables, and a configuration file.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_SEARCH_MAX_CHARS;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_POOL_MIN_IDLE: u32 = 2;
const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_TEXT_SEARCH_CONFIG: &str = "english";

/// Settings for the note sharing engine.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "NOTESHARE")]
pub struct NoteshareSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    pub pool_max_size: Option<u32>,
    /// Idle connections the pool keeps open.
    pub pool_min_idle: Option<u32>,
    /// Pool checkout timeout in milliseconds.
    pub connection_timeout_ms: Option<u64>,
    /// Default per-call store deadline in milliseconds.
    pub request_timeout_ms: Option<u64>,
    /// PostgreSQL text search configuration used to index and match notes.
    pub text_search_config: Option<String>,
    /// Longest accepted search input, in characters.
    pub search_max_chars: Option<usize>,
    /// Apply embedded migrations at start-up.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl NoteshareSettings {
    /// Configured database URL, if any.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    pub fn pool_min_idle(&self) -> u32 {
        self.pool_min_idle.unwrap_or(DEFAULT_POOL_MIN_IDLE)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(
            self.connection_timeout_ms
                .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_MS),
        )
    }

    /// Budget handed to each request's deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    pub fn text_search_config(&self) -> &str {
        self.text_search_config
            .as_deref()
            .unwrap_or(DEFAULT_TEXT_SEARCH_CONFIG)
    }

    pub fn search_max_chars(&self) -> usize {
        self.search_max_chars.unwrap_or(DEFAULT_SEARCH_MAX_CHARS)
    }

    /// Pool configuration for `database_url`.
    pub fn pool_config(&self, database_url: &str) -> PoolConfig {
        PoolConfig::new(database_url)
            .with_max_size(self.pool_max_size())
            .with_min_idle(Some(self.pool_min_idle()))
            .with_connection_timeout(self.connection_timeout())
    }
}
