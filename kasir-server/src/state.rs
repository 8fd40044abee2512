//! Application state shared across all request handlers.

use kasir_core::config::SharedConfig;
use kasir_core::events::StatusHub;
use kasir_core::framework::DatabaseProcessor;
use sqlx::PgPool;

use crate::shutdown::Shutdown;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Runtime configuration (can be reloaded via SIGHUP).
    pub config: SharedConfig,
    /// Outbound HTTP client, shared so gateway calls reuse connections.
    pub http: reqwest::Client,
    /// Fan-out of status records to WebSocket subscribers.
    pub status_hub: StatusHub,
    /// Stop flag for long-lived connections.
    pub shutdown: Shutdown,
}

impl AppState {
    pub fn new(db: PgPool, config: SharedConfig, http: reqwest::Client, shutdown: Shutdown) -> Self {
        Self {
            db,
            config,
            http,
            status_hub: StatusHub::default(),
            shutdown,
        }
    }

    /// Store handle over the shared pool.
    pub fn store(&self) -> DatabaseProcessor {
        DatabaseProcessor::new(self.db.clone())
    }
}
