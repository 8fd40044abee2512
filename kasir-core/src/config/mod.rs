//! Configuration types for the Kasir checkout server.
//!
//! These are the validated runtime values shared across crates. Loading and
//! parsing the TOML file is handled by the server crate.

mod catalog;
mod gateway;
mod server;

pub use catalog::CatalogConfig;
pub use gateway::GatewayConfig;
pub use server::ServerConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with a separate lock per section, so a
/// reload of one section never blocks readers of another.
#[derive(Clone)]
pub struct SharedConfig {
    pub server: Arc<RwLock<ServerConfig>>,
    pub gateway: Arc<RwLock<GatewayConfig>>,
    pub catalog: Arc<RwLock<CatalogConfig>>,
}

impl SharedConfig {
    pub fn new(server: ServerConfig, gateway: GatewayConfig, catalog: CatalogConfig) -> Self {
        Self {
            server: Arc::new(RwLock::new(server)),
            gateway: Arc::new(RwLock::new(gateway)),
            catalog: Arc::new(RwLock::new(catalog)),
        }
    }

    /// Swap in freshly validated values for every section.
    pub async fn replace(&self, server: ServerConfig, gateway: GatewayConfig, catalog: CatalogConfig) {
        *self.server.write().await = server;
        *self.gateway.write().await = gateway;
        *self.catalog.write().await = catalog;
    }
}
