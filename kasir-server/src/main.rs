//! Kasir checkout server
//!
//! Storefront backend for hosted-gateway card payments: catalog, orders,
//! signed checkout requests and payment notifications.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use anyhow::Context;
use clap::Parser;
use config::{ConfigLoader, get_database_url};
use shutdown::{Shutdown, spawn_config_reload_handler};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Connections kept open to Postgres.
const DB_MAX_CONNECTIONS: u32 = 10;
/// Bound on TCP/TLS setup towards the gateway. Whole-call timeouts are set
/// per request from `gateway.timeout_secs`.
const GATEWAY_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "kasir-server", version, about = "Storefront checkout server")]
struct Args {
    /// TOML configuration file.
    #[arg(short, long, env = "KASIR_CONFIG", default_value = "./kasir-config.toml")]
    config: PathBuf,

    /// Listen address, overriding `server.listen`.
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Apply the bundled migrations before serving.
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "kasir-server starting"
    );

    let loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded = loader.load().context("loading configuration")?;
    let listen = loaded.server.listen;

    let pool = open_pool(args.migrate).await?;
    let http = reqwest::Client::builder()
        .connect_timeout(GATEWAY_CONNECT_TIMEOUT)
        .build()
        .context("building gateway HTTP client")?;

    let shutdown = Shutdown::on_signal();
    let state = AppState::new(pool.clone(), loaded.into_shared(), http, shutdown.clone());
    let reload = spawn_config_reload_handler(state.clone(), loader);

    let served = server::run_server(server::build_router(state), listen, shutdown).await;

    // Covers a failed bind, where shutdown never fired.
    reload.abort();
    pool.close().await;
    tracing::info!("kasir-server stopped");

    served.with_context(|| format!("serving on {listen}"))
}

/// Connect to `DATABASE_URL`, applying migrations first when asked to.
async fn open_pool(migrate: bool) -> anyhow::Result<PgPool> {
    let url = get_database_url()?;
    let pool = PgPoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .connect(&url)
        .await
        .context("connecting to Postgres")?;
    tracing::info!("database pool ready");

    if migrate {
        sqlx::migrate!("../migrations")
            .run(&pool)
            .await
            .context("applying migrations")?;
        tracing::info!("migrations applied");
    }
    Ok(pool)
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
