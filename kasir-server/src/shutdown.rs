//! Signal handling for graceful shutdown and config reload.

use crate::config::ConfigLoader;
use crate::state::AppState;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Process-wide stop flag, observed by the HTTP server and by long-lived
/// WebSocket streams.
///
/// Flips once and stays flipped. If the sending side goes away without
/// flipping it, [`Shutdown::triggered`] never resolves.
#[derive(Clone, Debug)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// A handle plus the sender that triggers it.
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self { rx })
    }

    /// A handle triggered by SIGTERM or SIGINT.
    pub fn on_signal() -> Self {
        let (tx, shutdown) = Self::channel();
        tokio::spawn(async move {
            shutdown_signal().await;
            let _ = tx.send(true);
        });
        shutdown
    }

    /// Resolves once shutdown has been requested.
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Completes when SIGTERM or SIGINT (Ctrl+C) is received.
async fn shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install SIGTERM handler, only Ctrl+C will stop the server");
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }
}

/// Spawns a task that reloads the configuration on SIGHUP until shutdown.
///
/// A reload that fails validation keeps the previous configuration. The
/// listen address is only read at startup.
pub fn spawn_config_reload_handler(state: AppState, config_loader: Arc<ConfigLoader>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(sighup) => sighup,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGHUP handler, config reload disabled");
                return;
            }
        };

        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    tracing::info!("Received SIGHUP, reloading configuration");
                    match config_loader.reload() {
                        Ok(loaded) => {
                            state
                                .config
                                .replace(loaded.server, loaded.gateway, loaded.catalog)
                                .await;
                            tracing::info!("Configuration reloaded successfully");
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload configuration: {}", e);
                        }
                    }
                }
                _ = state.shutdown.triggered() => {
                    tracing::debug!("Config reload handler shutting down");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_triggered_after_send() {
        let (tx, shutdown) = Shutdown::channel();
        let waiter = shutdown.clone();
        let task = tokio::spawn(async move { waiter.triggered().await });

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        // Already flipped: resolves immediately for late callers too.
        tokio::time::timeout(Duration::from_millis(50), shutdown.triggered())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dropped_sender_never_triggers() {
        let (tx, shutdown) = Shutdown::channel();
        drop(tx);
        assert!(
            tokio::time::timeout(Duration::from_millis(50), shutdown.triggered())
                .await
                .is_err()
        );
    }
}
