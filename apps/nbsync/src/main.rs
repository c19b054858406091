//! nbsync: keeps LibreNMS devices in line with NetBox.

mod config;
mod logging;

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use nbsync_connector_librenms::LibreNmsConnector;
use nbsync_connector_netbox::NetBoxConnector;
use nbsync_reconciliation::{ReconciliationEngine, SyncScheduler};

use crate::config::SyncConfig;
use crate::logging::{init_logging, LogFormat};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    init_logging(LogFormat::from_value(std::env::var("LOG_FORMAT").ok().as_deref()));

    let config = SyncConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    info!(
        netbox_url = %config.netbox_url,
        librenms_url = %config.librenms_url,
        domain = %config.domain_name,
        role_ids = ?config.role_ids,
        sync_frequency_secs = config.sync_frequency.as_secs(),
        dry_run = config.dry_run,
        "Starting nbsync"
    );

    let netbox = NetBoxConnector::new(config.netbox_http_config()).unwrap_or_else(|e| {
        eprintln!("NetBox connector error: {e}");
        std::process::exit(1);
    });
    let librenms = LibreNmsConnector::new(config.librenms_http_config()).unwrap_or_else(|e| {
        eprintln!("LibreNMS connector error: {e}");
        std::process::exit(1);
    });

    let engine = ReconciliationEngine::new(
        Arc::new(netbox),
        Arc::new(librenms),
        config.reconciliation_config(),
    );
    let scheduler = SyncScheduler::new(engine).with_interval(config.sync_frequency);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = cancel_tx.send(true);
    });

    let cycles = scheduler.run(cancel_rx).await;

    info!(cycles, "nbsync stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, finishing the current cycle before shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, finishing the current cycle before shutdown");
        }
    }
}
