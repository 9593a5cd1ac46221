//! Order Hub Binary
//!
//! Starts the order sync and statistics service.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-hub
//! ```
//!
//! # Environment Variables
//!
//! - `AIRTABLE_API_TOKEN`: provider API token (default: empty; surfaces as
//!   provider-side auth failures rather than a startup error)
//! - `SMEE_URL`: webhook delivery URL (default: a shared smee.io channel)
//! - `BASE_NAME`: provider base name (default: "Purrfect Creations")
//! - `TABLE_NAME`: table to mirror (default: "Orders")
//! - `VIEW_NAME`: view to fetch from (default: "Grid view")
//! - `HTTP_PORT`: HTTP listen port (default: 3000)
//! - `RUST_LOG`: log level (default: info)

use std::sync::Arc;

use anyhow::Context;
use order_hub::{
    AirtableClient, ApiServer, ApiState, AppConfig, NotificationHub, RecordSource, SnapshotStore,
    SyncConfig, SyncService, WebhookRegistrar,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    init_tracing();

    tracing::info!("Starting Order Hub");

    let config = AppConfig::from_env();
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let client = Arc::new(
        AirtableClient::new(config.api_token.clone()).context("building provider client")?,
    );

    let base_id = client
        .resolve_base_id(&config.base_name)
        .await
        .context("resolving provider base id")?;
    tracing::info!(base = %config.base_name, base_id = %base_id, "resolved provider base");

    let snapshot = Arc::new(SnapshotStore::new());
    let hub = Arc::new(NotificationHub::with_defaults());

    let sync = Arc::new(SyncService::new(
        Arc::clone(&client) as Arc<dyn RecordSource>,
        Arc::clone(&client) as Arc<dyn WebhookRegistrar>,
        Arc::clone(&snapshot),
        Arc::clone(&hub),
        SyncConfig {
            base_id,
            table_name: config.table_name.clone(),
            view_name: config.view_name.clone(),
            notification_url: config.notification_url.clone(),
        },
    ));

    // Rotate the webhook and install the first snapshot before serving;
    // a failure here aborts startup.
    let report = sync.run_cycle().await.context("initial sync cycle")?;
    tracing::info!(records = report.records, "initial snapshot installed");

    let state = Arc::new(ApiState::new(
        Arc::clone(&snapshot),
        Arc::clone(&hub),
        Arc::clone(&sync),
    ));
    let server = ApiServer::new(config.http_port, state, shutdown_token.clone());

    tokio::spawn(async move {
        if let Err(e) = server.run().await {
            tracing::error!(error = %e, "HTTP server error");
        }
    });

    tracing::info!("Order hub ready");

    await_shutdown(shutdown_token).await;

    tracing::info!("Order hub stopped");
    Ok(())
}

/// Initialize tracing with an env-filter, defaulting to `info`.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Log the parsed configuration (token redacted by its Debug impl).
fn log_config(config: &AppConfig) {
    tracing::info!(
        base = %config.base_name,
        table = %config.table_name,
        view = %config.view_name,
        notification_url = %config.notification_url,
        http_port = config.http_port,
        "Configuration loaded"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
