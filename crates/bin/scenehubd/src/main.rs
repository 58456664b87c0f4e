//! # scenehubd: scenehub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`scenehub.toml`, env overrides)
//! - Install the tracing subscriber
//! - Open the configured scenario store (JSON files or `SQLite`)
//! - Construct the configured device control (virtual devices or the IoT cloud)
//! - Build the scheduler and the axum router
//! - Run the periodic due-scenario sweep next to the HTTP server
//! - Handle graceful shutdown (SIGTERM/SIGINT), dropping pending delayed actions
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use scenehub_adapter_cloud::{CloudConfig, CloudDeviceControl};
use scenehub_adapter_http_axum::router;
use scenehub_adapter_http_axum::state::AppState;
use scenehub_adapter_storage_json::JsonFileStore;
use scenehub_adapter_storage_sqlite_sqlx::SqliteScenarioStore;
use scenehub_adapter_virtual::VirtualDeviceControl;
use scenehub_app::ports::{DeviceControl, ScenarioStore, SystemClock};
use scenehub_app::scheduler::Scheduler;

use config::{Config, DeviceControlBackend, StorageBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.logging.filter)
        .with_context(|| format!("invalid log filter `{}`", config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match config.storage.backend {
        StorageBackend::Json => {
            let store = JsonFileStore::open(&config.storage.data_dir)
                .await
                .with_context(|| {
                    format!(
                        "failed to open data directory {}",
                        config.storage.data_dir.display()
                    )
                })?;
            tracing::info!(data_dir = %config.storage.data_dir.display(), "using JSON file store");
            with_device_control(&config, store).await
        }
        StorageBackend::Sqlite => {
            let db = scenehub_adapter_storage_sqlite_sqlx::Config {
                database_url: config.storage.database_url.clone(),
            }
            .build()
            .await
            .context("failed to open the scenario database")?;
            tracing::info!(url = %config.storage.database_url, "using SQLite store");
            with_device_control(&config, SqliteScenarioStore::new(db.pool().clone())).await
        }
    }
}

async fn with_device_control<S>(config: &Config, store: S) -> anyhow::Result<()>
where
    S: ScenarioStore + Send + Sync + 'static,
{
    match config.device_control.backend {
        DeviceControlBackend::Virtual => {
            let control = VirtualDeviceControl::default();
            tracing::info!(devices = ?control.devices(), "using virtual devices");
            serve(config, store, control).await
        }
        DeviceControlBackend::Cloud => {
            let control = CloudDeviceControl::new(CloudConfig {
                base_url: config.device_control.base_url.clone(),
                access_token: Some(config.device_control.access_token.clone()),
                timeout: Duration::from_secs(config.device_control.timeout_secs),
            })
            .context("failed to set up the cloud client")?;
            tracing::info!(base_url = %config.device_control.base_url, "using IoT cloud");
            serve(config, store, control).await
        }
    }
}

async fn serve<S, D>(config: &Config, store: S, control: D) -> anyhow::Result<()>
where
    S: ScenarioStore + Send + Sync + 'static,
    D: DeviceControl + Send + Sync + 'static,
{
    let scheduler = Arc::new(
        Scheduler::new(store, control, SystemClock)
            .cancel_pending_on_delete(config.scheduler.cancel_pending_on_delete),
    );

    let sweep = tokio::spawn(scheduler.sweeper().run_periodic(config.check_interval()));

    let app = router::build(AppState::new(Arc::clone(&scheduler)));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(
        %bind_addr,
        check_interval_secs = config.scheduler.check_interval_secs,
        "scenehubd listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweep.abort();
    scheduler.shutdown();
    tracing::info!("scenehubd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown requested");
}
