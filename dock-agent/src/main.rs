//! Headphone Holder Dock Agent
//!
//! Finds the headphone holder on a serial port, watches its dock sensor and
//! runs the configured hook commands when the headphones are placed or lifted.

mod hooks;
mod settings;

use anyhow::Context;
use dock_detect::{PortScanner, SerialConnector};
use dock_watch::spawn_worker;
use hooks::HookSink;
use settings::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "dockswitch=info,dock_protocol=info,dock_detect=info,dock_watch=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting dockswitch");

    let settings = Settings::load();
    let sink = HookSink::new(settings.on_docked.clone(), settings.on_undocked.clone());
    let scanner = PortScanner::with_config(settings.scanner_config());

    let handle = spawn_worker(scanner, SerialConnector, sink, settings.watch);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    tracing::info!("Shutting down");
    handle.shutdown().await;

    Ok(())
}
