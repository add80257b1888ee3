use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use lge360::{App, Config};
use lge360_mqtt::MqttSink;
use lge360_telegram::{MeterReader, Registry};
use lge360_transport::{SerialTransport, TransportLayer};
use tracing_subscriber::EnvFilter;

/// Upper bound for the MQTT event loop to flush `offline` after disconnecting
const MQTT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    init_logging(&config.log_level);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("An error occurred: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // Also installs the bridge that forwards the library crates' `log` records.
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(config: Config) -> Result<()> {
    let settings = config.serial_settings()?;
    let (publisher, mqtt_task) = MqttSink::connect(&config.mqtt_config());

    let mut transport = SerialTransport::new(settings);
    if let Err(err) = transport.open().await {
        if let Err(e) = publisher.disconnect().await {
            tracing::warn!("Failed to disconnect publisher: {}", e);
        }
        let _ = tokio::time::timeout(MQTT_DRAIN_TIMEOUT, mqtt_task).await;
        return Err(err).context("failed to open meter port");
    }

    let reader = MeterReader::new(transport, Arc::new(Registry::e360()));
    let mut app = App::new(reader, publisher, config.poll_interval());

    let outcome = app.run(interrupted()).await;
    let cleanup = app.shutdown().await;
    if tokio::time::timeout(MQTT_DRAIN_TIMEOUT, mqtt_task).await.is_err() {
        tracing::warn!("MQTT event loop did not stop within {:?}", MQTT_DRAIN_TIMEOUT);
    }
    tracing::info!("Disconnected and cleaned up resources");

    outcome.context("meter bridge stopped")?;
    cleanup.context("cleanup failed")?;
    Ok(())
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for interrupts: {}", err);
        std::future::pending::<()>().await;
    }
}
