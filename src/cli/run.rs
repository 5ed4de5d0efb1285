use crate::config::{load_config, ConfigError};
use crate::shipper::scheduler::Scheduler;
use crate::shipper::Shipper;
use crate::sink::{SeqSink, SinkError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::signal;
use tracing::info;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("signal error: {0}")]
    Signal(#[from] std::io::Error),
}

pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match config_path {
        Some(path) => path,
        None => {
            eprintln!("Error: config not found");
            eprintln!("Searched locations:");
            eprintln!("  ~/.config/seqship/config.yml");
            eprintln!("  /etc/seqship/config.yml");
            eprintln!("\nUse --config <path> to specify a config file, or run 'seqship config init' to generate one.");
            std::process::exit(1);
        }
    };

    run_shipper(&config_path).await.map_err(Into::into)
}

async fn run_shipper(config_path: &Path) -> Result<(), RunError> {
    info!(config_path = %config_path.display(), "Loading configuration");
    let config = load_config(config_path)?;

    let sink = Arc::new(SeqSink::new(
        &config.server_url,
        config.api_key.as_deref(),
        config.request_timeout,
    )?);
    let shipper = Arc::new(Shipper::new(
        config.buffer_base.clone(),
        config.batch_posting_limit,
        sink,
    ));

    info!(
        server_url = %config.server_url,
        buffer_base = %config.buffer_base.display(),
        period = ?config.period,
        "Starting shipper"
    );
    let scheduler = Scheduler::start(shipper, config.period);

    signal::ctrl_c().await?;
    info!("Received shutdown signal");

    // Mandatory lifecycle step: cancels the timer, waits for any in-flight
    // tick, then flushes remaining backlog with one final tick.
    scheduler.shutdown().await;
    Ok(())
}
