mod app;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    sync::{Arc, Mutex},
};

use coverfinder_core::{
    config::{self, AppConfig},
    GamesDbClient,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    if config.api_key.is_empty() {
        tracing::warn!(
            path = %config::config_path().display(),
            "No API key configured; requests will be rejected upstream"
        );
    }

    let client = GamesDbClient::from_config(&config).context("failed to build API client")?;
    info!(base_url = %config.api_base_url, "Starting coverfinder");

    let mut app = app::CoverFinderApp::new(
        Arc::new(client),
        config.assets_dir.clone(),
        config.download_dir(),
    );
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("coverfinder.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
