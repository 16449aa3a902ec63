//! Sensibo platform server
//!
//! Keeps the accessory cache of a config directory in sync with the device
//! snapshot in `sensibo-devices.json`.
//!
//! Usage: `sensibo [CONFIG_DIR]` (defaults to the current directory)

use anyhow::{Context, Result};
use clap::Parser;
use sensibo_config::PlatformConfig;
use sensibo_registries::{AccessoryRegistry, Storage};
use sensibo_sync::{JsonFileSource, Platform};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Parser)]
#[command(name = "sensibo")]
#[command(about = "Keep Sensibo accessories in sync with the device inventory")]
#[command(version)]
struct Args {
    /// Directory holding configuration.yaml, secrets.yaml and .storage/
    #[arg(default_value = ".")]
    config_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args { config_dir } = Args::parse();

    let config = PlatformConfig::load(&config_dir)
        .with_context(|| format!("loading configuration from {}", config_dir.display()))?;

    // RUST_LOG wins over the configured level
    let level = if config.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting {} from {}", config.name, config_dir.display());
    debug!(
        api_key_set = config.api_key.is_some(),
        refresh_interval = config.refresh_interval,
        flags = ?config.flags(),
        "Platform configuration loaded"
    );

    let registry = Arc::new(AccessoryRegistry::new(Arc::new(Storage::new(&config_dir))));
    registry
        .load()
        .await
        .context("loading accessory cache")?;

    let mut platform = Platform::new(&config, registry.clone(), registry.cached_accessories());
    let source = JsonFileSource::in_config_dir(&config_dir);

    let mut ticker = interval(config.refresh_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match platform.refresh(&source).await {
                    Ok(report) if report.host_changed() => {
                        if let Err(e) = registry.save().await {
                            error!("Failed to save accessory cache: {}", e);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => error!("Device refresh failed: {}", e),
                }
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
        }
    }

    info!("Shutting down...");
    registry.save().await?;

    Ok(())
}
