pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

pub enum AppCommand {
    Live {
        currency: String,
    },
    Historical {
        currency: String,
        dates: Vec<NaiveDate>,
    },
}

/// Options shared by every command.
#[derive(Debug, Default, Clone)]
pub struct RunOptions<'a> {
    pub config_path: Option<&'a str>,
    /// Keep historical rates in the on-disk cache between runs
    pub persist_cache: bool,
}

pub async fn run_command(command: AppCommand, options: RunOptions<'_>) -> Result<()> {
    info!("fxlayer starting...");

    let config = match options.config_path {
        Some(path) => core::config::AppConfig::load_from_path(path)?,
        None => core::config::AppConfig::load()?,
    };
    debug!(
        base_url = %config.apilayer.base_url,
        data_path = ?config.data_path,
        "Loaded config"
    );

    let cache = store::open_historical_cache(&config, options.persist_cache);
    let client = providers::ApilayerClient::new(&config.apilayer, cache)
        .context("Failed to create apilayer client")?;

    match command {
        AppCommand::Live { currency } => cli::rates::run_live(&client, &currency).await,
        AppCommand::Historical { currency, dates } => {
            cli::rates::run_historical(&client, &currency, &dates).await
        }
    }
}
