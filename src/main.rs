use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use fxlayer::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Keep historical rates in memory only for this run
    #[arg(long, global = true)]
    no_persist: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the live exchange rate for a currency
    Live {
        /// Currency code, e.g. EUR
        currency: String,
    },
    /// Display historical exchange rates for a currency
    Historical {
        /// Currency code, e.g. EUR
        currency: String,
        /// Date in YYYY-MM-DD format, may be repeated
        #[arg(short, long = "date", required = true, value_parser = parse_date)]
        dates: Vec<NaiveDate>,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{value}', expected YYYY-MM-DD: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let options = fxlayer::RunOptions {
        config_path: cli.config_path.as_deref(),
        persist_cache: !cli.no_persist,
    };

    let result = match cli.command {
        Some(Commands::Setup) => fxlayer::cli::setup::setup(),
        Some(Commands::Live { currency }) => {
            fxlayer::run_command(fxlayer::AppCommand::Live { currency }, options).await
        }
        Some(Commands::Historical { currency, dates }) => {
            fxlayer::run_command(fxlayer::AppCommand::Historical { currency, dates }, options)
                .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
