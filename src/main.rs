mod commands;
mod flow;
mod ledger;
mod models;
mod provider;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::ledger::{HistoryFilter, Ledger};
use crate::models::{Platform, TransactionStatus};
use crate::provider::JsonFileProvider;

#[derive(Parser, Debug)]
#[command(name = "tipflow")]
#[command(about = "Stablecoin tipping flow for streaming creators", long_about = None)]
struct Cli {
    /// JSON array of creators; built-in fixtures when omitted
    #[arg(long, env = "TIPFLOW_CREATORS_FILE")]
    creators_file: Option<PathBuf>,

    /// JSON array of stablecoin balances; built-in fixtures when omitted
    #[arg(long, env = "TIPFLOW_BALANCES_FILE")]
    balances_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Creators {
        #[arg(long, value_enum)]
        platform: Option<Platform>,
        #[arg(long, default_value = "")]
        query: String,
    },
    Preview {
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
    },
    Balances,
    History {
        #[arg(long, value_enum)]
        platform: Option<Platform>,
        #[arg(long, value_enum)]
        status: Option<TransactionStatus>,
        #[arg(long)]
        since: Option<String>,
        #[arg(long)]
        until: Option<String>,
    },
    /// Interactive donation flow on stdin
    Session,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let provider = JsonFileProvider::new(cli.creators_file, cli.balances_file);

    match cli.command {
        Commands::Creators { platform, query } => {
            commands::creators::run(&provider, platform, &query)
        }
        Commands::Preview { amount } => commands::preview::run(&amount),
        Commands::Balances => commands::balances::run(&provider),
        Commands::History {
            platform,
            status,
            since,
            until,
        } => {
            let ledger = Ledger::open_in_memory()?;
            let filter = HistoryFilter {
                platform,
                status,
                since,
                until,
            };
            commands::history::run(&ledger, &filter)
        }
        Commands::Session => {
            let ledger = Ledger::open_in_memory()?;
            commands::session::run(&provider, &ledger).await
        }
    }
}
