//! cracmd - Command-line interface to Crabada on-chain functions
//!
//! Builds, signs and submits transactions against a single EVM chain:
//! removing a crabada from a team, and transferring native TUS.

use clap::{Parser, Subcommand};
use ethers::types::Address;
use tracing::{error, info};

mod chain;
mod config;
mod crabada;
mod error;
mod tx;

use config::Settings;
use crabada::CrabadaClient;
use error::{ClientError, ClientResult};
use tx::TransactionSender;

#[derive(Parser)]
#[command(name = "cracmd", version, about = "Command-line interface to Crabada functions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove the crabada at a position from a team
    RemoveFromTeam {
        /// Team id
        team_id: u64,
        /// Position within the team
        position: u64,
    },
    /// Transfer TUS to an address
    SendTus {
        /// Recipient address
        to: String,
        /// Amount in whole TUS
        amount: u64,
    },
}

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let settings = Settings::load()?;

    match cli.command {
        Commands::RemoveFromTeam { team_id, position } => {
            let client = CrabadaClient::connect(settings).await?;
            let receipt = client.remove_crabada_from_team(team_id, position).await?;
            info!(
                tx_hash = ?receipt.transaction_hash,
                block = ?receipt.block_number,
                "removeCrabadaFromTeam confirmed"
            );
        }
        Commands::SendTus { to, amount } => {
            let to: Address = to
                .parse()
                .map_err(|e| ClientError::Config(format!("Invalid recipient address: {e}")))?;
            let sender = TransactionSender::connect(settings).await?;
            let receipt = sender.send_tus(to, amount).await?;
            info!(
                tx_hash = ?receipt.transaction_hash,
                block = ?receipt.block_number,
                "Transfer confirmed"
            );
        }
    }

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cracmd=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
