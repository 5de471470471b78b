// crates/kyc-cli/src/main.rs
//
// CLI entrypoint for the KYC oracle developer tools.
//
// Submits verification requests to a running kyc-oracle daemon and shows its
// health and node info.

mod commands;
mod output;
mod rpc_client;

use clap::{Parser, Subcommand};
use commands::verify::VerifyCmd;

/// KYC oracle CLI.
#[derive(Parser, Debug)]
#[command(name = "kyc", version, about = "Developer CLI for the KYC oracle")]
struct Cli {
    /// RPC endpoint of the kyc-oracle daemon.
    #[arg(long, global = true, default_value = "http://localhost:8080")]
    rpc: String,

    /// Print raw JSON instead of a table.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a subject through the oracle and record the verdict on chain.
    Verify(VerifyCmd),

    /// Check that the daemon is up and show its chain target.
    Health,

    /// Show daemon version, uptime, and enabled sources.
    Info,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let format = if cli.json {
        output::OutputFormat::Json
    } else {
        output::OutputFormat::Table
    };

    match &cli.command {
        Commands::Verify(cmd) => commands::verify::run(&cli.rpc, cmd, &format).await?,
        Commands::Health => commands::health::run(&cli.rpc, &format).await?,
        Commands::Info => commands::info::run(&cli.rpc, &format).await?,
    }

    Ok(())
}
