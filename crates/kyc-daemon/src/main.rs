// crates/kyc-daemon/src/main.rs
//
// Binary entrypoint for the KYC oracle daemon.
//
// Parses CLI arguments, loads configuration, initializes tracing, validates
// everything once into an immutable oracle context, and serves the RPC API
// until Ctrl-C.

mod config;
mod wiring;

use clap::Parser;
use config::DaemonConfig;

use kyc_rpc::{KycRpcServer, RpcConfig};

/// KYC oracle daemon: aggregates provider checks and records verdicts on chain.
#[derive(Parser, Debug)]
#[command(name = "kyc-oracle", version, about = "KYC oracle daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, env = "ORACLE_CONFIG", default_value = "~/.kyc-oracle/config.toml")]
    config: String,

    /// Chain JSON-RPC endpoint.
    #[arg(long, env = "ORACLE_RPC_URL")]
    rpc_url: Option<String>,

    /// KYC registry contract address.
    #[arg(long, env = "ORACLE_CONTRACT_ADDRESS")]
    contract_address: Option<String>,

    /// Hex signing key. Overrides [chain] private_key_path.
    #[arg(long, env = "ORACLE_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Bearer credential for the financial provider.
    #[arg(long, env = "ORACLE_FINANCIAL_API_KEY", hide_env_values = true)]
    financial_api_key: Option<String>,

    /// Financial provider endpoint.
    #[arg(long, env = "ORACLE_FINANCIAL_API_URL")]
    financial_api_url: Option<String>,

    /// Identity provider base URL.
    #[arg(long, env = "ORACLE_IDENTITY_API_URL")]
    identity_api_url: Option<String>,

    /// Port for the RPC server.
    #[arg(long, env = "ORACLE_RPC_PORT")]
    port: Option<u16>,
}

impl Args {
    fn apply(&self, config: &mut DaemonConfig) {
        if let Some(url) = &self.rpc_url {
            config.chain.rpc_url = url.clone();
        }
        if let Some(address) = &self.contract_address {
            config.chain.contract_address = address.clone();
        }
        if let Some(key) = &self.financial_api_key {
            config.sources.financial_api_key = key.clone();
        }
        if let Some(url) = &self.financial_api_url {
            config.sources.financial_api_url = url.clone();
        }
        if let Some(url) = &self.identity_api_url {
            config.sources.identity_api_url = url.clone();
        }
        if let Some(port) = self.port {
            config.rpc_port = port;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // A missing config file means defaults; a malformed one is fatal.
    let (mut daemon_config, found) = DaemonConfig::load_or_default(&args.config)
        .map_err(|e| format!("invalid config {}: {}", args.config, e))?;
    args.apply(&mut daemon_config);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    if found {
        tracing::info!("Loaded configuration from {}", args.config);
    } else {
        tracing::warn!("No config file at {}. Using defaults.", args.config);
    }

    tracing::info!("KYC Oracle Daemon v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Chain RPC: {}", daemon_config.chain.rpc_url);
    tracing::info!("Contract: {}", daemon_config.chain.contract_address);

    let private_key = wiring::load_private_key(args.private_key.as_deref(), &daemon_config)?;
    let (oracle, status) = wiring::build_oracle(&daemon_config, &private_key)?;
    drop(private_key);

    let rpc_config = RpcConfig {
        host: daemon_config.rpc_host.clone(),
        port: daemon_config.rpc_port,
    };
    tracing::info!(
        "RPC endpoint: {}:{}",
        daemon_config.rpc_host,
        daemon_config.rpc_port
    );

    let server = KycRpcServer::new(rpc_config, oracle, status);
    server
        .start_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Received Ctrl-C, shutting down...");
        })
        .await
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;

    tracing::info!("KYC oracle daemon stopped");
    Ok(())
}
