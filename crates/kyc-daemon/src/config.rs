// crates/kyc-daemon/src/config.rs
//
// Runtime configuration for the KYC oracle daemon.
// Loaded from a TOML file or populated with defaults; command-line flags and
// environment variables are applied on top in main.rs.

use serde::Deserialize;
use std::fs;

use kyc_chain::{DEFAULT_FUNCTION_SIGNATURE, DEFAULT_GAS_LIMIT};

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Host address for the RPC server.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    /// Port for the RPC server.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log level used when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub chain: ChainConfig,

    #[serde(default)]
    pub sources: SourcesConfig,
}

/// `[chain]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of the chain node.
    #[serde(default = "default_chain_rpc_url")]
    pub rpc_url: String,

    /// Address of the KYC registry contract.
    #[serde(default)]
    pub contract_address: String,

    /// File holding the hex-encoded oracle signing key.
    #[serde(default = "default_private_key_path")]
    pub private_key_path: String,

    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,

    #[serde(default = "default_function_signature")]
    pub function_signature: String,
}

/// `[sources]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    /// Per-request timeout for every provider call, 1..=10 seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub identity_enabled: bool,

    #[serde(default = "default_identity_api_url")]
    pub identity_api_url: String,

    #[serde(default = "default_true")]
    pub financial_enabled: bool,

    #[serde(default = "default_financial_api_url")]
    pub financial_api_url: String,

    /// Bearer credential for the financial provider. Prefer the
    /// ORACLE_FINANCIAL_API_KEY environment variable.
    #[serde(default)]
    pub financial_api_key: String,
}

fn default_rpc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_chain_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_private_key_path() -> String {
    "~/.kyc-oracle/oracle.key".to_string()
}

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

fn default_function_signature() -> String {
    DEFAULT_FUNCTION_SIGNATURE.to_string()
}

/// Upper bound for `[sources] request_timeout_secs`.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 10;

fn default_request_timeout_secs() -> u64 {
    MAX_REQUEST_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

fn default_identity_api_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_financial_api_url() -> String {
    "http://localhost:3000/api/verify".to_string()
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_chain_rpc_url(),
            contract_address: String::new(),
            private_key_path: default_private_key_path(),
            gas_limit: default_gas_limit(),
            function_signature: default_function_signature(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            identity_enabled: true,
            identity_api_url: default_identity_api_url(),
            financial_enabled: true,
            financial_api_url: default_financial_api_url(),
            financial_api_key: String::new(),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            log_level: default_log_level(),
            chain: ChainConfig::default(),
            sources: SourcesConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load from a TOML file. A missing file yields the defaults and a false
    /// flag; unreadable or malformed files are errors.
    pub fn load_or_default(path: &str) -> Result<(Self, bool), Box<dyn std::error::Error>> {
        match fs::read_to_string(expand_tilde(path)) {
            Ok(contents) => Ok((Self::parse(&contents)?, true)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok((Self::default(), false)),
            Err(e) => Err(e.into()),
        }
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: DaemonConfig = toml::from_str(contents)?;
        Ok(config)
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
