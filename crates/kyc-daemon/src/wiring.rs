// crates/kyc-daemon/src/wiring.rs
//
// Turns a validated DaemonConfig into the immutable oracle context.

use std::sync::Arc;
use std::time::{Duration, Instant};

use kyc_chain::{ChainSubmitter, JsonRpcChainClient, LocalSigner, SubmitterConfig};
use kyc_core::{Address, KycError, VerificationSource};
use kyc_pipeline::{Oracle, OracleContext};
use kyc_rpc::NodeStatus;
use kyc_sources::{FinancialSourceClient, IdentitySourceClient};

use crate::config::{expand_tilde, DaemonConfig, MAX_REQUEST_TIMEOUT_SECS};

/// Resolve the signing key: the explicit override wins, otherwise the key
/// file named in `[chain]` is read.
pub fn load_private_key(
    override_key: Option<&str>,
    config: &DaemonConfig,
) -> Result<String, KycError> {
    if let Some(key) = override_key {
        return Ok(key.trim().to_string());
    }
    let path = expand_tilde(&config.chain.private_key_path);
    std::fs::read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| KycError::Config(format!("cannot read private key file {}: {}", path, e)))
}

/// Build the oracle and the startup facts the RPC layer reports.
pub fn build_oracle(
    config: &DaemonConfig,
    private_key: &str,
) -> Result<(Oracle, NodeStatus), KycError> {
    let timeout_secs = config.sources.request_timeout_secs;
    if timeout_secs == 0 || timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
        return Err(KycError::Config(format!(
            "[sources] request_timeout_secs must be between 1 and {}, got {}",
            MAX_REQUEST_TIMEOUT_SECS, timeout_secs
        )));
    }
    let timeout = Duration::from_secs(timeout_secs);
    let mut sources: Vec<Arc<dyn VerificationSource>> = Vec::new();

    if config.sources.identity_enabled {
        let client = IdentitySourceClient::with_timeout(&config.sources.identity_api_url, timeout)?;
        tracing::info!("Identity source enabled: {}", config.sources.identity_api_url);
        sources.push(Arc::new(client));
    }
    if config.sources.financial_enabled {
        let client = FinancialSourceClient::with_timeout(
            &config.sources.financial_api_url,
            &config.sources.financial_api_key,
            timeout,
        )?;
        tracing::info!("Financial source enabled: {}", config.sources.financial_api_url);
        sources.push(Arc::new(client));
    }

    let contract: Address = config
        .chain
        .contract_address
        .parse()
        .map_err(|e| KycError::Config(format!("[chain] contract_address: {}", e)))?;
    let signer = LocalSigner::from_hex(private_key)?;
    tracing::info!("Oracle signer: {}", signer.address().to_checksum());

    let client = JsonRpcChainClient::new(&config.chain.rpc_url)?;
    let submitter = ChainSubmitter::new(
        client,
        signer,
        SubmitterConfig {
            contract,
            function_signature: config.chain.function_signature.clone(),
            gas_limit: config.chain.gas_limit,
        },
    )?;

    let status = NodeStatus {
        chain_rpc: submitter.endpoint(),
        gas_limit: submitter.gas_limit(),
        start_time: Instant::now(),
    };
    let context = OracleContext::new(sources, Arc::new(submitter))?;
    Ok((Oracle::new(context), status))
}
