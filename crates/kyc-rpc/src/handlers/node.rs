// crates/kyc-rpc/src/handlers/node.rs
//
// Node info and health handlers: GetHealth, GetNodeInfo.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use kyc_pipeline::Oracle;

use super::HandlerError;

/// Static facts about the running oracle, captured at startup.
#[derive(Debug, Clone)]
pub struct NodeStatus {
    pub chain_rpc: String,
    pub gas_limit: u64,
    pub start_time: Instant,
}

// ---------------------------------------------------------------------------
// GetHealth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetHealthRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetHealthResponse {
    pub status: String,
    pub service: String,
    /// Target contract, EIP-55 checksummed.
    pub contract: String,
    /// Oracle signing account, EIP-55 checksummed.
    pub signer: String,
    pub chain_rpc: String,
    /// Enabled verification sources.
    pub sources: Vec<String>,
}

pub async fn handle_get_health(
    _request: GetHealthRequest,
    oracle: &Oracle,
    status: &NodeStatus,
) -> Result<GetHealthResponse, HandlerError> {
    let context = oracle.context();
    Ok(GetHealthResponse {
        status: "healthy".to_string(),
        service: "kyc-oracle".to_string(),
        contract: context.submitter().contract().to_checksum(),
        signer: context.submitter().signer().to_checksum(),
        chain_rpc: status.chain_rpc.clone(),
        sources: context.source_kinds().iter().map(|k| k.to_string()).collect(),
    })
}

// ---------------------------------------------------------------------------
// GetNodeInfo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetNodeInfoRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetNodeInfoResponse {
    /// Software version.
    pub version: String,
    pub uptime_seconds: u64,
    pub sources: Vec<String>,
    pub gas_limit: u64,
}

pub async fn handle_get_node_info(
    _request: GetNodeInfoRequest,
    oracle: &Oracle,
    status: &NodeStatus,
) -> Result<GetNodeInfoResponse, HandlerError> {
    Ok(GetNodeInfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: status.start_time.elapsed().as_secs(),
        sources: oracle
            .context()
            .source_kinds()
            .iter()
            .map(|k| k.to_string())
            .collect(),
        gas_limit: status.gas_limit,
    })
}
