// crates/kyc-rpc/src/handlers/verify.rs
//
// kyc/verify: run one request through the oracle pipeline.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use kyc_core::VerificationRequest;
use kyc_pipeline::{Oracle, PipelineFailure, VerificationReceipt};

use super::HandlerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub user_address: String,
    pub document_id: String,
    pub document_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    /// Always "success"; failures use the error envelope.
    pub status: String,
    pub request_id: String,
    pub tx_hash: String,
    pub final_verified: bool,
    pub risk_score: u8,
    pub classification: String,
    /// 0x-prefixed proof digest.
    pub proof: String,
    /// Unix seconds mixed into the proof.
    pub proof_timestamp: i64,
    pub nonce: u64,
    /// True when a soft-fail default replaced an unreachable source.
    pub used_default: bool,
}

impl From<VerificationReceipt> for VerifyResponse {
    fn from(receipt: VerificationReceipt) -> Self {
        Self {
            status: "success".to_string(),
            request_id: receipt.request_id.to_string(),
            tx_hash: receipt.submission.tx_hash.to_string(),
            final_verified: receipt.verdict.final_verified,
            risk_score: receipt.verdict.risk_score,
            classification: receipt.verdict.classification.to_string(),
            proof: receipt.proof.to_hex(),
            proof_timestamp: receipt.proof.timestamp,
            nonce: receipt.submission.nonce,
            used_default: receipt.verdict.used_default,
        }
    }
}

impl From<PipelineFailure> for HandlerError {
    fn from(failure: PipelineFailure) -> Self {
        HandlerError::new(failure.error.category(), failure.to_string())
    }
}

/// Handle a kyc/verify request.
///
/// Returns once the update transaction has been accepted by the chain
/// endpoint, not once it is mined.
///
/// The pipeline runs on its own task. If this future is dropped (the caller
/// went away) while sources are still pending, the request is cancelled;
/// once submission has started it runs to completion so a signed nonce is
/// never abandoned half way.
pub async fn handle_verify(
    oracle: &Oracle,
    request: VerifyRequest,
) -> Result<VerifyResponse, HandlerError> {
    let request = VerificationRequest::new(
        request.user_address,
        request.document_id,
        request.document_type,
    );
    let (_caller_alive, caller_gone) = oneshot::channel::<()>();
    let oracle = oracle.clone();
    let task = tokio::spawn(async move {
        oracle
            .process_until(&request, async {
                let _ = caller_gone.await;
            })
            .await
    });
    let receipt = task
        .await
        .map_err(|e| HandlerError::internal(format!("verification task failed: {}", e)))??;
    Ok(receipt.into())
}
