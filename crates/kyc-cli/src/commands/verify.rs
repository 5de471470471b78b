// crates/kyc-cli/src/commands/verify.rs
//
// `kyc verify`: run one subject through the oracle pipeline.

use clap::Args;
use serde_json::json;

use crate::output::{format_fields, format_json, OutputFormat};
use crate::rpc_client::rpc_call;

/// Verification request command.
#[derive(Debug, Args)]
pub struct VerifyCmd {
    /// Subject chain address (0x + 40 hex digits).
    #[arg(long)]
    pub address: String,

    /// Identity document number.
    #[arg(long)]
    pub document_id: String,

    /// Identity document type.
    #[arg(long, default_value = "passport")]
    pub document_type: String,
}

/// Run the verify command.
pub async fn run(
    endpoint: &str,
    cmd: &VerifyCmd,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let params = json!({
        "user_address": cmd.address,
        "document_id": cmd.document_id,
        "document_type": cmd.document_type,
    });
    let result = rpc_call(endpoint, "kyc/verify", params).await?.into_result()?;

    match format {
        OutputFormat::Json => println!("{}", format_json(&result)),
        OutputFormat::Table => println!(
            "{}",
            format_fields(
                &result,
                &[
                    ("Request", "request_id"),
                    ("Verified", "final_verified"),
                    ("Risk score", "risk_score"),
                    ("Classification", "classification"),
                    ("Proof", "proof"),
                    ("Proof time", "proof_timestamp"),
                    ("Tx hash", "tx_hash"),
                    ("Nonce", "nonce"),
                    ("Defaulted", "used_default"),
                ],
            )
        ),
    }

    Ok(())
}
