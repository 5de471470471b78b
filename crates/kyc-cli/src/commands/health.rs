// crates/kyc-cli/src/commands/health.rs
//
// `kyc health`: daemon liveness and chain target.

use serde_json::json;

use crate::output::{format_fields, format_json, OutputFormat};
use crate::rpc_client::rpc_call;

/// Run the health command.
pub async fn run(endpoint: &str, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let result = rpc_call(endpoint, "node/health", json!({}))
        .await
        .map_err(|e| format!("Could not reach {}: {}", endpoint, e))?
        .into_result()?;

    match format {
        OutputFormat::Json => println!("{}", format_json(&result)),
        OutputFormat::Table => println!(
            "{}",
            format_fields(
                &result,
                &[
                    ("Status", "status"),
                    ("Service", "service"),
                    ("Contract", "contract"),
                    ("Signer", "signer"),
                    ("Chain RPC", "chain_rpc"),
                    ("Sources", "sources"),
                ],
            )
        ),
    }

    Ok(())
}
