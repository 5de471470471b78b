// crates/kyc-cli/src/commands/info.rs
//
// `kyc info`: daemon version, uptime, and source set.

use serde_json::json;

use crate::output::{format_fields, format_json, OutputFormat};
use crate::rpc_client::rpc_call;

pub async fn run(endpoint: &str, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let result = rpc_call(endpoint, "node/info", json!({}))
        .await?
        .into_result()?;

    match format {
        OutputFormat::Json => println!("{}", format_json(&result)),
        OutputFormat::Table => println!(
            "{}",
            format_fields(
                &result,
                &[
                    ("Version", "version"),
                    ("Uptime (s)", "uptime_seconds"),
                    ("Sources", "sources"),
                    ("Gas limit", "gas_limit"),
                ],
            )
        ),
    }

    Ok(())
}
