// crates/kyc-cli/src/rpc_client.rs
//
// Lightweight JSON-RPC client that POSTs to the kyc-oracle HTTP endpoint.

use serde::{Deserialize, Serialize};

use kyc_rpc::RPC_PATH;

/// Mirrors the server's JsonRpcRequest envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub method: String,
    pub params: serde_json::Value,
}

/// Mirrors the server's JsonRpcResponse envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub success: bool,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    #[serde(default)]
    pub error_kind: Option<String>,
}

impl JsonRpcResponse {
    /// The result payload, or the server's error as a message.
    pub fn into_result(self) -> Result<serde_json::Value, String> {
        if self.success {
            return Ok(self.result.unwrap_or(serde_json::Value::Null));
        }
        let message = self.error.unwrap_or_else(|| "unknown error".to_string());
        Err(match self.error_kind {
            Some(kind) => format!("{} ({})", message, kind),
            None => message,
        })
    }
}

/// Full URL of the call endpoint under a daemon base URL.
pub fn call_url(endpoint: &str) -> String {
    format!("{}{}", endpoint.trim_end_matches('/'), RPC_PATH)
}

/// Send a JSON-RPC call to the daemon and return the parsed response.
pub async fn rpc_call(
    endpoint: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<JsonRpcResponse, Box<dyn std::error::Error>> {
    let request = JsonRpcRequest {
        method: method.to_string(),
        params,
    };

    let client = reqwest::Client::new();
    let resp = client
        .post(call_url(endpoint))
        .json(&request)
        .send()
        .await?;

    let rpc_response: JsonRpcResponse = resp.json().await?;
    Ok(rpc_response)
}
