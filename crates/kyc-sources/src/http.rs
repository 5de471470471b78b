// crates/kyc-sources/src/http.rs
//
// Shared HTTP plumbing for provider calls: a timeout-bounded client and the
// mapping from reqwest outcomes onto the source error taxonomy.

use std::time::Duration;

use serde::de::DeserializeOwned;

use kyc_core::{KycError, SourceKind};

/// Upper bound on a single provider call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a reqwest client whose every request is bounded by `timeout`.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, KycError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| KycError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Send a request and decode a JSON body.
///
/// Transport failures and timeouts become `SourceUnreachable`, non-success
/// statuses `SourceRejected`, undecodable bodies `SourceMalformed`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: SourceKind,
    request: reqwest::RequestBuilder,
) -> Result<T, KycError> {
    let response = request
        .send()
        .await
        .map_err(|e| KycError::SourceUnreachable {
            provider,
            reason: describe(&e),
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(KycError::SourceRejected {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| KycError::SourceUnreachable {
            provider,
            reason: format!("body read failed: {}", describe(&e)),
        })?;

    serde_json::from_slice(&bytes).map_err(|e| KycError::SourceMalformed {
        provider,
        reason: e.to_string(),
    })
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}
