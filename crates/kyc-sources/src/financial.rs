// crates/kyc-sources/src/financial.rs
//
// Document/financial KYC provider client. One authenticated POST per request;
// unreachable providers abort the request unless the policy is overridden.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use kyc_core::{
    FailurePolicy, FinancialAttributes, KycError, SourceAttributes, SourceKind, SourceResult,
    ValidatedRequest, VerificationSource, MAX_RISK_SCORE,
};

use crate::http::{build_http_client, send_json, DEFAULT_REQUEST_TIMEOUT};
use crate::identity::FALLBACK_RISK_SCORE;

#[derive(Debug, Serialize)]
struct FinancialRequest<'a> {
    user_address: String,
    document_id: &'a str,
    document_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct FinancialResponse {
    verified: bool,
    risk_score: u8,
    #[serde(default)]
    credit_score: i64,
    #[serde(default)]
    employment_status: String,
    #[serde(default)]
    address_verified: bool,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Client for the document/financial verification provider.
#[derive(Clone)]
pub struct FinancialSourceClient {
    /// Full endpoint URL the request is POSTed to.
    pub url: String,
    api_key: String,
    policy: FailurePolicy,
    client: reqwest::Client,
}

impl fmt::Debug for FinancialSourceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinancialSourceClient")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("policy", &self.policy)
            .finish()
    }
}

impl FinancialSourceClient {
    /// Create a hard-fail client with the default 10 second timeout.
    pub fn new(url: &str, api_key: &str) -> Result<Self, KycError> {
        Self::with_timeout(url, api_key, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(url: &str, api_key: &str, timeout: Duration) -> Result<Self, KycError> {
        if api_key.trim().is_empty() {
            return Err(KycError::Config(
                "financial source requires an API key".to_string(),
            ));
        }
        Ok(Self {
            url: url.to_string(),
            api_key: api_key.trim().to_string(),
            policy: FailurePolicy::HardFail,
            client: build_http_client(timeout)?,
        })
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait]
impl VerificationSource for FinancialSourceClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Financial
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    fn fallback(&self) -> Option<SourceResult> {
        match self.policy {
            FailurePolicy::HardFail => None,
            FailurePolicy::SoftFail => Some(SourceResult {
                source: SourceKind::Financial,
                verified: false,
                risk_score: FALLBACK_RISK_SCORE,
                attributes: SourceAttributes::Financial(FinancialAttributes {
                    credit_score: 0,
                    employment_status: "unknown".to_string(),
                    address_verified: false,
                    provider: None,
                    reason: Some("provider unreachable".to_string()),
                }),
                defaulted: true,
            }),
        }
    }

    async fn fetch(&self, request: &ValidatedRequest) -> Result<SourceResult, KycError> {
        let body = FinancialRequest {
            user_address: request.subject.to_string(),
            document_id: &request.document_id,
            document_type: &request.document_type,
        };
        tracing::debug!(
            "Submitting document {} ({}) to financial source",
            request.document_id,
            request.document_type
        );

        let builder = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body);
        let response: FinancialResponse = send_json(SourceKind::Financial, builder).await?;

        if response.risk_score > MAX_RISK_SCORE {
            return Err(KycError::SourceMalformed {
                provider: SourceKind::Financial,
                reason: format!("risk score {} out of range", response.risk_score),
            });
        }

        tracing::info!(
            "Financial source: verified={}, risk_score={}",
            response.verified,
            response.risk_score
        );

        Ok(SourceResult {
            source: SourceKind::Financial,
            verified: response.verified,
            risk_score: response.risk_score,
            attributes: SourceAttributes::Financial(FinancialAttributes {
                credit_score: response.credit_score,
                employment_status: response.employment_status,
                address_verified: response.address_verified,
                provider: response.provider,
                reason: response.reason,
            }),
            defaulted: false,
        })
    }
}
