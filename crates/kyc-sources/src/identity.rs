// crates/kyc-sources/src/identity.rs
//
// Identity source client: looks up the attestation an identity provider holds
// for a subject address (nationality, residency, age).
//
// GET {base_url}/api/user-verification/{subject}

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use kyc_core::{
    FailurePolicy, IdentityAttributes, KycError, SourceAttributes, SourceKind, SourceResult,
    ValidatedRequest, VerificationSource, MAX_RISK_SCORE,
};

use crate::http::{build_http_client, send_json, DEFAULT_REQUEST_TIMEOUT};

/// Risk score of the conservative result used when a soft-fail provider
/// cannot be reached.
pub const FALLBACK_RISK_SCORE: u8 = 50;

/// Wire shape of the identity provider's answer.
#[derive(Debug, Deserialize)]
struct IdentityResponse {
    verified: bool,
    #[serde(default)]
    nationality: Option<String>,
    #[serde(default)]
    is_local_resident: bool,
    #[serde(default)]
    age: u32,
    risk_score: u8,
}

/// Client for the identity attestation provider.
#[derive(Debug, Clone)]
pub struct IdentitySourceClient {
    /// Base URL of the provider API (e.g., "http://localhost:3001").
    pub base_url: String,
    policy: FailurePolicy,
    client: reqwest::Client,
}

impl IdentitySourceClient {
    /// Create a soft-fail client with the default 10 second timeout.
    pub fn new(base_url: &str) -> Result<Self, KycError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, KycError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            policy: FailurePolicy::SoftFail,
            client: build_http_client(timeout)?,
        })
    }

    /// Override the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The conservative result: unverified, unknown attributes, elevated risk.
    pub fn default_result() -> SourceResult {
        SourceResult {
            source: SourceKind::Identity,
            verified: false,
            risk_score: FALLBACK_RISK_SCORE,
            attributes: SourceAttributes::Identity(IdentityAttributes::unknown()),
            defaulted: true,
        }
    }
}

#[async_trait]
impl VerificationSource for IdentitySourceClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Identity
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    fn fallback(&self) -> Option<SourceResult> {
        match self.policy {
            FailurePolicy::SoftFail => Some(Self::default_result()),
            FailurePolicy::HardFail => None,
        }
    }

    async fn fetch(&self, request: &ValidatedRequest) -> Result<SourceResult, KycError> {
        let url = format!("{}/api/user-verification/{}", self.base_url, request.subject);
        tracing::debug!("Querying identity source: {}", url);

        let response: IdentityResponse = send_json(SourceKind::Identity, self.client.get(&url)).await?;

        if response.risk_score > MAX_RISK_SCORE {
            return Err(KycError::SourceMalformed {
                provider: SourceKind::Identity,
                reason: format!("risk score {} out of range", response.risk_score),
            });
        }

        let attributes = IdentityAttributes {
            nationality: response
                .nationality
                .unwrap_or_else(|| IdentityAttributes::unknown().nationality),
            is_local_resident: response.is_local_resident,
            age: response.age,
        };

        tracing::info!(
            "Identity source: verified={}, nationality={}, local_resident={}",
            response.verified,
            attributes.nationality,
            attributes.is_local_resident
        );

        Ok(SourceResult {
            source: SourceKind::Identity,
            verified: response.verified,
            risk_score: response.risk_score,
            attributes: SourceAttributes::Identity(attributes),
            defaulted: false,
        })
    }
}
