// crates/kyc-core/src/traits.rs

use async_trait::async_trait;

use crate::address::Address;
use crate::error::KycError;
use crate::request::ValidatedRequest;
use crate::source::{FailurePolicy, SourceKind, SourceResult};
use crate::submission::{ChainSubmission, Proof};

/// A verification provider client: fetch one result and normalize it.
///
/// Implemented by kyc-sources (one implementation per provider).
#[async_trait]
pub trait VerificationSource: Send + Sync {
    /// Which provider this client talks to.
    fn kind(&self) -> SourceKind;

    /// How an unreachable provider is handled.
    fn failure_policy(&self) -> FailurePolicy;

    /// Conservative result substituted by soft-fail sources. Hard-fail
    /// sources return `None`.
    fn fallback(&self) -> Option<SourceResult>;

    /// Make exactly one provider call for this request. No retries.
    async fn fetch(&self, request: &ValidatedRequest) -> Result<SourceResult, KycError>;
}

/// Commits a verdict on chain.
///
/// Implemented by kyc-chain.
#[async_trait]
pub trait VerdictSubmitter: Send + Sync {
    /// Encode, sign, and broadcast the update. Returns once the endpoint has
    /// accepted the transaction, not once it is mined.
    async fn submit(
        &self,
        subject: &Address,
        verified: bool,
        risk_score: u8,
        proof: &Proof,
    ) -> Result<ChainSubmission, KycError>;

    /// Address of the target contract.
    fn contract(&self) -> Address;

    /// Address of the oracle's signing account.
    fn signer(&self) -> Address;
}
