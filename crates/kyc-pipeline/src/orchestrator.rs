// crates/kyc-pipeline/src/orchestrator.rs
//
// Oracle: drives one verification request from input to chain submission.
//
// Sources run as parallel tasks joined at a barrier: every configured source
// must answer (or be replaced by its soft-fail default) before aggregation.
// A hard source failure or caller cancellation ends the wait immediately and
// aborts the remaining source tasks. Once the barrier is passed the request
// runs to completion; nothing is retried.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use uuid::Uuid;

use kyc_core::{
    ChainSubmission, CombinedVerdict, FailurePolicy, KycError, Proof, SourceResult,
    ValidatedRequest, VerificationRequest,
};
use kyc_verify::aggregate;

use crate::context::OracleContext;
use crate::state::{PipelineState, PipelineStateMachine};

/// Outcome of a request that reached `done`.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReceipt {
    pub request_id: Uuid,
    pub verdict: CombinedVerdict,
    pub proof: Proof,
    pub submission: ChainSubmission,
}

/// Outcome of a request that reached `failed`.
#[derive(Debug, thiserror::Error)]
#[error("request {request_id} failed while {failed_at}: {error}")]
pub struct PipelineFailure {
    pub request_id: Uuid,
    /// State the request was in when it failed.
    pub failed_at: PipelineState,
    #[source]
    pub error: KycError,
}

/// The oracle pipeline. Cheap to clone; clones share one context.
#[derive(Debug, Clone)]
pub struct Oracle {
    context: Arc<OracleContext>,
}

impl Oracle {
    pub fn new(context: OracleContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    pub fn context(&self) -> &OracleContext {
        &self.context
    }

    /// Run a request with no external cancellation.
    pub async fn process(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationReceipt, PipelineFailure> {
        self.process_until(request, std::future::pending::<()>()).await
    }

    /// Run a request; if `cancel` completes while sources are pending, the
    /// request fails with `KycError::Cancelled`.
    pub async fn process_until<F>(
        &self,
        request: &VerificationRequest,
        cancel: F,
    ) -> Result<VerificationReceipt, PipelineFailure>
    where
        F: Future<Output = ()>,
    {
        let request_id = Uuid::now_v7();
        let mut machine = PipelineStateMachine::new(request_id);
        tracing::info!(request_id = %request_id, "Received verification request");

        let validated = match request.validate() {
            Ok(validated) => validated,
            Err(e) => return Err(fail(&mut machine, request_id, e)),
        };
        tracing::info!(request_id = %request_id, "Subject: {}", validated.subject);

        if let Err(e) = advance(&mut machine, PipelineState::SourcesPending) {
            return Err(fail(&mut machine, request_id, e));
        }

        let results = tokio::select! {
            biased;
            _ = cancel => Err(KycError::Cancelled),
            results = self.collect_sources(request_id, &validated) => results,
        };
        let results = match results {
            Ok(results) => results,
            Err(e) => return Err(fail(&mut machine, request_id, e)),
        };

        match self.finish(&mut machine, request_id, &validated, &results).await {
            Ok(receipt) => Ok(receipt),
            Err(e) => Err(fail(&mut machine, request_id, e)),
        }
    }

    /// Fan out to every configured source and wait for all of them.
    async fn collect_sources(
        &self,
        request_id: Uuid,
        request: &ValidatedRequest,
    ) -> Result<Vec<SourceResult>, KycError> {
        let mut tasks = JoinSet::new();
        for source in self.context.sources() {
            let source = Arc::clone(source);
            let request = request.clone();
            tasks.spawn(async move {
                let outcome = source.fetch(&request).await;
                (source, outcome)
            });
        }

        let mut results = Vec::with_capacity(self.context.sources().len());
        while let Some(joined) = tasks.join_next().await {
            let (source, outcome) =
                joined.map_err(|e| KycError::Internal(format!("source task failed: {}", e)))?;
            match outcome {
                Ok(result) => {
                    tracing::debug!(
                        request_id = %request_id,
                        "{} source answered: verified={}, risk_score={}",
                        result.source,
                        result.verified,
                        result.risk_score
                    );
                    results.push(result);
                }
                Err(e) if e.is_unreachable() && source.failure_policy() == FailurePolicy::SoftFail => {
                    let fallback = source.fallback().ok_or(e)?;
                    tracing::warn!(
                        request_id = %request_id,
                        "{} source unreachable, using conservative default",
                        source.kind()
                    );
                    results.push(fallback);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(results)
    }

    async fn finish(
        &self,
        machine: &mut PipelineStateMachine,
        request_id: Uuid,
        request: &ValidatedRequest,
        results: &[SourceResult],
    ) -> Result<VerificationReceipt, KycError> {
        advance(machine, PipelineState::Aggregating)?;
        let verdict = aggregate(results)?;
        tracing::info!(
            request_id = %request_id,
            "Verdict: verified={}, risk_score={}, classification={}",
            verdict.final_verified,
            verdict.risk_score,
            verdict.classification
        );

        let proof = self.context.proof_generator().generate(
            &request.subject,
            verdict.final_verified,
            verdict.risk_score,
        );
        advance(machine, PipelineState::ProofGenerated)?;

        advance(machine, PipelineState::Submitting)?;
        let submission = self
            .context
            .submitter()
            .submit(&request.subject, verdict.final_verified, verdict.risk_score, &proof)
            .await?;

        advance(machine, PipelineState::Done)?;
        tracing::info!(
            request_id = %request_id,
            "Verification complete: tx={}",
            submission.tx_hash
        );

        Ok(VerificationReceipt {
            request_id,
            verdict,
            proof,
            submission,
        })
    }
}

fn advance(machine: &mut PipelineStateMachine, next: PipelineState) -> Result<(), KycError> {
    machine.transition(next).map_err(KycError::Internal)
}

fn fail(machine: &mut PipelineStateMachine, request_id: Uuid, error: KycError) -> PipelineFailure {
    let failed_at = machine.current();
    tracing::error!(
        request_id = %request_id,
        "Request failed while {} ({}): {}",
        failed_at,
        error.category(),
        error
    );
    if let Err(e) = machine.transition(PipelineState::Failed) {
        tracing::error!(request_id = %request_id, "{}", e);
    }
    PipelineFailure {
        request_id,
        failed_at,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use async_trait::async_trait;
    use kyc_core::{
        Address, ChainError, Classification, IdentityAttributes, SourceAttributes, SourceKind,
        TxHash, TxSignature, VerdictSubmitter, VerificationSource,
    };

    enum Behavior {
        Answer { verified: bool, risk_score: u8 },
        Unreachable,
        Rejected,
    }

    struct StubSource {
        kind: SourceKind,
        policy: FailurePolicy,
        behavior: Behavior,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(kind: SourceKind, policy: FailurePolicy, behavior: Behavior) -> Self {
            Self {
                kind,
                policy,
                behavior,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn attributes(&self) -> SourceAttributes {
            match self.kind {
                SourceKind::Identity => SourceAttributes::Identity(IdentityAttributes {
                    nationality: "TWN".to_string(),
                    is_local_resident: true,
                    age: 30,
                }),
                SourceKind::Financial => SourceAttributes::Financial(kyc_core::FinancialAttributes {
                    credit_score: 700,
                    employment_status: "employed".to_string(),
                    address_verified: true,
                    provider: None,
                    reason: None,
                }),
            }
        }
    }

    #[async_trait]
    impl VerificationSource for StubSource {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        fn failure_policy(&self) -> FailurePolicy {
            self.policy
        }

        fn fallback(&self) -> Option<SourceResult> {
            (self.policy == FailurePolicy::SoftFail).then(|| SourceResult {
                source: self.kind,
                verified: false,
                risk_score: 50,
                attributes: match self.kind {
                    SourceKind::Identity => SourceAttributes::Identity(IdentityAttributes::unknown()),
                    SourceKind::Financial => self.attributes(),
                },
                defaulted: true,
            })
        }

        async fn fetch(&self, _request: &ValidatedRequest) -> Result<SourceResult, KycError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match self.behavior {
                Behavior::Answer { verified, risk_score } => Ok(SourceResult {
                    source: self.kind,
                    verified,
                    risk_score,
                    attributes: self.attributes(),
                    defaulted: false,
                }),
                Behavior::Unreachable => Err(KycError::SourceUnreachable {
                    provider: self.kind,
                    reason: "connection refused".to_string(),
                }),
                Behavior::Rejected => Err(KycError::SourceRejected {
                    provider: self.kind,
                    status: 503,
                    body: "maintenance".to_string(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSubmitter {
        calls: Mutex<Vec<(Address, bool, u8)>>,
        fail: bool,
    }

    #[async_trait]
    impl VerdictSubmitter for RecordingSubmitter {
        async fn submit(
            &self,
            subject: &Address,
            verified: bool,
            risk_score: u8,
            _proof: &Proof,
        ) -> Result<ChainSubmission, KycError> {
            if self.fail {
                return Err(ChainError::GasPrice("node offline".to_string()).into());
            }
            let mut calls = self.calls.lock().unwrap();
            calls.push((*subject, verified, risk_score));
            Ok(ChainSubmission {
                chain_id: 1,
                nonce: calls.len() as u64 - 1,
                gas_price: 1,
                gas_limit: 300_000,
                value: 0,
                contract: Address::ZERO,
                call_data: Vec::new(),
                signature: TxSignature { v: 37, r: [1; 32], s: [2; 32] },
                tx_hash: TxHash([calls.len() as u8; 32]),
            })
        }

        fn contract(&self) -> Address {
            Address::ZERO
        }

        fn signer(&self) -> Address {
            Address::ZERO
        }
    }

    fn oracle(
        sources: Vec<Arc<StubSource>>,
        submitter: Arc<RecordingSubmitter>,
    ) -> Oracle {
        let sources = sources
            .into_iter()
            .map(|s| s as Arc<dyn VerificationSource>)
            .collect();
        Oracle::new(OracleContext::new(sources, submitter).unwrap())
    }

    fn request() -> VerificationRequest {
        VerificationRequest::new(
            "0x52908400098527886e0f7030069857d2e4169ee7",
            "P1234567",
            "passport",
        )
    }

    #[tokio::test]
    async fn waits_for_every_source_before_aggregating() {
        let identity = Arc::new(
            StubSource::new(
                SourceKind::Identity,
                FailurePolicy::SoftFail,
                Behavior::Answer { verified: true, risk_score: 10 },
            )
            .delayed(Duration::from_millis(150)),
        );
        let financial = Arc::new(StubSource::new(
            SourceKind::Financial,
            FailurePolicy::HardFail,
            Behavior::Answer { verified: true, risk_score: 20 },
        ));
        let submitter = Arc::new(RecordingSubmitter::default());
        let oracle = oracle(vec![identity, financial], submitter.clone());

        let receipt = oracle.process(&request()).await.unwrap();
        assert!(receipt.verdict.final_verified);
        assert_eq!(receipt.verdict.risk_score, 6);
        assert_eq!(receipt.verdict.classification, Classification::DualVerified);
        assert_eq!(submitter.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_subject_fails_before_any_call() {
        let identity = Arc::new(StubSource::new(
            SourceKind::Identity,
            FailurePolicy::SoftFail,
            Behavior::Answer { verified: true, risk_score: 10 },
        ));
        let submitter = Arc::new(RecordingSubmitter::default());
        let oracle = oracle(vec![identity.clone()], submitter.clone());

        let bad = VerificationRequest::new("0x1234", "P1", "passport");
        let failure = oracle.process(&bad).await.unwrap_err();
        assert_eq!(failure.failed_at, PipelineState::Received);
        assert_eq!(failure.error.category(), kyc_core::ErrorCategory::InvalidInput);
        assert_eq!(identity.calls.load(Ordering::SeqCst), 0);
        assert!(submitter.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn soft_fail_source_falls_back_on_unreachable() {
        let identity = Arc::new(StubSource::new(
            SourceKind::Identity,
            FailurePolicy::SoftFail,
            Behavior::Unreachable,
        ));
        let financial = Arc::new(StubSource::new(
            SourceKind::Financial,
            FailurePolicy::HardFail,
            Behavior::Answer { verified: true, risk_score: 5 },
        ));
        let submitter = Arc::new(RecordingSubmitter::default());
        let oracle = oracle(vec![identity, financial], submitter.clone());

        let receipt = oracle.process(&request()).await.unwrap();
        assert!(!receipt.verdict.final_verified);
        assert!(receipt.verdict.used_default);
        assert_eq!(receipt.verdict.risk_score, 38);
        assert_eq!(receipt.verdict.classification, Classification::SecondOnly);
        assert_eq!(submitter.calls.lock().unwrap()[0].2, 38);
    }

    #[tokio::test]
    async fn soft_fail_source_still_propagates_rejections() {
        let identity = Arc::new(StubSource::new(
            SourceKind::Identity,
            FailurePolicy::SoftFail,
            Behavior::Rejected,
        ));
        let submitter = Arc::new(RecordingSubmitter::default());
        let oracle = oracle(vec![identity], submitter.clone());

        let failure = oracle.process(&request()).await.unwrap_err();
        assert_eq!(failure.failed_at, PipelineState::SourcesPending);
        assert!(matches!(failure.error, KycError::SourceRejected { status: 503, .. }));
        assert!(submitter.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn hard_failure_short_circuits_slow_sources() {
        let identity = Arc::new(
            StubSource::new(
                SourceKind::Identity,
                FailurePolicy::SoftFail,
                Behavior::Answer { verified: true, risk_score: 10 },
            )
            .delayed(Duration::from_secs(5)),
        );
        let financial = Arc::new(StubSource::new(
            SourceKind::Financial,
            FailurePolicy::HardFail,
            Behavior::Unreachable,
        ));
        let submitter = Arc::new(RecordingSubmitter::default());
        let oracle = oracle(vec![identity, financial], submitter.clone());

        let started = Instant::now();
        let failure = oracle.process(&request()).await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(failure.failed_at, PipelineState::SourcesPending);
        assert_eq!(
            failure.error.category(),
            kyc_core::ErrorCategory::SourceUnreachable
        );
        assert!(submitter.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancellation_abandons_the_wait() {
        let identity = Arc::new(
            StubSource::new(
                SourceKind::Identity,
                FailurePolicy::SoftFail,
                Behavior::Answer { verified: true, risk_score: 10 },
            )
            .delayed(Duration::from_secs(5)),
        );
        let submitter = Arc::new(RecordingSubmitter::default());
        let oracle = oracle(vec![identity], submitter.clone());

        let started = Instant::now();
        let failure = oracle
            .process_until(&request(), tokio::time::sleep(Duration::from_millis(50)))
            .await
            .unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(matches!(failure.error, KycError::Cancelled));
        assert_eq!(failure.failed_at, PipelineState::SourcesPending);
        assert!(submitter.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn chain_failure_is_reported_at_submitting() {
        let financial = Arc::new(StubSource::new(
            SourceKind::Financial,
            FailurePolicy::HardFail,
            Behavior::Answer { verified: true, risk_score: 20 },
        ));
        let submitter = Arc::new(RecordingSubmitter {
            fail: true,
            ..Default::default()
        });
        let oracle = oracle(vec![financial], submitter);

        let failure = oracle.process(&request()).await.unwrap_err();
        assert_eq!(failure.failed_at, PipelineState::Submitting);
        assert_eq!(
            failure.error.category(),
            kyc_core::ErrorCategory::ChainSubmissionError
        );
    }

    #[test]
    fn context_requires_distinct_sources() {
        let submitter: Arc<dyn VerdictSubmitter> = Arc::new(RecordingSubmitter::default());
        assert!(OracleContext::new(Vec::new(), submitter.clone()).is_err());

        let a: Arc<dyn VerificationSource> = Arc::new(StubSource::new(
            SourceKind::Financial,
            FailurePolicy::HardFail,
            Behavior::Unreachable,
        ));
        let b: Arc<dyn VerificationSource> = Arc::new(StubSource::new(
            SourceKind::Financial,
            FailurePolicy::HardFail,
            Behavior::Unreachable,
        ));
        assert!(OracleContext::new(vec![a, b], submitter).is_err());
    }
}
