// crates/kyc-pipeline/src/context.rs
//
// OracleContext: everything a request needs, fixed at startup.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use kyc_core::{KycError, SourceKind, VerdictSubmitter, VerificationSource};
use kyc_verify::ProofGenerator;

/// Immutable process-wide configuration shared by every request.
#[derive(Clone)]
pub struct OracleContext {
    sources: Vec<Arc<dyn VerificationSource>>,
    proof_generator: ProofGenerator,
    submitter: Arc<dyn VerdictSubmitter>,
}

impl fmt::Debug for OracleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleContext")
            .field("sources", &self.source_kinds())
            .field("contract", &self.submitter.contract())
            .field("signer", &self.submitter.signer())
            .finish()
    }
}

impl OracleContext {
    /// Requires at least one source and at most one per provider kind.
    pub fn new(
        sources: Vec<Arc<dyn VerificationSource>>,
        submitter: Arc<dyn VerdictSubmitter>,
    ) -> Result<Self, KycError> {
        if sources.is_empty() {
            return Err(KycError::Config(
                "at least one verification source must be enabled".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for source in &sources {
            if !seen.insert(source.kind()) {
                return Err(KycError::Config(format!(
                    "{} source configured more than once",
                    source.kind()
                )));
            }
        }
        Ok(Self {
            sources,
            proof_generator: ProofGenerator::new(),
            submitter,
        })
    }

    pub fn sources(&self) -> &[Arc<dyn VerificationSource>] {
        &self.sources
    }

    pub fn source_kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|s| s.kind()).collect()
    }

    pub fn proof_generator(&self) -> &ProofGenerator {
        &self.proof_generator
    }

    pub fn submitter(&self) -> &Arc<dyn VerdictSubmitter> {
        &self.submitter
    }
}
