// crates/kyc-verify/src/prover.rs
//
// ProofGenerator: derives the 32-byte freshness proof embedded in each
// on-chain update.
//
// digest = SHA-256("{subject}:{verified}:{risk_score}:{unix_seconds}")
//
// The proof attests when the oracle produced the verdict, not that the
// verdict is correct. Recomputing it requires the exact timestamp.

use chrono::Utc;

use kyc_core::crypto::sha256;
use kyc_core::{Address, Proof};

/// Generates freshness proofs for verdict submissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProofGenerator;

impl ProofGenerator {
    /// Create a new ProofGenerator.
    pub fn new() -> Self {
        Self
    }

    /// Canonical preimage for the digest.
    pub fn preimage(subject: &Address, verified: bool, risk_score: u8, timestamp: i64) -> String {
        format!("{}:{}:{}:{}", subject, verified, risk_score, timestamp)
    }

    /// Deterministic proof for an explicit timestamp (Unix seconds).
    pub fn generate_at(
        &self,
        subject: &Address,
        verified: bool,
        risk_score: u8,
        timestamp: i64,
    ) -> Proof {
        let preimage = Self::preimage(subject, verified, risk_score, timestamp);
        Proof {
            digest: sha256(preimage.as_bytes()),
            timestamp,
        }
    }

    /// Proof stamped with the current wall-clock time.
    pub fn generate(&self, subject: &Address, verified: bool, risk_score: u8) -> Proof {
        self.generate_at(subject, verified, risk_score, Utc::now().timestamp())
    }
}
