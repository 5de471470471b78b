// crates/kyc-core/src/lib.rs
//
// kyc-core: Core types, errors, and trait seams for the KYC oracle.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the request/verdict data model, the failure taxonomy, the chain
// address type, hashing helpers, and the traits implemented by the source
// clients and the chain submitter.

pub mod address;
pub mod crypto;
pub mod error;
pub mod request;
pub mod source;
pub mod submission;
pub mod traits;
pub mod verdict;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use kyc_core::CombinedVerdict;`

pub use address::Address;
pub use error::{ChainError, ErrorCategory, KycError};
pub use request::{ValidatedRequest, VerificationRequest};
pub use source::{
    FailurePolicy, FinancialAttributes, IdentityAttributes, SourceAttributes, SourceKind,
    SourceResult,
};
pub use submission::{ChainSubmission, Proof, TxHash, TxSignature};
pub use traits::{VerdictSubmitter, VerificationSource};
pub use verdict::{Classification, CombinedVerdict};

/// Maximum risk score a source or a verdict may carry.
pub const MAX_RISK_SCORE: u8 = 100;
