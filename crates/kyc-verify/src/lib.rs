// crates/kyc-verify/src/lib.rs
//
// kyc-verify: turns source results into a verdict and a freshness proof.
//
// The aggregator is the only place that decides how much each provider is
// trusted; the prover binds the verdict to the moment it was produced.

pub mod aggregator;
pub mod prover;

// Re-export key types for ergonomic access from downstream crates.
pub use aggregator::{aggregate, combine, combine_single};
pub use prover::ProofGenerator;
