// crates/kyc-pipeline/src/lib.rs
//
// kyc-pipeline: the request orchestrator.
//
//   received -> sources-pending -> aggregating -> proof-generated -> submitting -> done
//
// with `failed` reachable from every non-terminal state.

pub mod context;
pub mod orchestrator;
pub mod state;

pub use context::OracleContext;
pub use orchestrator::{Oracle, PipelineFailure, VerificationReceipt};
pub use state::{PipelineState, PipelineStateMachine};
