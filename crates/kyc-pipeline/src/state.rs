// crates/kyc-pipeline/src/state.rs
//
// Per-request lifecycle.
//
// Valid transitions:
//   Received -> SourcesPending -> Aggregating -> ProofGenerated -> Submitting -> Done
//   Any non-terminal state -> Failed

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineState {
    /// Request accepted, subject not yet validated.
    Received,
    /// Waiting for every configured source.
    SourcesPending,
    Aggregating,
    ProofGenerated,
    /// Transaction being built, signed, and broadcast.
    Submitting,
    Done,
    Failed,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Received => "received",
            PipelineState::SourcesPending => "sources-pending",
            PipelineState::Aggregating => "aggregating",
            PipelineState::ProofGenerated => "proof-generated",
            PipelineState::Submitting => "submitting",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks one request's progress and rejects out-of-order transitions.
#[derive(Debug)]
pub struct PipelineStateMachine {
    request_id: Uuid,
    current: PipelineState,
}

impl PipelineStateMachine {
    /// Create a new state machine starting in the Received state.
    pub fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            current: PipelineState::Received,
        }
    }

    pub fn current(&self) -> PipelineState {
        self.current
    }

    /// Attempt to transition to a new state.
    ///
    /// Returns an error if the transition is not valid.
    pub fn transition(&mut self, next: PipelineState) -> Result<(), String> {
        let valid = match (self.current, next) {
            (from, PipelineState::Failed) => !from.is_terminal(),
            (PipelineState::Received, PipelineState::SourcesPending) => true,
            (PipelineState::SourcesPending, PipelineState::Aggregating) => true,
            (PipelineState::Aggregating, PipelineState::ProofGenerated) => true,
            (PipelineState::ProofGenerated, PipelineState::Submitting) => true,
            (PipelineState::Submitting, PipelineState::Done) => true,
            _ => false,
        };

        if !valid {
            return Err(format!(
                "Invalid state transition: {} -> {}",
                self.current, next
            ));
        }

        tracing::info!(
            request_id = %self.request_id,
            "State transition: {} -> {}",
            self.current,
            next
        );
        self.current = next;
        Ok(())
    }
}
