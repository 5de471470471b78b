use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::SourceKind;

/// Oracle-wide error type.
///
/// Every variant maps onto one [`ErrorCategory`], which is what callers of the
/// service see.
#[derive(Debug, Error)]
pub enum KycError {
    /// Malformed request input (e.g. the subject is not a chain address).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transport failure or timeout talking to a provider.
    #[error("{provider} source unreachable: {reason}")]
    SourceUnreachable { provider: SourceKind, reason: String },

    /// Provider answered with a non-success HTTP status.
    #[error("{provider} source rejected the request ({status}): {body}")]
    SourceRejected {
        provider: SourceKind,
        status: u16,
        body: String,
    },

    /// Provider answered with a body that could not be decoded.
    #[error("{provider} source returned a malformed response: {reason}")]
    SourceMalformed { provider: SourceKind, reason: String },

    /// Source results could not be combined into a verdict.
    #[error("Aggregation error: {0}")]
    Aggregation(String),

    /// Any failure while building, signing, or broadcasting the transaction.
    #[error("Chain submission error: {0}")]
    Chain(#[from] ChainError),

    /// The caller abandoned the request before it completed.
    #[error("Request cancelled")]
    Cancelled,

    /// Invalid process configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A bug or runtime fault inside the oracle itself (e.g. a panicked task).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Chain-side failure points. Each external read is its own variant so a
/// failed submission says exactly which step broke.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("failed to read chain id: {0}")]
    ChainId(String),

    #[error("failed to read pending nonce: {0}")]
    Nonce(String),

    #[error("failed to read gas price: {0}")]
    GasPrice(String),

    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("failed to sign transaction: {0}")]
    Signing(String),

    #[error("broadcast rejected: {0}")]
    Broadcast(String),

    #[error("malformed RPC response: {0}")]
    MalformedResponse(String),
}

/// Externally visible failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    InvalidInput,
    SourceUnreachable,
    AggregationError,
    ChainSubmissionError,
    Cancelled,
    InternalError,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidInput => "invalid-input",
            ErrorCategory::SourceUnreachable => "source-unreachable",
            ErrorCategory::AggregationError => "aggregation-error",
            ErrorCategory::ChainSubmissionError => "chain-submission-error",
            ErrorCategory::Cancelled => "cancelled",
            ErrorCategory::InternalError => "internal-error",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl KycError {
    /// The failure class reported to callers.
    pub fn category(&self) -> ErrorCategory {
        match self {
            KycError::InvalidInput(_) => ErrorCategory::InvalidInput,
            KycError::SourceUnreachable { .. }
            | KycError::SourceRejected { .. }
            | KycError::SourceMalformed { .. } => ErrorCategory::SourceUnreachable,
            KycError::Aggregation(_) => ErrorCategory::AggregationError,
            KycError::Chain(_) => ErrorCategory::ChainSubmissionError,
            KycError::Cancelled => ErrorCategory::Cancelled,
            KycError::Config(_) | KycError::Serialization(_) | KycError::Internal(_) => {
                ErrorCategory::InternalError
            }
        }
    }

    /// True for transport-level provider failures, the only kind a soft-fail
    /// source may recover from.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, KycError::SourceUnreachable { .. })
    }
}

impl From<serde_json::Error> for KycError {
    fn from(e: serde_json::Error) -> Self {
        KycError::Serialization(e.to_string())
    }
}
