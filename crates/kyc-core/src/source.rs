// crates/kyc-core/src/source.rs
//
// Normalized per-provider verification results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which provider a result came from. Also fixes its slot in aggregation:
/// identity is the first source, financial the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Identity attestation provider (nationality, residency, age).
    Identity,
    /// Document/financial KYC provider (credit, employment, address checks).
    Financial,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Identity => write!(f, "identity"),
            SourceKind::Financial => write!(f, "financial"),
        }
    }
}

/// What happens to a request when a source cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Substitute a conservative default result and continue.
    SoftFail,
    /// Abort the whole request.
    HardFail,
}

/// Attributes reported by the identity source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityAttributes {
    pub nationality: String,
    pub is_local_resident: bool,
    pub age: u32,
}

impl IdentityAttributes {
    /// Attributes used when nothing is known about the subject.
    pub fn unknown() -> Self {
        Self {
            nationality: "UNKNOWN".to_string(),
            is_local_resident: false,
            age: 0,
        }
    }
}

/// Attributes reported by the financial/document source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialAttributes {
    pub credit_score: i64,
    pub employment_status: String,
    pub address_verified: bool,
    /// Provider name, when the provider reports one.
    pub provider: Option<String>,
    /// Provider's free-text explanation, when given.
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceAttributes {
    Identity(IdentityAttributes),
    Financial(FinancialAttributes),
}

/// One provider's normalized answer for one request. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceResult {
    pub source: SourceKind,
    pub verified: bool,
    /// Risk score in `[0, 100]`.
    pub risk_score: u8,
    pub attributes: SourceAttributes,
    /// True when this result was synthesized by a soft-fail fallback.
    pub defaulted: bool,
}

impl SourceResult {
    pub fn identity(&self) -> Option<&IdentityAttributes> {
        match &self.attributes {
            SourceAttributes::Identity(attrs) => Some(attrs),
            SourceAttributes::Financial(_) => None,
        }
    }

    pub fn financial(&self) -> Option<&FinancialAttributes> {
        match &self.attributes {
            SourceAttributes::Financial(attrs) => Some(attrs),
            SourceAttributes::Identity(_) => None,
        }
    }
}
