// crates/kyc-core/src/verdict.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::source::{FinancialAttributes, IdentityAttributes};

/// Which sources reported `verified = true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    DualVerified,
    FirstOnly,
    SecondOnly,
    Unverified,
}

impl Classification {
    /// Total over the two verified flags. A source that is not configured
    /// counts as not verified.
    pub fn from_flags(first_verified: bool, second_verified: bool) -> Self {
        match (first_verified, second_verified) {
            (true, true) => Classification::DualVerified,
            (true, false) => Classification::FirstOnly,
            (false, true) => Classification::SecondOnly,
            (false, false) => Classification::Unverified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::DualVerified => "dual-verified",
            Classification::FirstOnly => "first-only",
            Classification::SecondOnly => "second-only",
            Classification::Unverified => "unverified",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single verdict produced by the aggregator for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedVerdict {
    /// Conjunction of every configured source's verified flag.
    pub final_verified: bool,
    /// Combined risk score, clamped to `[0, 100]`.
    pub risk_score: u8,
    /// Identity source verified flag; `None` when that source is not configured.
    pub identity_verified: Option<bool>,
    /// Financial source verified flag; `None` when that source is not configured.
    pub financial_verified: Option<bool>,
    pub classification: Classification,
    /// Identity attributes kept for audit logging.
    pub identity: Option<IdentityAttributes>,
    /// Financial attributes kept for audit logging.
    pub financial: Option<FinancialAttributes>,
    /// True if any contributing result was a soft-fail default.
    pub used_default: bool,
}
