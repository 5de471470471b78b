// crates/kyc-core/src/request.rs

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::KycError;

/// An inbound verification request as received on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationRequest {
    /// Subject chain address, unvalidated.
    pub user_address: String,
    /// Opaque document identifier forwarded to document-based providers.
    pub document_id: String,
    /// Opaque document type (e.g. "passport", "national_id").
    pub document_type: String,
}

/// A request whose subject has been validated as a chain address.
///
/// Only this type is handed to verification sources, so no provider can be
/// called with a malformed subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub subject: Address,
    pub document_id: String,
    pub document_type: String,
}

impl VerificationRequest {
    pub fn new(
        user_address: impl Into<String>,
        document_id: impl Into<String>,
        document_type: impl Into<String>,
    ) -> Self {
        Self {
            user_address: user_address.into(),
            document_id: document_id.into(),
            document_type: document_type.into(),
        }
    }

    /// Validate the subject address. Has no side effects. Surrounding
    /// whitespace is not stripped; the subject must be the bare address.
    pub fn validate(&self) -> Result<ValidatedRequest, KycError> {
        let subject: Address = self.user_address.parse()?;
        Ok(ValidatedRequest {
            subject,
            document_id: self.document_id.clone(),
            document_type: self.document_type.clone(),
        })
    }
}
