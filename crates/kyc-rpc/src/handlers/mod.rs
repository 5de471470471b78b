// crates/kyc-rpc/src/handlers/mod.rs
//
// Handler modules for the RPC endpoints. Each module defines request/response
// types and handler functions for one API group.

pub mod node;
pub mod verify;

use kyc_core::ErrorCategory;

/// A failed handler call: message plus the taxonomy class shown to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    pub kind: ErrorCategory,
    pub message: String,
}

impl HandlerError {
    pub fn new(kind: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::InvalidInput, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::InternalError, message)
    }
}
