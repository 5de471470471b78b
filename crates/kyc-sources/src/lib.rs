// crates/kyc-sources/src/lib.rs
//
// kyc-sources: Verification Source Clients.
//
// One client per provider, each implementing `kyc_core::VerificationSource`:
// - `IdentitySourceClient`: GET by subject address, soft-fail by default.
// - `FinancialSourceClient`: POST with the document payload and a bearer
//   credential, hard-fail by default.
//
// Every call goes through a reqwest client with a bounded timeout; there are
// no retries and no response caching.

pub mod financial;
pub mod http;
pub mod identity;

#[cfg(test)]
pub(crate) mod mock_server;

pub use financial::FinancialSourceClient;
pub use http::{build_http_client, DEFAULT_REQUEST_TIMEOUT};
pub use identity::{IdentitySourceClient, FALLBACK_RISK_SCORE};
