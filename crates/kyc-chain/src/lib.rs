// crates/kyc-chain/src/lib.rs
//
// kyc-chain: Transaction Builder / Submitter for the KYC oracle.
//
// Encodes the registry contract call, signs a legacy EIP-155 transaction with
// the oracle's secp256k1 key, and broadcasts it through an EVM JSON-RPC node.

pub mod abi;
pub mod rpc;
pub mod signer;
pub mod submitter;
pub mod transaction;

#[cfg(test)]
pub(crate) mod mock_rpc;

pub use abi::{encode_update_call, function_selector, DEFAULT_FUNCTION_SIGNATURE};
pub use rpc::{ChainClient, JsonRpcChainClient};
pub use signer::LocalSigner;
pub use submitter::{ChainSubmitter, SubmitterConfig, DEFAULT_GAS_LIMIT};
pub use transaction::{LegacyTransaction, SignedTransaction};
