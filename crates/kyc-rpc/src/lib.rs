// crates/kyc-rpc/src/lib.rs
//
// kyc-rpc: RPC server for the KYC oracle.
//
// Exposes the oracle pipeline as a JSON envelope API on a single tonic
// service. Methods: kyc/verify, node/health, node/info.

pub mod handlers;
pub mod middleware;
pub mod server;

pub use handlers::node::NodeStatus;
pub use handlers::HandlerError;
pub use server::{JsonRpcRequest, JsonRpcResponse, KycRpcServer, RpcConfig, RPC_PATH, SERVICE_NAME};
