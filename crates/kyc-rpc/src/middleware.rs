// crates/kyc-rpc/src/middleware.rs
//
// Logging interceptor for the RPC server.

use tonic::{Request, Status};

/// Logs each incoming request's metadata, minus any credentials.
pub fn logging_interceptor(req: Request<()>) -> Result<Request<()>, Status> {
    let metadata = req.metadata();
    let user_agent = metadata
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info!(
        "Incoming RPC request (user-agent: {}, authorization: {})",
        user_agent,
        if metadata.contains_key("authorization") {
            "<redacted>"
        } else {
            "none"
        }
    );
    Ok(req)
}
