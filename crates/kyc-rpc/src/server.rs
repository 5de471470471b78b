// crates/kyc-rpc/src/server.rs
//
// RPC server setup: KycRpcServer and RpcConfig.
//
// A single tonic service with one method, `Call`, accepts a JSON envelope
// `{method, params}` over HTTP/1.1 or HTTP/2, dispatches to a handler, and
// answers `{success, result, error, error_kind}`. No proto codegen.

use std::future::Future;

use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tonic::transport::Server;
use tonic::Status;

use kyc_core::ErrorCategory;
use kyc_pipeline::Oracle;

use crate::handlers::node::NodeStatus;
use crate::handlers::{self, HandlerError};
use crate::middleware;

/// Fully-qualified service name; tonic routes `/{SERVICE_NAME}/*` to us.
pub const SERVICE_NAME: &str = "kyc.oracle.OracleService";

/// HTTP path clients POST envelopes to.
pub const RPC_PATH: &str = "/kyc.oracle.OracleService/Call";

// ---------------------------------------------------------------------------
// RpcConfig
// ---------------------------------------------------------------------------

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC Envelope
// ---------------------------------------------------------------------------

/// A JSON-RPC-style request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// The RPC method to invoke (e.g., "kyc/verify", "node/health").
    pub method: String,
    /// JSON-encoded parameters for the method.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// A JSON-RPC-style response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// The result data (if success).
    pub result: Option<serde_json::Value>,
    /// Error message (if not success).
    pub error: Option<String>,
    /// Failure class (if not success).
    #[serde(default)]
    pub error_kind: Option<ErrorCategory>,
}

impl JsonRpcResponse {
    fn failure(error: HandlerError) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.message),
            error_kind: Some(error.kind),
        }
    }
}

// ---------------------------------------------------------------------------
// KycRpcServer
// ---------------------------------------------------------------------------

/// The oracle's RPC server.
#[derive(Debug, Clone)]
pub struct KycRpcServer {
    config: RpcConfig,
    service: OracleServiceImpl,
}

impl KycRpcServer {
    /// Create a new server.
    ///
    /// # Arguments
    /// * `config` - Server configuration (host, port).
    /// * `oracle` - The pipeline requests are run through.
    /// * `status` - Startup facts reported by node/health and node/info.
    pub fn new(config: RpcConfig, oracle: Oracle, status: NodeStatus) -> Self {
        Self {
            config,
            service: OracleServiceImpl { oracle, status },
        }
    }

    /// Dispatch one envelope without going through HTTP.
    pub async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        self.service.dispatch(request).await
    }

    /// Serve until `shutdown` completes.
    pub async fn start_with_shutdown<F>(
        &self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send,
    {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        tracing::info!("KYC oracle RPC server starting on {}", addr);

        Server::builder()
            .accept_http1(true)
            .add_service(tonic::service::interceptor::InterceptedService::new(
                OracleJsonRpcServer::new(self.service.clone()),
                middleware::logging_interceptor,
            ))
            .serve_with_shutdown(addr, shutdown)
            .await?;

        tracing::info!("KYC oracle RPC server stopped");
        Ok(())
    }

    /// Serve until the process is terminated.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.start_with_shutdown(std::future::pending()).await
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Holds shared state and routes method names to handlers.
#[derive(Debug, Clone)]
struct OracleServiceImpl {
    oracle: Oracle,
    status: NodeStatus,
}

impl OracleServiceImpl {
    async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("Dispatching {}", request.method);
        let result = match request.method.as_str() {
            "kyc/verify" => {
                dispatch_handler(request.params, |r| async move {
                    handlers::verify::handle_verify(&self.oracle, r).await
                })
                .await
            }
            "node/health" => {
                dispatch_handler(request.params, |r| async move {
                    handlers::node::handle_get_health(r, &self.oracle, &self.status).await
                })
                .await
            }
            "node/info" => {
                dispatch_handler(request.params, |r| async move {
                    handlers::node::handle_get_node_info(r, &self.oracle, &self.status).await
                })
                .await
            }
            _ => Err(HandlerError::invalid_input(format!(
                "Unknown method: {}",
                request.method
            ))),
        };

        match result {
            Ok(value) => JsonRpcResponse {
                success: true,
                result: Some(value),
                error: None,
                error_kind: None,
            },
            Err(err) => JsonRpcResponse::failure(err),
        }
    }
}

/// Generic dispatch helper: deserialize params into a request type,
/// call the handler, and serialize the result to JSON.
async fn dispatch_handler<Req, Resp, F, Fut>(
    params: serde_json::Value,
    handler: F,
) -> Result<serde_json::Value, HandlerError>
where
    Req: serde::de::DeserializeOwned,
    Resp: serde::Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: Future<Output = Result<Resp, HandlerError>>,
{
    let params = if params.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        params
    };
    let request: Req = serde_json::from_value(params)
        .map_err(|e| HandlerError::invalid_input(format!("Failed to deserialize request: {}", e)))?;
    let response = handler(request).await?;
    serde_json::to_value(response)
        .map_err(|e| HandlerError::internal(format!("Failed to serialize response: {}", e)))
}

// ---------------------------------------------------------------------------
// Tonic Service Wiring
// ---------------------------------------------------------------------------

/// Low-level service: bytes in, JSON envelope dispatch, bytes out.
#[derive(Clone)]
pub struct OracleJsonRpcServer {
    inner: OracleServiceImpl,
}

impl std::fmt::Debug for OracleJsonRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleJsonRpcServer").finish()
    }
}

impl OracleJsonRpcServer {
    fn new(inner: OracleServiceImpl) -> Self {
        Self { inner }
    }
}

impl tonic::server::NamedService for OracleJsonRpcServer {
    const NAME: &'static str = SERVICE_NAME;
}

impl<B> tower_service::Service<http::Request<B>> for OracleJsonRpcServer
where
    B: HttpBody + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    B::Data: Send,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let body_bytes = match collect_body(req.into_body()).await {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("Failed to read request body: {}", e);
                    let resp = JsonRpcResponse::failure(HandlerError::invalid_input(format!(
                        "Failed to read request body: {}",
                        e
                    )));
                    return Ok(build_response(&resp));
                }
            };

            let rpc_request: JsonRpcRequest = match serde_json::from_slice(&body_bytes) {
                Ok(r) => r,
                Err(e) => {
                    let resp = JsonRpcResponse::failure(HandlerError::invalid_input(format!(
                        "Invalid JSON-RPC request: {}",
                        e
                    )));
                    return Ok(build_response(&resp));
                }
            };

            let rpc_response = inner.dispatch(rpc_request).await;
            Ok(build_response(&rpc_response))
        })
    }
}

/// Collect the body of an HTTP request into bytes.
async fn collect_body<B>(body: B) -> Result<Vec<u8>, String>
where
    B: HttpBody + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    B::Data: Send,
{
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    loop {
        match std::future::poll_fn(|cx| HttpBody::poll_frame(body.as_mut(), cx)).await {
            Some(Ok(frame)) => {
                if let Ok(data) = frame.into_data() {
                    use bytes::Buf;
                    collected.extend_from_slice(data.chunk());
                }
            }
            Some(Err(e)) => return Err(e.into().to_string()),
            None => break,
        }
    }

    Ok(collected)
}

/// Build an HTTP 200 response carrying the JSON envelope.
fn build_response(envelope: &JsonRpcResponse) -> http::Response<tonic::body::BoxBody> {
    let json = serde_json::to_vec(envelope).unwrap_or_default();
    let body = tonic::body::BoxBody::new(
        http_body_util::Full::new(bytes::Bytes::from(json))
            .map_err(|e| Status::internal(format!("body error: {}", e))),
    );

    let mut response = http::Response::new(body);
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use async_trait::async_trait;
    use kyc_core::{
        Address, ChainSubmission, FailurePolicy, KycError, Proof, SourceAttributes, SourceKind,
        SourceResult, TxHash, TxSignature, ValidatedRequest, VerdictSubmitter,
        VerificationSource,
    };
    use kyc_pipeline::OracleContext;
    use serde_json::json;

    use crate::handlers::verify::{handle_verify, VerifyRequest};

    struct FixedFinancial {
        reachable: bool,
        delay: Duration,
    }

    #[async_trait]
    impl VerificationSource for FixedFinancial {
        fn kind(&self) -> SourceKind {
            SourceKind::Financial
        }

        fn failure_policy(&self) -> FailurePolicy {
            FailurePolicy::HardFail
        }

        fn fallback(&self) -> Option<SourceResult> {
            None
        }

        async fn fetch(&self, _request: &ValidatedRequest) -> Result<SourceResult, KycError> {
            tokio::time::sleep(self.delay).await;
            if !self.reachable {
                return Err(KycError::SourceUnreachable {
                    provider: SourceKind::Financial,
                    reason: "connection refused".to_string(),
                });
            }
            Ok(SourceResult {
                source: SourceKind::Financial,
                verified: true,
                risk_score: 20,
                attributes: SourceAttributes::Financial(kyc_core::FinancialAttributes {
                    credit_score: 700,
                    employment_status: "employed".to_string(),
                    address_verified: true,
                    provider: None,
                    reason: None,
                }),
                defaulted: false,
            })
        }
    }

    struct AcceptingSubmitter;

    #[async_trait]
    impl VerdictSubmitter for AcceptingSubmitter {
        async fn submit(
            &self,
            _subject: &Address,
            _verified: bool,
            _risk_score: u8,
            _proof: &Proof,
        ) -> Result<ChainSubmission, KycError> {
            Ok(ChainSubmission {
                chain_id: 31337,
                nonce: 4,
                gas_price: 1,
                gas_limit: 300_000,
                value: 0,
                contract: self.contract(),
                call_data: Vec::new(),
                signature: TxSignature { v: 62709, r: [1; 32], s: [2; 32] },
                tx_hash: TxHash([0xab; 32]),
            })
        }

        fn contract(&self) -> Address {
            "0x52908400098527886e0f7030069857d2e4169ee7".parse().unwrap()
        }

        fn signer(&self) -> Address {
            Address::ZERO
        }
    }

    /// Sleeps before accepting and counts completed submissions.
    struct SlowSubmitter {
        delay: Duration,
        completed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl VerdictSubmitter for SlowSubmitter {
        async fn submit(
            &self,
            subject: &Address,
            verified: bool,
            risk_score: u8,
            proof: &Proof,
        ) -> Result<ChainSubmission, KycError> {
            tokio::time::sleep(self.delay).await;
            let submission = AcceptingSubmitter
                .submit(subject, verified, risk_score, proof)
                .await?;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(submission)
        }

        fn contract(&self) -> Address {
            AcceptingSubmitter.contract()
        }

        fn signer(&self) -> Address {
            Address::ZERO
        }
    }

    fn server(reachable: bool) -> KycRpcServer {
        server_with(
            FixedFinancial { reachable, delay: Duration::ZERO },
            Arc::new(AcceptingSubmitter),
        )
    }

    fn server_with(source: FixedFinancial, submitter: Arc<dyn VerdictSubmitter>) -> KycRpcServer {
        let context = OracleContext::new(vec![Arc::new(source)], submitter).unwrap();
        KycRpcServer::new(
            RpcConfig::default(),
            Oracle::new(context),
            NodeStatus {
                chain_rpc: "http://localhost:8545".to_string(),
                gas_limit: 300_000,
                start_time: Instant::now(),
            },
        )
    }

    fn verify_request(address: &str) -> JsonRpcRequest {
        JsonRpcRequest {
            method: "kyc/verify".to_string(),
            params: json!({
                "user_address": address,
                "document_id": "P1234567",
                "document_type": "passport",
            }),
        }
    }

    #[tokio::test]
    async fn verify_returns_receipt_fields() {
        let resp = server(true)
            .dispatch(verify_request("0x52908400098527886e0f7030069857d2e4169ee7"))
            .await;
        assert!(resp.success, "{:?}", resp.error);
        let result = resp.result.unwrap();
        assert_eq!(result["status"], "success");
        assert_eq!(result["tx_hash"], format!("0x{}", "ab".repeat(32)));
        assert_eq!(result["final_verified"], true);
        // Financial only: 20 at full weight, +15 for unknown residency.
        assert_eq!(result["risk_score"], 35);
        assert_eq!(result["classification"], "second-only");
        assert_eq!(result["nonce"], 4);
        assert!(result["proof"].as_str().unwrap().starts_with("0x"));
    }

    #[tokio::test]
    async fn verify_failures_carry_error_kind() {
        let resp = server(true).dispatch(verify_request("0xnope")).await;
        assert!(!resp.success);
        assert_eq!(resp.error_kind, Some(ErrorCategory::InvalidInput));

        let resp = server(false)
            .dispatch(verify_request("0x52908400098527886e0f7030069857d2e4169ee7"))
            .await;
        assert!(!resp.success);
        assert_eq!(resp.error_kind, Some(ErrorCategory::SourceUnreachable));
        assert!(resp.error.unwrap().contains("sources-pending"));
    }

    fn verify_params() -> VerifyRequest {
        VerifyRequest {
            user_address: "0x52908400098527886e0f7030069857d2e4169ee7".to_string(),
            document_id: "P1234567".to_string(),
            document_type: "passport".to_string(),
        }
    }

    #[tokio::test]
    async fn caller_dropping_while_sources_pending_cancels_request() {
        let completed = Arc::new(AtomicUsize::new(0));
        let server = server_with(
            FixedFinancial { reachable: true, delay: Duration::from_millis(200) },
            Arc::new(SlowSubmitter { delay: Duration::ZERO, completed: completed.clone() }),
        );

        let call = handle_verify(&server.service.oracle, verify_params());
        assert!(tokio::time::timeout(Duration::from_millis(20), call).await.is_err());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn caller_dropping_during_submission_lets_it_finish() {
        let completed = Arc::new(AtomicUsize::new(0));
        let server = server_with(
            FixedFinancial { reachable: true, delay: Duration::ZERO },
            Arc::new(SlowSubmitter {
                delay: Duration::from_millis(150),
                completed: completed.clone(),
            }),
        );

        let call = handle_verify(&server.service.oracle, verify_params());
        assert!(tokio::time::timeout(Duration::from_millis(50), call).await.is_err());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(completed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn health_and_info_accept_missing_params() {
        let server = server(true);
        let health = server
            .dispatch(JsonRpcRequest {
                method: "node/health".to_string(),
                params: serde_json::Value::Null,
            })
            .await;
        let health = health.result.unwrap();
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["contract"], AcceptingSubmitter.contract().to_checksum());
        assert_eq!(health["sources"], json!(["financial"]));

        let info = server
            .dispatch(JsonRpcRequest {
                method: "node/info".to_string(),
                params: json!({}),
            })
            .await
            .result
            .unwrap();
        assert_eq!(info["gas_limit"], 300_000);
        assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn unknown_method_and_bad_params_are_invalid_input() {
        let server = server(true);
        let resp = server
            .dispatch(JsonRpcRequest {
                method: "kyc/forget".to_string(),
                params: json!({}),
            })
            .await;
        assert_eq!(resp.error_kind, Some(ErrorCategory::InvalidInput));

        let resp = server
            .dispatch(JsonRpcRequest {
                method: "kyc/verify".to_string(),
                params: json!({"user_address": 5}),
            })
            .await;
        assert_eq!(resp.error_kind, Some(ErrorCategory::InvalidInput));
    }

    #[tokio::test]
    async fn serves_envelopes_over_http1() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut server = server(true);
        server.config.port = port;
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            server
                .start_with_shutdown(async {
                    let _ = stop_rx.await;
                })
                .await
                .map_err(|e| e.to_string())
        });

        let url = format!("http://127.0.0.1:{}{}", port, RPC_PATH);
        let client = reqwest::Client::new();
        let mut response = None;
        for _ in 0..50 {
            match client
                .post(&url)
                .json(&json!({"method": "node/health", "params": {}}))
                .send()
                .await
            {
                Ok(r) => {
                    response = Some(r);
                    break;
                }
                Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        }
        let envelope: JsonRpcResponse = response.unwrap().json().await.unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.result.unwrap()["service"], "kyc-oracle");

        stop_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
