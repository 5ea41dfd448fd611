// crates/rhem-rpc/src/server.rs
//
// RPC server setup: RhemRpcServer, RhemService and RpcConfig.
//
// A single tonic service accepts JSON-encoded requests with a method field,
// dispatches to the appropriate handler, and returns JSON-encoded responses.
// This avoids proto codegen while still using tonic's server infrastructure
// for transport and interceptors.
//
// Every call takes the platform lock for the whole operation and reads the
// clock once while holding it, so mutating calls are serialized and their
// timestamps follow the order they committed in.

use std::sync::Arc;
use std::time::Instant;

use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tonic::transport::Server;
use tonic::Status;

use rhem_core::{Clock, ManualClock};
use rhem_economics::Platform;

use crate::error::RpcError;
use crate::handlers;
use crate::middleware;

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
            port: 50061,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC Envelope
// ---------------------------------------------------------------------------

/// A JSON-RPC-style request envelope.
/// The client sends a method name and a JSON params payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// The RPC method to invoke (e.g., "ledger/transfer", "staking/stake").
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
    /// Stable reason code (if not success), e.g. "StillLocked".
    #[serde(default)]
    pub code: Option<String>,
}

impl JsonRpcResponse {
    pub fn success(value: serde_json::Value) -> Self {
        Self {
            success: true,
            result: Some(value),
            error: None,
            code: None,
        }
    }

    pub fn failure(err: RpcError) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(err.message),
            code: Some(err.code),
        }
    }
}

// ---------------------------------------------------------------------------
// RhemService
// ---------------------------------------------------------------------------

/// Shared state behind the RPC surface, and the method dispatcher.
///
/// Cloning is cheap; all clones see the same platform.
#[derive(Clone)]
pub struct RhemService {
    platform: Arc<RwLock<Platform>>,
    clock: Arc<dyn Clock>,
    /// Set when the node runs a manual clock; enables `node/advance_time`.
    manual_clock: Option<Arc<ManualClock>>,
    start_time: Instant,
}

impl std::fmt::Debug for RhemService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RhemService")
            .field("manual_clock", &self.manual_clock.is_some())
            .finish()
    }
}

impl RhemService {
    /// Serve `platform` with time from `clock`.
    pub fn new(platform: Arc<RwLock<Platform>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            platform,
            clock,
            manual_clock: None,
            start_time: Instant::now(),
        }
    }

    /// Serve `platform` on a manual clock that `node/advance_time` can move.
    pub fn with_manual_clock(platform: Arc<RwLock<Platform>>, clock: Arc<ManualClock>) -> Self {
        Self {
            platform,
            clock: clock.clone(),
            manual_clock: Some(clock),
            start_time: Instant::now(),
        }
    }

    pub fn platform(&self) -> &Arc<RwLock<Platform>> {
        &self.platform
    }

    /// Dispatch a JSON-RPC request to the appropriate handler based on the method name.
    pub async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let JsonRpcRequest { method, params } = request;
        let platform = self.platform.as_ref();
        let clock = self.clock.as_ref();

        let result = match method.as_str() {
            // Ledger
            "ledger/balance" => {
                dispatch_handler(params, |r| handlers::ledger::handle_balance(platform, r)).await
            }
            "ledger/allowance" => {
                dispatch_handler(params, |r| handlers::ledger::handle_allowance(platform, r)).await
            }
            "ledger/transfer" => {
                dispatch_handler(params, |r| handlers::ledger::handle_transfer(platform, r)).await
            }
            "ledger/approve" => {
                dispatch_handler(params, |r| handlers::ledger::handle_approve(platform, r)).await
            }
            "ledger/transfer_from" => {
                dispatch_handler(params, |r| handlers::ledger::handle_transfer_from(platform, r))
                    .await
            }
            "ledger/mint" => {
                dispatch_handler(params, |r| handlers::ledger::handle_mint(platform, r)).await
            }
            "ledger/burn" => {
                dispatch_handler(params, |r| handlers::ledger::handle_burn(platform, r)).await
            }
            "ledger/claim" => {
                dispatch_handler(params, |r| handlers::ledger::handle_claim(platform, r)).await
            }
            "ledger/info" => {
                dispatch_handler(params, |r| handlers::ledger::handle_info(platform, r)).await
            }

            // Staking
            "staking/stake" => {
                dispatch_handler(params, |r| handlers::staking::handle_stake(platform, clock, r))
                    .await
            }
            "staking/unstake" => {
                dispatch_handler(params, |r| handlers::staking::handle_unstake(platform, clock, r))
                    .await
            }
            "staking/positions" => {
                dispatch_handler(params, |r| handlers::staking::handle_positions(platform, r))
                    .await
            }
            "staking/rewards" => {
                dispatch_handler(params, |r| handlers::staking::handle_rewards(platform, clock, r))
                    .await
            }
            "staking/totals" => {
                dispatch_handler(params, |r| handlers::staking::handle_totals(platform, r)).await
            }
            "staking/multiplier" => {
                dispatch_handler(params, |r| handlers::staking::handle_multiplier(platform, r))
                    .await
            }
            "staking/set_multiplier" => {
                dispatch_handler(params, |r| {
                    handlers::staking::handle_set_multiplier(platform, r)
                })
                .await
            }

            // Trading
            "trading/execute" => {
                dispatch_handler(params, |r| handlers::trading::handle_execute(platform, clock, r))
                    .await
            }
            "trading/history" => {
                dispatch_handler(params, |r| handlers::trading::handle_history(platform, r)).await
            }
            "trading/set_settlement" => {
                dispatch_handler(params, |r| {
                    handlers::trading::handle_set_settlement(platform, r)
                })
                .await
            }

            // Registry
            "registry/register" => {
                dispatch_handler(params, |r| handlers::registry::handle_register(platform, clock, r))
                    .await
            }
            "registry/get" => {
                dispatch_handler(params, |r| handlers::registry::handle_get(platform, r)).await
            }

            // Administration
            "admin/pause" => {
                dispatch_handler(params, |r| handlers::admin::handle_pause(platform, r)).await
            }
            "admin/unpause" => {
                dispatch_handler(params, |r| handlers::admin::handle_unpause(platform, r)).await
            }
            "admin/freeze" => {
                dispatch_handler(params, |r| handlers::admin::handle_freeze(platform, r)).await
            }
            "admin/unfreeze" => {
                dispatch_handler(params, |r| handlers::admin::handle_unfreeze(platform, r)).await
            }
            "admin/grant_role" => {
                dispatch_handler(params, |r| handlers::admin::handle_grant_role(platform, r)).await
            }
            "admin/revoke_role" => {
                dispatch_handler(params, |r| handlers::admin::handle_revoke_role(platform, r))
                    .await
            }
            "admin/has_role" => {
                dispatch_handler(params, |r| handlers::admin::handle_has_role(platform, r)).await
            }
            "admin/approve_for_staking" => {
                dispatch_handler(params, |r| {
                    handlers::admin::handle_approve_for_staking(platform, r)
                })
                .await
            }
            "admin/collect_fee" => {
                dispatch_handler(params, |r| handlers::admin::handle_collect_fee(platform, r))
                    .await
            }

            // Node
            "node/info" => {
                let manual = self.manual_clock.is_some();
                let uptime = self.start_time.elapsed().as_secs();
                dispatch_handler(params, |r| {
                    handlers::node::handle_get_node_info(platform, clock, manual, uptime, r)
                })
                .await
            }
            "node/advance_time" => {
                let manual = self.manual_clock.as_deref();
                dispatch_handler(params, |r| handlers::node::handle_advance_time(manual, r)).await
            }

            _ => Err(RpcError::unknown_method(&method)),
        };

        match result {
            Ok(value) => {
                tracing::debug!(method = %method, "rpc call succeeded");
                JsonRpcResponse::success(value)
            }
            Err(err) => {
                tracing::warn!(method = %method, code = %err.code, error = %err.message, "rpc call rejected");
                JsonRpcResponse::failure(err)
            }
        }
    }
}

/// Generic dispatch helper: deserialize params into a request type,
/// call the handler, and serialize the result to JSON.
async fn dispatch_handler<Req, Resp, F, Fut>(
    params: serde_json::Value,
    handler: F,
) -> Result<serde_json::Value, RpcError>
where
    Req: serde::de::DeserializeOwned,
    Resp: serde::Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: std::future::Future<Output = Result<Resp, RpcError>>,
{
    // Parameterless methods may omit params entirely.
    let params = if params.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        params
    };
    let request: Req = serde_json::from_value(params)
        .map_err(|e| RpcError::invalid_request(format!("Failed to deserialize request: {}", e)))?;
    let response = handler(request).await?;
    serde_json::to_value(response)
        .map_err(|e| RpcError::internal(format!("Failed to serialize response: {}", e)))
}

// ---------------------------------------------------------------------------
// RhemRpcServer
// ---------------------------------------------------------------------------

/// The RPC server for the RHEM platform.
#[derive(Debug, Clone)]
pub struct RhemRpcServer {
    config: RpcConfig,
    service: RhemService,
}

impl RhemRpcServer {
    pub fn new(config: RpcConfig, service: RhemService) -> Self {
        Self { config, service }
    }

    /// Start the RPC server and serve requests until the process is terminated.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Start the RPC server and serve requests until `signal` resolves.
    pub async fn start_with_shutdown<F>(&self, signal: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: std::future::Future<Output = ()> + Send,
    {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        tracing::info!("RHEM RPC server starting on {}", addr);

        Server::builder()
            .accept_http1(true)
            .add_service(tonic::service::interceptor::InterceptedService::new(
                RhemJsonRpcServer::new(self.service.clone()),
                middleware::logging_interceptor,
            ))
            .serve_with_shutdown(addr, signal)
            .await?;

        tracing::info!("RHEM RPC server stopped");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tonic Service Wiring
// ---------------------------------------------------------------------------
// A single service with one method. The request and response bodies are raw
// JSON-encoded JsonRpcRequest/JsonRpcResponse.

/// The tonic service wrapper. Implements the low-level service
/// by accepting bytes, deserializing as JSON-RPC, and dispatching.
#[derive(Clone)]
pub struct RhemJsonRpcServer {
    inner: RhemService,
}

impl std::fmt::Debug for RhemJsonRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RhemJsonRpcServer").finish()
    }
}

impl RhemJsonRpcServer {
    fn new(inner: RhemService) -> Self {
        Self { inner }
    }
}

impl tonic::server::NamedService for RhemJsonRpcServer {
    const NAME: &'static str = "rhem.rpc.RhemService";
}

impl<B> tower_service::Service<http::Request<B>> for RhemJsonRpcServer
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
                    let resp = JsonRpcResponse::failure(RpcError::invalid_request(format!(
                        "Failed to read request body: {}",
                        e
                    )));
                    return Ok(build_response(&resp));
                }
            };

            let rpc_request: JsonRpcRequest = match serde_json::from_slice(&body_bytes) {
                Ok(r) => r,
                Err(e) => {
                    let resp = JsonRpcResponse::failure(RpcError::invalid_request(format!(
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

/// Build an HTTP response carrying the JSON-encoded envelope.
fn build_response(resp: &JsonRpcResponse) -> http::Response<tonic::body::BoxBody> {
    let json = serde_json::to_vec(resp).unwrap_or_default();
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
