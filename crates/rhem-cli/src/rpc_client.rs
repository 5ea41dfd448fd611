// crates/rhem-cli/src/rpc_client.rs
//
// Lightweight JSON-RPC client that POSTs to the rhem-daemon HTTP endpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mirrors the server's JsonRpcRequest envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub method: String,
    pub params: serde_json::Value,
}

/// Mirrors the server's JsonRpcResponse envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub success: bool,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Error)]
pub enum CliError {
    /// The daemon rejected the call.
    #[error("{method} rejected [{code}]: {message}")]
    Rejected {
        method: String,
        code: String,
        message: String,
    },

    #[error("could not reach daemon: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response from {0}")]
    Malformed(String),
}

/// Send a JSON-RPC call to the daemon and return the parsed response.
pub async fn rpc_call(
    endpoint: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<JsonRpcResponse, CliError> {
    let request = JsonRpcRequest {
        method: method.to_string(),
        params,
    };

    let client = reqwest::Client::new();
    let resp = client.post(endpoint).json(&request).send().await?;

    let rpc_response: JsonRpcResponse = resp.json().await?;
    Ok(rpc_response)
}

/// Call and unwrap the envelope: the result payload on success, a
/// `CliError::Rejected` carrying the daemon's reason code otherwise.
pub async fn call(
    endpoint: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<serde_json::Value, CliError> {
    let resp = rpc_call(endpoint, method, params).await?;
    if resp.success {
        resp.result.ok_or_else(|| CliError::Malformed(method.to_string()))
    } else {
        Err(CliError::Rejected {
            method: method.to_string(),
            code: resp.code.unwrap_or_else(|| "Unknown".to_string()),
            message: resp.error.unwrap_or_default(),
        })
    }
}
