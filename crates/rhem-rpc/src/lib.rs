// crates/rhem-rpc/src/lib.rs
//
// rhem-rpc: JSON-RPC server and handlers for the RHEM platform.
//
// A single tonic service accepts JSON-encoded `{method, params}` envelopes
// over HTTP and dispatches them to the handler groups under `handlers/`.
// No protobuf codegen is involved.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;

// Re-export the main server types for ergonomic access.
pub use error::RpcError;
pub use server::{JsonRpcRequest, JsonRpcResponse, RhemRpcServer, RhemService, RpcConfig};
