// crates/rhem-rpc/src/middleware.rs
//
// Request interceptor for the RPC server.

use tonic::{Request, Status};

/// Logging interceptor for incoming requests.
///
/// Method-level logging happens in the dispatcher once the body is decoded;
/// this records the transport metadata at trace level.
pub fn logging_interceptor(req: Request<()>) -> Result<Request<()>, Status> {
    tracing::trace!("Incoming RPC request: {:?}", req.metadata());
    Ok(req)
}
