// crates/rhem-rpc/src/error.rs
//
// Error type returned by RPC handlers. Carries the stable reason code that
// ends up in the response envelope next to the human-readable message.

use rhem_core::RhemError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RpcError {
    /// Stable reason code (`RhemError::code()` for core failures).
    pub code: String,
    pub message: String,
}

impl RpcError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Malformed params or an unparseable field.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new("InvalidRequest", message)
    }

    pub fn unknown_method(method: &str) -> Self {
        Self::new("UnknownMethod", format!("Unknown method: {}", method))
    }

    /// The method exists but this node is not configured to serve it.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new("Unavailable", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("Internal", message)
    }
}

impl From<RhemError> for RpcError {
    fn from(err: RhemError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_keeps_code() {
        let err: RpcError = RhemError::InvalidStakeIndex { index: 3 }.into();
        assert_eq!(err.code, "InvalidStakeIndex");
        assert_eq!(err.message, "Invalid stake index: 3");
    }
}
