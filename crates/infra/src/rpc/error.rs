use solidgate_core::GatewayError;
use thiserror::Error;

/// Failure of one JSON-RPC round trip.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// Transport failure or non-success HTTP status.
    #[error("cluster unreachable: {0}")]
    Unreachable(String),

    /// The envelope carried an `error` object.
    #[error("JSON-RPC error: {message}")]
    Rpc {
        code: Option<i64>,
        name: Option<String>,
        message: String,
    },

    /// The body was not a valid envelope, or the result did not decode.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RpcError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

impl From<RpcError> for GatewayError {
    fn from(value: RpcError) -> Self {
        match value {
            RpcError::Unreachable(msg) => GatewayError::UpstreamUnreachable(msg),
            RpcError::Rpc {
                code,
                name,
                message,
            } => GatewayError::UpstreamRpc {
                code,
                name,
                message,
            },
            RpcError::Malformed(msg) => GatewayError::MalformedUpstreamResponse(msg),
        }
    }
}
