//! Gateway error model.

use thiserror::Error;

use crate::id::AccountId;

/// Result type used across the gateway core.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway-level error.
///
/// Every variant is scoped to the request that produced it. Authorization and
/// validation variants are raised before the storage cluster is contacted; the
/// `Upstream*` variants describe what happened on the wire.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The caller carries no identity.
    #[error("authentication required")]
    AuthenticationRequired,

    /// The caller is identified but holds no role for the action.
    #[error("forbidden: no role grants {namespace}.{action}")]
    AuthorizationDenied { namespace: String, action: String },

    /// The account is outside this deployment's tenant set.
    #[error("account {0} is not managed by this gateway")]
    TenantNotAllowed(AccountId),

    /// The resource exists upstream but no allowed tenant owns it.
    #[error("{message}")]
    OwnershipViolation { code: &'static str, message: String },

    /// A request value failed boundary validation.
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// No cluster is configured under the requested name.
    #[error("unknown cluster '{0}'")]
    UnknownCluster(String),

    /// The cluster could not be reached, or answered with a non-success status.
    #[error("cluster unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The cluster answered with a JSON-RPC error object.
    #[error("JSON-RPC error: {message}")]
    UpstreamRpc {
        code: Option<i64>,
        name: Option<String>,
        message: String,
    },

    /// The cluster's answer violated the JSON-RPC envelope contract.
    #[error("malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),
}

impl GatewayError {
    pub fn validation(code: &'static str, msg: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: msg.into(),
        }
    }

    pub fn ownership(code: &'static str, msg: impl Into<String>) -> Self {
        Self::OwnershipViolation {
            code,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn denied(namespace: impl Into<String>, action: impl Into<String>) -> Self {
        Self::AuthorizationDenied {
            namespace: namespace.into(),
            action: action.into(),
        }
    }

    /// True when retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::UpstreamUnreachable(_))
    }

    /// True for failures raised before any upstream call is issued.
    pub fn is_rejected_locally(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationRequired
                | Self::AuthorizationDenied { .. }
                | Self::TenantNotAllowed(_)
                | Self::Validation { .. }
                | Self::UnknownCluster(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unreachable_is_transient() {
        assert!(GatewayError::UpstreamUnreachable("connection refused".into()).is_transient());
        assert!(
            !GatewayError::UpstreamRpc {
                code: Some(500),
                name: Some("xVolumeIDDoesNotExist".into()),
                message: "no such volume".into(),
            }
            .is_transient()
        );
        assert!(!GatewayError::AuthenticationRequired.is_transient());
    }

    #[test]
    fn rpc_error_display_keeps_upstream_prefix() {
        let err = GatewayError::UpstreamRpc {
            code: None,
            name: None,
            message: "bad params".into(),
        };
        assert_eq!(err.to_string(), "JSON-RPC error: bad params");
    }
}
