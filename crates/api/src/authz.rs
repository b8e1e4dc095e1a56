//! API-side authorization guard.
//!
//! Handlers call this first, before any validation or upstream call.

use solidgate_auth::{Action, Authorizer, Namespace, PolicyResolver};
use solidgate_core::{GatewayError, GatewayResult};

use crate::context::PrincipalContext;

/// Require `action` in `namespace` for the current caller.
pub fn require<P: PolicyResolver>(
    authorizer: &Authorizer<P>,
    principal: &PrincipalContext,
    namespace: Namespace,
    action: Action,
) -> GatewayResult<()> {
    let outcome = authorizer.authorize(principal.principal(), namespace, action);
    tracing::debug!(
        principal = principal.name().unwrap_or_default(),
        namespace = namespace.as_str(),
        action = action.as_str(),
        granted = outcome.is_ok(),
        "authorization decision"
    );
    outcome.map_err(GatewayError::from)
}

/// Require only that the caller is identified.
pub fn require_authenticated(principal: &PrincipalContext) -> GatewayResult<()> {
    if principal.principal().is_authenticated() {
        Ok(())
    } else {
        Err(GatewayError::AuthenticationRequired)
    }
}
