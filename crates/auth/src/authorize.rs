use serde::Serialize;
use thiserror::Error;

use solidgate_core::GatewayError;

use crate::policy::{Action, Namespace, PolicyResolver};
use crate::principal::Principal;
use crate::roles::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: no role grants {namespace}.{action}")]
    Forbidden { namespace: Namespace, action: Action },
}

impl From<AuthzError> for GatewayError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Unauthenticated => GatewayError::AuthenticationRequired,
            AuthzError::Forbidden { namespace, action } => {
                GatewayError::denied(namespace.as_str(), action.as_str())
            }
        }
    }
}

/// Why an authorization decision came out the way it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "role", rename_all = "snake_case")]
pub enum Decision {
    /// A global admin role matched; namespace policy was not consulted.
    GlobalAdmin(Role),
    /// A role configured for the action matched.
    ActionRole(Role),
    Unauthenticated,
    NoMatchingRole,
}

/// Detailed, serializable record of one authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub namespace: Namespace,
    pub action: Action,
    pub principal: Option<String>,
    pub groups: Vec<String>,
    pub granted: bool,
    pub decision: Decision,
    /// Roles the action's policy accepts (empty for global-admin grants).
    pub allowed_roles: Vec<String>,
}

/// Role-based access check over a [`PolicyResolver`].
///
/// - No IO
/// - No panics
/// - Evaluated before any upstream call for the action
#[derive(Debug, Clone)]
pub struct Authorizer<P> {
    policy: P,
}

impl<P: PolicyResolver> Authorizer<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn is_global_admin(&self, principal: &Principal) -> bool {
        principal.is_authenticated() && self.global_admin_match(principal).is_some()
    }

    pub fn is_allowed(&self, principal: &Principal, namespace: Namespace, action: Action) -> bool {
        self.explain(principal, namespace, action).granted
    }

    pub fn authorize(
        &self,
        principal: &Principal,
        namespace: Namespace,
        action: Action,
    ) -> Result<(), AuthzError> {
        let explanation = self.explain(principal, namespace, action);
        match explanation.decision {
            Decision::GlobalAdmin(_) | Decision::ActionRole(_) => Ok(()),
            Decision::Unauthenticated => Err(AuthzError::Unauthenticated),
            Decision::NoMatchingRole => {
                tracing::info!(
                    principal = principal.name().unwrap_or_default(),
                    namespace = namespace.as_str(),
                    action = action.as_str(),
                    allowed_roles = ?explanation.allowed_roles,
                    "authorization denied"
                );
                Err(AuthzError::Forbidden { namespace, action })
            }
        }
    }

    pub fn explain(
        &self,
        principal: &Principal,
        namespace: Namespace,
        action: Action,
    ) -> AuthorizationExplanation {
        let (decision, allowed_roles) = if !principal.is_authenticated() {
            (Decision::Unauthenticated, Vec::new())
        } else if let Some(role) = self.global_admin_match(principal) {
            (Decision::GlobalAdmin(role.clone()), Vec::new())
        } else {
            let allowed = self.policy.roles_for(namespace, action);
            let decision = match allowed.iter().find(|r| principal.holds(r)) {
                Some(role) => Decision::ActionRole(role.clone()),
                None => Decision::NoMatchingRole,
            };
            (decision, allowed.iter().map(|r| r.as_str().to_owned()).collect())
        };

        AuthorizationExplanation {
            namespace,
            action,
            principal: principal.name().map(str::to_owned),
            groups: principal.groups().iter().map(|g| g.as_str().to_owned()).collect(),
            granted: matches!(decision, Decision::GlobalAdmin(_) | Decision::ActionRole(_)),
            decision,
            allowed_roles,
        }
    }

    fn global_admin_match(&self, principal: &Principal) -> Option<&Role> {
        self.policy
            .global_admin_roles()
            .iter()
            .find(|r| principal.holds(r))
    }
}
