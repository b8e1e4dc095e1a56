use solidgate_auth::{Principal, Role};
use uuid::Uuid;

/// Principal context for a request (caller identity + resolved groups).
///
/// Always present on routed requests; an anonymous principal when the proxy
/// supplied no identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn name(&self) -> Option<&str> {
        self.principal.name()
    }

    pub fn groups(&self) -> &[Role] {
        self.principal.groups()
    }
}

/// Correlation id assigned to a request, echoed as `x-request-id`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}
