//! Service wiring: policy table, cluster clients and tenant set, built once
//! from configuration and shared read-only by every request.

use std::sync::Arc;

use solidgate_auth::{Action, Authorizer, Namespace, PolicyTable};
use solidgate_core::{ConfigSource, GatewayResult};
use solidgate_infra::config::{ClusterRegistry, ConfigError, TenantSet};
use solidgate_infra::rpc::{ClusterClients, RpcGatewayClient};
use solidgate_infra::tenant_scope::TenantScopeResolver;

use crate::authz;
use crate::context::PrincipalContext;

#[derive(Debug)]
pub struct GatewayServices {
    authorizer: Authorizer<Arc<PolicyTable>>,
    clusters: ClusterClients,
    tenants: TenantSet,
}

impl GatewayServices {
    pub fn new(policy: PolicyTable, clusters: ClusterClients, tenants: TenantSet) -> Self {
        Self {
            authorizer: Authorizer::new(Arc::new(policy)),
            clusters,
            tenants,
        }
    }

    pub fn authorizer(&self) -> &Authorizer<Arc<PolicyTable>> {
        &self.authorizer
    }

    pub fn tenants(&self) -> &TenantSet {
        &self.tenants
    }

    pub fn authorize(
        &self,
        principal: &PrincipalContext,
        namespace: Namespace,
        action: Action,
    ) -> GatewayResult<()> {
        authz::require(&self.authorizer, principal, namespace, action)
    }

    pub fn is_global_admin(&self, principal: &PrincipalContext) -> bool {
        self.authorizer.is_global_admin(principal.principal())
    }

    pub fn client(&self, cluster: &str) -> GatewayResult<RpcGatewayClient> {
        self.clusters.client_for(cluster)
    }

    pub fn scope<'a>(&'a self, client: &'a RpcGatewayClient) -> TenantScopeResolver<'a> {
        TenantScopeResolver::new(client, self.tenants.accounts())
    }
}

pub fn build_services(config: &dyn ConfigSource) -> Result<GatewayServices, ConfigError> {
    let policy = PolicyTable::from_config(config);
    let registry = Arc::new(ClusterRegistry::from_config(config)?);
    if registry.is_empty() {
        tracing::warn!("no clusters configured");
    }
    let clusters = ClusterClients::build(registry)?;
    let tenants = TenantSet::from_config(config);
    tracing::info!(tenants = ?tenants.accounts(), "tenant set loaded");

    Ok(GatewayServices::new(policy, clusters, tenants))
}
