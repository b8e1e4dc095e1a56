use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path},
    routing::get,
};
use serde_json::Value;

use solidgate_auth::{Action, Namespace};
use solidgate_core::GatewayResult;
use solidgate_infra::models::NoParams;

use crate::app::errors;
use crate::app::services::GatewayServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/clusterstats/capacity", get(capacity))
        .route("/clusterstats/performance", get(performance))
}

pub async fn capacity(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
) -> axum::response::Response {
    let result = cluster_stat(&services, &principal, &cluster, "GetClusterCapacity").await;
    errors::respond(&cluster, result)
}

pub async fn performance(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
) -> axum::response::Response {
    let result = cluster_stat(&services, &principal, &cluster, "GetClusterStats").await;
    errors::respond(&cluster, result)
}

async fn cluster_stat(
    services: &GatewayServices,
    principal: &PrincipalContext,
    cluster: &str,
    method: &str,
) -> GatewayResult<Value> {
    services.authorize(principal, Namespace::ClusterStats, Action::Get)?;
    services.client(cluster)?.call(method, &NoParams {}).await
}
