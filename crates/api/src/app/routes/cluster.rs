//! Cluster-level endpoints outside the resource groups.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path, Query},
    routing::get,
};
use serde_json::Value;

use solidgate_auth::{Action, Namespace};
use solidgate_infra::models::NoParams;

use crate::app::routes::volumes::account_volumes_json;
use crate::app::services::GatewayServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/clusterinfo", get(cluster_info))
        .route("/listvolumesforaccount", get(list_volumes_for_account))
}

/// Any identified caller may read cluster identity.
pub async fn cluster_info(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
) -> axum::response::Response {
    let result = async {
        authz::require_authenticated(&principal)?;
        let client = services.client(&cluster)?;
        client.call::<_, Value>("GetClusterInfo", &NoParams {}).await
    }
    .await;
    errors::respond(&cluster, result)
}

/// Older listing route. Global admins may list any account.
pub async fn list_volumes_for_account(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
    Query(query): Query<dto::AccountQuery>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Volumes, Action::List)?;
        let account = query.account()?;
        if !services.is_global_admin(&principal) {
            services.tenants().ensure_allowed(account)?;
        }

        let client = services.client(&cluster)?;
        let volumes = services.scope(&client).list_for_account(account).await?;
        account_volumes_json(account, &volumes)
    }
    .await;
    errors::respond(&cluster, result)
}
