use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path, Query},
    routing::get,
};
use serde_json::Value;

use solidgate_auth::{Action, Namespace};
use solidgate_infra::models::{AccountIdParams, VolumeStatsByAccountParams};

use crate::app::services::GatewayServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/accounts/efficiency", get(account_efficiency))
        .route("/accounts/volumestats", get(volume_stats))
}

pub async fn account_efficiency(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
    Query(query): Query<dto::AccountQuery>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::AccountStats, Action::Get)?;
        let account_id = query.account()?;
        services.tenants().ensure_allowed(account_id)?;

        let client = services.client(&cluster)?;
        client
            .call::<_, Value>("GetAccountEfficiency", &AccountIdParams { account_id })
            .await
    }
    .await;
    errors::respond(&cluster, result)
}

pub async fn volume_stats(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
    Query(query): Query<dto::AccountQuery>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::AccountStats, Action::List)?;
        let account_id = query.account()?;
        services.tenants().ensure_allowed(account_id)?;

        let client = services.client(&cluster)?;
        client
            .call::<_, Value>(
                "ListVolumeStatsByAccount",
                &VolumeStatsByAccountParams::single(account_id),
            )
            .await
    }
    .await;
    errors::respond(&cluster, result)
}
