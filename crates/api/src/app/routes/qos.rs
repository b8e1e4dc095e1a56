use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    routing::get,
};
use serde_json::{Value, json};

use solidgate_auth::{Action, Namespace};
use solidgate_core::{GatewayError, QosPolicyId};
use solidgate_infra::models::{
    ModifyQosPolicyRequest, NoParams, QosPolicyIdParams, QosPolicyList, QosPolicyResult,
    QosPolicyView,
};

use crate::app::services::GatewayServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/qospolicies", get(list_policies))
        .route(
            "/qospolicies/:qos_policy_id",
            get(get_policy).put(modify_policy).delete(delete_policy),
        )
}

pub async fn list_policies(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Qos, Action::List)?;
        let client = services.client(&cluster)?;
        let list: QosPolicyList = client.call("ListQoSPolicies", &NoParams {}).await?;
        let views: Vec<QosPolicyView> = list.qos_policies.iter().map(QosPolicyView::from).collect();
        Ok::<_, GatewayError>(json!({ "qosPolicies": views }))
    }
    .await;
    errors::respond(&cluster, result)
}

pub async fn get_policy(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((cluster, raw_id)): Path<(String, String)>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Qos, Action::Get)?;
        let qos_policy_id: QosPolicyId = dto::path_id(&raw_id)?;

        let client = services.client(&cluster)?;
        let found: QosPolicyResult = client
            .call("GetQoSPolicy", &QosPolicyIdParams { qos_policy_id })
            .await?;
        Ok::<_, GatewayError>(json!({ "qosPolicy": QosPolicyView::from(&found.qos_policy) }))
    }
    .await;
    errors::respond(&cluster, result)
}

pub async fn modify_policy(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((cluster, raw_id)): Path<(String, String)>,
    payload: Result<Json<ModifyQosPolicyRequest>, JsonRejection>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Qos, Action::Update)?;
        let qos_policy_id: QosPolicyId = dto::path_id(&raw_id)?;
        let mut body = dto::body(payload)?;
        // The path names the policy; any id in the body is ignored.
        body.qos_policy_id = qos_policy_id;

        let client = services.client(&cluster)?;
        let modified: QosPolicyResult = client.call("ModifyQoSPolicy", &body).await?;
        tracing::info!(cluster = %cluster, policy = %qos_policy_id, "qos policy modified");
        Ok::<_, GatewayError>(json!({ "qosPolicy": QosPolicyView::from(&modified.qos_policy) }))
    }
    .await;
    errors::respond(&cluster, result)
}

pub async fn delete_policy(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((cluster, raw_id)): Path<(String, String)>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Qos, Action::Delete)?;
        let qos_policy_id: QosPolicyId = dto::path_id(&raw_id)?;

        let client = services.client(&cluster)?;
        let _: Value = client
            .call("DeleteQoSPolicy", &QosPolicyIdParams { qos_policy_id })
            .await?;
        tracing::info!(cluster = %cluster, policy = %qos_policy_id, "qos policy deleted");
        Ok::<_, GatewayError>(json!({}))
    }
    .await;
    errors::respond(&cluster, result)
}
