//! Volume access groups. Listing filters on the owner tag; mutations also
//! accept untagged groups whose volumes are all owned.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    routing::{get, post},
};
use serde_json::{Value, json};

use solidgate_auth::{Action, Namespace};
use solidgate_core::{AccessGroupId, GatewayError, GatewayResult};
use solidgate_infra::models::{
    AccessGroupVolumesParams, AccessGroupVolumesRequest, NoParams, VolumeAccessGroup,
    VolumeAccessGroupList, VolumeAccessGroupResult,
};
use solidgate_infra::rpc::RpcGatewayClient;
use solidgate_infra::tenant_scope::{is_owned_by_attribute, is_tagged_for};

use crate::app::services::GatewayServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/volumeaccessgroups", get(list_access_groups))
        .route(
            "/volumeaccessgroups/:group_id/volumes",
            post(add_volumes).delete(remove_volumes),
        )
}

#[derive(Debug, Clone, Copy)]
enum Membership {
    Add,
    Remove,
}

impl Membership {
    fn method(self) -> &'static str {
        match self {
            Self::Add => "AddVolumesToVolumeAccessGroup",
            Self::Remove => "RemoveVolumesFromVolumeAccessGroup",
        }
    }
}

async fn list_groups(client: &RpcGatewayClient) -> GatewayResult<Vec<VolumeAccessGroup>> {
    let list: VolumeAccessGroupList = client.call("ListVolumeAccessGroups", &NoParams {}).await?;
    Ok(list.volume_access_groups)
}

pub async fn list_access_groups(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Volumes, Action::List)?;
        let client = services.client(&cluster)?;
        let tenants = services.tenants().accounts();

        let groups: Vec<VolumeAccessGroup> = list_groups(&client)
            .await?
            .into_iter()
            .filter(|g| is_tagged_for(g, tenants))
            .collect();
        Ok::<_, GatewayError>(json!({ "volumeAccessGroups": groups }))
    }
    .await;
    errors::respond(&cluster, result)
}

pub async fn add_volumes(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((cluster, raw_id)): Path<(String, String)>,
    payload: Result<Json<AccessGroupVolumesRequest>, JsonRejection>,
) -> axum::response::Response {
    let result =
        change_membership(&services, &principal, &cluster, &raw_id, payload, Membership::Add)
            .await;
    errors::respond(&cluster, result)
}

pub async fn remove_volumes(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((cluster, raw_id)): Path<(String, String)>,
    payload: Result<Json<AccessGroupVolumesRequest>, JsonRejection>,
) -> axum::response::Response {
    let result =
        change_membership(&services, &principal, &cluster, &raw_id, payload, Membership::Remove)
            .await;
    errors::respond(&cluster, result)
}

async fn change_membership(
    services: &GatewayServices,
    principal: &PrincipalContext,
    cluster: &str,
    raw_id: &str,
    payload: Result<Json<AccessGroupVolumesRequest>, JsonRejection>,
    membership: Membership,
) -> GatewayResult<Value> {
    services.authorize(principal, Namespace::Volumes, Action::Update)?;
    let group_id: AccessGroupId = dto::path_id(raw_id)?;
    let volumes = dto::body(payload)?
        .volumes
        .filter(|v| !v.is_empty())
        .ok_or_else(|| GatewayError::validation("missingVolumes", "At least one volume is required"))?;

    let client = services.client(cluster)?;
    let scope = services.scope(&client);
    let (owned, groups) = futures::try_join!(scope.volumes_owned_by(), list_groups(&client))?;

    let group = groups
        .iter()
        .find(|g| g.volume_access_group_id == group_id)
        .ok_or_else(|| {
            GatewayError::not_found(format!("Volume access group {group_id} not found"))
        })?;

    if !is_owned_by_attribute(group, scope.tenants(), &owned) {
        return Err(GatewayError::ownership(
            "forbiddenGroup",
            format!("Volume access group {group_id} not owned by allowed tenants"),
        ));
    }
    if let Some(volume) = volumes.iter().find(|v| !owned.contains(*v)) {
        return Err(GatewayError::ownership(
            "volumeNotAllowed",
            format!("Volume {volume} not owned by allowed tenants"),
        ));
    }

    let params = AccessGroupVolumesParams {
        volume_access_group_id: group_id,
        volumes,
    };
    let updated: VolumeAccessGroupResult = client.call(membership.method(), &params).await?;
    tracing::info!(
        cluster,
        group = %group_id,
        volumes = params.volumes.len(),
        method = membership.method(),
        "access group membership changed"
    );
    dto::to_json(&updated)
}
