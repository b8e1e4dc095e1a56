use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    routing::{get, post},
};
use serde_json::{Value, json};

use solidgate_auth::{Action, Namespace};
use solidgate_core::validation::{check_attribute_size, check_modify_attributes, merge_attributes};
use solidgate_core::{AccountId, GatewayError, GatewayResult, VolumeId};
use solidgate_infra::models::{
    CreateVolumeRequest, CreateVolumeResult, ModifyVolumeRequest, Volume, VolumeIdParams,
    VolumeResult, VolumeView,
};

use crate::app::services::GatewayServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/volumes", post(create_volume).put(modify_volume))
        .route("/volumes/foraccount", get(list_for_account))
        .route("/volumes/purge", post(purge_volume))
        .route("/volumes/:volume_id", get(get_volume).delete(delete_volume))
}

pub async fn list_for_account(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
    Query(query): Query<dto::AccountQuery>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Volumes, Action::List)?;
        let account = query.account()?;
        services.tenants().ensure_allowed(account)?;

        let client = services.client(&cluster)?;
        let volumes = services.scope(&client).list_for_account(account).await?;
        account_volumes_json(account, &volumes)
    }
    .await;
    errors::respond(&cluster, result)
}

/// Trimmed listing shared with `listvolumesforaccount`; no volumes is a 404.
pub(crate) fn account_volumes_json(
    account: AccountId,
    volumes: &[Volume],
) -> GatewayResult<Value> {
    if volumes.is_empty() {
        return Err(GatewayError::not_found(format!(
            "No volumes found for account {account}"
        )));
    }
    let views: Vec<VolumeView> = volumes.iter().map(|v| v.view()).collect();
    Ok(json!({ "volumes": views }))
}

pub async fn get_volume(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((cluster, raw_id)): Path<(String, String)>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Volumes, Action::Get)?;
        let volume_id: VolumeId = dto::path_id(&raw_id)?;

        let client = services.client(&cluster)?;
        services.scope(&client).require_volume(volume_id).await?;

        let found: VolumeResult = client.call("GetVolume", &VolumeIdParams { volume_id }).await?;
        Ok::<_, GatewayError>(json!({ "volume": found.volume.view() }))
    }
    .await;
    errors::respond(&cluster, result)
}

pub async fn create_volume(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
    payload: Result<Json<CreateVolumeRequest>, JsonRejection>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Volumes, Action::Create)?;
        let body = dto::body(payload)?;
        services.tenants().ensure_allowed(body.account_id)?;
        check_attribute_size(&body.attributes)?;

        let client = services.client(&cluster)?;
        let created: CreateVolumeResult = client.call("CreateVolume", &body).await?;
        tracing::info!(
            cluster = %cluster,
            account = %body.account_id,
            volume = %created.volume_id,
            "volume created"
        );
        Ok::<_, GatewayError>(json!({
            "volumeID": created.volume_id,
            "volume": created.volume.as_ref().map(|v| v.view()),
        }))
    }
    .await;
    errors::respond(&cluster, result)
}

pub async fn modify_volume(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
    payload: Result<Json<ModifyVolumeRequest>, JsonRejection>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Volumes, Action::Update)?;
        let mut body = dto::body(payload)?;
        if let Some(submitted) = &body.attributes {
            check_modify_attributes(submitted)?;
        }

        let client = services.client(&cluster)?;
        let owned = services.scope(&client).require_volume(body.volume_id).await?;

        if let Some(submitted) = body.attributes.take() {
            let existing = owned.volume.attributes.unwrap_or_default();
            body.attributes = Some(merge_attributes(&existing, submitted));
        }

        let modified: VolumeResult = client.call("ModifyVolume", &body).await?;
        tracing::info!(cluster = %cluster, volume = %body.volume_id, "volume modified");
        Ok::<_, GatewayError>(json!({ "volume": modified.volume.view() }))
    }
    .await;
    errors::respond(&cluster, result)
}

pub async fn delete_volume(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((cluster, raw_id)): Path<(String, String)>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Volumes, Action::Delete)?;
        let volume_id: VolumeId = dto::path_id(&raw_id)?;

        let client = services.client(&cluster)?;
        services.scope(&client).require_volume(volume_id).await?;

        let deleted: VolumeResult = client.call("DeleteVolume", &VolumeIdParams { volume_id }).await?;
        tracing::info!(cluster = %cluster, volume = %volume_id, "volume deleted");
        dto::to_json(&deleted.volume.deleted_view())
    }
    .await;
    errors::respond(&cluster, result)
}

pub async fn purge_volume(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
    payload: Result<Json<VolumeIdParams>, JsonRejection>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Volumes, Action::Purge)?;
        let body = dto::body(payload)?;

        let client = services.client(&cluster)?;
        services.scope(&client).require_volume(body.volume_id).await?;

        let _: Value = client.call("PurgeDeletedVolume", &body).await?;
        tracing::info!(cluster = %cluster, volume = %body.volume_id, "volume purged");
        Ok::<_, GatewayError>(json!({}))
    }
    .await;
    errors::respond(&cluster, result)
}
