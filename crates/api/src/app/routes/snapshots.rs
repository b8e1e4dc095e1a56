use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Extension, Path, rejection::JsonRejection},
    routing::post,
};
use futures::future::try_join_all;
use serde::Serialize;

use solidgate_auth::{Action, Namespace};
use solidgate_core::validation::check_attribute_size;
use solidgate_core::{AttributeMap, GatewayError, Retention, VolumeId};
use solidgate_infra::models::{
    CreateGroupSnapshotRequest, CreateGroupSnapshotResult, CreateSnapshotRequest,
    CreateSnapshotResult, GroupSnapshotList, ListGroupSnapshotsParams, ListSnapshotsRequest,
    SnapshotList, VolumeIdParams,
};

use crate::app::services::GatewayServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/snapshots", post(create_snapshot))
        .route("/snapshots/list", post(list_snapshots))
        .route("/snapshots/group", post(create_group_snapshot))
        .route("/snapshots/group/list", post(list_group_snapshots))
}

/// `CreateSnapshot` as forwarded, retention in canonical form.
#[derive(Debug, Serialize)]
struct CreateSnapshotParams<'a> {
    #[serde(rename = "volumeID")]
    volume_id: VolumeId,
    retention: Retention,
    name: Option<&'a str>,
    attributes: Option<&'a AttributeMap>,
}

#[derive(Debug, Serialize)]
struct CreateGroupSnapshotParams<'a> {
    volumes: &'a [VolumeId],
    retention: Retention,
    name: Option<&'a str>,
    attributes: Option<&'a AttributeMap>,
}

pub async fn create_snapshot(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
    payload: Result<Json<CreateSnapshotRequest>, JsonRejection>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Snapshots, Action::Create)?;
        let body = dto::body(payload)?;
        let retention: Retention = body.retention.parse()?;
        if let Some(attributes) = &body.attributes {
            check_attribute_size(attributes)?;
        }

        let client = services.client(&cluster)?;
        services.scope(&client).require_volume(body.volume_id).await?;

        let params = CreateSnapshotParams {
            volume_id: body.volume_id,
            retention,
            name: body.name.as_deref(),
            attributes: body.attributes.as_ref(),
        };
        let created: CreateSnapshotResult = client.call("CreateSnapshot", &params).await?;
        tracing::info!(
            cluster = %cluster,
            volume = %body.volume_id,
            snapshot = created.snapshot_id,
            %retention,
            "snapshot created"
        );
        dto::to_json(&created)
    }
    .await;
    errors::respond(&cluster, result)
}

pub async fn create_group_snapshot(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
    payload: Result<Json<CreateGroupSnapshotRequest>, JsonRejection>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Snapshots, Action::Create)?;
        let body = dto::body(payload)?;
        let retention: Retention = body.retention.parse()?;
        if body.volumes.is_empty() {
            return Err(GatewayError::validation(
                "missingVolumes",
                "At least one volume is required",
            ));
        }
        if let Some(attributes) = &body.attributes {
            check_attribute_size(attributes)?;
        }

        let client = services.client(&cluster)?;
        let owners = services.scope(&client).volume_owners().await?;

        let mut tenant = None;
        for volume in &body.volumes {
            let owner = owners.get(volume).copied().ok_or_else(|| {
                GatewayError::ownership(
                    "volumeNotAllowed",
                    format!("Volume {volume} not owned by allowed tenants"),
                )
            })?;
            match tenant {
                None => tenant = Some(owner),
                Some(first) if first != owner => {
                    return Err(GatewayError::validation(
                        "volumesMismatchTenant",
                        "All volumes must belong to the same tenant",
                    ));
                }
                Some(_) => {}
            }
        }

        let params = CreateGroupSnapshotParams {
            volumes: &body.volumes,
            retention,
            name: body.name.as_deref(),
            attributes: body.attributes.as_ref(),
        };
        let created: CreateGroupSnapshotResult =
            client.call("CreateGroupSnapshot", &params).await?;
        tracing::info!(
            cluster = %cluster,
            group_snapshot = created.group_snapshot_id,
            volumes = body.volumes.len(),
            "group snapshot created"
        );
        dto::to_json(&created)
    }
    .await;
    errors::respond(&cluster, result)
}

pub async fn list_group_snapshots(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Snapshots, Action::List)?;
        let client = services.client(&cluster)?;
        let owned = services.scope(&client).volumes_owned_by().await?;
        if owned.is_empty() {
            return dto::to_json(&GroupSnapshotList::default());
        }

        let params = ListGroupSnapshotsParams {
            volumes: owned.into_iter().collect(),
        };
        let list: GroupSnapshotList = client.call("ListGroupSnapshots", &params).await?;
        dto::to_json(&list)
    }
    .await;
    errors::respond(&cluster, result)
}

/// One volume when `volumeID` is positive, otherwise every owned volume.
/// The body may be omitted.
pub async fn list_snapshots(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(cluster): Path<String>,
    payload: Bytes,
) -> axum::response::Response {
    let result = async {
        services.authorize(&principal, Namespace::Snapshots, Action::List)?;
        let request: ListSnapshotsRequest = dto::optional_body(&payload)?;

        let client = services.client(&cluster)?;
        let scope = services.scope(&client);

        let volumes: Vec<VolumeId> = match request.volume_id.filter(|id| id.get() > 0) {
            Some(volume_id) => {
                scope.require_volume(volume_id).await?;
                vec![volume_id]
            }
            None => scope.volumes_owned_by().await?.into_iter().collect(),
        };

        let calls = volumes.into_iter().map(|volume_id| {
            let client = &client;
            async move {
                client
                    .call::<_, SnapshotList>("ListSnapshots", &VolumeIdParams { volume_id })
                    .await
            }
        });
        let snapshots = try_join_all(calls)
            .await?
            .into_iter()
            .flat_map(|list| list.snapshots)
            .collect();

        dto::to_json(&SnapshotList { snapshots })
    }
    .await;
    errors::respond(&cluster, result)
}
