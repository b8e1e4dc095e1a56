//! Storage cluster wire types.
//!
//! Field names follow the cluster's JSON (`accountID`, `minIOPS`, ...). Every
//! attribute map is an [`AttributeMap`], so decoding a response normalizes it.
//! Response types default missing members; the cluster omits fields freely.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use solidgate_core::{AccessGroupId, AccountId, AttributeMap, QosPolicyId, VolumeId};

/// Empty parameter object (`{}`).
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoParams {}

// ---------- QoS ----------

/// Volume or policy QoS as returned by the cluster.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Qos {
    #[serde(rename = "minIOPS")]
    pub min_iops: i64,
    #[serde(rename = "maxIOPS")]
    pub max_iops: i64,
    #[serde(rename = "burstIOPS")]
    pub burst_iops: i64,
    #[serde(rename = "burstTime", skip_serializing_if = "Option::is_none")]
    pub burst_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve: Option<BTreeMap<String, i64>>,
}

/// The three IOPS limits, without burst window or curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct QosLimits {
    #[serde(rename = "minIOPS")]
    pub min_iops: i64,
    #[serde(rename = "maxIOPS")]
    pub max_iops: i64,
    #[serde(rename = "burstIOPS")]
    pub burst_iops: i64,
}

impl From<&Qos> for QosLimits {
    fn from(q: &Qos) -> Self {
        Self {
            min_iops: q.min_iops,
            max_iops: q.max_iops,
            burst_iops: q.burst_iops,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct QosPolicy {
    pub name: String,
    pub qos: Qos,
    #[serde(rename = "qosPolicyID")]
    pub qos_policy_id: QosPolicyId,
    #[serde(rename = "volumeIDs")]
    pub volume_ids: Vec<VolumeId>,
}

/// QoS policy as returned to gateway callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QosPolicyView {
    pub name: String,
    #[serde(rename = "qosPolicyID")]
    pub qos_policy_id: QosPolicyId,
    pub qos: QosLimits,
    #[serde(rename = "volumeIDs")]
    pub volume_ids: Vec<VolumeId>,
}

impl From<&QosPolicy> for QosPolicyView {
    fn from(p: &QosPolicy) -> Self {
        Self {
            name: p.name.clone(),
            qos_policy_id: p.qos_policy_id,
            qos: QosLimits::from(&p.qos),
            volume_ids: p.volume_ids.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QosPolicyList {
    pub qos_policies: Vec<QosPolicy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QosPolicyResult {
    pub qos_policy: QosPolicy,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct QosPolicyIdParams {
    #[serde(rename = "qosPolicyID")]
    pub qos_policy_id: QosPolicyId,
}

/// `ModifyQoSPolicy` parameters; also the HTTP request body.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModifyQosPolicyRequest {
    #[serde(rename = "qosPolicyID", default)]
    pub qos_policy_id: QosPolicyId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub qos: Option<QosLimits>,
}

// ---------- Volumes ----------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Volume {
    pub access: Option<String>,
    #[serde(rename = "accountID")]
    pub account_id: AccountId,
    pub attributes: Option<AttributeMap>,
    pub block_size: Option<i64>,
    pub create_time: Option<String>,
    pub current_protection_scheme: Option<String>,
    pub delete_time: Option<String>,
    pub enable512e: Option<bool>,
    pub enable_snap_mirror_replication: Option<bool>,
    pub fifo_size: Option<i64>,
    pub min_fifo_size: Option<i64>,
    pub iqn: Option<String>,
    pub last_access_time: Option<String>,
    #[serde(rename = "lastAccessTimeIO")]
    pub last_access_time_io: Option<String>,
    pub name: Option<String>,
    pub previous_protection_scheme: Option<String>,
    pub purge_time: Option<String>,
    pub qos: Option<Qos>,
    #[serde(rename = "qosPolicyID")]
    pub qos_policy_id: Option<QosPolicyId>,
    #[serde(rename = "scsiEUIDeviceID")]
    pub scsi_eui_device_id: Option<String>,
    #[serde(rename = "scsiNAADeviceID")]
    pub scsi_naa_device_id: Option<String>,
    pub slice_count: Option<i64>,
    pub status: Option<String>,
    pub total_size: Option<i64>,
    #[serde(rename = "virtualVolumeID")]
    pub virtual_volume_id: Option<Value>,
    pub volume_access_groups: Option<Vec<AccessGroupId>>,
    #[serde(rename = "volumeConsistencyGroupUUID")]
    pub volume_consistency_group_uuid: Option<String>,
    #[serde(rename = "volumeID")]
    pub volume_id: VolumeId,
    pub volume_pairs: Option<Vec<Value>>,
    #[serde(rename = "volumeUUID")]
    pub volume_uuid: Option<String>,
}

impl Volume {
    pub fn view(&self) -> VolumeView {
        VolumeView {
            access: self.access.clone(),
            account_id: self.account_id,
            attributes: self.attributes.clone(),
            block_size: self.block_size,
            create_time: self.create_time.clone(),
            delete_time: self.delete_time.clone(),
            enable512e: self.enable512e,
            fifo_size: self.fifo_size,
            iqn: self.iqn.clone(),
            last_access_time: self.last_access_time.clone(),
            last_access_time_io: self.last_access_time_io.clone(),
            min_fifo_size: self.min_fifo_size,
            name: self.name.clone(),
            purge_time: self.purge_time.clone(),
            qos: self.qos.as_ref().map(QosLimits::from),
            qos_policy_id: self.qos_policy_id,
            scsi_eui_device_id: self.scsi_eui_device_id.clone(),
            scsi_naa_device_id: self.scsi_naa_device_id.clone(),
            status: self.status.clone(),
            total_size: self.total_size,
            volume_access_groups: self.volume_access_groups.clone(),
            volume_consistency_group_uuid: self.volume_consistency_group_uuid.clone(),
            volume_id: self.volume_id,
            volume_pairs: self.volume_pairs.clone(),
            volume_uuid: self.volume_uuid.clone(),
        }
    }

    pub fn deleted_view(&self) -> DeletedVolumeView {
        DeletedVolumeView {
            volume_id: self.volume_id,
            delete_time: self.delete_time.clone(),
            purge_time: self.purge_time.clone(),
            iqn: self.iqn.clone(),
            status: self.status.clone(),
            volume_access_groups: self.volume_access_groups.clone(),
            volume_pairs: self.volume_pairs.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

/// Volume as returned to gateway callers: no protection-scheme internals,
/// QoS reduced to its IOPS limits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeView {
    pub access: Option<String>,
    #[serde(rename = "accountID")]
    pub account_id: AccountId,
    pub attributes: Option<AttributeMap>,
    pub block_size: Option<i64>,
    pub create_time: Option<String>,
    pub delete_time: Option<String>,
    pub enable512e: Option<bool>,
    pub fifo_size: Option<i64>,
    pub iqn: Option<String>,
    pub last_access_time: Option<String>,
    #[serde(rename = "lastAccessTimeIO")]
    pub last_access_time_io: Option<String>,
    pub min_fifo_size: Option<i64>,
    pub name: Option<String>,
    pub purge_time: Option<String>,
    pub qos: Option<QosLimits>,
    #[serde(rename = "qosPolicyID")]
    pub qos_policy_id: Option<QosPolicyId>,
    #[serde(rename = "scsiEUIDeviceID")]
    pub scsi_eui_device_id: Option<String>,
    #[serde(rename = "scsiNAADeviceID")]
    pub scsi_naa_device_id: Option<String>,
    pub status: Option<String>,
    pub total_size: Option<i64>,
    pub volume_access_groups: Option<Vec<AccessGroupId>>,
    #[serde(rename = "volumeConsistencyGroupUUID")]
    pub volume_consistency_group_uuid: Option<String>,
    #[serde(rename = "volumeID")]
    pub volume_id: VolumeId,
    pub volume_pairs: Option<Vec<Value>>,
    #[serde(rename = "volumeUUID")]
    pub volume_uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedVolumeView {
    #[serde(rename = "volumeID")]
    pub volume_id: VolumeId,
    pub delete_time: Option<String>,
    pub purge_time: Option<String>,
    pub iqn: Option<String>,
    pub status: Option<String>,
    pub volume_access_groups: Option<Vec<AccessGroupId>>,
    pub volume_pairs: Option<Vec<Value>>,
    pub attributes: Option<AttributeMap>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ListVolumesForAccountParams {
    #[serde(rename = "accountID")]
    pub account_id: AccountId,
    #[serde(rename = "includeVirtualVolumes")]
    pub include_virtual_volumes: bool,
}

impl ListVolumesForAccountParams {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            include_virtual_volumes: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VolumeList {
    pub volumes: Vec<Volume>,
}

/// Parameters naming a single volume (`GetVolume`, `DeleteVolume`,
/// `PurgeDeletedVolume`, `ListSnapshots`).
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct VolumeIdParams {
    #[serde(rename = "volumeID")]
    pub volume_id: VolumeId,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VolumeResult {
    pub volume: Volume,
}

/// `CreateVolume` parameters; also the HTTP request body.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVolumeRequest {
    pub name: String,
    #[serde(rename = "accountID")]
    pub account_id: AccountId,
    pub total_size: i64,
    #[serde(default)]
    pub enable512e: bool,
    #[serde(default)]
    pub attributes: AttributeMap,
    #[serde(rename = "qosPolicyID", default)]
    pub qos_policy_id: Option<QosPolicyId>,
    #[serde(rename = "associateWithQoSPolicy", default = "default_true")]
    pub associate_with_qos_policy: bool,
    #[serde(default)]
    pub qos: Option<QosLimits>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateVolumeResult {
    pub volume: Option<Volume>,
    #[serde(rename = "volumeID")]
    pub volume_id: VolumeId,
}

/// `ModifyVolume` parameters; also the HTTP request body.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModifyVolumeRequest {
    #[serde(rename = "volumeID")]
    pub volume_id: VolumeId,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub attributes: Option<AttributeMap>,
    #[serde(rename = "qosPolicyID", default)]
    pub qos_policy_id: Option<QosPolicyId>,
    #[serde(rename = "totalSize", default)]
    pub total_size: Option<i64>,
}

// ---------- Snapshots ----------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    pub attributes: Option<AttributeMap>,
    pub checksum: Option<String>,
    pub create_time: Option<String>,
    pub enable_remote_replication: Option<bool>,
    pub expiration_reason: Option<String>,
    pub expiration_time: Option<String>,
    #[serde(rename = "groupID")]
    pub group_id: Option<i64>,
    #[serde(rename = "groupSnapshotUUID")]
    pub group_snapshot_uuid: Option<String>,
    pub instance_create_time: Option<String>,
    #[serde(rename = "instanceSnapshotUUID")]
    pub instance_snapshot_uuid: Option<String>,
    pub name: Option<String>,
    pub snap_mirror_label: Option<String>,
    #[serde(rename = "snapshotID")]
    pub snapshot_id: i64,
    #[serde(rename = "snapshotUUID")]
    pub snapshot_uuid: Option<String>,
    pub status: Option<String>,
    pub total_size: Option<i64>,
    #[serde(rename = "virtualVolumeID")]
    pub virtual_volume_id: Option<Value>,
    #[serde(rename = "volumeID")]
    pub volume_id: VolumeId,
    pub volume_name: Option<String>,
}

/// `CreateSnapshot` HTTP body. Retention is validated before forwarding.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateSnapshotRequest {
    #[serde(rename = "volumeID")]
    pub volume_id: VolumeId,
    pub retention: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: Option<AttributeMap>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CreateSnapshotResult {
    pub checksum: Option<String>,
    pub snapshot: Option<Snapshot>,
    #[serde(rename = "snapshotID")]
    pub snapshot_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GroupSnapshotMember {
    pub checksum: Option<String>,
    #[serde(rename = "snapshotID")]
    pub snapshot_id: i64,
    #[serde(rename = "snapshotUUID")]
    pub snapshot_uuid: Option<String>,
    #[serde(rename = "volumeID")]
    pub volume_id: VolumeId,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupSnapshot {
    pub attributes: Option<AttributeMap>,
    pub create_time: Option<String>,
    pub enable_remote_replication: Option<bool>,
    #[serde(rename = "groupSnapshotID")]
    pub group_snapshot_id: i64,
    #[serde(rename = "groupSnapshotUUID")]
    pub group_snapshot_uuid: Option<String>,
    pub members: Option<Vec<Snapshot>>,
    pub name: Option<String>,
    pub status: Option<String>,
}

/// `CreateGroupSnapshot` HTTP body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateGroupSnapshotRequest {
    pub volumes: Vec<VolumeId>,
    pub retention: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: Option<AttributeMap>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateGroupSnapshotResult {
    pub group_snapshot: Option<GroupSnapshot>,
    #[serde(rename = "groupSnapshotID")]
    pub group_snapshot_id: i64,
    pub members: Vec<GroupSnapshotMember>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListGroupSnapshotsParams {
    pub volumes: Vec<VolumeId>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupSnapshotList {
    pub group_snapshots: Vec<GroupSnapshot>,
}

/// `POST snapshots/list` body; absent or non-positive id means "all".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSnapshotsRequest {
    #[serde(rename = "volumeID", default)]
    pub volume_id: Option<VolumeId>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SnapshotList {
    pub snapshots: Vec<Snapshot>,
}

// ---------- Volume access groups ----------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeAccessGroup {
    pub attributes: Option<AttributeMap>,
    pub deleted_volumes: Option<Vec<VolumeId>>,
    #[serde(rename = "initiatorIDs")]
    pub initiator_ids: Option<Vec<i64>>,
    pub initiators: Option<Vec<String>>,
    pub name: Option<String>,
    #[serde(rename = "volumeAccessGroupID")]
    pub volume_access_group_id: AccessGroupId,
    pub volumes: Option<Vec<VolumeId>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeAccessGroupList {
    pub volume_access_groups: Vec<VolumeAccessGroup>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeAccessGroupResult {
    pub volume_access_group: VolumeAccessGroup,
}

/// HTTP body for adding or removing access group volumes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessGroupVolumesRequest {
    #[serde(default)]
    pub volumes: Option<Vec<VolumeId>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessGroupVolumesParams {
    #[serde(rename = "volumeAccessGroupID")]
    pub volume_access_group_id: AccessGroupId,
    pub volumes: Vec<VolumeId>,
}

// ---------- Accounts ----------

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AccountIdParams {
    #[serde(rename = "accountID")]
    pub account_id: AccountId,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeStatsByAccountParams {
    #[serde(rename = "includeVirtualVolumes")]
    pub include_virtual_volumes: bool,
    pub accounts: Vec<AccountId>,
}

impl VolumeStatsByAccountParams {
    pub fn single(account_id: AccountId) -> Self {
        Self {
            include_virtual_volumes: false,
            accounts: vec![account_id],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use solidgate_core::AttributeValue;

    #[test]
    fn volume_decodes_wire_names_and_normalizes_attributes() {
        let v: Volume = serde_json::from_value(json!({
            "volumeID": 7,
            "accountID": 100,
            "name": "db01",
            "attributes": {"owner": "ops", "accountID": "100", "ratio": 1.5, "n": 3},
            "qos": {"minIOPS": 50, "maxIOPS": 15000, "burstIOPS": 15000, "burstTime": 60, "curve": {"4096": 100}},
            "scsiNAADeviceID": "6f47",
            "lastAccessTimeIO": null,
            "sliceCount": 1
        }))
        .unwrap();

        assert_eq!(v.volume_id, VolumeId::new(7));
        assert_eq!(v.account_id, AccountId::new(100));
        let attrs = v.attributes.as_ref().unwrap();
        assert_eq!(attrs["n"], AttributeValue::Integer(3));
        assert_eq!(attrs["ratio"], AttributeValue::Double(1.5));
        assert_eq!(attrs["accountID"], AttributeValue::Text("100".into()));
    }

    #[test]
    fn volume_view_drops_burst_window_and_curve() {
        let v: Volume = serde_json::from_value(json!({
            "volumeID": 7,
            "accountID": 100,
            "qos": {"minIOPS": 50, "maxIOPS": 100, "burstIOPS": 200, "burstTime": 60, "curve": {"4096": 100}},
            "currentProtectionScheme": "doubleHelix"
        }))
        .unwrap();

        let out = serde_json::to_value(v.view()).unwrap();
        assert_eq!(out["qos"], json!({"minIOPS": 50, "maxIOPS": 100, "burstIOPS": 200}));
        assert!(out.get("currentProtectionScheme").is_none());
        assert_eq!(out["volumeID"], 7);
        assert_eq!(out["accountID"], 100);
    }

    #[test]
    fn qos_policy_view_keeps_limits_and_volume_ids() {
        let p: QosPolicy = serde_json::from_value(json!({
            "name": "gold",
            "qosPolicyID": 2,
            "qos": {"minIOPS": 1000, "maxIOPS": 5000, "burstIOPS": 8000, "burstTime": 60},
            "volumeIDs": [1, 4]
        }))
        .unwrap();
        let view = serde_json::to_value(QosPolicyView::from(&p)).unwrap();
        assert_eq!(
            view,
            json!({
                "name": "gold",
                "qosPolicyID": 2,
                "qos": {"minIOPS": 1000, "maxIOPS": 5000, "burstIOPS": 8000},
                "volumeIDs": [1, 4]
            })
        );
    }

    #[test]
    fn create_volume_request_defaults_association_on() {
        let req: CreateVolumeRequest = serde_json::from_value(json!({
            "name": "db02", "accountID": 100, "totalSize": 1073741824
        }))
        .unwrap();
        assert!(req.associate_with_qos_policy);
        assert!(req.attributes.is_empty());
        let wire = serde_json::to_value(&req).unwrap();
        assert_eq!(wire["associateWithQoSPolicy"], true);
        assert_eq!(wire["totalSize"], 1073741824_i64);
    }
}
