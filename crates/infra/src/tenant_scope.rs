//! Tenant-scoped views over the cluster.
//!
//! Ownership is never cached: every question re-lists the allowed tenants'
//! volumes, one `ListVolumesForAccount` per tenant, issued concurrently.
//! Dropping a pending call drops every outstanding per-tenant request.

use std::collections::{BTreeMap, BTreeSet};

use futures::future::try_join_all;
use solidgate_core::{AccountId, AttributeMap, GatewayError, GatewayResult, VolumeId};

use crate::models::{ListVolumesForAccountParams, Volume, VolumeAccessGroup, VolumeList};
use crate::rpc::RpcGatewayClient;

/// Attribute key tagging a resource with its owning account.
pub const OWNER_ATTRIBUTE: &str = "accountID";

/// A resource whose ownership is expressed by attribute tag or volume list.
pub trait ScopedResource {
    fn attributes(&self) -> Option<&AttributeMap>;

    fn volume_ids(&self) -> Option<&[VolumeId]>;
}

impl ScopedResource for VolumeAccessGroup {
    fn attributes(&self) -> Option<&AttributeMap> {
        self.attributes.as_ref()
    }

    fn volume_ids(&self) -> Option<&[VolumeId]> {
        self.volumes.as_deref()
    }
}

/// How a resource's `accountID` attribute reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOwner {
    /// No tag present.
    Untagged,
    /// Tag present and names an account.
    Account(AccountId),
    /// Tag present but not a readable account id.
    Unreadable,
}

pub fn attribute_owner(attributes: Option<&AttributeMap>) -> AttributeOwner {
    match attributes.and_then(|a| a.get(OWNER_ATTRIBUTE)) {
        None => AttributeOwner::Untagged,
        Some(value) => value
            .as_account_id()
            .map_or(AttributeOwner::Unreadable, AttributeOwner::Account),
    }
}

/// True if the resource's `accountID` tag names one of `tenants`.
///
/// Untagged resources are not matched; this is the listing filter.
pub fn is_tagged_for(resource: &impl ScopedResource, tenants: &[AccountId]) -> bool {
    matches!(
        attribute_owner(resource.attributes()),
        AttributeOwner::Account(owner) if tenants.contains(&owner)
    )
}

/// Ownership of a resource by tag, falling back to its volume list.
///
/// The tag decides when present. Without one, every listed volume must be in
/// `owned_volumes`; a resource with no volume list passes.
pub fn is_owned_by_attribute(
    resource: &impl ScopedResource,
    tenants: &[AccountId],
    owned_volumes: &BTreeSet<VolumeId>,
) -> bool {
    match attribute_owner(resource.attributes()) {
        AttributeOwner::Account(owner) => tenants.contains(&owner),
        AttributeOwner::Unreadable => false,
        AttributeOwner::Untagged => resource
            .volume_ids()
            .is_none_or(|ids| ids.iter().all(|id| owned_volumes.contains(id))),
    }
}

/// A volume together with the tenant found to own it.
#[derive(Debug, Clone)]
pub struct OwnedVolume {
    pub account: AccountId,
    pub volume: Volume,
}

/// Answers ownership questions for one cluster and one tenant set.
#[derive(Debug, Clone, Copy)]
pub struct TenantScopeResolver<'a> {
    client: &'a RpcGatewayClient,
    tenants: &'a [AccountId],
}

impl<'a> TenantScopeResolver<'a> {
    pub fn new(client: &'a RpcGatewayClient, tenants: &'a [AccountId]) -> Self {
        Self { client, tenants }
    }

    pub fn tenants(&self) -> &'a [AccountId] {
        self.tenants
    }

    /// Volumes the cluster lists for a single account.
    pub async fn list_for_account(&self, account: AccountId) -> GatewayResult<Vec<Volume>> {
        let list: VolumeList = self
            .client
            .call("ListVolumesForAccount", &ListVolumesForAccountParams::new(account))
            .await?;
        Ok(list.volumes)
    }

    /// Per-tenant listings, in configured tenant order.
    pub async fn listings(&self) -> GatewayResult<Vec<(AccountId, Vec<Volume>)>> {
        let calls = self.tenants.iter().map(|&account| async move {
            let volumes = self.list_for_account(account).await?;
            Ok::<_, GatewayError>((account, volumes))
        });
        let listings = try_join_all(calls).await?;
        tracing::debug!(
            cluster = self.client.cluster(),
            tenants = self.tenants.len(),
            volumes = listings.iter().map(|(_, v)| v.len()).sum::<usize>(),
            "listed tenant volumes"
        );
        Ok(listings)
    }

    /// Union of the volume ids owned by the tenants.
    pub async fn volumes_owned_by(&self) -> GatewayResult<BTreeSet<VolumeId>> {
        Ok(self
            .listings()
            .await?
            .into_iter()
            .flat_map(|(_, volumes)| volumes.into_iter().map(|v| v.volume_id))
            .collect())
    }

    /// Volume → owning tenant. A volume listed under several tenants goes to
    /// the first in configured order.
    pub async fn volume_owners(&self) -> GatewayResult<BTreeMap<VolumeId, AccountId>> {
        Ok(owners_from_listings(&self.listings().await?))
    }

    pub async fn account_of(&self, volume: VolumeId) -> GatewayResult<Option<AccountId>> {
        Ok(self.find_volume(volume).await?.map(|owned| owned.account))
    }

    /// The volume as listed by the first tenant that owns it.
    pub async fn find_volume(&self, volume: VolumeId) -> GatewayResult<Option<OwnedVolume>> {
        let listings = self.listings().await?;
        Ok(listings.into_iter().find_map(|(account, volumes)| {
            volumes
                .into_iter()
                .find(|v| v.volume_id == volume)
                .map(|volume| OwnedVolume { account, volume })
        }))
    }

    /// Like [`find_volume`](Self::find_volume), but a volume outside every
    /// tenant is an ownership violation.
    pub async fn require_volume(&self, volume: VolumeId) -> GatewayResult<OwnedVolume> {
        self.find_volume(volume).await?.ok_or_else(|| {
            GatewayError::ownership(
                "volumeNotAllowed",
                format!("Volume {volume} not owned by allowed tenants"),
            )
        })
    }
}

fn owners_from_listings(listings: &[(AccountId, Vec<Volume>)]) -> BTreeMap<VolumeId, AccountId> {
    let mut owners = BTreeMap::new();
    for (account, volumes) in listings {
        for v in volumes {
            owners.entry(v.volume_id).or_insert(*account);
        }
    }
    owners
}
