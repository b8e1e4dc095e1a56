//! Configuration-driven action policies.
//!
//! Every namespace is read the same way, from
//! `<Section>.ActionRoles.<Action>`, into one immutable table built at startup.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use solidgate_core::ConfigSource;

use crate::roles::{Role, ordered_role_set};

/// Category of resource/action pairs under which role lists are configured.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Namespace {
    Volumes,
    Qos,
    Snapshots,
    Accounts,
    AccountStats,
    ClusterStats,
}

impl Namespace {
    pub const ALL: [Namespace; 6] = [
        Namespace::Volumes,
        Namespace::Qos,
        Namespace::Snapshots,
        Namespace::Accounts,
        Namespace::AccountStats,
        Namespace::ClusterStats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Volumes => "volumes",
            Namespace::Qos => "qos",
            Namespace::Snapshots => "snapshots",
            Namespace::Accounts => "accounts",
            Namespace::AccountStats => "accountStats",
            Namespace::ClusterStats => "clusterStats",
        }
    }

    /// Top-level configuration section holding this namespace's role lists.
    pub fn config_section(&self) -> &'static str {
        match self {
            Namespace::Volumes => "VolumeAccess",
            Namespace::Qos => "QosAccess",
            Namespace::Snapshots => "SnapshotAccess",
            Namespace::Accounts => "AccountAccess",
            Namespace::AccountStats => "AccountStatsAccess",
            Namespace::ClusterStats => "ClusterStatsAccess",
        }
    }
}

impl core::fmt::Display for Namespace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action performed within a namespace.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    List,
    Get,
    Create,
    Update,
    Delete,
    Purge,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::List => "List",
            Action::Get => "Get",
            Action::Create => "Create",
            Action::Update => "Update",
            Action::Delete => "Delete",
            Action::Purge => "Purge",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of role sets for authorization decisions.
pub trait PolicyResolver: Send + Sync {
    /// Roles authorized for `action` in `namespace`; empty when unconfigured.
    fn roles_for(&self, namespace: Namespace, action: Action) -> &[Role];

    /// Roles that bypass every per-namespace check.
    fn global_admin_roles(&self) -> &[Role];
}

impl<P> PolicyResolver for Arc<P>
where
    P: PolicyResolver + ?Sized,
{
    fn roles_for(&self, namespace: Namespace, action: Action) -> &[Role] {
        (**self).roles_for(namespace, action)
    }

    fn global_admin_roles(&self) -> &[Role] {
        (**self).global_admin_roles()
    }
}

/// Immutable (namespace, action) → roles table.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    global_admins: Vec<Role>,
    actions: HashMap<(Namespace, String), Vec<Role>>,
}

impl PolicyTable {
    pub fn new(global_admins: Vec<Role>) -> Self {
        Self {
            global_admins,
            actions: HashMap::new(),
        }
    }

    /// Builder-style insertion, mostly for tests and programmatic setup.
    pub fn with_action(mut self, namespace: Namespace, action: Action, roles: Vec<Role>) -> Self {
        self.actions.insert((namespace, action.as_str().to_owned()), roles);
        self
    }

    /// Read every namespace's `ActionRoles` section plus `GlobalAdminRoles`.
    ///
    /// Action keys other than the known [`Action`]s are kept, so configuration
    /// for actions added later is not silently dropped.
    pub fn from_config(config: &dyn ConfigSource) -> Self {
        let global_admins = ordered_role_set(config.string_list("GlobalAdminRoles"));
        let mut actions = HashMap::new();

        for namespace in Namespace::ALL {
            let section = format!("{}.ActionRoles", namespace.config_section());
            for action in config.child_keys(&section) {
                let roles = ordered_role_set(config.string_list(&format!("{section}.{action}")));
                tracing::debug!(
                    namespace = namespace.as_str(),
                    action = %action,
                    roles = roles.len(),
                    "loaded action policy"
                );
                actions.insert((namespace, action), roles);
            }
        }

        Self {
            global_admins,
            actions,
        }
    }

    /// Roles for an action named by string (configuration-defined actions).
    pub fn roles_for_name(&self, namespace: Namespace, action: &str) -> &[Role] {
        self.actions
            .get(&(namespace, action.to_owned()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl PolicyResolver for PolicyTable {
    fn roles_for(&self, namespace: Namespace, action: Action) -> &[Role] {
        self.roles_for_name(namespace, action.as_str())
    }

    fn global_admin_roles(&self) -> &[Role] {
        &self.global_admins
    }
}
