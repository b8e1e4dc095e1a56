//! Configuration loading and the registries built from it.
//!
//! The file is TOML; once parsed it is exposed as a [`ConfigTree`] so the
//! policy table and everything below read it through the same dotted paths.

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use solidgate_core::{AccountId, ConfigSource, ConfigTree, GatewayError, GatewayResult};
use thiserror::Error;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_HEADER: &str = "x-remote-user";
pub const DEFAULT_GROUPS_HEADER: &str = "x-remote-groups";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("invalid configuration: {0}")]
    Parse(String),

    #[error("cluster '{0}' has no Endpoint")]
    MissingEndpoint(String),

    #[error("cluster '{cluster}' has an invalid Endpoint: {reason}")]
    InvalidEndpoint { cluster: String, reason: String },

    #[error("clusters '{first}' and '{second}' share the Endpoint {endpoint}")]
    DuplicateEndpoint {
        first: String,
        second: String,
        endpoint: String,
    },

    #[error("invalid Server.Listen address '{0}'")]
    InvalidListen(String),

    #[error("failed to build HTTP client for cluster '{cluster}': {reason}")]
    Client { cluster: String, reason: String },
}

/// Read and parse a TOML configuration file.
pub fn load_config_file(path: impl AsRef<Path>) -> Result<ConfigTree, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_toml(&text)
}

pub fn parse_toml(text: &str) -> Result<ConfigTree, ConfigError> {
    let parsed: toml::Value = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
    let root = serde_json::to_value(parsed).map_err(|e| ConfigError::Parse(e.to_string()))?;
    Ok(ConfigTree::new(root))
}

/// Basic-auth credential pair for a cluster.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One storage cluster entry under `Clusters.<name>`.
#[derive(Clone)]
pub struct ClusterConfig {
    pub name: String,
    pub endpoint: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub skip_tls_validation: bool,
    pub timeout: Duration,
}

impl std::fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("skip_tls_validation", &self.skip_tls_validation)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClusterConfig {
    fn from_config(config: &dyn ConfigSource, name: &str) -> Result<Self, ConfigError> {
        let section = format!("Clusters.{name}");
        let endpoint = config
            .string(&format!("{section}.Endpoint"))
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ConfigError::MissingEndpoint(name.to_owned()))?;
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint {
                cluster: name.to_owned(),
                reason: "expected an http:// or https:// URL".into(),
            });
        }

        let timeout_secs = config
            .integer(&format!("{section}.TimeoutSeconds"))
            .and_then(|s| u64::try_from(s).ok())
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            name: name.to_owned(),
            endpoint,
            username: config.string(&format!("{section}.Username")).filter(|u| !u.is_empty()),
            password: config.string(&format!("{section}.Password")),
            skip_tls_validation: config
                .boolean(&format!("{section}.SkipTlsValidation"))
                .unwrap_or(false),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.username.as_ref().map(|username| Credentials {
            username: username.clone(),
            password: self.password.clone().unwrap_or_default(),
        })
    }
}

/// Immutable name → cluster table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ClusterRegistry {
    clusters: BTreeMap<String, ClusterConfig>,
}

impl ClusterRegistry {
    pub fn new(clusters: impl IntoIterator<Item = ClusterConfig>) -> Self {
        Self {
            clusters: clusters.into_iter().map(|c| (c.name.clone(), c)).collect(),
        }
    }

    /// Each cluster needs its own endpoint; credentials are looked up by it.
    pub fn from_config(config: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let mut clusters = BTreeMap::new();
        let mut endpoints: BTreeMap<String, String> = BTreeMap::new();
        for name in config.child_keys("Clusters") {
            let cluster = ClusterConfig::from_config(config, &name)?;
            if let Some(first) = endpoints.insert(endpoint_key(&cluster.endpoint), name.clone()) {
                return Err(ConfigError::DuplicateEndpoint {
                    first,
                    second: name,
                    endpoint: cluster.endpoint,
                });
            }
            tracing::info!(
                cluster = %name,
                endpoint = %cluster.endpoint,
                skip_tls_validation = cluster.skip_tls_validation,
                "registered cluster"
            );
            clusters.insert(name, cluster);
        }
        Ok(Self { clusters })
    }

    pub fn get(&self, name: &str) -> GatewayResult<&ClusterConfig> {
        self.clusters
            .get(name)
            .ok_or_else(|| GatewayError::UnknownCluster(name.to_owned()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clusters.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClusterConfig> {
        self.clusters.values()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Credentials of the cluster whose configured endpoint is `base`.
    ///
    /// Endpoints are compared ignoring ASCII case and a trailing slash.
    pub fn credentials_for_endpoint(&self, base: &str) -> Option<Credentials> {
        let wanted = endpoint_key(base);
        self.clusters
            .values()
            .find(|c| endpoint_key(&c.endpoint) == wanted)
            .and_then(ClusterConfig::credentials)
    }
}

fn endpoint_key(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_ascii_lowercase()
}

/// Accounts this deployment may act on, in configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantSet {
    accounts: Vec<AccountId>,
}

impl TenantSet {
    pub fn new(accounts: impl IntoIterator<Item = AccountId>) -> Self {
        let mut ordered: Vec<AccountId> = Vec::new();
        for account in accounts {
            if !ordered.contains(&account) {
                ordered.push(account);
            }
        }
        Self { accounts: ordered }
    }

    pub fn from_config(config: &dyn ConfigSource) -> Self {
        Self::new(
            config
                .integer_list("TenantOptions.AllowedTenants")
                .into_iter()
                .map(AccountId::new),
        )
    }

    pub fn accounts(&self) -> &[AccountId] {
        &self.accounts
    }

    pub fn contains(&self, account: AccountId) -> bool {
        self.accounts.contains(&account)
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn ensure_allowed(&self, account: AccountId) -> GatewayResult<()> {
        if self.contains(account) {
            Ok(())
        } else {
            Err(GatewayError::TenantNotAllowed(account))
        }
    }
}

/// Where the fronting proxy puts the caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySettings {
    pub user_header: String,
    pub groups_header: String,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            user_header: DEFAULT_USER_HEADER.to_owned(),
            groups_header: DEFAULT_GROUPS_HEADER.to_owned(),
        }
    }
}

/// Process-level settings outside the policy and cluster tables.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub listen: SocketAddr,
    pub identity: IdentitySettings,
    /// Raw group id → display name. Empty means ids are already names.
    pub group_directory: HashMap<String, String>,
}

impl GatewaySettings {
    pub fn from_config(config: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let listen_raw = config
            .string("Server.Listen")
            .unwrap_or_else(|| DEFAULT_LISTEN.to_owned());
        let listen = listen_raw
            .parse()
            .map_err(|_| ConfigError::InvalidListen(listen_raw.clone()))?;

        let defaults = IdentitySettings::default();
        let identity = IdentitySettings {
            user_header: config
                .string("Identity.UserHeader")
                .map(|h| h.to_ascii_lowercase())
                .unwrap_or(defaults.user_header),
            groups_header: config
                .string("Identity.GroupsHeader")
                .map(|h| h.to_ascii_lowercase())
                .unwrap_or(defaults.groups_header),
        };

        let group_directory = config
            .child_keys("GroupDirectory")
            .into_iter()
            .filter_map(|id| {
                let name = config.string(&format!("GroupDirectory.{id}"))?;
                Some((id, name))
            })
            .collect();

        Ok(Self {
            listen,
            identity,
            group_directory,
        })
    }
}
