use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role name used for RBAC.
///
/// A role is either a directory group display name (`CORP\storage-ops`) or a
/// literal identity name. Group matching ignores ASCII case, as directory
/// names do; identity names must match exactly (see [`Role::is_identity`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }

    /// Exact comparison against a caller's identity name.
    pub fn is_identity(&self, name: &str) -> bool {
        self.0 == name
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl From<&'static str> for Role {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

/// Build an ordered role set, dropping blanks and exact duplicates.
///
/// `Alice` and `alice` stay distinct: either may be an identity name.
pub fn ordered_role_set<I, S>(names: I) -> Vec<Role>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut roles: Vec<Role> = Vec::new();
    for name in names {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() || roles.iter().any(|r| r.as_str() == name) {
            continue;
        }
        roles.push(Role::from(name.to_owned()));
    }
    roles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_ascii_case() {
        assert!(Role::new("CORP\\Storage-Ops").matches("corp\\storage-ops"));
        assert!(!Role::new("ops").matches("ops2"));
    }

    #[test]
    fn identity_comparison_is_exact() {
        assert!(Role::new("CORP\\alice").is_identity("CORP\\alice"));
        assert!(!Role::new("CORP\\alice").is_identity("corp\\alice"));
    }

    #[test]
    fn ordered_set_keeps_first_occurrence() {
        let roles = ordered_role_set(["ops", "  ", "admins", "ops ", "Alice", "alice"]);
        let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
        assert_eq!(names, vec!["ops", "admins", "Alice", "alice"]);
    }
}
