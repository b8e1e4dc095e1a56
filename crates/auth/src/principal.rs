use serde::Serialize;

use crate::claims::{GroupTranslationError, GroupTranslator, RawClaims};
use crate::roles::{Role, ordered_role_set};

/// Caller identity for one request: name plus resolved group names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Principal {
    name: Option<String>,
    groups: Vec<Role>,
}

impl Principal {
    /// Blank names are treated as no identity.
    pub fn new(name: impl Into<String>, groups: Vec<Role>) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() { None } else { Some(name) };
        Self { name, groups }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.name.is_some()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn groups(&self) -> &[Role] {
        &self.groups
    }

    /// True if `role` names one of the groups, or is exactly the identity name.
    pub fn holds(&self, role: &Role) -> bool {
        self.groups.iter().any(|g| role.matches(g.as_str()))
            || self.name.as_deref().is_some_and(|n| role.is_identity(n))
    }
}

/// Outcome of resolving claims into a principal.
///
/// Groups that failed translation are not part of the principal; they are
/// returned alongside so the caller can report them.
#[derive(Debug, Clone)]
pub struct ResolvedPrincipal {
    pub principal: Principal,
    pub dropped: Vec<GroupTranslationError>,
}

/// Translate raw claims into a [`Principal`].
pub fn resolve(claims: &RawClaims, translator: &dyn GroupTranslator) -> ResolvedPrincipal {
    let mut names = Vec::with_capacity(claims.group_ids.len());
    let mut dropped = Vec::new();

    for id in &claims.group_ids {
        match translator.translate(id) {
            Ok(name) => names.push(name),
            Err(e) => dropped.push(e),
        }
    }

    ResolvedPrincipal {
        principal: Principal::new(claims.name.clone().unwrap_or_default(), ordered_role_set(names)),
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::claims::{DirectoryTranslator, PassthroughTranslator};

    #[test]
    fn blank_name_is_unauthenticated() {
        assert!(!Principal::new("  ", vec![]).is_authenticated());
        assert!(!Principal::anonymous().is_authenticated());
        assert!(Principal::new("CORP\\alice", vec![]).is_authenticated());
    }

    #[test]
    fn untranslatable_groups_are_dropped_not_fatal() {
        let directory = DirectoryTranslator::new(HashMap::from([
            ("S-1-5-21-1".to_string(), "CORP\\storage-ops".to_string()),
            ("S-1-5-21-2".to_string(), "CORP\\auditors".to_string()),
        ]));
        let claims = RawClaims::new(
            "CORP\\alice",
            vec!["S-1-5-21-1".into(), "S-1-5-21-9".into(), "S-1-5-21-2".into(), "".into()],
        );

        let resolved = resolve(&claims, &directory);

        let groups: Vec<&str> = resolved.principal.groups().iter().map(Role::as_str).collect();
        assert_eq!(groups, vec!["CORP\\storage-ops", "CORP\\auditors"]);
        assert_eq!(resolved.dropped.len(), 2);
        assert!(resolved.dropped.contains(&GroupTranslationError::Unknown("S-1-5-21-9".into())));
        assert_eq!(resolved.principal.name(), Some("CORP\\alice"));
    }

    #[test]
    fn passthrough_keeps_names_and_deduplicates() {
        let claims = RawClaims::new("bob", vec!["ops".into(), "OPS".into(), "dev".into()]);
        let resolved = resolve(&claims, &PassthroughTranslator);
        assert_eq!(resolved.principal.groups().len(), 2);
        assert!(resolved.dropped.is_empty());
    }

    #[test]
    fn holds_matches_groups_and_identity() {
        let p = Principal::new("CORP\\alice", vec![Role::new("ops")]);
        assert!(p.holds(&Role::new("OPS")));
        assert!(p.holds(&Role::new("CORP\\alice")));
        assert!(!p.holds(&Role::new("dev")));
    }

    #[test]
    fn identity_name_is_matched_literally() {
        let p = Principal::new("Alice", vec![Role::new("CORP\\Ops")]);
        assert!(p.holds(&Role::new("Alice")));
        assert!(!p.holds(&Role::new("alice")));
        assert!(!p.holds(&Role::new("ALICE")));
        assert!(p.holds(&Role::new("corp\\ops")));
    }
}
