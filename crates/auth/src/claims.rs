use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity claims as delivered by the host's authentication layer.
///
/// `group_ids` are platform group identifiers (e.g. Windows SIDs) that still
/// need translating into the display names used in role lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawClaims {
    pub name: Option<String>,
    pub group_ids: Vec<String>,
}

impl RawClaims {
    pub fn new(name: impl Into<String>, group_ids: Vec<String>) -> Self {
        Self {
            name: Some(name.into()),
            group_ids,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GroupTranslationError {
    #[error("group '{0}' is not present in the directory")]
    Unknown(String),

    #[error("group identifier is blank")]
    Blank,
}

/// Translate a platform group identifier into its display name.
pub trait GroupTranslator: Send + Sync {
    fn translate(&self, group_id: &str) -> Result<String, GroupTranslationError>;
}

/// Identifiers are already display names.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

impl GroupTranslator for PassthroughTranslator {
    fn translate(&self, group_id: &str) -> Result<String, GroupTranslationError> {
        let trimmed = group_id.trim();
        if trimmed.is_empty() {
            return Err(GroupTranslationError::Blank);
        }
        Ok(trimmed.to_owned())
    }
}

/// Static identifier → display name table.
#[derive(Debug, Clone, Default)]
pub struct DirectoryTranslator {
    entries: HashMap<String, String>,
}

impl DirectoryTranslator {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl GroupTranslator for DirectoryTranslator {
    fn translate(&self, group_id: &str) -> Result<String, GroupTranslationError> {
        let trimmed = group_id.trim();
        if trimmed.is_empty() {
            return Err(GroupTranslationError::Blank);
        }
        self.entries
            .get(trimmed)
            .cloned()
            .ok_or_else(|| GroupTranslationError::Unknown(trimmed.to_owned()))
    }
}
