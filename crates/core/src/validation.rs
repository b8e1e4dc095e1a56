//! Boundary validation applied before any upstream call.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};
use crate::value::AttributeMap;

/// Largest serialized attribute payload accepted on create/modify.
pub const MAX_ATTRIBUTE_BYTES: usize = 256;

/// Largest number of non-reserved attribute keys accepted on modify.
pub const MAX_USER_ATTRIBUTES: usize = 3;

/// Key prefix for attributes managed by the platform rather than callers.
pub const RESERVED_ATTRIBUTE_PREFIX: &str = "_reserved";

/// Snapshot retention period in `HH:MM:SS` form.
///
/// Hours range over 0-99, minutes and seconds over 0-59. Each part is one or
/// two digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Retention {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl Retention {
    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn as_secs(&self) -> u64 {
        u64::from(self.hours) * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }
}

impl FromStr for Retention {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_error =
            || GatewayError::validation("invalidRetentionFormat", "Retention must be HH:mm:ss");

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(format_error());
        }

        let mut fields = [0u8; 3];
        for (slot, part) in fields.iter_mut().zip(&parts) {
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format_error());
            }
            *slot = part.parse().map_err(|_| format_error())?;
        }

        let [hours, minutes, seconds] = fields;
        if hours > 99 || minutes > 59 || seconds > 59 {
            return Err(GatewayError::validation(
                "invalidRetentionRange",
                "Retention parts out of range: hours 0-99, minutes/seconds 0-59",
            ));
        }

        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }
}

impl TryFrom<String> for Retention {
    type Error = GatewayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Retention> for String {
    fn from(value: Retention) -> Self {
        value.to_string()
    }
}

impl core::fmt::Display for Retention {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

pub fn is_reserved_attribute(key: &str) -> bool {
    key.starts_with(RESERVED_ATTRIBUTE_PREFIX)
}

/// Reject attribute payloads whose JSON form exceeds [`MAX_ATTRIBUTE_BYTES`].
pub fn check_attribute_size(attributes: &AttributeMap) -> GatewayResult<()> {
    if attributes.is_empty() {
        return Ok(());
    }
    let size = serde_json::to_vec(attributes)
        .map_err(|e| GatewayError::validation("invalidAttributes", e.to_string()))?
        .len();
    if size > MAX_ATTRIBUTE_BYTES {
        return Err(GatewayError::validation(
            "attributesTooLarge",
            format!("Attributes payload is {size} bytes; max is {MAX_ATTRIBUTE_BYTES}."),
        ));
    }
    Ok(())
}

/// Validate attributes submitted on a modify request.
///
/// Checks the payload size and caps the number of non-reserved keys.
pub fn check_modify_attributes(submitted: &AttributeMap) -> GatewayResult<()> {
    check_attribute_size(submitted)?;
    let user_keys = submitted.keys().filter(|k| !is_reserved_attribute(k)).count();
    if user_keys > MAX_USER_ATTRIBUTES {
        return Err(GatewayError::validation(
            "tooManyAttributes",
            format!("Maximum {MAX_USER_ATTRIBUTES} user attributes allowed"),
        ));
    }
    Ok(())
}

/// Merge submitted attributes onto the reserved keys already on a resource.
///
/// Existing non-reserved keys are replaced wholesale by the submission;
/// reserved keys survive unless the submission names them explicitly.
pub fn merge_attributes(existing: &AttributeMap, submitted: AttributeMap) -> AttributeMap {
    let mut merged: AttributeMap = existing
        .iter()
        .filter(|(k, _)| is_reserved_attribute(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    merged.extend(submitted);
    merged
}
