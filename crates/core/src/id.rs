//! Strongly-typed identifiers used across the gateway.
//!
//! The storage cluster numbers every object with a plain integer; wrapping them
//! keeps an account id from being passed where a volume id is expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Identifier of a tenant account on the storage cluster.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i64);

/// Identifier of a volume.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolumeId(i64);

/// Identifier of a volume access group.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessGroupId(i64);

/// Identifier of a QoS policy.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QosPolicyId(i64);

macro_rules! impl_int_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = GatewayError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| GatewayError::validation("invalidId", format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }
    };
}

impl_int_newtype!(AccountId, "AccountId");
impl_int_newtype!(VolumeId, "VolumeId");
impl_int_newtype!(AccessGroupId, "AccessGroupId");
impl_int_newtype!(QosPolicyId, "QosPolicyId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_integers() {
        let id: VolumeId = " 42 ".parse().unwrap();
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = "abc".parse::<AccountId>().unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));
    }

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_string(&AccountId::new(100)).unwrap();
        assert_eq!(json, "100");
    }
}
