//! Request extraction helpers and JSON mapping.
//!
//! Wire types shared with the cluster live in `solidgate_infra::models`; this
//! module only adapts HTTP inputs to them.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use solidgate_core::{AccountId, GatewayError, GatewayResult};

/// `?accountID=` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountQuery {
    #[serde(rename = "accountID", default)]
    pub account_id: Option<String>,
}

impl AccountQuery {
    pub fn account(&self) -> GatewayResult<AccountId> {
        self.account_id
            .as_deref()
            .ok_or_else(|| GatewayError::validation("missingAccountId", "accountID is required"))?
            .parse()
    }
}

/// Unwrap a JSON body, turning extractor rejections into validation errors.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> GatewayResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| GatewayError::validation("invalidBody", e.body_text()))
}

/// Body that may be left out. Only an absent or blank body yields
/// `T::default()`; anything else must parse.
pub fn optional_body<T>(raw: &[u8]) -> GatewayResult<T>
where
    T: DeserializeOwned + Default,
{
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(raw).map_err(|e| GatewayError::validation("invalidBody", e.to_string()))
}

/// Parse an id taken from the URL path.
pub fn path_id<T>(raw: &str) -> GatewayResult<T>
where
    T: core::str::FromStr<Err = GatewayError>,
{
    raw.parse()
}

pub fn to_json<T: Serialize>(value: &T) -> GatewayResult<Value> {
    serde_json::to_value(value).map_err(|e| GatewayError::MalformedUpstreamResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use solidgate_core::VolumeId;
    use solidgate_infra::models::ListSnapshotsRequest;

    #[test]
    fn account_query_requires_numeric_id() {
        let q = AccountQuery { account_id: Some(" 100 ".into()) };
        assert_eq!(q.account().unwrap(), AccountId::new(100));

        let missing = AccountQuery::default().account().unwrap_err();
        assert!(matches!(missing, GatewayError::Validation { code: "missingAccountId", .. }));

        let bad = AccountQuery { account_id: Some("abc".into()) }.account().unwrap_err();
        assert!(matches!(bad, GatewayError::Validation { code: "invalidId", .. }));
    }

    #[test]
    fn path_ids_parse_into_newtypes() {
        assert_eq!(path_id::<VolumeId>("42").unwrap(), VolumeId::new(42));
        assert!(path_id::<VolumeId>("4x2").is_err());
    }

    #[test]
    fn optional_body_defaults_only_when_blank() {
        let empty: ListSnapshotsRequest = optional_body(b"").unwrap();
        assert!(empty.volume_id.is_none());
        let blank: ListSnapshotsRequest = optional_body(b" \n").unwrap();
        assert!(blank.volume_id.is_none());

        let given: ListSnapshotsRequest = optional_body(br#"{"volumeID": 3}"#).unwrap();
        assert_eq!(given.volume_id, Some(VolumeId::new(3)));

        for raw in [&br#"{"volumeID": "3"}"#[..], &b"{"[..], &b"null"[..]] {
            let err = optional_body::<ListSnapshotsRequest>(raw).unwrap_err();
            assert!(matches!(err, GatewayError::Validation { code: "invalidBody", .. }));
        }
    }
}
