//! JSON-RPC envelope as spoken by the storage cluster.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RpcError;

/// Outgoing request: `{ "method", "params", "id" }`.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub method: &'a str,
    pub params: Value,
    pub id: u64,
}

/// Error object carried in a response's `error` member.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Incoming response: `{ "id", "result" }` or `{ "id", "error" }`.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    /// Resolve the envelope into its result payload.
    ///
    /// A response that echoes a different id, or carries both or neither of
    /// `result` and `error`, is malformed.
    pub fn into_result(self, expected_id: u64) -> Result<Value, RpcError> {
        if let Some(id) = &self.id {
            if !id.is_null() && id.as_u64() != Some(expected_id) {
                return Err(RpcError::Malformed(format!(
                    "response id {id} does not match request id {expected_id}"
                )));
            }
        }

        match (self.result, self.error) {
            (Some(_), Some(_)) => Err(RpcError::Malformed(
                "response carries both result and error".into(),
            )),
            (None, Some(err)) => Err(RpcError::Rpc {
                code: err.code,
                name: err.name,
                message: err.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(RpcError::Malformed(
                "response carries neither result nor error".into(),
            )),
        }
    }
}

/// Remove null-valued object members, recursively.
///
/// Optional parameters the caller left unset are omitted from the wire
/// instead of being sent as `null`.
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> RpcResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn result_envelope_yields_payload() {
        let out = parse(json!({"id": 1, "result": {"volumes": []}})).into_result(1).unwrap();
        assert_eq!(out, json!({"volumes": []}));
    }

    #[test]
    fn error_envelope_yields_rpc_error() {
        let err = parse(json!({
            "id": 1,
            "error": {"code": 500, "name": "xVolumeIDDoesNotExist", "message": "VolumeID 9 does not exist."}
        }))
        .into_result(1)
        .unwrap_err();
        assert_eq!(
            err,
            RpcError::Rpc {
                code: Some(500),
                name: Some("xVolumeIDDoesNotExist".into()),
                message: "VolumeID 9 does not exist.".into(),
            }
        );
    }

    #[test]
    fn envelopes_violating_the_contract_are_malformed() {
        assert!(matches!(parse(json!({"id": 1})).into_result(1), Err(RpcError::Malformed(_))));
        assert!(matches!(
            parse(json!({"id": 1, "result": {}, "error": {"message": "x"}})).into_result(1),
            Err(RpcError::Malformed(_))
        ));
        assert!(matches!(
            parse(json!({"id": 7, "result": {}})).into_result(1),
            Err(RpcError::Malformed(_))
        ));
    }

    #[test]
    fn strip_nulls_is_recursive_and_keeps_falsey_values() {
        let stripped = strip_nulls(json!({
            "volumeID": 4,
            "access": null,
            "qos": {"minIOPS": 0, "burstIOPS": null},
            "attributes": {"flag": false, "note": ""},
            "list": [{"a": null, "b": 1}]
        }));
        assert_eq!(
            stripped,
            json!({
                "volumeID": 4,
                "qos": {"minIOPS": 0},
                "attributes": {"flag": false, "note": ""},
                "list": [{"b": 1}]
            })
        );
    }
}
