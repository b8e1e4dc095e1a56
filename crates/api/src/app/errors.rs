use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Value, json};

use solidgate_core::{GatewayError, GatewayResult};

/// HTTP status and stable error code for a gateway error.
pub fn status_and_code(err: &GatewayError) -> (StatusCode, &'static str) {
    match err {
        GatewayError::AuthenticationRequired => (StatusCode::UNAUTHORIZED, "unauthenticated"),
        GatewayError::AuthorizationDenied { .. } => (StatusCode::FORBIDDEN, "forbidden"),
        GatewayError::TenantNotAllowed(_) => (StatusCode::FORBIDDEN, "tenantNotAllowed"),
        GatewayError::OwnershipViolation { code, .. } => (StatusCode::FORBIDDEN, *code),
        GatewayError::Validation { code, .. } => (StatusCode::BAD_REQUEST, *code),
        GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "notfound"),
        GatewayError::UnknownCluster(_) => (StatusCode::NOT_FOUND, "unknownCluster"),
        GatewayError::UpstreamUnreachable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unreachable"),
        GatewayError::UpstreamRpc { .. } => (StatusCode::BAD_REQUEST, "rpcError"),
        GatewayError::MalformedUpstreamResponse(_) => (StatusCode::BAD_GATEWAY, "malformedResponse"),
    }
}

pub fn gateway_error_to_response(cluster: Option<&str>, err: GatewayError) -> axum::response::Response {
    let (status, code) = status_and_code(&err);
    if status.is_server_error() {
        tracing::warn!(cluster = cluster.unwrap_or_default(), error = %err, code, "upstream failure");
    } else {
        tracing::info!(cluster = cluster.unwrap_or_default(), error = %err, code, "request rejected");
    }
    json_error(status, cluster, code, err.to_string())
}

pub fn json_error(
    status: StatusCode,
    cluster: Option<&str>,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    let mut body = json!({
        "id": 1,
        "error": code,
        "message": message.into(),
    });
    if let Some(cluster) = cluster {
        body["cluster"] = Value::String(cluster.to_owned());
    }
    (status, axum::Json(body)).into_response()
}

/// Wrap a result as `{ "id": 1, "result": ... }` or the matching error body.
pub fn respond(cluster: &str, result: GatewayResult<Value>) -> axum::response::Response {
    match result {
        Ok(result) => axum::Json(json!({ "id": 1, "result": result })).into_response(),
        Err(e) => gateway_error_to_response(Some(cluster), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solidgate_core::AccountId;

    #[test]
    fn every_error_has_a_distinct_status_class() {
        let cases = [
            (GatewayError::AuthenticationRequired, 401, "unauthenticated"),
            (GatewayError::denied("volumes", "List"), 403, "forbidden"),
            (GatewayError::TenantNotAllowed(AccountId::new(9)), 403, "tenantNotAllowed"),
            (GatewayError::ownership("forbiddenGroup", "x"), 403, "forbiddenGroup"),
            (GatewayError::validation("invalidRetentionRange", "x"), 400, "invalidRetentionRange"),
            (GatewayError::not_found("x"), 404, "notfound"),
            (GatewayError::UnknownCluster("x".into()), 404, "unknownCluster"),
            (GatewayError::UpstreamUnreachable("x".into()), 503, "unreachable"),
            (
                GatewayError::UpstreamRpc { code: None, name: None, message: "x".into() },
                400,
                "rpcError",
            ),
            (GatewayError::MalformedUpstreamResponse("x".into()), 502, "malformedResponse"),
        ];
        for (err, status, code) in cases {
            assert_eq!(status_and_code(&err), (StatusCode::from_u16(status).unwrap(), code));
        }
    }
}
