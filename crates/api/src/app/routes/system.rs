use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::app::errors;
use crate::app::services::GatewayServices;
use crate::authz;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(services): Extension<Arc<GatewayServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(e) = authz::require_authenticated(&principal) {
        return errors::gateway_error_to_response(None, e);
    }

    Json(serde_json::json!({
        "name": principal.name(),
        "groups": principal.groups().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "globalAdmin": services.is_global_admin(&principal),
    }))
    .into_response()
}
