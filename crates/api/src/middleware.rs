use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use solidgate_auth::{GroupTranslator, RawClaims, resolve};
use solidgate_infra::config::IdentitySettings;

use crate::context::{PrincipalContext, RequestId};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct IdentityState {
    pub settings: IdentitySettings,
    pub translator: Arc<dyn GroupTranslator>,
}

/// Resolve the proxy-supplied identity into a [`PrincipalContext`].
///
/// Never rejects: a request without identity carries an anonymous principal,
/// and handlers answer 401 through the authorizer.
pub async fn identity_middleware(
    State(state): State<IdentityState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let claims = extract_claims(req.headers(), &state.settings);
    let resolved = resolve(&claims, state.translator.as_ref());

    for dropped in &resolved.dropped {
        tracing::warn!(
            principal = claims.name.as_deref().unwrap_or_default(),
            error = %dropped,
            "dropping untranslatable group"
        );
    }

    req.extensions_mut()
        .insert(PrincipalContext::new(resolved.principal));

    next.run(req).await
}

fn extract_claims(headers: &HeaderMap, settings: &IdentitySettings) -> RawClaims {
    let name = header_str(headers, &settings.user_header)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_owned);

    let group_ids = header_str(headers, &settings.groups_header)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    RawClaims { name, group_ids }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Assign a request id, run the request inside a span carrying it, and echo
/// it on the response.
pub async fn request_id_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let request_id = RequestId::new();
    req.extensions_mut().insert(request_id);

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut response = next.run(req).instrument(span.clone()).await;
    span.in_scope(|| {
        tracing::info!(status = response.status().as_u16(), "request completed");
    });

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
