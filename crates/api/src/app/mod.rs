//! HTTP API application wiring (axum router + service wiring).
//!
//! - `services.rs`: policy table, cluster clients and tenant set
//! - `routes/`: HTTP routes + handlers (one file per resource area)
//! - `dto.rs`: request extraction helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use solidgate_auth::{DirectoryTranslator, GroupTranslator, PassthroughTranslator};
use solidgate_infra::config::GatewaySettings;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<services::GatewayServices>, settings: &GatewaySettings) -> Router {
    let translator: Arc<dyn GroupTranslator> = if settings.group_directory.is_empty() {
        Arc::new(PassthroughTranslator)
    } else {
        Arc::new(DirectoryTranslator::new(settings.group_directory.clone()))
    };
    let identity = middleware::IdentityState {
        settings: settings.identity.clone(),
        translator,
    };

    // Routed endpoints: caller identity resolved, services attached.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            identity,
            middleware::identity_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        )))
}
