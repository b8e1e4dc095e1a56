use axum::{Router, routing::get};

pub mod access_groups;
pub mod accounts;
pub mod cluster;
pub mod cluster_stats;
pub mod qos;
pub mod snapshots;
pub mod system;
pub mod volumes;

/// Router for every endpoint that carries a caller identity.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/SolidFire/:cluster", cluster_router())
}

/// Endpoints addressed to one named cluster.
fn cluster_router() -> Router {
    Router::new()
        .merge(cluster::router())
        .merge(volumes::router())
        .merge(qos::router())
        .merge(snapshots::router())
        .merge(access_groups::router())
        .merge(accounts::router())
        .merge(cluster_stats::router())
}
