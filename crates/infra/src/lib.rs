//! Infrastructure layer: configuration, cluster JSON-RPC client, tenant scoping.

pub mod config;
pub mod models;
pub mod rpc;
pub mod tenant_scope;
