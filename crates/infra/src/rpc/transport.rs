use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::redirect::Policy;
use serde_json::Value;

use super::RpcError;
use crate::config::{ClusterConfig, ConfigError, Credentials};

/// Carries one serialized JSON-RPC request to a cluster and returns the
/// decoded response body.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Base address the transport posts to.
    fn endpoint(&self) -> &str;

    async fn send(&self, request: Value) -> Result<Value, RpcError>;
}

#[async_trait]
impl<T> RpcTransport for Arc<T>
where
    T: RpcTransport + ?Sized,
{
    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }

    async fn send(&self, request: Value) -> Result<Value, RpcError> {
        (**self).send(request).await
    }
}

/// Build the pooled HTTP client for one cluster.
///
/// `reqwest::Client` is reference counted; clones share the connection pool.
pub fn build_http_client(cluster: &ClusterConfig) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(cluster.timeout)
        .redirect(Policy::none())
        .danger_accept_invalid_certs(cluster.skip_tls_validation)
        .build()
        .map_err(|e| ConfigError::Client {
            cluster: cluster.name.clone(),
            reason: e.to_string(),
        })
}

/// HTTP POST transport with optional basic auth.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    credentials: Option<Credentials>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl HttpTransport {
    pub fn new(client: Client, endpoint: impl Into<String>, credentials: Option<Credentials>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            credentials,
        }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, request: Value) -> Result<Value, RpcError> {
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(creds) = &self.credentials {
            builder = builder.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RpcError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RpcError::Unreachable(format!(
                "http status {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RpcError::Unreachable(e.to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| RpcError::Malformed(format!("invalid json-rpc response: {e}")))
    }
}
