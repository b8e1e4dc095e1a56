use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use solidgate_core::{GatewayError, GatewayResult};

use super::envelope::{RpcRequest, RpcResponse, strip_nulls};
use super::transport::{HttpTransport, RpcTransport, build_http_client};
use super::RpcError;
use crate::config::{ClusterRegistry, ConfigError};

/// JSON-RPC client bound to one named cluster.
///
/// One round trip per call; failures are returned as-is, never retried.
pub struct RpcGatewayClient {
    cluster: String,
    transport: Arc<dyn RpcTransport>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for RpcGatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcGatewayClient")
            .field("cluster", &self.cluster)
            .field("endpoint", &self.transport.endpoint())
            .finish()
    }
}

impl RpcGatewayClient {
    pub fn new(cluster: impl Into<String>, transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            cluster: cluster.into(),
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// Invoke `method` with `params` and decode the `result` member as `T`.
    pub async fn call<P, T>(&self, method: &str, params: &P) -> GatewayResult<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let params = serde_json::to_value(params)
            .map_err(|e| GatewayError::validation("invalidParams", e.to_string()))?;
        self.call_value(method, params)
            .await
            .and_then(|result| {
                serde_json::from_value(result).map_err(|e| {
                    RpcError::Malformed(format!("unexpected {method} result: {e}"))
                })
            })
            .map_err(GatewayError::from)
    }

    async fn call_value(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            method,
            params: strip_nulls(params),
            id,
        };
        tracing::debug!(cluster = %self.cluster, method, id, "json-rpc call");
        tracing::trace!(cluster = %self.cluster, params = %request.params, "json-rpc params");

        let body = serde_json::to_value(&request)
            .map_err(|e| RpcError::Malformed(format!("request serialization failed: {e}")))?;

        let outcome = match self.transport.send(body).await {
            Ok(raw) => {
                tracing::trace!(cluster = %self.cluster, method, body = %raw, "json-rpc response");
                serde_json::from_value::<RpcResponse>(raw)
                    .map_err(|e| RpcError::Malformed(format!("invalid json-rpc envelope: {e}")))
                    .and_then(|response| response.into_result(id))
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            tracing::warn!(cluster = %self.cluster, method, id, error = %e, "json-rpc call failed");
        }
        outcome
    }
}

/// Per-cluster HTTP clients, built once at startup.
///
/// Each [`RpcGatewayClient`] handed out shares its cluster's connection pool;
/// its credentials are looked up again from the registry by endpoint.
#[derive(Debug, Clone)]
pub struct ClusterClients {
    registry: Arc<ClusterRegistry>,
    http: HashMap<String, Client>,
}

impl ClusterClients {
    pub fn build(registry: Arc<ClusterRegistry>) -> Result<Self, ConfigError> {
        let mut http = HashMap::new();
        for cluster in registry.iter() {
            http.insert(cluster.name.clone(), build_http_client(cluster)?);
        }
        Ok(Self { registry, http })
    }

    pub fn registry(&self) -> &ClusterRegistry {
        &self.registry
    }

    pub fn client_for(&self, cluster: &str) -> GatewayResult<RpcGatewayClient> {
        let config = self.registry.get(cluster)?;
        let http = self
            .http
            .get(cluster)
            .cloned()
            .ok_or_else(|| GatewayError::UnknownCluster(cluster.to_owned()))?;
        let credentials = self.registry.credentials_for_endpoint(&config.endpoint);
        let transport = HttpTransport::new(http, config.endpoint.clone(), credentials);
        Ok(RpcGatewayClient::new(cluster, Arc::new(transport)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::config::ClusterConfig;

    #[derive(Default)]
    struct Seen {
        auth: Mutex<Vec<Option<String>>>,
        bodies: Mutex<Vec<Value>>,
    }

    async fn spawn_upstream(
        reply: fn(&Value) -> (StatusCode, String),
    ) -> (String, Arc<Seen>) {
        let seen = Arc::new(Seen::default());
        let app = Router::new()
            .route(
                "/json-rpc/12.3",
                post(
                    move |State(seen): State<Arc<Seen>>, headers: HeaderMap, body: axum::Json<Value>| async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_owned);
                        seen.auth.lock().unwrap().push(auth);
                        seen.bodies.lock().unwrap().push(body.0.clone());
                        reply(&body.0).into_response()
                    },
                ),
            )
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/json-rpc/12.3"), seen)
    }

    fn clients_for(endpoint: &str, username: Option<&str>) -> ClusterClients {
        let registry = ClusterRegistry::new([ClusterConfig {
            name: "lab".into(),
            endpoint: endpoint.to_owned(),
            username: username.map(str::to_owned),
            password: Some("secret".into()),
            skip_tls_validation: false,
            timeout: Duration::from_secs(5),
        }]);
        ClusterClients::build(Arc::new(registry)).unwrap()
    }

    #[derive(Debug, Deserialize)]
    struct Volumes {
        volumes: Vec<Value>,
    }

    fn echo_volumes(req: &Value) -> (StatusCode, String) {
        let body = json!({"id": req["id"], "result": {"volumes": [{"volumeID": 1}]}});
        (StatusCode::OK, body.to_string())
    }

    #[tokio::test]
    async fn posts_envelope_with_basic_auth_and_decodes_result() {
        let (endpoint, seen) = spawn_upstream(echo_volumes).await;
        let client = clients_for(&endpoint, Some("gateway")).client_for("lab").unwrap();

        let out: Volumes = client
            .call("ListVolumesForAccount", &json!({"accountID": 100, "includeVirtualVolumes": false}))
            .await
            .unwrap();
        assert_eq!(out.volumes.len(), 1);

        let body = seen.bodies.lock().unwrap()[0].clone();
        assert_eq!(body["method"], "ListVolumesForAccount");
        assert_eq!(body["id"], 1);
        assert_eq!(body["params"]["accountID"], 100);
        assert_eq!(
            seen.auth.lock().unwrap()[0].as_deref(),
            Some("Basic Z2F0ZXdheTpzZWNyZXQ=")
        );
    }

    #[tokio::test]
    async fn null_params_are_omitted_and_no_auth_without_credentials() {
        let (endpoint, seen) = spawn_upstream(echo_volumes).await;
        let client = clients_for(&endpoint, None).client_for("lab").unwrap();

        let _: Volumes = client
            .call("ModifyVolume", &json!({"volumeID": 3, "access": null, "totalSize": null}))
            .await
            .unwrap();

        let body = seen.bodies.lock().unwrap()[0].clone();
        assert_eq!(body["params"], json!({"volumeID": 3}));
        assert_eq!(seen.auth.lock().unwrap()[0], None);
    }

    #[tokio::test]
    async fn rpc_error_envelope_is_reported_with_its_message() {
        let (endpoint, _) = spawn_upstream(|req| {
            let body = json!({
                "id": req["id"],
                "error": {"code": 500, "name": "xVolumeIDDoesNotExist", "message": "VolumeID 42 does not exist."}
            });
            (StatusCode::OK, body.to_string())
        })
        .await;
        let client = clients_for(&endpoint, None).client_for("lab").unwrap();

        let err = client
            .call::<_, Value>("GetVolume", &json!({"volumeID": 42}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "JSON-RPC error: VolumeID 42 does not exist.");
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn envelope_without_result_or_error_is_malformed() {
        let (endpoint, _) = spawn_upstream(|req| (StatusCode::OK, json!({"id": req["id"]}).to_string())).await;
        let client = clients_for(&endpoint, None).client_for("lab").unwrap();
        let err = client.call::<_, Value>("GetClusterInfo", &json!({})).await.unwrap_err();
        assert!(matches!(err, GatewayError::MalformedUpstreamResponse(_)));
    }

    #[tokio::test]
    async fn undecodable_body_or_result_is_malformed() {
        let (endpoint, _) = spawn_upstream(|_| (StatusCode::OK, "<html>gateway</html>".into())).await;
        let client = clients_for(&endpoint, None).client_for("lab").unwrap();
        let err = client.call::<_, Value>("GetClusterInfo", &json!({})).await.unwrap_err();
        assert!(matches!(err, GatewayError::MalformedUpstreamResponse(_)));

        let (endpoint, _) = spawn_upstream(|req| {
            (StatusCode::OK, json!({"id": req["id"], "result": {"volumes": 7}}).to_string())
        })
        .await;
        let client = clients_for(&endpoint, None).client_for("lab").unwrap();
        let err = client.call::<_, Volumes>("ListVolumes", &json!({})).await.unwrap_err();
        assert!(matches!(err, GatewayError::MalformedUpstreamResponse(_)));
    }

    #[tokio::test]
    async fn non_success_status_is_unreachable() {
        let (endpoint, _) = spawn_upstream(|_| (StatusCode::INTERNAL_SERVER_ERROR, "boom".into())).await;
        let client = clients_for(&endpoint, None).client_for("lab").unwrap();
        let err = client.call::<_, Value>("GetClusterInfo", &json!({})).await.unwrap_err();
        assert!(matches!(err, GatewayError::UpstreamUnreachable(ref m) if m.contains("500")));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = clients_for(&format!("http://{addr}/json-rpc/12.3"), None)
            .client_for("lab")
            .unwrap();
        let err = client.call::<_, Value>("GetClusterInfo", &json!({})).await.unwrap_err();
        assert!(matches!(err, GatewayError::UpstreamUnreachable(_)));
    }

    #[test]
    fn unknown_cluster_is_rejected_before_any_call() {
        let clients = clients_for("http://127.0.0.1:1/json-rpc", None);
        assert_eq!(
            clients.client_for("nope").unwrap_err(),
            GatewayError::UnknownCluster("nope".into())
        );
    }
}
