//! JSON-RPC client for the storage cluster.

pub mod client;
pub mod envelope;
pub mod error;
pub mod transport;

pub use client::{ClusterClients, RpcGatewayClient};
pub use error::RpcError;
pub use transport::{HttpTransport, RpcTransport};

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transport that answers from a method → handler script.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::{RpcError, RpcGatewayClient, RpcTransport};

    type Handler = Box<dyn Fn(&Value) -> Result<Value, RpcError> + Send + Sync>;

    #[derive(Default)]
    pub struct ScriptedTransport {
        handlers: Vec<(String, Handler)>,
        calls: Mutex<Vec<(String, Value)>>,
        stalled: Vec<i64>,
        in_flight: AtomicUsize,
    }

    struct InFlight<'a>(&'a AtomicUsize);

    impl Drop for InFlight<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn on(
            mut self,
            method: &str,
            handler: impl Fn(&Value) -> Result<Value, RpcError> + Send + Sync + 'static,
        ) -> Self {
            self.handlers.push((method.to_owned(), Box::new(handler)));
            self
        }

        /// `ListVolumesForAccount` answering from an (account, volume ids) table.
        pub fn with_accounts(self, table: &[(i64, &[i64])]) -> Self {
            let table: Vec<(i64, Vec<i64>)> = table.iter().map(|(a, v)| (*a, v.to_vec())).collect();
            self.on("ListVolumesForAccount", move |params| {
                let account = params["accountID"].as_i64().unwrap_or_default();
                let volumes: Vec<Value> = table
                    .iter()
                    .filter(|(a, _)| *a == account)
                    .flat_map(|(a, ids)| {
                        ids.iter().map(move |id| {
                            json!({"volumeID": id, "accountID": a, "name": format!("vol{id}")})
                        })
                    })
                    .collect();
                Ok(json!({ "volumes": volumes }))
            })
        }

        /// `ListVolumesForAccount` for this account never answers.
        pub fn stall_account(mut self, account: i64) -> Self {
            self.stalled.push(account);
            self
        }

        /// Requests sent but not yet answered or dropped.
        pub fn in_flight(&self) -> usize {
            self.in_flight.load(Ordering::SeqCst)
        }

        pub fn methods(&self) -> Vec<String> {
            self.calls
                .lock()
                .map(|c| c.iter().map(|(m, _)| m.clone()).collect())
                .unwrap_or_default()
        }

        pub fn params_of(&self, method: &str) -> Vec<Value> {
            self.calls
                .lock()
                .map(|c| c.iter().filter(|(m, _)| m == method).map(|(_, p)| p.clone()).collect())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl RpcTransport for ScriptedTransport {
        fn endpoint(&self) -> &str {
            "scripted://cluster"
        }

        async fn send(&self, request: Value) -> Result<Value, RpcError> {
            let method = request["method"].as_str().unwrap_or_default().to_owned();
            let params = request["params"].clone();
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((method.clone(), params.clone()));
            }
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            let _guard = InFlight(&self.in_flight);
            if method == "ListVolumesForAccount"
                && params["accountID"].as_i64().is_some_and(|a| self.stalled.contains(&a))
            {
                std::future::pending::<()>().await;
            }
            let handler = self
                .handlers
                .iter()
                .find(|(m, _)| *m == method)
                .map(|(_, h)| h)
                .ok_or_else(|| RpcError::Unreachable(format!("no script for {method}")))?;
            let result = handler(&params)?;
            Ok(json!({ "id": request["id"], "result": result }))
        }
    }

    pub fn client(transport: &Arc<ScriptedTransport>) -> RpcGatewayClient {
        RpcGatewayClient::new("test", transport.clone())
    }
}
