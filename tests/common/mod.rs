//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use product_api::config::ServiceConfig;
use product_api::http::ServerError;
use product_api::lifecycle::{self, ServerState, Shutdown};
use product_api::ProductStore;

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub state: watch::Receiver<ServerState>,
    pub store: Arc<ProductStore>,
    pub handle: JoinHandle<Result<(), ServerError>>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Trigger shutdown and wait for `run` to return.
    pub async fn stop(self) -> Result<(), ServerError> {
        self.shutdown.trigger();
        self.handle.await.expect("server task panicked")
    }
}

/// Config bound to 127.0.0.1 on a free port.
pub fn local_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}

/// Start a server with `config` and wait until it is listening.
pub async fn start_server(config: ServiceConfig) -> TestServer {
    let prepared = lifecycle::prepare(config).await.expect("bind test listener");
    let addr = prepared.local_addr().unwrap();
    let mut state = prepared.server.state();
    let store = Arc::clone(prepared.server.store());

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(prepared.server.run(prepared.listener, server_shutdown));

    state
        .wait_for(|s| *s >= ServerState::Listening)
        .await
        .expect("server state channel closed");

    TestServer {
        addr,
        shutdown,
        state,
        store,
        handle,
    }
}

/// A reqwest client that never reuses connections.
#[allow(dead_code)]
pub fn fresh_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
