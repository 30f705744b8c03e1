//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize the product store from config
//! - Bind the listener
//! - Build the HTTP server around the store
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned to the caller, which exits
//! - The listener is bound before the server is built, so a bind failure
//!   never leaves a half-started server behind

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::net::listener::{Listener, ListenerError};
use crate::observability::metrics;
use crate::products::ProductStore;

/// A bound listener and the server ready to run on it.
pub struct Prepared {
    pub server: HttpServer,
    pub listener: Listener,
}

impl Prepared {
    /// Address the listener actually bound (resolves port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }
}

/// Seed the store, bind the listener and build the server.
pub async fn prepare(config: ServiceConfig) -> Result<Prepared, ListenerError> {
    let store = if config.store.seed {
        ProductStore::seeded()
    } else {
        ProductStore::new()
    };
    tracing::info!(products = store.len(), "Product store initialized");
    metrics::record_store_size(store.len());

    let listener = Listener::bind(&config.listener).await?;
    let server = HttpServer::new(config, Arc::new(store));

    Ok(Prepared { server, listener })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        config
    }

    #[tokio::test]
    async fn binds_ephemeral_port_with_seeded_store() {
        let prepared = prepare(local_config()).await.unwrap();
        assert_ne!(prepared.local_addr().unwrap().port(), 0);
        assert_eq!(prepared.server.store().len(), 2);
    }

    #[tokio::test]
    async fn seed_can_be_disabled() {
        let mut config = local_config();
        config.store.seed = false;
        let prepared = prepare(config).await.unwrap();
        assert!(prepared.server.store().is_empty());
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let first = prepare(local_config()).await.unwrap();
        let mut config = local_config();
        config.listener.bind_address = first.local_addr().unwrap().to_string();

        assert!(matches!(prepare(config).await, Err(ListenerError::Bind(_))));
    }
}
