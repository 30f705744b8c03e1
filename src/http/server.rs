//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Create the Axum Router with the dispatch handler
//! - Wire up middleware (request id, tracing, response timeout)
//! - Accept connections and serve each one in its own task
//! - Drain in-flight requests on shutdown, bounded by the grace period
//!
//! # Design Decisions
//! - Routing goes through our own `RouteTable` so bad ids are 400 and
//!   everything unregistered is 405
//! - The listener is dropped the moment shutdown starts
//! - Connections still open after the grace period are aborted
//! - HTTP/1.1 only, so every connection is covered by the idle and head bounds

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper::{body::Incoming, server::conn::http1};
use hyper_util::{
    rt::{TokioIo, TokioTimer},
    server::graceful::GracefulShutdown,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinSet;
use tower::Service;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::error::ApiError;
use crate::http::handlers;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::http::validation::{with_validated_product, BodyPolicy};
use crate::lifecycle::state::{Lifecycle, ServerState};
use crate::net::connection::ConnectionTracker;
use crate::net::deadline::HeadDeadline;
use crate::net::listener::{Listener, ListenerError};
use crate::observability::{metrics, tracing::request_span};
use crate::products::ProductStore;
use crate::routing::{Operation, ParamError, RouteTable};

/// Pause after a failed accept so a persistent error (e.g. fd exhaustion)
/// does not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Errors that end [`HttpServer::run`].
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("graceful shutdown exceeded {grace_secs}s with {open_connections} connection(s) still open")]
    ShutdownTimeout {
        grace_secs: u64,
        open_connections: u64,
    },
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ProductStore>,
    pub routes: Arc<RouteTable>,
    pub body_policy: BodyPolicy,
}

/// HTTP server for the product API.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    store: Arc<ProductStore>,
    lifecycle: Lifecycle,
}

impl HttpServer {
    /// Create a new HTTP server serving `store`.
    pub fn new(config: ServiceConfig, store: Arc<ProductStore>) -> Self {
        let state = AppState {
            store: Arc::clone(&store),
            routes: Arc::new(RouteTable::products()),
            body_policy: BodyPolicy {
                max_bytes: config.limits.max_body_bytes,
                read_timeout: config.timeouts.read(),
            },
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            store,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        Router::new()
            .route("/", any(dispatch))
            .route("/{*path}", any(dispatch))
            .with_state(state)
            .layer(response_deadline(config.timeouts.write()))
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(SetRequestIdLayer::new(request_id, UuidRequestId))
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Watch the server's lifecycle state.
    pub fn state(&self) -> watch::Receiver<ServerState> {
        self.lifecycle.subscribe()
    }

    /// The store this server mutates.
    pub fn store(&self) -> &Arc<ProductStore> {
        &self.store
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Serve connections from `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        self.lifecycle.advance(ServerState::Listening);
        tracing::info!(address = %addr, "Starting server");

        // The header read timer starts as soon as a connection waits for a
        // request, so it is the keep-alive idle bound.
        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(self.config.timeouts.idle())
            .keep_alive(true);
        let head_timeout = self.config.timeouts.read();

        let graceful = GracefulShutdown::new();
        let tracker = ConnectionTracker::new();
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer_addr, permit) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(error = %e, "Accept failed");
                            tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                            continue;
                        }
                    };

                    let guard = tracker.track();
                    let router = self.router.clone();
                    let service = hyper::service::service_fn(move |request: Request<Incoming>| {
                        router.clone().call(request)
                    });
                    let io = TokioIo::new(HeadDeadline::new(stream, head_timeout));
                    let conn = graceful.watch(builder.serve_connection(io, service));

                    connections.spawn(async move {
                        let connection_id = guard.id();
                        tracing::trace!(%connection_id, %peer_addr, "Connection opened");
                        if let Err(e) = conn.await {
                            tracing::debug!(%connection_id, error = %e, "Connection error");
                        }
                        drop(permit);
                        drop(guard);
                    });
                }
                _ = shutdown.recv() => break,
            }

            while connections.try_join_next().is_some() {}
        }

        // Stop accepting before draining
        drop(listener);
        self.lifecycle.advance(ServerState::ShuttingDown);

        let grace_secs = self.config.timeouts.shutdown_grace_secs;
        tracing::info!(
            open_connections = tracker.active_count(),
            grace_secs,
            "Received terminate, graceful shutdown"
        );

        let grace = self.config.timeouts.shutdown_grace();
        let result = match tokio::time::timeout(grace, graceful.shutdown()).await {
            Ok(()) => Ok(()),
            Err(_) => {
                let open_connections = tracker.active_count();
                tracing::error!(
                    open_connections,
                    grace_secs,
                    "Grace period elapsed, aborting connections"
                );
                connections.abort_all();
                Err(ServerError::ShutdownTimeout {
                    grace_secs,
                    open_connections,
                })
            }
        };

        while connections.join_next().await.is_some() {}
        self.lifecycle.advance(ServerState::Stopped);
        tracing::info!("Server stopped");
        result
    }
}

/// Bound on producing a response. Running out is a server fault, not the
/// client's, so it answers 503 rather than 408.
fn response_deadline(limit: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::SERVICE_UNAVAILABLE, limit)
}

/// Single entry point: resolve the route, then run the operation.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();

    let route = match state.routes.resolve(&method, request.uri().path()) {
        Ok(route) => route,
        Err(e) => {
            tracing::debug!(%method, path = %request.uri().path(), error = %e, "No route");
            let response = ApiError::from(e).into_response();
            let status = response.status().as_u16();
            metrics::record_request(method.as_str(), "none", status, start_time);
            return response;
        }
    };

    let store = state.store.as_ref();
    let body = request.into_body();
    let response = match (route.operation, route.id) {
        (Operation::ListProducts, _) => handlers::list_products(store).await.into_response(),
        (Operation::CreateProduct, _) => {
            with_validated_product(body, state.body_policy, |product| {
                handlers::create_product(store, product)
            })
            .await
        }
        (Operation::UpdateProduct, Some(id)) => {
            with_validated_product(body, state.body_policy, |product| {
                handlers::update_product(store, id, product)
            })
            .await
        }
        (Operation::UpdateProduct, None) => {
            ApiError::InvalidRouteParameter(ParamError::Missing).into_response()
        }
    };

    metrics::record_request(
        method.as_str(),
        route.operation.as_str(),
        response.status().as_u16(),
        start_time,
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        HttpServer::new(ServiceConfig::default(), Arc::new(ProductStore::seeded()))
    }

    async fn send(
        server: &HttpServer,
        method: Method,
        uri: &str,
        body: &str,
    ) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn list_returns_seed_products() {
        let server = server();
        let (status, body) = send(&server, Method::GET, "/", "").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[1]["name"], "Espresso");
    }

    #[tokio::test]
    async fn create_echoes_assigned_id() {
        let server = server();
        let (status, body) = send(
            &server,
            Method::POST,
            "/",
            r#"{"id":1,"name":"Tea","description":"Hot leaf water","price":1.0,"sku":"tea"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(server.store().len(), 3);
        assert_eq!(server.store().get(1).unwrap().name, "Latte");
    }

    #[tokio::test]
    async fn negative_client_id_is_ignored() {
        let server = server();
        let body = r#"{"id":-1,"name":"Tea","price":1.0,"sku":"t"}"#;
        let (status, body) = send(&server, Method::POST, "/", body).await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["id"], 3);

        let body = r#"{"id":-7,"name":"Doppio","price":2.5,"sku":"d"}"#;
        let (status, _) = send(&server, Method::PUT, "/2", body).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(server.store().get(2).unwrap().name, "Doppio");
    }

    #[tokio::test]
    async fn update_semantics() {
        let server = server();
        let body = r#"{"id":9,"name":"Mocha","price":3.5,"sku":"moc"}"#;

        let (status, text) = send(&server, Method::PUT, "/1", body).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(text.is_empty());
        assert_eq!(server.store().get(1).unwrap().name, "Mocha");

        let (status, text) = send(&server, Method::PUT, "/12", body).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(text, "Product not found\n");
    }

    #[tokio::test]
    async fn bad_ids_are_rejected_before_the_body_is_read() {
        let server = server();
        for uri in ["/", "/abc", "/1/2"] {
            let (status, text) = send(&server, Method::PUT, uri, "{not json").await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "PUT {uri}");
            assert_eq!(text, "Invalid URI\n");
        }
    }

    #[tokio::test]
    async fn malformed_bodies_do_not_touch_the_store() {
        let server = server();
        let before = server.store().all().unwrap();

        let (status, text) = send(&server, Method::POST, "/", "{\"name\":").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(text, "Unable to unmarshal json\n");

        let (status, _) = send(&server, Method::PUT, "/1", "[1,2,3]").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(server.store().all().unwrap(), before);
    }

    #[tokio::test]
    async fn other_methods_are_405_with_empty_body() {
        let server = server();
        for (method, uri) in [(Method::DELETE, "/1"), (Method::PATCH, "/"), (Method::GET, "/1")] {
            let (status, text) = send(&server, method.clone(), uri, "").await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
            assert!(text.is_empty());
        }
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let server = server();
        let request = Request::builder()
            .uri("/")
            .header(X_REQUEST_ID, "req-123")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "req-123");

        let response = server
            .router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key(X_REQUEST_ID));
    }

    #[tokio::test]
    async fn slow_response_is_503() {
        let router = Router::new()
            .route(
                "/",
                axum::routing::get(|| async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    "late"
                }),
            )
            .layer(response_deadline(Duration::from_millis(50)));
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn new_server_is_created() {
        assert_eq!(*server().state().borrow(), ServerState::Created);
    }
}
