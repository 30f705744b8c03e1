//! Metrics collection and exposition.
//!
//! # Metrics
//! - `product_api_requests_total` (counter): requests by method, operation, status
//! - `product_api_request_duration_seconds` (histogram): latency by method, operation
//! - `product_api_active_connections` (gauge): open connections
//! - `product_api_products` (gauge): products in the store
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record one finished request.
pub fn record_request(method: &str, operation: &'static str, status: u16, start: Instant) {
    counter!(
        "product_api_requests_total",
        "method" => method.to_string(),
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "product_api_request_duration_seconds",
        "method" => method.to_string(),
        "operation" => operation
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_active_connections(count: u64) {
    gauge!("product_api_active_connections").set(count as f64);
}

pub fn record_store_size(count: usize) {
    gauge!("product_api_products").set(count as f64);
}
