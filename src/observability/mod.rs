//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (subscriber setup for structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!     → tracing.rs (one span per request, carrying the request id)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
pub mod tracing;
