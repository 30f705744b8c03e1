//! Product API library.
//!
//! An HTTP service exposing list/create/update over an in-memory product
//! collection.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ net::listener ──▶ http::server ──▶ routing ──▶ http::validation
//!                                 (layers: request id,        (POST / PUT only)
//!                                  trace, timeout)                  │
//!                                                                   ▼
//!   Client ◀── http::codec ◀──────────── http::handlers ◀──── products::store
//!
//!   Cross-cutting: config, lifecycle (startup / signals / shutdown), observability
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod products;
pub mod routing;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use products::{Product, ProductStore};
