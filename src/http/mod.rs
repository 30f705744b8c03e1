//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::listener)
//!     → server.rs (hyper connection, tower layers: request id, trace, timeout)
//!     → routing::RouteTable (method + path → operation)
//!     → validation.rs (POST/PUT: bounded read, decode, field rules)
//!     → handlers.rs (store calls)
//!     → codec.rs (JSON response body)
//!     → error.rs (every failure → status + short text)
//! ```

pub mod codec;
pub mod error;
pub mod handlers;
pub mod request;
pub mod server;
pub mod validation;

pub use error::ApiError;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
pub use validation::{BodyPolicy, ValidatedProduct};
