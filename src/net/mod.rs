//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (ids, live-connection accounting)
//!     → deadline.rs (bound on receiving each request head)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bounded accept prevents resource exhaustion
//! - Each connection tracked so shutdown can report what it is waiting on

pub mod connection;
pub mod deadline;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use deadline::HeadDeadline;
pub use listener::{ConnectionPermit, Listener, ListenerError};
