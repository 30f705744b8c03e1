//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Seed store → Bind listener → Build server
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs + state.rs):
//!     Created → Listening → ShuttingDown → Stopped
//!     Signal received → Stop accepting → Drain connections → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: a bind failure is fatal, no retry
//! - Ordered shutdown: stop accept, drain, close
//! - Shutdown has timeout: forced termination after the grace period

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use shutdown::Shutdown;
pub use signals::TerminationSignal;
pub use startup::{prepare, Prepared};
pub use state::{Lifecycle, ServerState};
