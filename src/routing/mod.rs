//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (filter registrations by method)
//!     → matcher.rs (match path template, capture trailing id)
//!     → Return: RouteMatch, InvalidParameter or MethodNotAllowed
//! ```
//!
//! # Design Decisions
//! - Table built once at startup, immutable at runtime (no locks)
//! - No regex: the id capture is a digit-only scan of the path tail
//! - First registration that matches wins
//! - A path that reaches an id template but carries a bad id is rejected
//!   rather than falling through to 405

pub mod matcher;
pub mod router;

pub use matcher::{ParamError, PathTemplate, TemplateMatch};
pub use router::{Operation, RouteError, RouteMatch, RouteTable};
