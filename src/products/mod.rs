//! Product domain subsystem.
//!
//! # Data Flow
//! ```text
//! Validated request body
//!     → product.rs (ProductDraft, field rules)
//!     → store.rs (assign id, insert / replace under one lock)
//!     → Product (stored record, returned to handlers)
//! ```
//!
//! # Design Decisions
//! - One coarse mutex around the whole collection (small data, low contention)
//! - Ids are assigned by the store only; client-supplied ids are ignored
//! - No persistence: the collection lives and dies with the process

pub mod product;
pub mod store;

pub use product::{Product, ProductDraft, ProductRuleError};
pub use store::{ProductStore, StoreError};
