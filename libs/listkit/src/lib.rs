//! Async list engine on top of `listing-core`.
//!
//! [`Paginator`] picks offset or cursor pagination for a request, runs the
//! composed query through a [`Repository`] and shapes the response envelope.
//! The `api` module wires the same flow into axum handlers.

pub mod api;
mod error;
pub mod memory;
mod paginate;
pub mod repo;

pub use error::Error;
pub use memory::{FieldAccess, FieldValue, InMemoryRepository};
pub use paginate::Paginator;
pub use repo::{Listable, Repository};

// Re-export the core types so callers need a single dependency
pub use listing_core::{
    compose_query, CursorResult, FilterPredicate, LinkConfig, OperatorKind, PageResult,
    Paginated, PaginationRequest, QueryOverride, QuerySpec, SortDir,
};
