//! Filter DSL and pagination primitives for list endpoints.
//!
//! A list request is a flat bag of query parameters. Keys shaped like
//! `where__<field>[__<operator>]` and `order__<field>` carry filters and sort
//! orders; `page` and `take` select offset or cursor pagination.
//! [`compose_query`] turns such a request into a [`QuerySpec`] that a
//! repository adapter can execute, and [`LinkConfig`] builds the URL of the
//! next cursor page.

mod compose;
mod error;
pub mod key;
mod link;
pub mod operator;
mod page;
mod request;
mod spec;

pub use compose::{compose_query, QueryOverride, ORDER_PREFIX, WHERE_PREFIX};
pub use error::Error;
pub use key::{parse_filter_key, FilterKey};
pub use link::{LinkConfig, CURSOR_AFTER_KEY, CURSOR_BEFORE_KEY};
pub use operator::{Arity, OperatorKind};
pub use page::{Cursor, CursorResult, PageResult, Paginated};
pub use request::{
    PaginationRequest, CREATED_AT_FIELD, DEFAULT_TAKE, MAX_OFFSET, MAX_TAKE, ORDER_CREATED_AT_KEY,
    PAGE_KEY, TAKE_KEY,
};
pub use spec::{FilterPredicate, OrderBy, OrderKey, QuerySpec, SortDir};

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
