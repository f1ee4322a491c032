//! axum glue: the `ListQuery` extractor and RFC 9457 problem responses.

pub mod error;
pub mod extract;
pub mod problem;

pub use error::{listing_error_to_problem, query_error_to_problem};
pub use extract::ListQuery;
pub use problem::{Problem, ProblemResponse, APPLICATION_PROBLEM_JSON, PROBLEM_TYPE_BASE};
