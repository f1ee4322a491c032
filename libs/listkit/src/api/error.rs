use listing_core::Error as QueryError;

use crate::api::problem::{Problem, ProblemResponse};
use crate::Error;

fn title(e: &QueryError) -> &'static str {
    match e {
        QueryError::MalformedFilterKey(_) => "Malformed Filter Key",
        QueryError::UnknownOperator(_) => "Unknown Operator",
        QueryError::InvalidValueShape { .. } => "Invalid Filter Value",
        QueryError::InvalidOrderDirection(_) => "Invalid Order Direction",
        QueryError::InvalidTake(_) => "Invalid Take",
        QueryError::InvalidPage(_) => "Invalid Page",
        QueryError::UnknownField(_) => "Unknown Field",
        QueryError::TypeMismatch { .. } => "Type Mismatch",
        QueryError::InvalidLinkBase(_) => "Internal Server Error",
    }
}

/// Map a request-level error to an RFC 9457 problem.
///
/// `InvalidLinkBase` is a server misconfiguration and becomes a 500.
pub fn query_error_to_problem(e: &QueryError, instance: &str) -> ProblemResponse {
    if !e.is_client_error() {
        tracing::error!(error = %e, "list link configuration is invalid");
        return Problem::server(e.code(), title(e), "An internal error occurred")
            .with_instance(instance)
            .into();
    }

    Problem::client(e.code(), title(e), e.to_string())
        .with_instance(instance)
        .into()
}

/// Map a paginator error to an RFC 9457 problem.
///
/// Repository failures that are not request errors are logged and reported
/// as `INTERNAL_DB` without details.
pub fn listing_error_to_problem(e: &Error, instance: &str) -> ProblemResponse {
    if let Some(query) = e.client_error() {
        return query_error_to_problem(query, instance);
    }
    match e {
        Error::Query(query) => query_error_to_problem(query, instance),
        Error::Repository(source) => {
            tracing::error!(error = ?source, "list repository call failed");
            Problem::server(
                "INTERNAL_DB",
                "Internal Database Error",
                "An internal database error occurred",
            )
            .with_instance(instance)
            .into()
        }
    }
}
