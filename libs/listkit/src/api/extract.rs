use std::ops::Deref;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use listing_core::PaginationRequest;

use crate::api::error::query_error_to_problem;
use crate::api::problem::{Problem, ProblemResponse};

/// Parse the raw query string of a request into a [`PaginationRequest`].
///
/// Structural keys are validated here; filter keys are only checked when
/// the request is composed.
pub fn extract_list_query(parts: &Parts) -> Result<PaginationRequest, ProblemResponse> {
    let Query(pairs) =
        Query::<Vec<(String, String)>>::try_from_uri(&parts.uri).map_err(|e| {
            ProblemResponse::from(
                Problem::client(
                    "INVALID_QUERY",
                    "Invalid Query String",
                    format!("invalid query string: {e}"),
                )
                .with_instance(parts.uri.path()),
            )
        })?;

    PaginationRequest::from_pairs(pairs).map_err(|e| query_error_to_problem(&e, parts.uri.path()))
}

/// Axum extractor for list endpoints.
/// Usage in handlers:
///   async fn list_posts(ListQuery(request): ListQuery, /* ... */) { /* ... */ }
#[derive(Debug, Clone)]
pub struct ListQuery(pub PaginationRequest);

impl ListQuery {
    #[inline]
    pub fn into_inner(self) -> PaginationRequest {
        self.0
    }
}

impl Deref for ListQuery {
    type Target = PaginationRequest;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl core::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move { extract_list_query(parts).map(ListQuery) }
    }
}
