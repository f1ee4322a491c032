use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    routing::get,
    Json, Router,
};
use listkit::api::{listing_error_to_problem, ListQuery, ProblemResponse};
use listkit::{Paginated, Paginator, QueryOverride, Repository};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::posts;

pub const POSTS_PATH: &str = "posts";

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppState {
    pub paginator: Arc<Paginator>,
    pub posts: Arc<dyn Repository<posts::Model>>,
}

impl AppState {
    pub fn new(paginator: Paginator, posts: Arc<dyn Repository<posts::Model>>) -> Self {
        Self {
            paginator: Arc::new(paginator),
            posts,
        }
    }
}

pub fn build_router(state: AppState, timeout_sec: u64) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/posts", get(list_posts))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    query = req.uri().query().unwrap_or_default(),
                )
            }),
        );

    if timeout_sec > 0 {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(timeout_sec)));
    }
    router
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_posts(
    State(state): State<AppState>,
    ListQuery(request): ListQuery,
) -> Result<Json<Paginated<posts::Model, i64>>, ProblemResponse> {
    state
        .paginator
        .paginate(
            &request,
            state.posts.as_ref(),
            &QueryOverride::default(),
            POSTS_PATH,
        )
        .await
        .map(Json)
        .map_err(|e| listing_error_to_problem(&e, "/posts"))
}
