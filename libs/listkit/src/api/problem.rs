use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Prefix of the `type` URI of list request problems; the error code is
/// appended as the last path segment.
pub const PROBLEM_TYPE_BASE: &str = "https://errors.example.com";

/// RFC 9457 body returned when a list request cannot be served.
///
/// Client mistakes (bad filter key, unknown operator, out-of-range `take`)
/// are 400s whose `type` ends with `code`. Server faults are 500s with
/// `type` left at `about:blank` and a generic `detail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    pub status: u16,
    /// For 400s, names the offending parameter or value.
    pub detail: String,
    /// Path of the list endpoint, e.g. `/posts`.
    pub instance: String,
    /// Stable code such as `UNKNOWN_OPERATOR` or `INTERNAL_DB`.
    pub code: String,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_string(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
        }
    }

    /// 400 for a rejected list parameter, typed by its code.
    pub fn client(code: &str, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, title, detail)
            .with_type(format!("{PROBLEM_TYPE_BASE}/{code}"))
            .with_code(code)
    }

    /// 500 that hides the cause from the client.
    pub fn server(code: &str, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, title, detail).with_code(code)
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_instance(mut self, path: impl Into<String>) -> Self {
        self.instance = path.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

/// Renders a [`Problem`] with its status and the problem+json content type.
#[derive(Debug, Clone)]
pub struct ProblemResponse(pub Problem);

impl From<Problem> for ProblemResponse {
    fn from(p: Problem) -> Self {
        Self(p)
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut resp = (status, axum::Json(self.0)).into_response();
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}
