//! Correlation IDs for auth requests.
//!
//! Failed logins and rejected refreshes are logged with the `x-request-id`
//! of the call that caused them, so an operator can match a client report to
//! the security event. Callers may supply their own ID; otherwise a UUID v4
//! is minted. The ID is echoed back on every response.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderMap, HeaderValue, StatusCode, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Header carrying the correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied ID accepted as-is
const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation ID of the current request
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl RequestId {
    /// Take the caller's ID when it is usable, otherwise mint one.
    ///
    /// Empty or oversized values are replaced rather than propagated into logs.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let supplied = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty() && s.len() <= MAX_REQUEST_ID_LEN);

        match supplied {
            Some(id) => RequestId(id.to_string()),
            None => RequestId(Uuid::new_v4().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Attach a [`RequestId`] to the request and echo it on the response.
///
/// ```no_run
/// use axum::{Router, routing::post, middleware};
/// use authkeep_server::api::request_id::request_id_middleware;
///
/// # async fn example() {
/// let app: Router = Router::new()
///     .route("/api/v1/auth/login", post(|| async { "ok" }))
///     .layer(middleware::from_fn(request_id_middleware));
/// # }
/// ```
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    tracing::info!(
        request_id = %request_id.as_str(),
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "Request handled"
    );

    response
}

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestId>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "request_id_middleware is not installed",
        ))
    }
}
