//! Authentication middleware for protected endpoints.
//!
//! Extracts the access token from the `Authorization` header, verifies it
//! with the [`AuthManager`](authkeep::AuthManager), and injects the decoded
//! [`AccessTokenClaims`] into request extensions for downstream handlers.
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get, middleware};
//! # use authkeep_server::api::middleware::auth_middleware;
//! # use authkeep_server::api::AppState;
//! # async fn handler() {}
//! # let state: AppState = unimplemented!();
//!
//! let protected_routes: Router<AppState> = Router::new()
//!     .route("/api/protected", get(handler))
//!     .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
//! # let _ = protected_routes;
//! ```
//!
//! # Extracting Claims
//!
//! ```rust,no_run
//! use authkeep::auth::AccessTokenClaims;
//! use axum::extract::Extension;
//!
//! async fn protected_handler(Extension(claims): Extension<AccessTokenClaims>) -> String {
//!     format!("Authenticated as {}", claims.email)
//! }
//! # let _ = protected_handler;
//! ```

use authkeep::AuthError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AppState;
use super::auth::error_response;

/// Pull the token out of an `Authorization: Bearer <token>` header value.
fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware that validates access tokens and injects claims.
///
/// # Behavior
///
/// - **Success**: Token valid → Injects `AccessTokenClaims` into request extensions → Calls next handler
/// - **Missing header / invalid format**: Returns `401 Unauthorized`
/// - **Invalid/expired token**: Returns `401 Unauthorized`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);

    let Some(token) = token else {
        return error_response(&AuthError::InvalidAccessToken).into_response();
    };

    match state.auth_manager.verify_access_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected access token");
            error_response(&e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token("abc.def.ghi"), None);
    }
}
