//! Authentication API handlers.
//!
//! All endpoints take and return JSON. Failures carry a single `error`
//! field whose text never includes storage or signing details.
//!
//! # Examples
//!
//! Register a new account:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "a@x.com", "password": "pw1"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "a@x.com", "password": "pw1"}'
//! ```
//!
//! Rotate a refresh token:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/auth/refresh \
//!   -H "Content-Type: application/json" \
//!   -d '{"refresh_token": "1b4e28ba-2fa1-4d3b-a3f5-ef19b5a7633b"}'
//! ```

use authkeep::auth::{AccessTokenClaims, AccountView, AuthError, AuthenticatedAccount, Credentials};
use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::AppState;
use super::request_id::RequestId;
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct RefreshPayload {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map an engine error onto an HTTP status and a sanitized body.
pub fn error_response(err: &AuthError) -> ApiError {
    let status = match err {
        AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials
        | AuthError::InvalidRefreshToken
        | AuthError::InvalidAccessToken => StatusCode::UNAUTHORIZED,
        AuthError::HashingFailed
        | AuthError::SigningFailed(_)
        | AuthError::TokenLifetimeOverflow
        | AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.client_message(),
        }),
    )
}

/// Log a failed request: caller mistakes as security events, the rest as errors.
fn report_failure(event_type: &str, err: &AuthError, email: Option<&str>, request_id: &RequestId) {
    if err.is_client_error() {
        logging::log_security_event(event_type, email, Some(request_id.as_str()), &err.to_string());
    } else {
        tracing::error!(
            request_id = %request_id.as_str(),
            error = %err,
            "{} failed",
            event_type
        );
    }
}

/// Register a new account.
///
/// Registration does not log the account in; call `/login` afterwards.
///
/// # Response
///
/// `201 Created` with the account projection:
/// ```json
/// { "id": "8d0f5b1c-...", "email": "a@x.com" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Empty email or password
/// - `409 Conflict`: Email already registered
/// - `500 Internal Server Error`: Hashing or storage failure
pub async fn register(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(payload): Json<Credentials>,
) -> Result<(StatusCode, Json<AccountView>), ApiError> {
    match state
        .auth_manager
        .register(&payload.email, &payload.password)
        .await
    {
        Ok(view) => {
            metrics::registrations_total(true);
            Ok((StatusCode::CREATED, Json(view)))
        }
        Err(e) => {
            metrics::registrations_total(false);
            report_failure("register_rejected", &e, Some(&payload.email), &request_id);
            Err(error_response(&e))
        }
    }
}

/// Authenticate with email and password and open a new session.
///
/// # Response
///
/// `200 OK` with the account and a fresh token pair:
/// ```json
/// {
///   "account": { "id": "8d0f5b1c-...", "email": "a@x.com" },
///   "tokens": {
///     "access_token": "eyJhbGciOiJIUzI1NiIs...",
///     "refresh_token": "1b4e28ba-2fa1-4d3b-a3f5-ef19b5a7633b",
///     "expires_at": "2026-10-24T10:30:00Z",
///     "access_expires_at": "2026-10-17T10:45:00Z"
///   }
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable)
/// - `500 Internal Server Error`: Signing or storage failure
pub async fn login(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(payload): Json<Credentials>,
) -> Result<Json<AuthenticatedAccount>, ApiError> {
    let start = Instant::now();
    let result = state.auth_manager.login(&payload).await;
    logging::log_performance("login", start.elapsed().as_millis() as u64, None);

    match result {
        Ok(authenticated) => {
            metrics::login_attempts_total(true);
            Ok(Json(authenticated))
        }
        Err(e) => {
            metrics::login_attempts_total(false);
            report_failure("failed_login", &e, Some(&payload.email), &request_id);
            Err(error_response(&e))
        }
    }
}

/// Exchange a refresh token for a new token pair.
///
/// The presented token is single-use: once this call succeeds, presenting
/// it again yields `401`.
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown, revoked or expired refresh token
/// - `500 Internal Server Error`: Signing or storage failure
pub async fn refresh(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(payload): Json<RefreshPayload>,
) -> Result<Json<AuthenticatedAccount>, ApiError> {
    match state.auth_manager.refresh(&payload.refresh_token).await {
        Ok(authenticated) => {
            metrics::refresh_attempts_total("rotated");
            Ok(Json(authenticated))
        }
        Err(e) => {
            let outcome = if e.is_client_error() { "rejected" } else { "error" };
            metrics::refresh_attempts_total(outcome);
            report_failure("refresh_rejected", &e, None, &request_id);
            Err(error_response(&e))
        }
    }
}

/// Return the claims of the presented access token.
///
/// Requires `Authorization: Bearer <access token>`.
pub async fn me(Extension(claims): Extension<AccessTokenClaims>) -> Json<AccessTokenClaims> {
    Json(claims)
}
