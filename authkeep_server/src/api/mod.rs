//! HTTP API for the credential service.
//!
//! A thin transport over [`AuthManager`]: handlers decode JSON, call the
//! engine, and map [`authkeep::AuthError`] onto status codes.
//!
//! # Modules
//!
//! - [`auth`]: Register, login, refresh and the `me` endpoint
//! - [`middleware`]: Bearer access token authentication for protected endpoints
//! - [`request_id`]: `x-request-id` propagation
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                  - Health check (public)
//! POST /api/v1/auth/register    - Register account (public, 201)
//! POST /api/v1/auth/login       - Login with email and password (public)
//! POST /api/v1/auth/refresh     - Rotate a refresh token (public)
//! GET  /api/v1/auth/me          - Claims of the presented access token (auth required)
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use authkeep::auth::AuthManager;
//! use authkeep::db::{InMemoryAccountRepository, InMemorySessionRepository};
//! use authkeep::security::{Argon2Hasher, JwtTokenIssuer, TokenConfig};
//! use authkeep_server::api::{AppState, create_router};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let auth_manager = AuthManager::new(
//!     Arc::new(InMemoryAccountRepository::new()),
//!     Arc::new(InMemorySessionRepository::new()),
//!     Arc::new(Argon2Hasher::new("pepper".to_string())),
//!     Arc::new(JwtTokenIssuer::new("a-secret-of-at-least-32-characters", TokenConfig::default())),
//! );
//!
//! let state = AppState {
//!     auth_manager: Arc::new(auth_manager),
//!     database: None,
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod auth;
pub mod middleware;
pub mod request_id;

use axum::{
    Router,
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use authkeep::{AuthManager, db::Database};
use serde_json::json;
use std::{sync::Arc, time::Instant};
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// # Fields
///
/// - `auth_manager`: The credential engine
/// - `database`: Connection pool when running on PostgreSQL, probed by `/health`
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub database: Option<Database>,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .route_layer(axum::middleware::from_fn(track_metrics))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create API v1 router with all versioned endpoints.
fn create_v1_router(state: AppState) -> Router<AppState> {
    // Refresh is public: the refresh token itself is the credential
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Record request count and latency per matched route.
async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    crate::metrics::http_requests_total(&method, &path, response.status().as_u16());
    crate::metrics::http_request_duration_ms(&method, &path, elapsed_ms);

    response
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when storage is reachable, `503 Service Unavailable`
/// otherwise. The in-memory backend is always healthy.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","version":"1.0.0","database":true,"timestamp":"2026-10-17T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match &state.database {
        Some(db) => match db.health_check().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Database health check failed");
                false
            }
        },
        None => true,
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
