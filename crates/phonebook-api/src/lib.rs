//! # phonebook-api — Axum API Service for the Phonebook
//!
//! Lets a phone-number owner prove control of the number with a one-time
//! code, binds the number to a durable identity, and records the owner's
//! address book as a directed, named contact graph.
//!
//! ## API Surface
//!
//! | Path                     | Auth   | Module                      |
//! |--------------------------|--------|-----------------------------|
//! | `/request-verification`  | none   | [`routes::verification`]    |
//! | `/cancel-verification`   | none   | [`routes::verification`]    |
//! | `/verify`                | none   | [`routes::verification`]    |
//! | `/api/me`                | bearer | [`routes::account`]         |
//! | `/api/add-contacts`      | bearer | [`routes::contacts`]        |
//! | `/api/contacts`          | bearer | [`routes::contacts`]        |
//! | `/ping`, `/health/*`     | none   | probes                      |
//! | `/openapi.json`          | none   | [`openapi`]                 |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CORS → TraceLayer → Timeout (30s) → BodyLimit → [AuthMiddleware on /api/*] → Handler
//! ```
//!
//! ## Components
//!
//! Handlers are thin. The work lives in free functions over
//! `&dyn PhonebookStore`: [`ledger`] (verification attempts), [`resolver`]
//! (number → identity), [`graph`] (contact edges).

pub mod auth;
pub mod db;
pub mod delivery;
pub mod error;
pub mod extractors;
pub mod graph;
pub mod janitor;
pub mod ledger;
pub mod middleware;
pub mod openapi;
pub mod resolver;
pub mod routes;
pub mod state;
pub mod store;

use std::time::Duration;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, Method, StatusCode};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Per-request deadline.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum accepted request body.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
///
/// Probes, the OpenAPI document and the verification flow are public;
/// everything under `/api` sits behind the bearer-token middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        issuer: state.sessions.clone(),
    };

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::account::router())
        .merge(routes::contacts::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(axum::Extension(auth_config));

    // Unauthenticated probes.
    let health = Router::new()
        .route("/ping", get(ping))
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new()
        .merge(health)
        .merge(openapi::router())
        .merge(routes::verification::router())
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(timeout())
        .layer(middleware::tracing_layer::layer())
        .layer(cors())
        .with_state(state)
}

/// Requests still running after [`REQUEST_TIMEOUT`] get a 408.
fn timeout() -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, REQUEST_TIMEOUT)
}

/// Any origin; the headers and methods browser clients send.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
}

async fn ping() -> &'static str {
    "pong"
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — 200 when the store answers, 503 otherwise.
async fn readiness(State(state): State<AppState>) -> Response {
    match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, "ready").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "store unavailable").into_response()
        }
    }
}
