//! # Scorebook HTTP API Module
//!
//! This module implements the JSON API server using axum. Every route lives
//! under `/api`.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `/api/sessions`, `/api/classes`, `/api/students`, `/api/subjects` - CRUD
//! - `GET /api/classes/{id}/results` - Ranked results of a class
//! - `POST /api/marks` - Set one mark or replace a student's mark set
//! - `/api/settings` - Key/value settings
//! - `/api/login`, `/api/logout`, `/api/user`, `/api/register` - Admin auth
//!
//! Reads are public. Which writes need a login depends on
//! [`AccessPolicy`](crate::config::AccessPolicy).

mod auth;
mod error;
mod extract;
mod handlers;
mod middleware;
mod types;

pub use auth::{SESSION_COOKIE, hash_password, verify_password};
pub use error::{ApiError, ErrorBody};
pub use extract::{ApiPath, ApiQuery, PolicyGate, RequireAdmin, ValidJson};
pub use middleware::create_rate_limiter;
pub use types::{
    AdminProfile, BulkMarksResponse, HealthResponse, LoginResponse, MarkIdRef, MarksRequest,
    SettingValue, SuccessResponse, TextOrNumber, Validate, is_iso_date,
};

use crate::config::{AccessPolicy, ServerConfig};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use scorebook_core::{Repository, ScorebookError};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request bodies larger than this are rejected.
const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(repo: Repository, config: ServerConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const CORS_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build the CORS layer from `cors_origins`.
///
/// - `"*"`: any origin, without credentials
/// - unset: localhost only
/// - otherwise: the comma-separated list, with credentials
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins. Login cookies will not be sent cross-origin.");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| match s.parse::<HeaderValue>() {
                    Ok(hv) => {
                        tracing::info!("CORS: Allowing origin: {}", s);
                        Some(hv)
                    }
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", s, e);
                        None
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                credentialed_cors(allowed)
            }
        }
        None => build_localhost_cors(),
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse().ok())
    .collect();
    credentialed_cors(origins)
}

fn credentialed_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true)
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner): tracing, CORS, body limit, rate limit.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(state.config.cors_origins.as_deref());

    if state.config.access_policy == AccessPolicy::Legacy {
        tracing::warn!(
            "Access policy is 'legacy': session and class writes, student deletes and \
             subject creation do not require a login."
        );
    }

    let mut router = Router::new()
        .route("/api/health", get(handlers::health_handler))
        // auth
        .route("/api/login", post(auth::login_handler))
        .route("/api/logout", post(auth::logout_handler))
        .route("/api/user", get(auth::user_handler))
        .route("/api/register", post(auth::register_handler))
        // sessions
        .route(
            "/api/sessions",
            get(handlers::list_sessions_handler).post(handlers::create_session_handler),
        )
        .route(
            "/api/sessions/{id}",
            get(handlers::get_session_handler).delete(handlers::delete_session_handler),
        )
        // classes
        .route(
            "/api/classes",
            get(handlers::list_classes_handler).post(handlers::create_class_handler),
        )
        .route(
            "/api/classes/{id}",
            get(handlers::get_class_handler).delete(handlers::delete_class_handler),
        )
        .route(
            "/api/classes/{id}/results",
            get(handlers::class_results_handler),
        )
        // students
        .route(
            "/api/students",
            get(handlers::list_students_handler).post(handlers::create_student_handler),
        )
        .route(
            "/api/students/{id}",
            get(handlers::get_student_handler)
                .patch(handlers::update_student_handler)
                .delete(handlers::delete_student_handler),
        )
        // subjects
        .route(
            "/api/subjects",
            get(handlers::list_subjects_handler).post(handlers::create_subject_handler),
        )
        .route(
            "/api/subjects/{id}",
            get(handlers::get_subject_handler)
                .patch(handlers::update_subject_handler)
                .delete(handlers::delete_subject_handler),
        )
        // marks
        .route("/api/marks", post(handlers::marks_handler))
        .route("/api/marks/{id}", delete(handlers::delete_mark_handler))
        // settings
        .route(
            "/api/settings",
            get(handlers::list_settings_handler).post(handlers::set_setting_handler),
        )
        .route("/api/settings/{key}", get(handlers::get_setting_handler));

    match middleware::create_rate_limiter(state.config.rate_limit) {
        Some(limiter) => {
            tracing::info!(
                "Rate limiting enabled: {} requests/second",
                state.config.rate_limit
            );
            router = router.layer(axum_middleware::from_fn_with_state(
                limiter,
                middleware::rate_limit_middleware,
            ));
        }
        None => tracing::info!("Rate limiting disabled"),
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Open the database named by `config` and serve until shutdown.
pub async fn run_server(config: ServerConfig) -> Result<(), ScorebookError> {
    let repo = Repository::open(&config.database)?;
    let addr = config.bind_addr();
    tracing::info!(
        database = %config.database.display(),
        access_policy = %config.access_policy,
        "Opened database"
    );

    let router = create_router(AppState::new(repo, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ScorebookError::StorageError(format!("Bind failed on {}: {}", addr, e)))?;

    tracing::info!("Scorebook HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ScorebookError::StorageError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received");
    }
}
