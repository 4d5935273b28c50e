//! # Middleware Module
//!
//! Global rate limiting for the Scorebook HTTP API. The limit comes from
//! [`ServerConfig::rate_limit`](crate::config::ServerConfig); `0` turns the
//! limiter off entirely.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

use super::error::ErrorBody;

/// Shared limiter across all routes.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Build a limiter, or `None` when `requests_per_second` is zero.
pub fn create_rate_limiter(requests_per_second: u32) -> Option<GlobalRateLimiter> {
    let rps = NonZeroU32::new(requests_per_second)?;
    Some(Arc::new(RateLimiter::direct(Quota::per_second(rps))))
}

/// Rejects with 429 once the global quota is spent.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check().is_ok() {
        return next.run(request).await;
    }
    tracing::warn!(event = "rate_limited", path = %request.uri().path(), "Rate limit exceeded");
    let body = ErrorBody {
        message: "Too many requests".to_string(),
        field: None,
    };
    (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response()
}
