//! # Authentication Module
//!
//! Admin logins for the Scorebook HTTP API.
//!
//! ## Flow
//!
//! 1. `POST /api/login` verifies an argon2 password hash, stores a fresh
//!    UUID v4 token in the `logins` table and sets it as the `scorebook_sid`
//!    cookie (`HttpOnly`, `SameSite=Lax`).
//! 2. Later requests present the token either as that cookie or as
//!    `Authorization: Bearer <token>`.
//! 3. Tokens older than `session_ttl_secs` are rejected;
//!    `POST /api/logout` revokes the token and clears the cookie.
//!
//! Tokens live in the database, so a restart does not log anyone out.

use super::AppState;
use super::error::ApiError;
use super::extract::{RequireAdmin, ValidJson};
use super::types::{AdminProfile, LoginRequest, LoginResponse, RegisterRequest};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use scorebook_core::{Admin, NewAdmin};
use std::time::{SystemTime, UNIX_EPOCH};

/// Name of the login cookie.
pub const SESSION_COOKIE: &str = "scorebook_sid";

/// Checked in place of a stored hash when the email is unknown. Matches no
/// password.
const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

// =============================================================================
// PASSWORDS & TOKENS
// =============================================================================

/// Hash a password into a PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))
}

/// Check a password against a stored PHC hash. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// The login token presented with a request: Bearer header first, then cookie.
pub fn request_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|t| !t.is_empty())
}

fn session_cookie(state: &AppState, token: &str, max_age: u64) -> String {
    let secure = if state.config.cookie_secure {
        "; Secure"
    } else {
        ""
    };
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        SESSION_COOKIE, token, max_age, secure
    )
}

fn with_cookie(mut response: Response, cookie: &str) -> Result<Response, ApiError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| ApiError::Internal(format!("Invalid cookie header: {}", e)))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

// =============================================================================
// REQUEST AUTHENTICATION
// =============================================================================

/// The admin behind the request's token, if it is valid and unexpired.
pub fn current_admin(state: &AppState, headers: &HeaderMap) -> Result<Option<Admin>, ApiError> {
    let Some(token) = request_token(headers) else {
        return Ok(None);
    };
    let admin = state
        .repo
        .resolve_login(&token, now_secs(), state.config.session_ttl_secs)?;
    Ok(admin)
}

/// Like [`current_admin`], but a missing or stale login is a 401.
pub fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Admin, ApiError> {
    match current_admin(state, headers)? {
        Some(admin) => Ok(admin),
        None => {
            let reason = if request_token(headers).is_some() {
                "invalid_or_expired_token"
            } else {
                "missing_credentials"
            };
            tracing::warn!(
                event = "auth_failure",
                reason,
                "Authentication failed"
            );
            Err(ApiError::unauthorized("Unauthorized: Admin access required"))
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/login`
pub async fn login_handler(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let admin = state.repo.get_admin_by_email(&request.email)?;
    let hash = admin
        .as_ref()
        .map_or(DUMMY_PASSWORD_HASH, |a| a.password_hash.as_str());
    let verified = verify_password(&request.password, hash);
    let Some(admin) = admin.filter(|_| verified) else {
        tracing::warn!(
            event = "auth_failure",
            reason = "invalid_credentials",
            "Login failed"
        );
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    let token = uuid::Uuid::new_v4().to_string();
    let swept = state
        .repo
        .store_login(&token, admin.id, now_secs(), state.config.session_ttl_secs)?;
    tracing::info!(event = "login", admin_id = admin.id, swept, "Admin logged in");

    let cookie = session_cookie(&state, &token, state.config.session_ttl_secs);
    let body = LoginResponse {
        admin: AdminProfile::from(admin),
        token,
    };
    with_cookie(Json(body).into_response(), &cookie)
}

/// `POST /api/logout`: always succeeds, even without a login.
pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(token) = request_token(&headers) {
        state.repo.revoke_login(&token)?;
    }
    let cookie = session_cookie(&state, "", 0);
    with_cookie(StatusCode::NO_CONTENT.into_response(), &cookie)
}

/// `GET /api/user`
pub async fn user_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminProfile>, ApiError> {
    match current_admin(&state, &headers)? {
        Some(admin) => Ok(Json(AdminProfile::from(admin))),
        None => Err(ApiError::unauthorized("Not logged in")),
    }
}

/// `POST /api/register`: an admin creates another (non-super) admin.
pub async fn register_handler(
    State(state): State<AppState>,
    RequireAdmin(creator): RequireAdmin,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AdminProfile>), ApiError> {
    let admin = state.repo.create_admin(NewAdmin {
        email: request.email,
        password_hash: hash_password(&request.password)?,
        name: request.name.trim().to_string(),
        is_super_admin: false,
    })?;
    tracing::info!(
        event = "admin_created",
        admin_id = admin.id,
        created_by = creator.id,
        "Admin registered"
    );
    Ok((StatusCode::CREATED, Json(AdminProfile::from(admin))))
}

// =============================================================================
// TESTS
// =============================================================================
