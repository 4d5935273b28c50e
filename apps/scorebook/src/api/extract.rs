//! Request extractors: validated JSON bodies, path and query parameters, and
//! admin gating. Every rejection is an [`ApiError`], so clients always get a
//! JSON error body.

use super::AppState;
use super::auth;
use super::error::ApiError;
use super::types::Validate;
use crate::config::AccessPolicy;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use scorebook_core::Admin;
use serde::de::DeserializeOwned;

/// A JSON body that decoded and passed [`Validate`].
///
/// Malformed JSON and failed validation both become 400 responses.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Path parameters that failed to parse become a 400 [`ApiError`].
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Query-string filters; a malformed query is a 400 [`ApiError`].
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// A logged-in admin. Rejects the request with 401 otherwise.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Admin);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        auth::authenticate(state, &parts.headers).map(Self)
    }
}

/// Gate for writes that the legacy access policy leaves open.
///
/// Under [`AccessPolicy::Strict`] this behaves like [`RequireAdmin`]; under
/// [`AccessPolicy::Legacy`] anonymous callers pass with `None`.
#[derive(Debug, Clone)]
pub struct PolicyGate(pub Option<Admin>);

impl FromRequestParts<AppState> for PolicyGate {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match state.config.access_policy {
            AccessPolicy::Strict => auth::authenticate(state, &parts.headers).map(|a| Self(Some(a))),
            AccessPolicy::Legacy => auth::current_admin(state, &parts.headers).map(Self),
        }
    }
}
