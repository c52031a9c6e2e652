//! Bearer-token authentication.
//!
//! One opaque token per user; the middleware resolves it to a
//! `Principal` and injects it into request extensions so every service
//! call receives the caller explicitly.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};

use amora_core::users::{Principal, UserRepositoryTrait};

use crate::error::ApiError;
use crate::main_lib::AppState;

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = header.splitn(2, ' ');
    let scheme = parts.next()?;
    let token = parts.next()?.trim();
    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then_some(token)
}

/// Requires a valid user token; injects the `Principal`.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))?;

    let user = state
        .users
        .get_by_token(token)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".into()))?;

    let principal = Principal {
        user_id: user.id,
        is_admin: user.is_admin,
    };
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Runs after `require_user`; requires the admin privilege.
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))?;
    if !principal.is_admin {
        return Err(ApiError::Core(amora_core::Error::Forbidden(
            "admin privilege required".into(),
        )));
    }
    Ok(next.run(request).await)
}
