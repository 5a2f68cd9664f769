// Authentication middleware and extractors

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use std::sync::Arc;

use super::token::AuthError;
use crate::error::AppError;
use crate::AppState;

/// Identity attached to a request once its bearer token has been verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

/// Pull the token out of `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::Missing)
}

// Gatekeeper for protected routes. Rejects with 401 before the handler runs,
// otherwise stores the decoded identity in the request extensions.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    let token = bearer_token(request.headers()).map_err(|_| {
        tracing::warn!(%path, "rejected request without bearer token");
        AppError::Unauthorized("missing token".to_string())
    })?;

    let claims = state.tokens.verify(&token).map_err(|e| {
        tracing::warn!(%path, reason = %e, "rejected request with invalid token");
        AppError::Unauthorized("invalid token".to_string())
    })?;

    tracing::debug!(%path, user_id = %claims.sub, "authenticated request");
    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
    });

    Ok(next.run(request).await)
}

// Extractor for the identity set by `require_bearer`
// Usage: async fn handler(user: AuthUser) { ... }
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            tracing::warn!(path = %parts.uri.path(), "handler expected an authenticated request");
            AppError::Unauthorized("missing token".to_string())
        })
    }
}
