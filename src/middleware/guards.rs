use std::{marker::PhantomData, sync::Arc};

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use uuid::Uuid;

use crate::{
    auth::{Claims, RequiredRole},
    error::AppError,
    state::AppState,
};

const MISSING_BEARER: &str = "Missing/invalid Authorization header";

/// Token part of `Authorization: Bearer <token>`; the scheme is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

// Verified access-token claims, cached on the request so stacked guards decode once.
impl FromRequestParts<Arc<AppState>> for Claims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(claims.clone());
        }

        let token =
            bearer_token(&parts.headers).ok_or_else(|| AppError::unauthorized(MISSING_BEARER))?;
        let claims = state.auth.verify(token)?;

        parts.extensions.insert(claims.clone());
        Ok(claims)
    }
}

/// Any signed-in user.
pub type AuthGuard = Claims;

/// Signed-in user whose role passes `R`; otherwise 403.
pub struct AuthRoleGuard<R: RequiredRole> {
    pub claims: Claims,
    _marker: PhantomData<R>,
}

impl<R> FromRequestParts<Arc<AppState>> for AuthRoleGuard<R>
where
    R: RequiredRole,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = Claims::from_request_parts(parts, state).await?;
        if !R::allows(claims.role) {
            tracing::debug!(sub = %claims.sub, role = claims.role.as_str(), "role check failed");
            return Err(AppError::forbidden("Missing required role"));
        }

        Ok(Self {
            claims,
            _marker: PhantomData,
        })
    }
}

/// Audit actor for writes; a subject that is not a user id leaves the audit columns empty.
pub fn actor(claims: &Claims) -> Option<Uuid> {
    match claims.user_id() {
        Ok(id) => Some(id),
        Err(_) => {
            tracing::warn!(sub = %claims.sub, "audit actor could not be resolved");
            None
        }
    }
}
