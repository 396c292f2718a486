use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    middleware::AuthGuard,
    response::{ApiResult, JsonApiResponse},
    services::auth_service::{
        AuthSession, GoogleLoginRequest, LoginRequest, RefreshRequest, RegisterRequest,
    },
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/google-login", post(google_login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .with_state(state)
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<AuthSession> {
    let session = state.auth.register(body).await?;
    JsonApiResponse::created(session)
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<AuthSession> {
    JsonApiResponse::ok(state.auth.login(body).await?)
}

async fn google_login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GoogleLoginRequest>,
) -> ApiResult<AuthSession> {
    JsonApiResponse::ok(state.auth.google_login(body).await?)
}

/// Public: the refresh token alone identifies the session, so it works after the access token expired.
async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<AuthSession> {
    JsonApiResponse::ok(state.auth.refresh(body).await?)
}

async fn logout(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<serde_json::Value> {
    let caller = claims.user_id()?;
    state.auth.logout(&body.refresh_token, caller).await?;
    JsonApiResponse::with_status(StatusCode::OK, "logged out", serde_json::Value::Null)
}
