use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    auth::AdminRole,
    db::dao::PaginatedResponse,
    middleware::{AuthGuard, AuthRoleGuard, actor},
    response::{ApiResult, JsonApiResponse},
    routes::PageQuery,
    services::{
        ServiceContext, auth_service::UserResponse, user_service::CreateUserRequest,
    },
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/me", get(me))
        .route("/users/{id}", get(get_user))
        .with_state(state)
}

async fn me(State(state): State<Arc<AppState>>, claims: AuthGuard) -> ApiResult<UserResponse> {
    let id = claims.user_id()?;
    let user = ServiceContext::from_state(state.as_ref())
        .user()
        .find_by_id(id)
        .await?;
    JsonApiResponse::ok(user)
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    _guard: AuthRoleGuard<AdminRole>,
    Query(query): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<UserResponse>> {
    let users = ServiceContext::from_state(state.as_ref())
        .user()
        .list(query.page())
        .await?;
    JsonApiResponse::ok(users)
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    _guard: AuthRoleGuard<AdminRole>,
    Path(id): Path<Uuid>,
) -> ApiResult<UserResponse> {
    let user = ServiceContext::from_state(state.as_ref())
        .user()
        .find_by_id(id)
        .await?;
    JsonApiResponse::ok(user)
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { claims, .. }: AuthRoleGuard<AdminRole>,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<UserResponse> {
    let user = ServiceContext::from_state(state.as_ref())
        .user()
        .create(body, actor(&claims))
        .await?;
    JsonApiResponse::created(user)
}
