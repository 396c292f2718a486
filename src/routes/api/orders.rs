use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    auth::ManagerRole,
    db::dao::PaginatedResponse,
    middleware::{AuthRoleGuard, actor},
    response::{ApiResult, JsonApiResponse},
    routes::PageQuery,
    services::{
        ServiceContext,
        order_service::{OrderRequest, OrderResponse, OrderService},
    },
    state::AppState,
};

type Manager = AuthRoleGuard<ManagerRole>;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .with_state(state)
}

fn order_service(state: &AppState) -> OrderService {
    ServiceContext::from_state(state).order()
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { claims, .. }: Manager,
    Json(body): Json<OrderRequest>,
) -> ApiResult<OrderResponse> {
    let order = order_service(state.as_ref())
        .create(body, actor(&claims))
        .await?;
    JsonApiResponse::created(order)
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    _guard: Manager,
    Query(query): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<OrderResponse>> {
    let orders = order_service(state.as_ref()).find_all(query.page()).await?;
    JsonApiResponse::ok(orders)
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    _guard: Manager,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderResponse> {
    JsonApiResponse::ok(order_service(state.as_ref()).find_by_id(id).await?)
}

async fn update_order(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { claims, .. }: Manager,
    Path(id): Path<Uuid>,
    Json(body): Json<OrderRequest>,
) -> ApiResult<OrderResponse> {
    let order = order_service(state.as_ref())
        .update(id, body, actor(&claims))
        .await?;
    JsonApiResponse::ok(order)
}

async fn delete_order(
    State(state): State<Arc<AppState>>,
    _guard: Manager,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    order_service(state.as_ref()).delete(id).await?;
    JsonApiResponse::with_status(StatusCode::OK, "deleted", serde_json::Value::Null)
}
