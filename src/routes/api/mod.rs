pub mod auth;
pub mod catalog;
pub mod health;
pub mod orders;
pub mod users;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router(state.clone()))
        .merge(auth::router(state.clone()))
        .merge(users::router(state.clone()))
        .merge(catalog::router(state.clone()))
        .merge(orders::router(state))
}
