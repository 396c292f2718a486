pub mod api;
mod query;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub use query::{ListQuery, PageQuery};

pub const API_PREFIX: &str = "/api/v1";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new().nest(API_PREFIX, api::router(state))
}
