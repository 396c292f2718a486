use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{clock::Clock, config::AppConfig, services::auth_service::AuthService};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub auth: AuthService,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        auth: AuthService,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            db,
            auth,
            clock,
        })
    }
}
