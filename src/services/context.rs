use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    clock::Clock,
    config::OrdersConfig,
    db::dao::DaoContext,
    services::{
        auth_service::AuthService,
        catalog_service::{
            CustomerService, PriceListService, ProductService, ServiceTypeService, StoreService,
        },
        order_service::OrderService,
        user_service::UserService,
    },
    state::AppState,
};

/// Per-request factory for the domain services.
#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
    auth: AuthService,
    clock: Arc<dyn Clock>,
    orders: OrdersConfig,
}

impl ServiceContext {
    pub fn new(
        db: &DatabaseConnection,
        auth: AuthService,
        clock: Arc<dyn Clock>,
        orders: OrdersConfig,
    ) -> Self {
        Self {
            daos: DaoContext::new(db),
            auth,
            clock,
            orders,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            &state.db,
            state.auth.clone(),
            Arc::clone(&state.clock),
            state.config.orders.clone(),
        )
    }

    pub fn auth(&self) -> AuthService {
        self.auth.clone()
    }

    pub fn user(&self) -> UserService {
        UserService::new(self.daos.user(), self.auth.hasher())
    }

    pub fn store(&self) -> StoreService {
        StoreService::new(self.daos.store())
    }

    pub fn service_type(&self) -> ServiceTypeService {
        ServiceTypeService::new(self.daos.service_type())
    }

    pub fn product(&self) -> ProductService {
        ProductService::new(self.daos.product(), self.daos.store())
    }

    pub fn price_list(&self) -> PriceListService {
        PriceListService::new(
            self.daos.product_service(),
            self.daos.product(),
            self.daos.service_type(),
        )
    }

    pub fn customer(&self) -> CustomerService {
        CustomerService::new(self.daos.customer())
    }

    pub fn order(&self) -> OrderService {
        OrderService::new(
            Arc::new(self.daos.order()),
            Arc::new(self.daos.store()),
            Arc::new(self.daos.customer()),
            Arc::new(self.daos.product_service()),
            Arc::clone(&self.clock),
            self.orders.business_offset(),
        )
    }
}
