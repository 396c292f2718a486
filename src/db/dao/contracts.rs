//! Persistence capabilities consumed by the auth and order workflows.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use sea_orm::DatabaseTransaction;
use uuid::Uuid;

use super::{DaoResult, PageRequest, PaginatedResponse};
use crate::db::entities::{
    customer, order, order_item, product_service, refresh_token, store, user,
};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> DaoResult<Option<user::Model>>;
    async fn find_user_by_email(&self, email: &str) -> DaoResult<Option<user::Model>>;
    async fn create_user(&self, user: user::ActiveModel) -> DaoResult<user::Model>;
    async fn update_last_login(&self, id: Uuid, at: DateTime<FixedOffset>) -> DaoResult<()>;
    async fn link_google(
        &self,
        id: Uuid,
        google_id: &str,
        picture: Option<String>,
    ) -> DaoResult<user::Model>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Stores a new token; `issued_at` stamps the audit columns.
    async fn create_token(
        &self,
        user_id: Uuid,
        token: &str,
        issued_at: DateTime<FixedOffset>,
        expires_at: DateTime<FixedOffset>,
    ) -> DaoResult<refresh_token::Model>;

    /// Returns the row only when it is neither revoked nor expired at `now`.
    async fn find_active(
        &self,
        token: &str,
        now: DateTime<FixedOffset>,
    ) -> DaoResult<Option<refresh_token::Model>>;

    /// Returns `false` when the token was already revoked.
    async fn revoke(&self, id: Uuid, at: DateTime<FixedOffset>) -> DaoResult<bool>;

    async fn revoke_all_for_user(&self, user_id: Uuid, at: DateTime<FixedOffset>)
    -> DaoResult<u64>;
}

#[async_trait]
pub trait CatalogLookup<M: Send + 'static>: Send + Sync {
    async fn lookup(&self, id: Uuid) -> DaoResult<Option<M>>;
}

pub type ProductServiceCatalog = dyn CatalogLookup<product_service::Model>;
pub type CustomerCatalog = dyn CatalogLookup<customer::Model>;
pub type StoreCatalog = dyn CatalogLookup<store::Model>;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn begin(&self) -> DaoResult<DatabaseTransaction>;

    /// Advances and returns the invoice sequence for `(store_id, day)`.
    /// The counter row stays locked until `txn` ends.
    async fn next_invoice_seq(
        &self,
        txn: &DatabaseTransaction,
        store_id: Uuid,
        day: NaiveDate,
    ) -> DaoResult<i32>;

    async fn create_in_tx(
        &self,
        txn: &DatabaseTransaction,
        order: order::ActiveModel,
        items: Vec<order_item::ActiveModel>,
    ) -> DaoResult<OrderRecord>;

    /// Updates the header and replaces every item of the order.
    async fn update_in_tx(
        &self,
        txn: &DatabaseTransaction,
        order: order::ActiveModel,
        items: Vec<order_item::ActiveModel>,
    ) -> DaoResult<OrderRecord>;

    async fn find_order(&self, id: Uuid) -> DaoResult<Option<OrderRecord>>;

    async fn list_orders(&self, page: PageRequest) -> DaoResult<PaginatedResponse<OrderRecord>>;

    async fn find_items_by_order_ids(
        &self,
        ids: &[Uuid],
    ) -> DaoResult<HashMap<Uuid, Vec<order_item::Model>>>;

    async fn delete_order(&self, id: Uuid) -> DaoResult<()>;
}
