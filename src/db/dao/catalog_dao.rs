//! DAOs for the store catalog: service types, products, priced product services and customers.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::{CatalogLookup, DaoBase, DaoResult};
use crate::db::entities::{
    customer, product_service,
    prelude::{Customer, Product, ProductService, ServiceType},
};

macro_rules! catalog_dao {
    ($name:ident, $entity:ty) => {
        #[derive(Clone)]
        pub struct $name {
            db: DatabaseConnection,
        }

        impl DaoBase for $name {
            type Entity = $entity;

            fn new(db: &DatabaseConnection) -> Self {
                Self { db: db.clone() }
            }

            fn db(&self) -> &DatabaseConnection {
                &self.db
            }
        }
    };
}

catalog_dao!(ServiceTypeDao, ServiceType);
catalog_dao!(ProductDao, Product);
catalog_dao!(ProductServiceDao, ProductService);
catalog_dao!(CustomerDao, Customer);

#[async_trait]
impl CatalogLookup<product_service::Model> for ProductServiceDao {
    async fn lookup(&self, id: Uuid) -> DaoResult<Option<product_service::Model>> {
        self.find_optional(id).await
    }
}

#[async_trait]
impl CatalogLookup<customer::Model> for CustomerDao {
    async fn lookup(&self, id: Uuid) -> DaoResult<Option<customer::Model>> {
        self.find_optional(id).await
    }
}
