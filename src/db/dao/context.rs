use sea_orm::DatabaseConnection;

use super::{
    CustomerDao, DaoBase, OrderDao, ProductDao, ProductServiceDao, RefreshTokenDao,
    ServiceTypeDao, StoreDao, UserDao,
};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        DaoBase::new(&self.db)
    }

    pub fn refresh_token(&self) -> RefreshTokenDao {
        DaoBase::new(&self.db)
    }

    pub fn store(&self) -> StoreDao {
        DaoBase::new(&self.db)
    }

    pub fn service_type(&self) -> ServiceTypeDao {
        DaoBase::new(&self.db)
    }

    pub fn product(&self) -> ProductDao {
        DaoBase::new(&self.db)
    }

    pub fn product_service(&self) -> ProductServiceDao {
        DaoBase::new(&self.db)
    }

    pub fn customer(&self) -> CustomerDao {
        DaoBase::new(&self.db)
    }

    pub fn order(&self) -> OrderDao {
        DaoBase::new(&self.db)
    }
}
