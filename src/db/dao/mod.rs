pub mod base;
pub mod base_traits;
pub mod catalog_dao;
mod context;
pub mod contracts;
pub mod error;
pub mod order_dao;
pub mod refresh_token_dao;
pub mod store_dao;
pub mod user_dao;

pub use base::{
    ColumnFilter, DaoBase, FilterOp, PageRequest, PaginatedResponse, stamp_new,
    DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
pub use base_traits::{
    AuditedActiveModel, HasCreatedAtColumn, HasIdActiveModel, TimestampedActiveModel,
};
pub use catalog_dao::{CustomerDao, ProductDao, ProductServiceDao, ServiceTypeDao};
pub use context::DaoContext;
pub use contracts::{
    CatalogLookup, CustomerCatalog, OrderRecord, OrderStore, ProductServiceCatalog,
    RefreshTokenStore, StoreCatalog, UserStore,
};
pub use error::{DaoLayerError, DaoResult};
pub use order_dao::OrderDao;
pub use refresh_token_dao::RefreshTokenDao;
pub use store_dao::StoreDao;
pub use user_dao::UserDao;
