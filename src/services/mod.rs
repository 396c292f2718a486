pub mod auth_service;
pub mod catalog_service;
pub mod context;
pub mod crud_service;
pub mod invoice;
pub mod order_service;
pub mod user_service;
pub mod validation;

pub use context::ServiceContext;
