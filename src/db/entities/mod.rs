#[allow(unused_imports)]
pub mod prelude {
    pub use super::customer::Entity as Customer;
    pub use super::invoice_counter::Entity as InvoiceCounter;
    pub use super::order::Entity as Order;
    pub use super::order_item::Entity as OrderItem;
    pub use super::product::Entity as Product;
    pub use super::product_service::Entity as ProductService;
    pub use super::refresh_token::Entity as RefreshToken;
    pub use super::service_type::Entity as ServiceType;
    pub use super::store::Entity as Store;
    pub use super::user::Entity as User;
    pub use super::user_store::Entity as UserStore;
}

pub mod customer;
pub mod invoice_counter;
pub mod order;
pub mod order_item;
pub mod product;
pub mod product_service;
pub mod refresh_token;
pub mod service_type;
pub mod store;
pub mod user;
pub mod user_store;
