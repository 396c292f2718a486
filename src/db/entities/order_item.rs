use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

#[base_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(indexed)]
    pub order_id: Uuid,
    /// Zero-based line position within the order.
    pub position: i32,
    pub product_service_id: Uuid,
    pub quantity: f64,
    /// Catalog price at the time the line was priced.
    pub unit_price: f64,
    pub total_price: f64,
    pub notes: Option<String>,
    #[sea_orm(belongs_to, from = "order_id", to = "id", on_delete = "Cascade")]
    pub order: HasOne<super::order::Entity>,
    #[sea_orm(belongs_to, from = "product_service_id", to = "id")]
    pub product_service: HasOne<super::product_service::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
