use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

/// A priced pairing of a product with a service type, e.g. "shirt / dry clean, per piece".
#[base_entity(audited)]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "product_services")]
pub struct Model {
    #[sea_orm(indexed)]
    pub product_id: Uuid,
    #[sea_orm(indexed)]
    pub service_type_id: Uuid,
    pub unit: String,
    pub price: f64,
    #[sea_orm(belongs_to, from = "product_id", to = "id", on_delete = "Cascade")]
    pub product: HasOne<super::product::Entity>,
    #[sea_orm(belongs_to, from = "service_type_id", to = "id", on_delete = "Cascade")]
    pub service_type: HasOne<super::service_type::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
