use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

#[base_entity(audited)]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(indexed, unique_key = "store_invoice")]
    pub store_id: Uuid,
    #[sea_orm(unique_key = "store_invoice")]
    pub invoice_number: String,
    #[sea_orm(indexed)]
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub status: String,
    pub discount: f64,
    pub total_price: f64,
    pub paid_amount: f64,
    pub change_amount: f64,
    pub pickup_date: Option<DateTimeWithTimeZone>,
    #[sea_orm(belongs_to, from = "store_id", to = "id")]
    pub store: HasOne<super::store::Entity>,
    #[sea_orm(belongs_to, from = "customer_id", to = "id")]
    pub customer: HasOne<super::customer::Entity>,
    #[sea_orm(has_many)]
    pub items: HasMany<super::order_item::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
