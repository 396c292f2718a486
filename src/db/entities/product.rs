use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

#[base_entity(audited)]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    pub name: String,
    #[sea_orm(indexed)]
    pub store_id: Uuid,
    #[sea_orm(belongs_to, from = "store_id", to = "id", on_delete = "Cascade")]
    pub store: HasOne<super::store::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
