use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

#[base_entity(audited)]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "stores")]
pub struct Model {
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    pub address: String,
    pub phone: Option<String>,
    pub logo: Option<String>,
    #[sea_orm(has_many)]
    pub members: HasMany<super::user_store::Entity>,
    #[sea_orm(has_many)]
    pub products: HasMany<super::product::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
