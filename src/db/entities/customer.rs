use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

#[base_entity(audited)]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
