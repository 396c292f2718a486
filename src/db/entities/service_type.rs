use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

#[base_entity(audited)]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "service_types")]
pub struct Model {
    pub name: String,
}

impl ActiveModelBehavior for ActiveModel {}
