use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

#[base_entity(audited)]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Absent for accounts that never had a local password.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[sea_orm(indexed)]
    pub google_id: Option<String>,
    pub picture: Option<String>,
    pub provider: String,
    pub role: String,
    pub last_login_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(has_many)]
    pub refresh_tokens: HasMany<super::refresh_token::Entity>,
    #[sea_orm(has_many)]
    pub memberships: HasMany<super::user_store::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
