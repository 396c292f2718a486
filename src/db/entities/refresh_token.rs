use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

/// One issued session. Lookups only ever match rows that are unrevoked and unexpired,
/// and a row never returns to active once `revoked` is set.
#[base_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "refresh_tokens")]
pub struct Model {
    /// 64 hex chars from [`crate::auth::refresh::generate_refresh_token`].
    #[sea_orm(unique)]
    pub token: String,
    #[sea_orm(indexed)]
    pub user_id: Uuid,
    pub expires_at: DateTimeWithTimeZone,
    #[sea_orm(default_value = false)]
    pub revoked: bool,
    pub revoked_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
