use uuid::Uuid;

pub trait HasCreatedAtColumn: sea_orm::EntityTrait {
    fn created_at_column() -> Self::Column;
}

pub trait HasIdActiveModel {
    fn set_id(&mut self, id: Uuid);
}

pub trait TimestampedActiveModel {
    fn set_created_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone);
    fn set_updated_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone);
}

/// Implemented by `#[base_entity(audited)]` models.
pub trait AuditedActiveModel {
    fn set_created_by(&mut self, actor: Option<Uuid>);
    fn set_updated_by(&mut self, actor: Option<Uuid>);
    fn set_is_active(&mut self, active: bool);
}
