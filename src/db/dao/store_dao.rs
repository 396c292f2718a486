use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use super::{
    AuditedActiveModel, CatalogLookup, DaoBase, DaoLayerError, DaoResult, PageRequest,
    PaginatedResponse, stamp_new,
};
use crate::db::entities::{
    prelude::{Store, UserStore},
    store, user_store,
};

#[derive(Clone)]
pub struct StoreDao {
    db: DatabaseConnection,
}

impl DaoBase for StoreDao {
    type Entity = Store;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl StoreDao {
    /// Inserts the store and, when an actor is given, makes them a member in the same transaction.
    pub async fn create_with_member(
        &self,
        actor: Option<Uuid>,
        data: store::ActiveModel,
    ) -> DaoResult<store::Model> {
        let now = Utc::now().fixed_offset();
        let txn = self.db.begin().await.map_err(DaoLayerError::Db)?;

        let mut active = data;
        stamp_new(&mut active, now);
        active.set_created_by(actor);
        active.set_updated_by(actor);
        active.set_is_active(true);
        let created = active.insert(&txn).await.map_err(DaoLayerError::Db)?;

        if let Some(user_id) = actor {
            let mut membership = user_store::ActiveModel {
                user_id: Set(user_id),
                store_id: Set(created.id),
                ..Default::default()
            };
            stamp_new(&mut membership, now);
            membership.insert(&txn).await.map_err(DaoLayerError::Db)?;
        }

        txn.commit().await.map_err(DaoLayerError::Db)?;
        Ok(created)
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> DaoResult<PaginatedResponse<store::Model>> {
        let store_ids: Vec<Uuid> = UserStore::find()
            .select_only()
            .column(user_store::Column::StoreId)
            .filter(user_store::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;

        self.find(page, None, &[], move |query| {
            query.filter(store::Column::Id.is_in(store_ids))
        })
        .await
    }
}

#[async_trait]
impl CatalogLookup<store::Model> for StoreDao {
    async fn lookup(&self, id: Uuid) -> DaoResult<Option<store::Model>> {
        self.find_optional(id).await
    }
}
