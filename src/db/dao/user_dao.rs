use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult, TimestampedActiveModel, UserStore};
use crate::db::entities::{prelude::User, user};

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl DaoBase for UserDao {
    type Entity = User;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl UserDao {
    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn set_last_login(&self, id: Uuid, at: DateTime<FixedOffset>) -> DaoResult<()> {
        let model = self.find_by_id(id).await?;
        let mut active = model.into_active_model();
        active.last_login_at = Set(Some(at));
        active.set_updated_at(at);
        active.update(&self.db).await.map_err(DaoLayerError::Db)?;
        Ok(())
    }

}

#[async_trait]
impl UserStore for UserDao {
    async fn find_user(&self, id: Uuid) -> DaoResult<Option<user::Model>> {
        self.find_optional(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        self.find_by_email(email).await
    }

    async fn create_user(&self, user: user::ActiveModel) -> DaoResult<user::Model> {
        self.create_as(None, user).await
    }

    async fn update_last_login(&self, id: Uuid, at: DateTime<FixedOffset>) -> DaoResult<()> {
        self.set_last_login(id, at).await
    }

    /// Links a Google subject to an existing account that signed up locally.
    async fn link_google(
        &self,
        id: Uuid,
        google_id: &str,
        picture: Option<String>,
    ) -> DaoResult<user::Model> {
        let google_id = google_id.to_string();
        self.update(id, move |active| {
            active.google_id = Set(Some(google_id));
            if picture.is_some() {
                active.picture = Set(picture);
            }
        })
        .await
    }
}
