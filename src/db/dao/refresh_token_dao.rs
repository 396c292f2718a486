use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult, RefreshTokenStore, stamp_new};
use crate::db::entities::refresh_token::{self, Entity as RefreshToken};

#[derive(Clone)]
pub struct RefreshTokenDao {
    db: DatabaseConnection,
}

impl DaoBase for RefreshTokenDao {
    type Entity = RefreshToken;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl RefreshTokenDao {
    pub async fn find_active_by_token(
        &self,
        token: &str,
        now: DateTime<FixedOffset>,
    ) -> DaoResult<Option<refresh_token::Model>> {
        RefreshToken::find()
            .filter(refresh_token::Column::Token.eq(token))
            .filter(refresh_token::Column::Revoked.eq(false))
            .filter(refresh_token::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    async fn revoke_where(
        &self,
        condition: sea_orm::Condition,
        at: DateTime<FixedOffset>,
    ) -> DaoResult<u64> {
        let result = RefreshToken::update_many()
            .col_expr(refresh_token::Column::Revoked, Expr::value(true))
            .col_expr(refresh_token::Column::RevokedAt, Expr::value(at))
            .col_expr(refresh_token::Column::UpdatedAt, Expr::value(at))
            .filter(condition)
            .filter(refresh_token::Column::Revoked.eq(false))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }
}

#[async_trait]
impl RefreshTokenStore for RefreshTokenDao {
    async fn create_token(
        &self,
        user_id: Uuid,
        token: &str,
        issued_at: DateTime<FixedOffset>,
        expires_at: DateTime<FixedOffset>,
    ) -> DaoResult<refresh_token::Model> {
        let mut model = refresh_token::ActiveModel {
            token: Set(token.to_string()),
            user_id: Set(user_id),
            expires_at: Set(expires_at),
            revoked: Set(false),
            revoked_at: Set(None),
            ..Default::default()
        };
        stamp_new(&mut model, issued_at);
        sea_orm::ActiveModelTrait::insert(model, &self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    async fn find_active(
        &self,
        token: &str,
        now: DateTime<FixedOffset>,
    ) -> DaoResult<Option<refresh_token::Model>> {
        self.find_active_by_token(token, now).await
    }

    async fn revoke(&self, id: Uuid, at: DateTime<FixedOffset>) -> DaoResult<bool> {
        let condition = sea_orm::Condition::all().add(refresh_token::Column::Id.eq(id));
        Ok(self.revoke_where(condition, at).await? > 0)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        at: DateTime<FixedOffset>,
    ) -> DaoResult<u64> {
        let condition = sea_orm::Condition::all().add(refresh_token::Column::UserId.eq(user_id));
        self.revoke_where(condition, at).await
    }
}
