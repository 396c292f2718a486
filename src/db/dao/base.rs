use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::{Expr, ExprTrait, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityName, EntityTrait, FromQueryResult,
    IntoActiveModel, Order, PaginatorTrait, PrimaryKeyTrait, QueryFilter, QueryOrder, QuerySelect,
    Select,
};
use serde::Serialize;
use uuid::Uuid;

use super::base_traits::{
    AuditedActiveModel, HasCreatedAtColumn, HasIdActiveModel, TimestampedActiveModel,
};
use super::error::{DaoLayerError, DaoResult};

pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

impl PageRequest {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// Missing or zero limits fall back to [`DEFAULT_PAGE_LIMIT`].
    pub fn from_query(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self {
            limit: limit.filter(|limit| *limit > 0).unwrap_or(DEFAULT_PAGE_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
    pub limit: u64,
    pub offset: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        let limit = Ord::max(request.limit, 1);
        Self {
            data,
            total,
            page: request.offset / limit + 1,
            pages: total.div_ceil(limit),
            limit: request.limit,
            offset: request.offset,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            pages: self.pages,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FilterOp {
    Eq(sea_orm::sea_query::Value),
    Like { pattern: String, escape: char },
}

#[derive(Debug, Clone)]
pub struct ColumnFilter<C> {
    pub column: C,
    pub op: FilterOp,
}

/// Assigns a fresh id and creation timestamps to a row about to be inserted.
pub fn stamp_new<A>(active: &mut A, now: DateTime<FixedOffset>)
where
    A: HasIdActiveModel + TimestampedActiveModel,
{
    active.set_id(Uuid::new_v4());
    active.set_created_at(now);
    active.set_updated_at(now);
}

#[async_trait::async_trait]
pub trait DaoBase: Clone + Send + Sync + Sized
where
    <Self::Entity as EntityTrait>::Model:
        FromQueryResult + IntoActiveModel<<Self::Entity as EntityTrait>::ActiveModel> + Send + Sync,
    <Self::Entity as EntityTrait>::ActiveModel:
        ActiveModelTrait<Entity = Self::Entity> + HasIdActiveModel + TimestampedActiveModel + Send,
    <<Self::Entity as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType:
        From<Uuid> + Send + Sync,
    Self::Entity: HasCreatedAtColumn,
{
    type Entity: EntityTrait + Send + Sync;
    const MAX_PAGE_SIZE: u64 = MAX_PAGE_LIMIT;

    fn new(db: &DatabaseConnection) -> Self;

    fn db(&self) -> &DatabaseConnection;

    fn entity_name() -> &'static str {
        Self::Entity::default().table_name()
    }

    fn not_found(id: Uuid) -> DaoLayerError {
        DaoLayerError::NotFound {
            entity: Self::entity_name(),
            id,
        }
    }

    async fn create(
        &self,
        data: impl IntoActiveModel<<Self::Entity as EntityTrait>::ActiveModel> + Send,
    ) -> DaoResult<<Self::Entity as EntityTrait>::Model> {
        let mut active = data.into_active_model();
        stamp_new(&mut active, Utc::now().fixed_offset());
        active.insert(self.db()).await.map_err(DaoLayerError::Db)
    }

    async fn create_as(
        &self,
        actor: Option<Uuid>,
        data: impl IntoActiveModel<<Self::Entity as EntityTrait>::ActiveModel> + Send,
    ) -> DaoResult<<Self::Entity as EntityTrait>::Model>
    where
        <Self::Entity as EntityTrait>::ActiveModel: AuditedActiveModel,
    {
        let mut active = data.into_active_model();
        stamp_new(&mut active, Utc::now().fixed_offset());
        active.set_created_by(actor);
        active.set_updated_by(actor);
        active.set_is_active(true);
        active.insert(self.db()).await.map_err(DaoLayerError::Db)
    }

    async fn find_optional(
        &self,
        id: Uuid,
    ) -> DaoResult<Option<<Self::Entity as EntityTrait>::Model>> {
        Self::Entity::find_by_id(id)
            .one(self.db())
            .await
            .map_err(DaoLayerError::Db)
    }

    async fn find_by_id(&self, id: Uuid) -> DaoResult<<Self::Entity as EntityTrait>::Model> {
        self.find_optional(id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn find(
        &self,
        page: PageRequest,
        order: Option<(<Self::Entity as EntityTrait>::Column, Order)>,
        filters: &[ColumnFilter<<Self::Entity as EntityTrait>::Column>],
        apply: impl FnOnce(Select<Self::Entity>) -> Select<Self::Entity> + Send,
    ) -> DaoResult<PaginatedResponse<<Self::Entity as EntityTrait>::Model>>
    where
        <Self::Entity as EntityTrait>::Column: Clone,
    {
        if page.limit == 0 || page.limit > Self::MAX_PAGE_SIZE {
            return Err(DaoLayerError::InvalidPagination {
                limit: page.limit,
                max: Self::MAX_PAGE_SIZE,
            });
        }

        let filtered = filters
            .iter()
            .fold(apply(Self::Entity::find()), |select, filter| {
                match &filter.op {
                    FilterOp::Eq(value) => select.filter(filter.column.clone().eq(value.clone())),
                    FilterOp::Like { pattern, escape } => select.filter(
                        Expr::col(filter.column.clone())
                            .like(LikeExpr::new(pattern).escape(*escape)),
                    ),
                }
            });

        let total = filtered
            .clone()
            .count(self.db())
            .await
            .map_err(DaoLayerError::Db)?;

        let ordered = match order {
            Some((column, order)) => filtered.order_by(column, order),
            None => filtered.order_by_desc(Self::Entity::created_at_column()),
        };
        let data = ordered
            .limit(page.limit)
            .offset(page.offset)
            .all(self.db())
            .await
            .map_err(DaoLayerError::Db)?;

        Ok(PaginatedResponse::new(data, total, page))
    }

    async fn update<F>(&self, id: Uuid, apply: F) -> DaoResult<<Self::Entity as EntityTrait>::Model>
    where
        F: for<'a> FnOnce(&'a mut <Self::Entity as EntityTrait>::ActiveModel) + Send,
    {
        let model = self.find_by_id(id).await?;

        let mut active = model.into_active_model();
        apply(&mut active);
        active.set_updated_at(Utc::now().fixed_offset());

        active.update(self.db()).await.map_err(DaoLayerError::Db)
    }

    async fn update_as<F>(
        &self,
        id: Uuid,
        actor: Option<Uuid>,
        apply: F,
    ) -> DaoResult<<Self::Entity as EntityTrait>::Model>
    where
        F: for<'a> FnOnce(&'a mut <Self::Entity as EntityTrait>::ActiveModel) + Send,
        <Self::Entity as EntityTrait>::ActiveModel: AuditedActiveModel,
    {
        self.update(id, move |active| {
            apply(active);
            active.set_updated_by(actor);
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> DaoResult<Uuid> {
        let result = Self::Entity::delete_by_id(id)
            .exec(self.db())
            .await
            .map_err(DaoLayerError::Db)?;

        if result.rows_affected == 0 {
            return Err(Self::not_found(id));
        }

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::{PageRequest, PaginatedResponse};

    #[test]
    fn page_request_defaults_missing_and_zero_limits() {
        assert_eq!(PageRequest::from_query(None, None), PageRequest::new(20, 0));
        assert_eq!(PageRequest::from_query(Some(0), Some(40)), PageRequest::new(20, 40));
        assert_eq!(PageRequest::from_query(Some(5), Some(10)), PageRequest::new(5, 10));
    }

    #[test]
    fn paginated_response_derives_page_numbers() {
        let response = PaginatedResponse::new(vec![1, 2], 45, PageRequest::new(20, 40));

        assert_eq!(response.page, 3);
        assert_eq!(response.pages, 3);
        assert_eq!(response.total, 45);
    }

    #[test]
    fn zero_limit_does_not_divide_by_zero() {
        let response = PaginatedResponse::<u8>::new(Vec::new(), 7, PageRequest::new(0, 3));

        assert_eq!(response.page, 4);
        assert_eq!(response.pages, 7);
        assert_eq!(response.limit, 0);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let response = PaginatedResponse::<u8>::new(Vec::new(), 0, PageRequest::new(20, 0));

        assert_eq!(response.page, 1);
        assert_eq!(response.pages, 0);
    }
}
