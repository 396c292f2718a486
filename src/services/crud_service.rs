use std::collections::HashMap;

use sea_orm::sea_query::Value as QueryValue;
use sea_orm::{EntityTrait, IntoActiveModel, Select};
use uuid::Uuid;

use crate::db::dao::{
    AuditedActiveModel, ColumnFilter, DaoBase, DaoLayerError, FilterOp, PageRequest,
    PaginatedResponse,
};
use crate::error::AppError;

type CrudEntity<D> = <D as DaoBase>::Entity;
type CrudModel<D> = <CrudEntity<D> as EntityTrait>::Model;
type CrudActiveModel<D> = <CrudEntity<D> as EntityTrait>::ActiveModel;
type CrudColumn<D> = <CrudEntity<D> as EntityTrait>::Column;

#[derive(Debug, Clone, Copy)]
pub enum CrudAction {
    Create,
    Read,
    Update,
    Delete,
}

impl CrudAction {
    fn verb(self) -> &'static str {
        match self {
            CrudAction::Create => "create",
            CrudAction::Read => "load",
            CrudAction::Update => "update",
            CrudAction::Delete => "delete",
        }
    }
}

const INVALID_FILTER_MESSAGE: &str = "Invalid filter";
const INVALID_FILTER_VALUE_MESSAGE: &str = "Invalid filter value";

/// A query-string key a listing accepts, and how its value becomes a column filter.
pub struct FilterSpec<C> {
    pub key: &'static str,
    pub column: C,
    pub parse: fn(&str) -> Result<FilterOp, AppError>,
}

#[async_trait::async_trait]
pub trait CrudService {
    type Dao: DaoBase;
    /// Human name used in client messages, e.g. `"service type"`.
    const RESOURCE: &'static str;

    fn dao(&self) -> &Self::Dao;

    /// Filters accepted by [`CrudService::list`]; unknown keys are rejected.
    fn list_filters(&self) -> &'static [FilterSpec<CrudColumn<Self::Dao>>] {
        &[]
    }

    /// Missing rows become `NotFound("<resource> not found")` and broken references become
    /// `Conflict`; other storage failures stay internal and only the action and resource
    /// reach the client.
    fn map_error(&self, action: CrudAction, err: DaoLayerError) -> AppError {
        if err.is_foreign_key_violation() {
            return match action {
                CrudAction::Delete => {
                    AppError::conflict(format!("{} is still in use", Self::RESOURCE))
                }
                _ => AppError::conflict(format!(
                    "{} references a record that does not exist",
                    Self::RESOURCE
                )),
            };
        }
        match err {
            DaoLayerError::NotFound { .. } => {
                AppError::not_found(format!("{} not found", Self::RESOURCE))
            }
            DaoLayerError::InvalidPagination { .. } => AppError::bad_request(err.to_string()),
            DaoLayerError::Db(db_err) => AppError::internal_with_source(
                format!("Could not {} {}", action.verb(), Self::RESOURCE),
                db_err,
            ),
        }
    }

    async fn create_as<T>(
        &self,
        actor: Option<Uuid>,
        data: T,
    ) -> Result<CrudModel<Self::Dao>, AppError>
    where
        T: IntoActiveModel<CrudActiveModel<Self::Dao>> + Send,
        CrudActiveModel<Self::Dao>: AuditedActiveModel,
    {
        self.dao()
            .create_as(actor, data)
            .await
            .map_err(|err| self.map_error(CrudAction::Create, err))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<CrudModel<Self::Dao>, AppError> {
        self.dao()
            .find_by_id(id)
            .await
            .map_err(|err| self.map_error(CrudAction::Read, err))
    }

    async fn list<F>(
        &self,
        page: PageRequest,
        filters: HashMap<String, String>,
        apply: F,
    ) -> Result<PaginatedResponse<CrudModel<Self::Dao>>, AppError>
    where
        F: FnOnce(Select<CrudEntity<Self::Dao>>) -> Select<CrudEntity<Self::Dao>> + Send,
        CrudColumn<Self::Dao>: Copy,
    {
        let column_filters = self.build_column_filters(filters)?;
        self.dao()
            .find(page, None, &column_filters, apply)
            .await
            .map_err(|err| self.map_error(CrudAction::Read, err))
    }

    async fn update_as<F>(
        &self,
        id: Uuid,
        actor: Option<Uuid>,
        apply: F,
    ) -> Result<CrudModel<Self::Dao>, AppError>
    where
        F: for<'a> FnOnce(&'a mut CrudActiveModel<Self::Dao>) + Send,
        CrudActiveModel<Self::Dao>: AuditedActiveModel,
    {
        self.dao()
            .update_as(id, actor, apply)
            .await
            .map_err(|err| self.map_error(CrudAction::Update, err))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.dao()
            .delete(id)
            .await
            .map(|_| ())
            .map_err(|err| self.map_error(CrudAction::Delete, err))
    }

    fn build_column_filters(
        &self,
        filters: HashMap<String, String>,
    ) -> Result<Vec<ColumnFilter<CrudColumn<Self::Dao>>>, AppError>
    where
        CrudColumn<Self::Dao>: Copy,
    {
        let specs = self.list_filters();
        let mut parsed = Vec::with_capacity(filters.len());
        for (key, value) in filters {
            let spec = specs
                .iter()
                .find(|spec| spec.key == key)
                .ok_or_else(|| AppError::bad_request(format!("{INVALID_FILTER_MESSAGE}: {key}")))?;
            parsed.push(ColumnFilter {
                column: spec.column,
                op: (spec.parse)(&value)?,
            });
        }
        Ok(parsed)
    }
}

fn invalid_filter_value() -> AppError {
    AppError::bad_request(INVALID_FILTER_VALUE_MESSAGE)
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '%' => escaped.push_str("\\%"),
            '_' => escaped.push_str("\\_"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Exact match, or a `LIKE` when the value starts and/or ends with `*`.
pub fn parse_string_filter(raw: &str) -> Result<FilterOp, AppError> {
    let raw = raw.trim();
    let leading = raw.starts_with('*');
    let trailing = raw.ends_with('*');
    let inner = raw.trim_matches('*');
    if inner.is_empty() || inner.contains('*') {
        return Err(invalid_filter_value());
    }

    if !leading && !trailing {
        return Ok(FilterOp::Eq(QueryValue::String(Some(inner.to_string()))));
    }

    let escaped = escape_like(inner);
    let pattern = match (leading, trailing) {
        (true, true) => format!("%{escaped}%"),
        (true, false) => format!("%{escaped}"),
        _ => format!("{escaped}%"),
    };
    Ok(FilterOp::Like {
        pattern,
        escape: '\\',
    })
}

pub fn parse_uuid_filter(raw: &str) -> Result<FilterOp, AppError> {
    let id = Uuid::parse_str(raw.trim()).map_err(|err| {
        AppError::bad_request(format!("{INVALID_FILTER_VALUE_MESSAGE}: {err}"))
    })?;
    Ok(FilterOp::Eq(QueryValue::from(id)))
}
