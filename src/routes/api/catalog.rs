//! CRUD endpoints for the store catalog, restricted to admins and store owners.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
    auth::ManagerRole,
    db::dao::{PageRequest, PaginatedResponse},
    db::entities::{customer, product, product_service, service_type, store},
    error::AppError,
    middleware::{AuthRoleGuard, actor},
    response::{ApiResult, JsonApiResponse},
    routes::{ListQuery, PageQuery},
    services::{
        ServiceContext,
        catalog_service::{
            CustomerRequest, CustomerService, PriceListService, ProductRequest, ProductService,
            ProductServiceRequest, ServiceTypeRequest, ServiceTypeService, StoreRequest,
            StoreService,
        },
    },
    state::AppState,
};

type Manager = AuthRoleGuard<ManagerRole>;

/// A catalog service exposed under one collection path.
#[async_trait::async_trait]
pub trait CatalogResource: Send + Sync + Sized + 'static {
    type Request: DeserializeOwned + Send + 'static;
    type Model: Serialize + Send + 'static;

    fn from_context(services: &ServiceContext) -> Self;

    async fn create(&self, request: Self::Request, actor: Option<Uuid>)
    -> Result<Self::Model, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Self::Model, AppError>;
    async fn list(
        &self,
        query: ListQuery,
    ) -> Result<PaginatedResponse<Self::Model>, AppError>;
    async fn update(
        &self,
        id: Uuid,
        request: Self::Request,
        actor: Option<Uuid>,
    ) -> Result<Self::Model, AppError>;
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

macro_rules! catalog_resource {
    ($service:ty, $request:ty, $model:ty, $ctor:ident) => {
        #[async_trait::async_trait]
        impl CatalogResource for $service {
            type Request = $request;
            type Model = $model;

            fn from_context(services: &ServiceContext) -> Self {
                services.$ctor()
            }

            async fn create(
                &self,
                request: Self::Request,
                actor: Option<Uuid>,
            ) -> Result<Self::Model, AppError> {
                <$service>::create(self, request, actor).await
            }

            async fn find_by_id(&self, id: Uuid) -> Result<Self::Model, AppError> {
                <$service>::find_by_id(self, id).await
            }

            async fn list(
                &self,
                query: ListQuery,
            ) -> Result<PaginatedResponse<Self::Model>, AppError> {
                <$service>::list(self, query.page, query.filters).await
            }

            async fn update(
                &self,
                id: Uuid,
                request: Self::Request,
                actor: Option<Uuid>,
            ) -> Result<Self::Model, AppError> {
                <$service>::update(self, id, request, actor).await
            }

            async fn delete(&self, id: Uuid) -> Result<(), AppError> {
                <$service>::delete(self, id).await
            }
        }
    };
}

catalog_resource!(StoreService, StoreRequest, store::Model, store);
catalog_resource!(ServiceTypeService, ServiceTypeRequest, service_type::Model, service_type);
catalog_resource!(ProductService, ProductRequest, product::Model, product);
catalog_resource!(
    PriceListService,
    ProductServiceRequest,
    product_service::Model,
    price_list
);
catalog_resource!(CustomerService, CustomerRequest, customer::Model, customer);

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/stores/mine", get(my_stores))
        .merge(resource_router::<StoreService>("/stores"))
        .merge(resource_router::<ServiceTypeService>("/service-types"))
        .merge(resource_router::<ProductService>("/products"))
        .merge(resource_router::<PriceListService>("/product-services"))
        .merge(resource_router::<CustomerService>("/customers"))
        .with_state(state)
}

fn resource_router<R: CatalogResource>(base: &str) -> Router<Arc<AppState>> {
    let id_path = format!("{base}/{{id}}");
    Router::new()
        .route(base, get(list::<R>).post(create::<R>))
        .route(
            &id_path,
            get(find_one::<R>).put(update::<R>).delete(remove::<R>),
        )
}

fn resource<R: CatalogResource>(state: &AppState) -> R {
    R::from_context(&ServiceContext::from_state(state))
}

async fn create<R: CatalogResource>(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { claims, .. }: Manager,
    Json(body): Json<R::Request>,
) -> ApiResult<R::Model> {
    let created = resource::<R>(state.as_ref())
        .create(body, actor(&claims))
        .await?;
    JsonApiResponse::created(created)
}

async fn list<R: CatalogResource>(
    State(state): State<Arc<AppState>>,
    _guard: Manager,
    query: ListQuery,
) -> ApiResult<PaginatedResponse<R::Model>> {
    JsonApiResponse::ok(resource::<R>(state.as_ref()).list(query).await?)
}

async fn find_one<R: CatalogResource>(
    State(state): State<Arc<AppState>>,
    _guard: Manager,
    Path(id): Path<Uuid>,
) -> ApiResult<R::Model> {
    JsonApiResponse::ok(resource::<R>(state.as_ref()).find_by_id(id).await?)
}

async fn update<R: CatalogResource>(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { claims, .. }: Manager,
    Path(id): Path<Uuid>,
    Json(body): Json<R::Request>,
) -> ApiResult<R::Model> {
    let updated = resource::<R>(state.as_ref())
        .update(id, body, actor(&claims))
        .await?;
    JsonApiResponse::ok(updated)
}

async fn remove<R: CatalogResource>(
    State(state): State<Arc<AppState>>,
    _guard: Manager,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    resource::<R>(state.as_ref()).delete(id).await?;
    JsonApiResponse::with_status(StatusCode::OK, "deleted", serde_json::Value::Null)
}

async fn my_stores(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { claims, .. }: Manager,
    Query(query): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<store::Model>> {
    let user_id = claims.user_id()?;
    let page: PageRequest = query.page();
    let stores = ServiceContext::from_state(state.as_ref())
        .store()
        .list_mine(user_id, page)
        .await?;
    JsonApiResponse::ok(stores)
}
