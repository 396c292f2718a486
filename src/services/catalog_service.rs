//! Store catalog CRUD: stores, service types, products, product prices and customers.

use std::collections::HashMap;

use sea_orm::Set;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::dao::{
        CustomerDao, DaoBase, PageRequest, PaginatedResponse, ProductDao, ProductServiceDao,
        ServiceTypeDao, StoreDao,
    },
    db::entities::{customer, product, product_service, service_type, store},
    error::{AppError, conflict_on_duplicate},
    services::{
        crud_service::{CrudAction, CrudService, FilterSpec, parse_string_filter, parse_uuid_filter},
        validation::validate_request,
    },
};

const STORE_CODE_TAKEN: &str = "store code already in use";

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StoreRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 32, message = "code must be 1 to 32 characters"))]
    pub code: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Clone)]
pub struct StoreService {
    dao: StoreDao,
}

static STORE_FILTERS: &[FilterSpec<store::Column>] = &[
    FilterSpec {
        key: "name",
        column: store::Column::Name,
        parse: parse_string_filter,
    },
    FilterSpec {
        key: "code",
        column: store::Column::Code,
        parse: parse_string_filter,
    },
];

impl CrudService for StoreService {
    type Dao = StoreDao;
    const RESOURCE: &'static str = "store";

    fn dao(&self) -> &Self::Dao {
        &self.dao
    }

    fn list_filters(&self) -> &'static [FilterSpec<store::Column>] {
        STORE_FILTERS
    }
}

impl StoreService {
    pub fn new(dao: StoreDao) -> Self {
        Self { dao }
    }

    /// The creator becomes a member of the new store.
    pub async fn create(
        &self,
        request: StoreRequest,
        actor: Option<Uuid>,
    ) -> Result<store::Model, AppError> {
        validate_request(&request)?;
        let model = store::ActiveModel {
            name: Set(request.name.trim().to_string()),
            code: Set(request.code.trim().to_string()),
            address: Set(request.address.trim().to_string()),
            phone: Set(blank_to_none(request.phone)),
            logo: Set(blank_to_none(request.logo)),
            ..Default::default()
        };
        let created = self
            .dao
            .create_with_member(actor, model)
            .await
            .map_err(|err| conflict_on_duplicate(err, STORE_CODE_TAKEN))?;
        tracing::info!(store_id = %created.id, code = %created.code, "store created");
        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<store::Model, AppError> {
        CrudService::find_by_id(self, id).await
    }

    pub async fn list(
        &self,
        page: PageRequest,
        filters: HashMap<String, String>,
    ) -> Result<PaginatedResponse<store::Model>, AppError> {
        CrudService::list(self, page, filters, |query| query).await
    }

    pub async fn list_mine(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<PaginatedResponse<store::Model>, AppError> {
        Ok(self.dao.list_for_user(user_id, page).await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: StoreRequest,
        actor: Option<Uuid>,
    ) -> Result<store::Model, AppError> {
        validate_request(&request)?;
        self.dao
            .update_as(id, actor, move |active| {
                active.name = Set(request.name.trim().to_string());
                active.code = Set(request.code.trim().to_string());
                active.address = Set(request.address.trim().to_string());
                active.phone = Set(blank_to_none(request.phone));
                active.logo = Set(blank_to_none(request.logo));
            })
            .await
            .map_err(|err| {
                if err.is_unique_violation() {
                    AppError::conflict(STORE_CODE_TAKEN)
                } else {
                    self.map_error(CrudAction::Update, err)
                }
            })
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        CrudService::delete(self, id).await
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServiceTypeRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

#[derive(Clone)]
pub struct ServiceTypeService {
    dao: ServiceTypeDao,
}

static SERVICE_TYPE_FILTERS: &[FilterSpec<service_type::Column>] = &[FilterSpec {
    key: "name",
    column: service_type::Column::Name,
    parse: parse_string_filter,
}];

impl CrudService for ServiceTypeService {
    type Dao = ServiceTypeDao;
    const RESOURCE: &'static str = "service type";

    fn dao(&self) -> &Self::Dao {
        &self.dao
    }

    fn list_filters(&self) -> &'static [FilterSpec<service_type::Column>] {
        SERVICE_TYPE_FILTERS
    }
}

impl ServiceTypeService {
    pub fn new(dao: ServiceTypeDao) -> Self {
        Self { dao }
    }

    pub async fn create(
        &self,
        request: ServiceTypeRequest,
        actor: Option<Uuid>,
    ) -> Result<service_type::Model, AppError> {
        validate_request(&request)?;
        let model = service_type::ActiveModel {
            name: Set(request.name.trim().to_string()),
            ..Default::default()
        };
        CrudService::create_as(self, actor, model).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<service_type::Model, AppError> {
        CrudService::find_by_id(self, id).await
    }

    pub async fn list(
        &self,
        page: PageRequest,
        filters: HashMap<String, String>,
    ) -> Result<PaginatedResponse<service_type::Model>, AppError> {
        CrudService::list(self, page, filters, |query| query).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: ServiceTypeRequest,
        actor: Option<Uuid>,
    ) -> Result<service_type::Model, AppError> {
        validate_request(&request)?;
        CrudService::update_as(self, id, actor, move |active| {
            active.name = Set(request.name.trim().to_string());
        })
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        CrudService::delete(self, id).await
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub store_id: Uuid,
}

#[derive(Clone)]
pub struct ProductService {
    dao: ProductDao,
    stores: StoreDao,
}

static PRODUCT_FILTERS: &[FilterSpec<product::Column>] = &[
    FilterSpec {
        key: "name",
        column: product::Column::Name,
        parse: parse_string_filter,
    },
    FilterSpec {
        key: "store_id",
        column: product::Column::StoreId,
        parse: parse_uuid_filter,
    },
];

impl CrudService for ProductService {
    type Dao = ProductDao;
    const RESOURCE: &'static str = "product";

    fn dao(&self) -> &Self::Dao {
        &self.dao
    }

    fn list_filters(&self) -> &'static [FilterSpec<product::Column>] {
        PRODUCT_FILTERS
    }
}

impl ProductService {
    pub fn new(dao: ProductDao, stores: StoreDao) -> Self {
        Self { dao, stores }
    }

    async fn require_store(&self, id: Uuid) -> Result<(), AppError> {
        match self.stores.find_optional(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("store not found")),
        }
    }

    pub async fn create(
        &self,
        request: ProductRequest,
        actor: Option<Uuid>,
    ) -> Result<product::Model, AppError> {
        validate_request(&request)?;
        self.require_store(request.store_id).await?;
        let model = product::ActiveModel {
            name: Set(request.name.trim().to_string()),
            store_id: Set(request.store_id),
            ..Default::default()
        };
        CrudService::create_as(self, actor, model).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<product::Model, AppError> {
        CrudService::find_by_id(self, id).await
    }

    pub async fn list(
        &self,
        page: PageRequest,
        filters: HashMap<String, String>,
    ) -> Result<PaginatedResponse<product::Model>, AppError> {
        CrudService::list(self, page, filters, |query| query).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: ProductRequest,
        actor: Option<Uuid>,
    ) -> Result<product::Model, AppError> {
        validate_request(&request)?;
        self.require_store(request.store_id).await?;
        CrudService::update_as(self, id, actor, move |active| {
            active.name = Set(request.name.trim().to_string());
            active.store_id = Set(request.store_id);
        })
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        CrudService::delete(self, id).await
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductServiceRequest {
    pub product_id: Uuid,
    pub service_type_id: Uuid,
    #[validate(length(min = 1, message = "unit is required"))]
    pub unit: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
}

/// Prices a product for one service type.
#[derive(Clone)]
pub struct PriceListService {
    dao: ProductServiceDao,
    products: ProductDao,
    service_types: ServiceTypeDao,
}

static PRICE_LIST_FILTERS: &[FilterSpec<product_service::Column>] = &[
    FilterSpec {
        key: "product_id",
        column: product_service::Column::ProductId,
        parse: parse_uuid_filter,
    },
    FilterSpec {
        key: "service_type_id",
        column: product_service::Column::ServiceTypeId,
        parse: parse_uuid_filter,
    },
];

impl CrudService for PriceListService {
    type Dao = ProductServiceDao;
    const RESOURCE: &'static str = "product service";

    fn dao(&self) -> &Self::Dao {
        &self.dao
    }

    fn list_filters(&self) -> &'static [FilterSpec<product_service::Column>] {
        PRICE_LIST_FILTERS
    }
}

impl PriceListService {
    pub fn new(dao: ProductServiceDao, products: ProductDao, service_types: ServiceTypeDao) -> Self {
        Self {
            dao,
            products,
            service_types,
        }
    }

    async fn require_refs(&self, request: &ProductServiceRequest) -> Result<(), AppError> {
        if self.products.find_optional(request.product_id).await?.is_none() {
            return Err(AppError::not_found("product not found"));
        }
        if self
            .service_types
            .find_optional(request.service_type_id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found("service type not found"));
        }
        Ok(())
    }

    pub async fn create(
        &self,
        request: ProductServiceRequest,
        actor: Option<Uuid>,
    ) -> Result<product_service::Model, AppError> {
        validate_request(&request)?;
        self.require_refs(&request).await?;
        let model = product_service::ActiveModel {
            product_id: Set(request.product_id),
            service_type_id: Set(request.service_type_id),
            unit: Set(request.unit.trim().to_string()),
            price: Set(request.price),
            ..Default::default()
        };
        CrudService::create_as(self, actor, model).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<product_service::Model, AppError> {
        CrudService::find_by_id(self, id).await
    }

    pub async fn list(
        &self,
        page: PageRequest,
        filters: HashMap<String, String>,
    ) -> Result<PaginatedResponse<product_service::Model>, AppError> {
        CrudService::list(self, page, filters, |query| query).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: ProductServiceRequest,
        actor: Option<Uuid>,
    ) -> Result<product_service::Model, AppError> {
        validate_request(&request)?;
        self.require_refs(&request).await?;
        CrudService::update_as(self, id, actor, move |active| {
            active.product_id = Set(request.product_id);
            active.service_type_id = Set(request.service_type_id);
            active.unit = Set(request.unit.trim().to_string());
            active.price = Set(request.price);
        })
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        CrudService::delete(self, id).await
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Clone)]
pub struct CustomerService {
    dao: CustomerDao,
}

static CUSTOMER_FILTERS: &[FilterSpec<customer::Column>] = &[
    FilterSpec {
        key: "name",
        column: customer::Column::Name,
        parse: parse_string_filter,
    },
    FilterSpec {
        key: "phone",
        column: customer::Column::Phone,
        parse: parse_string_filter,
    },
];

impl CrudService for CustomerService {
    type Dao = CustomerDao;
    const RESOURCE: &'static str = "customer";

    fn dao(&self) -> &Self::Dao {
        &self.dao
    }

    fn list_filters(&self) -> &'static [FilterSpec<customer::Column>] {
        CUSTOMER_FILTERS
    }
}

impl CustomerService {
    pub fn new(dao: CustomerDao) -> Self {
        Self { dao }
    }

    pub async fn create(
        &self,
        request: CustomerRequest,
        actor: Option<Uuid>,
    ) -> Result<customer::Model, AppError> {
        validate_request(&request)?;
        let model = customer::ActiveModel {
            name: Set(request.name.trim().to_string()),
            phone: Set(blank_to_none(request.phone)),
            address: Set(blank_to_none(request.address)),
            ..Default::default()
        };
        CrudService::create_as(self, actor, model).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<customer::Model, AppError> {
        CrudService::find_by_id(self, id).await
    }

    pub async fn list(
        &self,
        page: PageRequest,
        filters: HashMap<String, String>,
    ) -> Result<PaginatedResponse<customer::Model>, AppError> {
        CrudService::list(self, page, filters, |query| query).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: CustomerRequest,
        actor: Option<Uuid>,
    ) -> Result<customer::Model, AppError> {
        validate_request(&request)?;
        CrudService::update_as(self, id, actor, move |active| {
            active.name = Set(request.name.trim().to_string());
            active.phone = Set(blank_to_none(request.phone));
            active.address = Set(blank_to_none(request.address));
        })
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        CrudService::delete(self, id).await
    }
}
