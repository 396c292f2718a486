use std::{fmt, str::FromStr, sync::Arc};

use chrono::{DateTime, FixedOffset};
use sea_orm::{IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    clock::Clock,
    db::dao::{
        AuditedActiveModel, CustomerCatalog, DaoLayerError, OrderRecord, OrderStore, PageRequest,
        PaginatedResponse, ProductServiceCatalog, StoreCatalog, TimestampedActiveModel,
    },
    db::entities::{customer, order, order_item},
    error::{AppError, FieldError},
    services::{
        invoice::{business_day, format_invoice_number},
        validation::{collect_field_errors, finish},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Ongoing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Ongoing => "ONGOING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PENDING" => Ok(OrderStatus::Pending),
            "ONGOING" => Ok(OrderStatus::Ongoing),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemRequest {
    pub product_service_id: Uuid,
    #[validate(range(exclusive_min = 0.0, message = "quantity must be greater than 0"))]
    pub quantity: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderRequest {
    pub store_id: Uuid,
    pub customer_id: Uuid,
    pub status: String,
    /// RFC 3339; empty means no pickup date.
    #[serde(default)]
    pub pickup_date: Option<String>,
    #[validate(length(min = 1, message = "at least one item is required"))]
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0, message = "discount must be between 0 and 100"))]
    pub discount: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "paid amount must not be negative"))]
    pub paid_amount: f64,
}

struct ValidOrder {
    status: OrderStatus,
    pickup_date: Option<DateTime<FixedOffset>>,
}

impl OrderRequest {
    fn check(&self) -> Result<ValidOrder, AppError> {
        let mut fields = Vec::new();
        if let Err(errors) = self.validate() {
            collect_field_errors("", &errors, &mut fields);
        }
        for (index, item) in self.items.iter().enumerate() {
            if let Err(errors) = item.validate() {
                collect_field_errors(&format!("items[{index}]"), &errors, &mut fields);
            }
        }

        let status = OrderStatus::from_str(self.status.trim()).ok();
        if status.is_none() {
            fields.push(FieldError::new(
                "status",
                "status must be one of PENDING, ONGOING, COMPLETED, CANCELLED",
            ));
        }

        let pickup_date = match self.pickup_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(parsed) => Some(parsed),
                Err(_) => {
                    fields.push(FieldError::new(
                        "pickup_date",
                        "pickup_date must be an RFC 3339 timestamp",
                    ));
                    None
                }
            },
        };

        finish(fields)?;
        Ok(ValidOrder {
            status: status.unwrap_or(OrderStatus::Pending),
            pickup_date,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_service_id: Uuid,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub store_id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub status: String,
    pub discount: f64,
    pub total_price: f64,
    pub paid_amount: f64,
    pub change: f64,
    pub pickup_date: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub created_by: Option<Uuid>,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderRecord> for OrderResponse {
    fn from(record: OrderRecord) -> Self {
        let OrderRecord { order, items } = record;
        Self {
            id: order.id,
            invoice_number: order.invoice_number,
            store_id: order.store_id,
            customer_id: order.customer_id,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            customer_address: order.customer_address,
            status: order.status,
            discount: order.discount,
            total_price: order.total_price,
            paid_amount: order.paid_amount,
            change: order.change_amount,
            pickup_date: order.pickup_date,
            created_at: order.created_at,
            created_by: order.created_by,
            items: items
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    product_service_id: item.product_service_id,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    total_price: item.total_price,
                    notes: item.notes,
                })
                .collect(),
        }
    }
}

struct PricedLine {
    product_service_id: Uuid,
    quantity: f64,
    unit_price: f64,
    total_price: f64,
    notes: Option<String>,
}

struct Pricing {
    lines: Vec<PricedLine>,
    total: f64,
    change: f64,
}

/// `subtotal` reduced by `discount` percent.
pub fn apply_discount(subtotal: f64, discount: f64) -> f64 {
    subtotal * (1.0 - discount / 100.0)
}

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    stores: Arc<StoreCatalog>,
    customers: Arc<CustomerCatalog>,
    product_services: Arc<ProductServiceCatalog>,
    clock: Arc<dyn Clock>,
    business_offset: FixedOffset,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        stores: Arc<StoreCatalog>,
        customers: Arc<CustomerCatalog>,
        product_services: Arc<ProductServiceCatalog>,
        clock: Arc<dyn Clock>,
        business_offset: FixedOffset,
    ) -> Self {
        Self {
            orders,
            stores,
            customers,
            product_services,
            clock,
            business_offset,
        }
    }

    pub async fn create(
        &self,
        request: OrderRequest,
        actor: Option<Uuid>,
    ) -> Result<OrderResponse, AppError> {
        let valid = request.check()?;
        if self.stores.lookup(request.store_id).await?.is_none() {
            return Err(AppError::not_found("store not found"));
        }
        let customer = self.resolve_customer(request.customer_id).await?;
        let pricing = self.price(&request).await?;

        let now_utc = self.clock.now();
        let now = now_utc.fixed_offset();
        let day = business_day(now_utc, self.business_offset);
        let order_id = Uuid::new_v4();

        let txn = self.orders.begin().await?;
        let seq = self
            .orders
            .next_invoice_seq(&txn, request.store_id, day)
            .await?;
        let invoice_number = format_invoice_number(day, seq);

        let mut header = order::ActiveModel {
            id: Set(order_id),
            created_at: Set(now),
            updated_at: Set(now),
            store_id: Set(request.store_id),
            invoice_number: Set(invoice_number.clone()),
            status: Set(valid.status.as_str().to_string()),
            discount: Set(request.discount),
            total_price: Set(pricing.total),
            paid_amount: Set(request.paid_amount),
            change_amount: Set(pricing.change),
            pickup_date: Set(valid.pickup_date),
            ..Default::default()
        };
        snapshot_customer(&mut header, &customer);
        header.set_created_by(actor);
        header.set_updated_by(actor);
        header.set_is_active(true);

        let items = line_models(order_id, pricing.lines, now);
        let record = self.orders.create_in_tx(&txn, header, items).await?;
        txn.commit().await.map_err(DaoLayerError::Db)?;

        tracing::info!(
            order_id = %record.order.id,
            store_id = %record.order.store_id,
            invoice = %invoice_number,
            total = record.order.total_price,
            "order created"
        );
        Ok(record.into())
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: OrderRequest,
        actor: Option<Uuid>,
    ) -> Result<OrderResponse, AppError> {
        let valid = request.check()?;
        let existing = self
            .orders
            .find_order(id)
            .await?
            .ok_or_else(|| AppError::not_found("order not found"))?;
        if request.store_id != existing.order.store_id {
            tracing::debug!(order_id = %id, "ignoring store change on order update");
        }
        let customer = self.resolve_customer(request.customer_id).await?;
        let pricing = self.price(&request).await?;
        let now = self.clock.now().fixed_offset();

        let mut header = existing.order.into_active_model();
        snapshot_customer(&mut header, &customer);
        header.status = Set(valid.status.as_str().to_string());
        header.discount = Set(request.discount);
        header.total_price = Set(pricing.total);
        header.paid_amount = Set(request.paid_amount);
        header.change_amount = Set(pricing.change);
        header.pickup_date = Set(valid.pickup_date);
        header.set_updated_at(now);
        header.set_updated_by(actor);

        let items = line_models(id, pricing.lines, now);
        let txn = self.orders.begin().await?;
        let record = self.orders.update_in_tx(&txn, header, items).await?;
        txn.commit().await.map_err(DaoLayerError::Db)?;

        tracing::info!(order_id = %id, total = record.order.total_price, "order updated");
        Ok(record.into())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<OrderResponse, AppError> {
        self.orders
            .find_order(id)
            .await?
            .map(OrderResponse::from)
            .ok_or_else(|| AppError::not_found("order not found"))
    }

    pub async fn find_all(
        &self,
        page: PageRequest,
    ) -> Result<PaginatedResponse<OrderResponse>, AppError> {
        Ok(self.orders.list_orders(page).await?.map(OrderResponse::from))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        match self.orders.delete_order(id).await {
            Ok(()) => Ok(()),
            Err(DaoLayerError::NotFound { .. }) => Err(AppError::not_found("order not found")),
            Err(err) => Err(err.into()),
        }
    }

    async fn resolve_customer(&self, id: Uuid) -> Result<customer::Model, AppError> {
        self.customers
            .lookup(id)
            .await?
            .ok_or_else(|| AppError::not_found("customer not found"))
    }

    /// Prices every line from the catalog; any missing entry aborts the whole order.
    /// Amounts that overflow to infinity are rejected as invalid input.
    async fn price(&self, request: &OrderRequest) -> Result<Pricing, AppError> {
        let mut lines = Vec::with_capacity(request.items.len());
        let mut fields = Vec::new();
        let mut subtotal = 0.0;
        for (index, item) in request.items.iter().enumerate() {
            let entry = self
                .product_services
                .lookup(item.product_service_id)
                .await?
                .ok_or_else(|| AppError::not_found("product service not found"))?;
            let total_price = entry.price * item.quantity;
            if !total_price.is_finite() {
                fields.push(FieldError::new(
                    format!("items[{index}].quantity"),
                    "line total is too large",
                ));
            }
            subtotal += total_price;
            lines.push(PricedLine {
                product_service_id: entry.id,
                quantity: item.quantity,
                unit_price: entry.price,
                total_price,
                notes: item.notes.clone().filter(|notes| !notes.trim().is_empty()),
            });
        }

        let total = apply_discount(subtotal, request.discount);
        let change = request.paid_amount - total;
        if fields.is_empty() && !(total.is_finite() && change.is_finite()) {
            fields.push(FieldError::new("items", "order total is too large"));
        }
        finish(fields)?;

        Ok(Pricing {
            lines,
            total,
            change,
        })
    }
}

fn snapshot_customer(header: &mut order::ActiveModel, customer: &customer::Model) {
    header.customer_id = Set(customer.id);
    header.customer_name = Set(customer.name.clone());
    header.customer_phone = Set(customer.phone.clone());
    header.customer_address = Set(customer.address.clone());
}

fn line_models(
    order_id: Uuid,
    lines: Vec<PricedLine>,
    now: DateTime<FixedOffset>,
) -> Vec<order_item::ActiveModel> {
    lines
        .into_iter()
        .zip(0..)
        .map(|(line, position)| order_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            created_at: Set(now),
            updated_at: Set(now),
            order_id: Set(order_id),
            position: Set(position),
            product_service_id: Set(line.product_service_id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            total_price: Set(line.total_price),
            notes: Set(line.notes),
            ..Default::default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
    use sea_orm::{DatabaseBackend, DatabaseTransaction, MockDatabase, TransactionTrait};
    use uuid::Uuid;

    use super::{OrderItemRequest, OrderRequest, OrderService, apply_discount};
    use crate::clock::ManualClock;
    use crate::db::dao::{
        CatalogLookup, DaoResult, OrderRecord, OrderStore, PageRequest, PaginatedResponse,
    };
    use crate::db::entities::{customer, order, order_item, product_service, store};
    use crate::error::AppError;

    fn ts() -> chrono::DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    struct Catalog<M>(HashMap<Uuid, M>);

    #[async_trait]
    impl<M: Clone + Send + Sync + 'static> CatalogLookup<M> for Catalog<M> {
        async fn lookup(&self, id: Uuid) -> DaoResult<Option<M>> {
            Ok(self.0.get(&id).cloned())
        }
    }

    /// Keeps orders in memory; transactions come from a mock connection.
    struct MemoryOrders {
        db: sea_orm::DatabaseConnection,
        counters: Mutex<HashMap<(Uuid, NaiveDate), i32>>,
        saved: Mutex<Vec<OrderRecord>>,
    }

    impl MemoryOrders {
        fn new() -> Self {
            Self {
                db: MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
                counters: Mutex::new(HashMap::new()),
                saved: Mutex::new(Vec::new()),
            }
        }
    }

    fn materialize(
        active: order::ActiveModel,
        items: Vec<order_item::ActiveModel>,
    ) -> OrderRecord {
        let order = order::Model {
            id: active.id.unwrap(),
            created_at: active.created_at.unwrap(),
            updated_at: active.updated_at.unwrap(),
            store_id: active.store_id.unwrap(),
            invoice_number: active.invoice_number.unwrap(),
            customer_id: active.customer_id.unwrap(),
            customer_name: active.customer_name.unwrap(),
            customer_phone: active.customer_phone.unwrap(),
            customer_address: active.customer_address.unwrap(),
            status: active.status.unwrap(),
            discount: active.discount.unwrap(),
            total_price: active.total_price.unwrap(),
            paid_amount: active.paid_amount.unwrap(),
            change_amount: active.change_amount.unwrap(),
            pickup_date: active.pickup_date.unwrap(),
            created_by: active.created_by.unwrap(),
            updated_by: active.updated_by.unwrap(),
            is_active: active.is_active.unwrap(),
        };
        let items = items
            .into_iter()
            .map(|item| order_item::Model {
                id: item.id.unwrap(),
                created_at: item.created_at.unwrap(),
                updated_at: item.updated_at.unwrap(),
                order_id: item.order_id.unwrap(),
                position: item.position.unwrap(),
                product_service_id: item.product_service_id.unwrap(),
                quantity: item.quantity.unwrap(),
                unit_price: item.unit_price.unwrap(),
                total_price: item.total_price.unwrap(),
                notes: item.notes.unwrap(),
            })
            .collect();
        OrderRecord { order, items }
    }

    #[async_trait]
    impl OrderStore for MemoryOrders {
        async fn begin(&self) -> DaoResult<DatabaseTransaction> {
            Ok(self.db.begin().await?)
        }

        async fn next_invoice_seq(
            &self,
            _txn: &DatabaseTransaction,
            store_id: Uuid,
            day: NaiveDate,
        ) -> DaoResult<i32> {
            let mut counters = self.counters.lock().expect("counter lock");
            let seq = counters.entry((store_id, day)).or_insert(0);
            *seq += 1;
            Ok(*seq)
        }

        async fn create_in_tx(
            &self,
            _txn: &DatabaseTransaction,
            order: order::ActiveModel,
            items: Vec<order_item::ActiveModel>,
        ) -> DaoResult<OrderRecord> {
            let record = materialize(order, items);
            self.saved.lock().expect("saved lock").push(record.clone());
            Ok(record)
        }

        async fn update_in_tx(
            &self,
            txn: &DatabaseTransaction,
            order: order::ActiveModel,
            items: Vec<order_item::ActiveModel>,
        ) -> DaoResult<OrderRecord> {
            self.create_in_tx(txn, order, items).await
        }

        async fn find_order(&self, id: Uuid) -> DaoResult<Option<OrderRecord>> {
            let saved = self.saved.lock().expect("saved lock");
            Ok(saved.iter().rev().find(|r| r.order.id == id).cloned())
        }

        async fn list_orders(
            &self,
            page: PageRequest,
        ) -> DaoResult<PaginatedResponse<OrderRecord>> {
            let saved = self.saved.lock().expect("saved lock").clone();
            let total = saved.len() as u64;
            Ok(PaginatedResponse::new(saved, total, page))
        }

        async fn find_items_by_order_ids(
            &self,
            _ids: &[Uuid],
        ) -> DaoResult<HashMap<Uuid, Vec<order_item::Model>>> {
            Ok(HashMap::new())
        }

        async fn delete_order(&self, _id: Uuid) -> DaoResult<()> {
            Ok(())
        }
    }

    struct Fixture {
        service: OrderService,
        orders: Arc<MemoryOrders>,
        store_id: Uuid,
        customer_id: Uuid,
        shirt: Uuid,
        towel: Uuid,
    }

    fn fixture() -> Fixture {
        let now = ts();
        let store_id = Uuid::new_v4();
        let customer_id = Uuid::new_v4();
        let shirt = Uuid::new_v4();
        let towel = Uuid::new_v4();

        let store = store::Model {
            id: store_id,
            created_at: now,
            updated_at: now,
            name: "Main".to_string(),
            code: "MAIN".to_string(),
            address: "1 Main St".to_string(),
            phone: None,
            logo: None,
            created_by: None,
            updated_by: None,
            is_active: true,
        };
        let customer = customer::Model {
            id: customer_id,
            created_at: now,
            updated_at: now,
            name: "Budi".to_string(),
            phone: Some("0812".to_string()),
            address: None,
            created_by: None,
            updated_by: None,
            is_active: true,
        };
        let priced = |id: Uuid, price: f64| product_service::Model {
            id,
            created_at: now,
            updated_at: now,
            product_id: Uuid::new_v4(),
            service_type_id: Uuid::new_v4(),
            unit: "pcs".to_string(),
            price,
            created_by: None,
            updated_by: None,
            is_active: true,
        };

        let orders = Arc::new(MemoryOrders::new());
        let service = OrderService::new(
            orders.clone(),
            Arc::new(Catalog(HashMap::from([(store_id, store)]))),
            Arc::new(Catalog(HashMap::from([(customer_id, customer)]))),
            Arc::new(Catalog(HashMap::from([
                (shirt, priced(shirt, 10.0)),
                (towel, priced(towel, 5.0)),
            ]))),
            Arc::new(ManualClock::new(Utc.from_utc_datetime(&now.naive_utc()))),
            FixedOffset::east_opt(0).expect("offset should be valid"),
        );

        Fixture {
            service,
            orders,
            store_id,
            customer_id,
            shirt,
            towel,
        }
    }

    fn request(fx: &Fixture) -> OrderRequest {
        OrderRequest {
            store_id: fx.store_id,
            customer_id: fx.customer_id,
            status: "PENDING".to_string(),
            pickup_date: None,
            items: vec![
                OrderItemRequest {
                    product_service_id: fx.shirt,
                    quantity: 3.0,
                    notes: None,
                },
                OrderItemRequest {
                    product_service_id: fx.towel,
                    quantity: 1.0,
                    notes: Some("starch".to_string()),
                },
            ],
            discount: 10.0,
            paid_amount: 40.0,
        }
    }

    #[test]
    fn discount_is_a_percentage_of_the_subtotal() {
        assert!((apply_discount(35.0, 10.0) - 31.5).abs() < 1e-9);
        assert_eq!(apply_discount(35.0, 0.0), 35.0);
        assert_eq!(apply_discount(35.0, 100.0), 0.0);
    }

    #[tokio::test]
    async fn create_prices_lines_and_numbers_the_invoice() {
        let fx = fixture();

        let created = fx
            .service
            .create(request(&fx), None)
            .await
            .expect("order should be created");

        assert!((created.total_price - 31.5).abs() < 1e-9);
        assert!((created.change - 8.5).abs() < 1e-9);
        assert_eq!(created.invoice_number, "INV-260101-001");
        assert_eq!(created.customer_name, "Budi");
        assert_eq!(created.items.len(), 2);
        assert_eq!(created.items[0].total_price, 30.0);
        assert_eq!(created.items[1].unit_price, 5.0);
        assert_eq!(created.items[1].notes.as_deref(), Some("starch"));
    }

    #[tokio::test]
    async fn underpayment_yields_negative_change() {
        let fx = fixture();
        let mut req = request(&fx);
        req.paid_amount = 30.0;

        let created = fx.service.create(req, None).await.expect("order should be created");
        assert!((created.change + 1.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn missing_product_service_aborts_before_any_write() {
        let fx = fixture();
        let mut req = request(&fx);
        req.items[1].product_service_id = Uuid::new_v4();

        let err = fx
            .service
            .create(req, None)
            .await
            .expect_err("unknown product service should fail");

        assert!(matches!(err, AppError::NotFound(ref m) if m == "product service not found"));
        assert!(fx.orders.saved.lock().expect("saved lock").is_empty());
        assert!(fx.orders.counters.lock().expect("counter lock").is_empty());
    }

    #[tokio::test]
    async fn missing_customer_is_not_found() {
        let fx = fixture();
        let mut req = request(&fx);
        req.customer_id = Uuid::new_v4();

        let err = fx.service.create(req, None).await.expect_err("should fail");
        assert_eq!(err.message(), "customer not found");
    }

    #[tokio::test]
    async fn invalid_request_reports_each_field() {
        let fx = fixture();
        let mut req = request(&fx);
        req.status = "DONE".to_string();
        req.discount = 120.0;
        req.pickup_date = Some("tomorrow".to_string());
        req.items[1].quantity = 0.0;

        let err = fx.service.create(req, None).await.expect_err("should fail");
        let fields: Vec<&str> = err
            .fields()
            .expect("validation error should carry fields")
            .iter()
            .map(|f| f.field.as_str())
            .collect();
        assert_eq!(
            fields,
            vec!["discount", "items[1].quantity", "pickup_date", "status"]
        );
    }

    #[tokio::test]
    async fn overflowing_line_total_is_rejected_before_numbering() {
        let fx = fixture();
        let mut req = request(&fx);
        req.items[0].quantity = 1e308;

        let err = fx.service.create(req, None).await.expect_err("should fail");
        let fields: Vec<&str> = err
            .fields()
            .expect("validation error should carry fields")
            .iter()
            .map(|f| f.field.as_str())
            .collect();
        assert_eq!(fields, vec!["items[0].quantity"]);
        assert!(fx.orders.saved.lock().expect("saved lock").is_empty());
        assert!(fx.orders.counters.lock().expect("counter lock").is_empty());
    }

    #[tokio::test]
    async fn overflowing_subtotal_is_rejected() {
        let fx = fixture();
        let mut req = request(&fx);
        // each line is finite on its own, the sum is not
        req.items[0].quantity = 1.5e307;
        req.items[1].quantity = 3e307;

        let err = fx.service.create(req, None).await.expect_err("should fail");
        let fields = err.fields().expect("validation error should carry fields");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "items");
    }

    #[tokio::test]
    async fn update_reprices_from_catalog_and_keeps_invoice() {
        let fx = fixture();
        let created = fx
            .service
            .create(request(&fx), None)
            .await
            .expect("order should be created");

        let mut req = request(&fx);
        req.items.truncate(1);
        req.discount = 0.0;
        req.status = "COMPLETED".to_string();
        req.pickup_date = Some("2026-01-03T10:00:00+07:00".to_string());

        let updated = fx
            .service
            .update(created.id, req, None)
            .await
            .expect("order should update");

        assert_eq!(updated.invoice_number, created.invoice_number);
        assert_eq!(updated.total_price, 30.0);
        assert_eq!(updated.change, 10.0);
        assert_eq!(updated.status, "COMPLETED");
        assert_eq!(updated.items.len(), 1);
        assert!(updated.pickup_date.is_some());
    }

    #[tokio::test]
    async fn update_of_unknown_order_is_not_found() {
        let fx = fixture();
        let err = fx
            .service
            .update(Uuid::new_v4(), request(&fx), None)
            .await
            .expect_err("should fail");
        assert_eq!(err.message(), "order not found");
    }
}
