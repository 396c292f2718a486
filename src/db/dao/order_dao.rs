use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, ExprTrait, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{
    DaoBase, DaoLayerError, DaoResult, OrderRecord, OrderStore, PageRequest, PaginatedResponse,
};
use crate::db::entities::{
    invoice_counter, order, order_item,
    prelude::{InvoiceCounter, Order, OrderItem},
};

#[derive(Clone)]
pub struct OrderDao {
    db: DatabaseConnection,
}

impl DaoBase for OrderDao {
    type Entity = Order;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl OrderDao {
    async fn insert_items<C: ConnectionTrait>(
        conn: &C,
        items: Vec<order_item::ActiveModel>,
    ) -> DaoResult<Vec<order_item::Model>> {
        let mut inserted = Vec::with_capacity(items.len());
        for item in items {
            inserted.push(item.insert(conn).await.map_err(DaoLayerError::Db)?);
        }
        Ok(inserted)
    }
}

#[async_trait]
impl OrderStore for OrderDao {
    async fn begin(&self) -> DaoResult<DatabaseTransaction> {
        self.db.begin().await.map_err(DaoLayerError::Db)
    }

    async fn next_invoice_seq(
        &self,
        txn: &DatabaseTransaction,
        store_id: Uuid,
        day: NaiveDate,
    ) -> DaoResult<i32> {
        let seed = invoice_counter::ActiveModel {
            store_id: Set(store_id),
            business_day: Set(day),
            last_seq: Set(1),
        };
        InvoiceCounter::insert(seed)
            .on_conflict(
                OnConflict::columns([
                    invoice_counter::Column::StoreId,
                    invoice_counter::Column::BusinessDay,
                ])
                .value(
                    invoice_counter::Column::LastSeq,
                    Expr::col((InvoiceCounter, invoice_counter::Column::LastSeq)).add(1),
                )
                .to_owned(),
            )
            .exec(txn)
            .await
            .map_err(DaoLayerError::Db)?;

        let counter = InvoiceCounter::find_by_id((store_id, day))
            .one(txn)
            .await
            .map_err(DaoLayerError::Db)?
            .ok_or_else(|| {
                DaoLayerError::Db(sea_orm::DbErr::RecordNotFound(format!(
                    "invoice counter for store {store_id} on {day}"
                )))
            })?;
        Ok(counter.last_seq)
    }

    async fn create_in_tx(
        &self,
        txn: &DatabaseTransaction,
        order: order::ActiveModel,
        items: Vec<order_item::ActiveModel>,
    ) -> DaoResult<OrderRecord> {
        let order = order.insert(txn).await.map_err(DaoLayerError::Db)?;
        let items = Self::insert_items(txn, items).await?;
        Ok(OrderRecord { order, items })
    }

    async fn update_in_tx(
        &self,
        txn: &DatabaseTransaction,
        order: order::ActiveModel,
        items: Vec<order_item::ActiveModel>,
    ) -> DaoResult<OrderRecord> {
        let order = order.update(txn).await.map_err(DaoLayerError::Db)?;
        OrderItem::delete_many()
            .filter(order_item::Column::OrderId.eq(order.id))
            .exec(txn)
            .await
            .map_err(DaoLayerError::Db)?;
        let items = Self::insert_items(txn, items).await?;
        Ok(OrderRecord { order, items })
    }

    async fn find_order(&self, id: Uuid) -> DaoResult<Option<OrderRecord>> {
        let Some(order) = self.find_optional(id).await? else {
            return Ok(None);
        };
        let items = self
            .find_items_by_order_ids(&[id])
            .await?
            .remove(&id)
            .unwrap_or_default();
        Ok(Some(OrderRecord { order, items }))
    }

    async fn list_orders(&self, page: PageRequest) -> DaoResult<PaginatedResponse<OrderRecord>> {
        let orders = self.find(page, None, &[], |query| query).await?;
        let ids: Vec<Uuid> = orders.data.iter().map(|order| order.id).collect();
        let mut items = self.find_items_by_order_ids(&ids).await?;
        Ok(orders.map(|order| OrderRecord {
            items: items.remove(&order.id).unwrap_or_default(),
            order,
        }))
    }

    async fn find_items_by_order_ids(
        &self,
        ids: &[Uuid],
    ) -> DaoResult<HashMap<Uuid, Vec<order_item::Model>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = OrderItem::find()
            .filter(order_item::Column::OrderId.is_in(ids.to_vec()))
            .order_by_asc(order_item::Column::OrderId)
            .order_by_asc(order_item::Column::Position)
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;

        let mut grouped: HashMap<Uuid, Vec<order_item::Model>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row);
        }
        Ok(grouped)
    }

    async fn delete_order(&self, id: Uuid) -> DaoResult<()> {
        let txn = self.db.begin().await.map_err(DaoLayerError::Db)?;
        OrderItem::delete_many()
            .filter(order_item::Column::OrderId.eq(id))
            .exec(&txn)
            .await
            .map_err(DaoLayerError::Db)?;
        let result = Order::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(DaoLayerError::Db)?;
        if result.rows_affected == 0 {
            return Err(Self::not_found(id));
        }
        txn.commit().await.map_err(DaoLayerError::Db)?;
        Ok(())
    }
}
