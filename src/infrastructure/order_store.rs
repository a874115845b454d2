use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde_json::json;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::OrderError;
use crate::domain::order::{OrderHeader, OrderLineItem, OrderStatus};
use crate::domain::ports::OrderStore;
use crate::schema::{order_header, order_line_item, order_outbox};

use super::models::{NewOutboxEventRow, OrderHeaderRow, OrderLineItemRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for OrderError {
    fn from(e: diesel::result::Error) -> Self {
        OrderError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for OrderError {
    fn from(e: r2d2::Error) -> Self {
        OrderError::Internal(e.to_string())
    }
}

// ── Store ────────────────────────────────────────────────────────────────────

pub struct DieselOrderStore {
    pool: DbPool,
}

impl DieselOrderStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Runs `f` on a pooled connection off the async executor.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, OrderError>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> Result<T, OrderError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| OrderError::Internal(e.to_string()))?
    }
}

fn outbox_event(order_id: Uuid, event_type: &str, payload: serde_json::Value) -> NewOutboxEventRow {
    NewOutboxEventRow {
        id: Uuid::new_v4(),
        aggregate_type: "Order".to_string(),
        aggregate_id: order_id.to_string(),
        event_type: event_type.to_string(),
        payload,
    }
}

#[async_trait]
impl OrderStore for DieselOrderStore {
    async fn put_line_item(&self, item: &OrderLineItem) -> Result<(), OrderError> {
        let row = OrderLineItemRow::from(item);
        self.with_conn(move |conn| {
            diesel::insert_into(order_line_item::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    /// Inserts the header and its `OrderCreated` outbox event in one
    /// transaction. The event carries the lines already stored for the order.
    async fn put_header(&self, header: &OrderHeader) -> Result<(), OrderError> {
        let row = OrderHeaderRow::from(header);
        self.with_conn(move |conn| {
            conn.transaction::<_, OrderError, _>(|conn| {
                diesel::insert_into(order_header::table)
                    .values(&row)
                    .execute(conn)?;

                let lines = order_line_item::table
                    .filter(order_line_item::order_id.eq(row.order_id))
                    .select(OrderLineItemRow::as_select())
                    .load(conn)?;
                let line_payloads: Vec<serde_json::Value> = lines
                    .iter()
                    .map(|l| {
                        json!({
                            "line_id": l.line_id,
                            "product_id": l.product_id,
                            "quantity": l.quantity,
                            "unit_price": l.unit_price.to_string()
                        })
                    })
                    .collect();

                let payload = json!({
                    "order_id": row.order_id,
                    "buyer_id": row.buyer_id,
                    "order_amount": row.order_amount.to_string(),
                    "order_status": row.order_status,
                    "pay_status": row.pay_status,
                    "lines": line_payloads
                });
                diesel::insert_into(order_outbox::table)
                    .values(&outbox_event(row.order_id, "OrderCreated", payload))
                    .execute(conn)?;

                Ok(())
            })
        })
        .await
    }

    async fn get_header_by_id(&self, order_id: Uuid) -> Result<Option<OrderHeader>, OrderError> {
        self.with_conn(move |conn| {
            let row = order_header::table
                .filter(order_header::order_id.eq(order_id))
                .select(OrderHeaderRow::as_select())
                .first(conn)
                .optional()?;
            row.map(OrderHeader::try_from).transpose()
        })
        .await
    }

    async fn list_line_items_by_order_id(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderLineItem>, OrderError> {
        self.with_conn(move |conn| {
            let rows = order_line_item::table
                .filter(order_line_item::order_id.eq(order_id))
                .select(OrderLineItemRow::as_select())
                .order(order_line_item::created_at.asc())
                .load(conn)?;
            Ok(rows.into_iter().map(OrderLineItem::from).collect())
        })
        .await
    }

    async fn update_header_status(
        &self,
        order_id: Uuid,
        expected_version: i32,
        status: OrderStatus,
    ) -> Result<bool, OrderError> {
        if status != OrderStatus::Finished {
            return Err(OrderError::Internal(format!(
                "order {order_id}: unsupported status write to {status}"
            )));
        }
        self.with_conn(move |conn| {
            conn.transaction::<_, OrderError, _>(|conn| {
                let updated = diesel::update(
                    order_header::table
                        .filter(order_header::order_id.eq(order_id))
                        .filter(order_header::version.eq(expected_version)),
                )
                .set((
                    order_header::order_status.eq(status.as_str()),
                    order_header::version.eq(expected_version + 1),
                    order_header::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;
                if updated == 0 {
                    return Ok(false);
                }

                let payload = json!({
                    "order_id": order_id,
                    "order_status": status.as_str(),
                    "version": expected_version + 1
                });
                diesel::insert_into(order_outbox::table)
                    .values(&outbox_event(order_id, "OrderFinished", payload))
                    .execute(conn)?;
                Ok(true)
            })
        })
        .await
    }

    async fn delete_line_items_by_order_id(&self, order_id: Uuid) -> Result<usize, OrderError> {
        self.with_conn(move |conn| {
            let removed = diesel::delete(
                order_line_item::table.filter(order_line_item::order_id.eq(order_id)),
            )
            .execute(conn)?;
            Ok(removed)
        })
        .await
    }
}
