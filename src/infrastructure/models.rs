use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::OrderError;
use crate::domain::order::{OrderHeader, OrderLineItem};
use crate::schema::{order_header, order_line_item, order_outbox};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = order_header)]
#[diesel(primary_key(order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderHeaderRow {
    pub order_id: Uuid,
    pub buyer_id: String,
    pub buyer_name: String,
    pub buyer_phone: String,
    pub buyer_address: String,
    pub order_amount: BigDecimal,
    pub order_status: String,
    pub pay_status: String,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&OrderHeader> for OrderHeaderRow {
    fn from(h: &OrderHeader) -> Self {
        Self {
            order_id: h.order_id,
            buyer_id: h.buyer_id.clone(),
            buyer_name: h.buyer_name.clone(),
            buyer_phone: h.buyer_phone.clone(),
            buyer_address: h.buyer_address.clone(),
            order_amount: h.order_amount.clone(),
            order_status: h.order_status.as_str().to_string(),
            pay_status: h.pay_status.as_str().to_string(),
            version: h.version,
            created_at: h.created_at,
            updated_at: h.updated_at,
        }
    }
}

impl TryFrom<OrderHeaderRow> for OrderHeader {
    type Error = OrderError;

    fn try_from(row: OrderHeaderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            order_id: row.order_id,
            buyer_id: row.buyer_id,
            buyer_name: row.buyer_name,
            buyer_phone: row.buyer_phone,
            buyer_address: row.buyer_address,
            order_amount: row.order_amount,
            order_status: row.order_status.parse()?,
            pay_status: row.pay_status.parse()?,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = order_line_item)]
#[diesel(primary_key(line_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderLineItemRow {
    pub line_id: Uuid,
    pub order_id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub product_icon: Option<String>,
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&OrderLineItem> for OrderLineItemRow {
    fn from(l: &OrderLineItem) -> Self {
        Self {
            line_id: l.line_id,
            order_id: l.order_id,
            product_id: l.product_id.clone(),
            product_name: l.product_name.clone(),
            product_icon: l.product_icon.clone(),
            unit_price: l.unit_price.clone(),
            quantity: l.quantity,
            created_at: l.created_at,
        }
    }
}

impl From<OrderLineItemRow> for OrderLineItem {
    fn from(row: OrderLineItemRow) -> Self {
        Self {
            line_id: row.line_id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            product_icon: row.product_icon,
            unit_price: row.unit_price,
            quantity: row.quantity,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = order_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}
