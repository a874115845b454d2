use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::OrderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    Finished,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::Finished => "FINISHED",
            OrderStatus::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(OrderStatus::New),
            "FINISHED" => Ok(OrderStatus::Finished),
            "CANCELED" => Ok(OrderStatus::Canceled),
            other => Err(OrderError::Internal(format!("unknown order status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayStatus {
    Wait,
    Paid,
}

impl PayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayStatus::Wait => "WAIT",
            PayStatus::Paid => "PAID",
        }
    }
}

impl fmt::Display for PayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAIT" => Ok(PayStatus::Wait),
            "PAID" => Ok(PayStatus::Paid),
            other => Err(OrderError::Internal(format!("unknown pay status '{other}'"))),
        }
    }
}

/// One product/quantity entry of an incoming order.
#[derive(Debug, Clone)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub buyer_id: String,
    pub buyer_name: String,
    pub buyer_phone: String,
    pub buyer_address: String,
    pub items: Vec<CartItem>,
}

/// Point-in-time price and metadata for a product, as reported by the catalog.
#[derive(Debug, Clone)]
pub struct ProductQuote {
    pub product_id: String,
    pub product_name: String,
    pub unit_price: BigDecimal,
    pub product_stock: i32,
    pub product_description: Option<String>,
    pub product_icon: Option<String>,
    pub product_status: i32,
    pub category_type: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockReservation {
    pub product_id: String,
    pub quantity: i32,
}

impl From<&CartItem> for StockReservation {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineItem {
    pub line_id: Uuid,
    pub order_id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub product_icon: Option<String>,
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl OrderLineItem {
    /// Materializes a line from the quote it matched. Quote fields are copied
    /// first, then the order back-reference and the line id are set.
    pub fn from_quote(quote: &ProductQuote, quantity: i32, order_id: Uuid, line_id: Uuid) -> Self {
        Self {
            line_id,
            order_id,
            product_id: quote.product_id.clone(),
            product_name: quote.product_name.clone(),
            product_icon: quote.product_icon.clone(),
            unit_price: quote.unit_price.clone(),
            quantity,
            created_at: Utc::now(),
        }
    }

    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * &BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderHeader {
    pub order_id: Uuid,
    pub buyer_id: String,
    pub buyer_name: String,
    pub buyer_phone: String,
    pub buyer_address: String,
    pub order_amount: BigDecimal,
    pub order_status: OrderStatus,
    pub pay_status: PayStatus,
    /// Bumped on every status write; guards `finish` against lost updates.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderHeader {
    pub fn new(order_id: Uuid, request: &OrderRequest, order_amount: BigDecimal) -> Self {
        let now = Utc::now();
        Self {
            order_id,
            buyer_id: request.buyer_id.clone(),
            buyer_name: request.buyer_name.clone(),
            buyer_phone: request.buyer_phone.clone(),
            buyer_address: request.buyer_address.clone(),
            order_amount,
            order_status: OrderStatus::New,
            pay_status: PayStatus::Wait,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderResult {
    pub order_id: Uuid,
    pub buyer_id: String,
    pub buyer_name: String,
    pub buyer_phone: String,
    pub buyer_address: String,
    pub order_amount: BigDecimal,
    pub order_status: OrderStatus,
    pub pay_status: PayStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub line_items: Vec<OrderLineItem>,
}

impl OrderResult {
    pub fn compose(header: OrderHeader, line_items: Vec<OrderLineItem>) -> Self {
        Self {
            order_id: header.order_id,
            buyer_id: header.buyer_id,
            buyer_name: header.buyer_name,
            buyer_phone: header.buyer_phone,
            buyer_address: header.buyer_address,
            order_amount: header.order_amount,
            order_status: header.order_status,
            pay_status: header.pay_status,
            created_at: header.created_at,
            updated_at: header.updated_at,
            line_items,
        }
    }
}
