use async_trait::async_trait;
use uuid::Uuid;

use super::errors::OrderError;
use super::order::{OrderHeader, OrderLineItem, OrderStatus, ProductQuote, StockReservation};

/// Price and metadata lookup. Unknown ids are omitted from the result, not
/// reported as errors.
#[async_trait]
pub trait CatalogService: Send + Sync + 'static {
    async fn quote(&self, product_ids: &[String]) -> Result<Vec<ProductQuote>, OrderError>;
}

/// Stock decrement for a whole batch; fails for the batch as a unit.
#[async_trait]
pub trait InventoryService: Send + Sync + 'static {
    async fn reserve(&self, items: &[StockReservation]) -> Result<(), OrderError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    async fn put_line_item(&self, item: &OrderLineItem) -> Result<(), OrderError>;

    async fn put_header(&self, header: &OrderHeader) -> Result<(), OrderError>;

    async fn get_header_by_id(&self, order_id: Uuid) -> Result<Option<OrderHeader>, OrderError>;

    async fn list_line_items_by_order_id(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderLineItem>, OrderError>;

    /// Sets the status and bumps the version only if the stored version still
    /// equals `expected_version`. Returns whether the write happened. Only
    /// FINISHED is a supported target; anything else is an `Internal` error.
    async fn update_header_status(
        &self,
        order_id: Uuid,
        expected_version: i32,
        status: OrderStatus,
    ) -> Result<bool, OrderError>;

    async fn delete_line_items_by_order_id(&self, order_id: Uuid) -> Result<usize, OrderError>;
}

pub trait IdGenerator: Send + Sync + 'static {
    fn new_id(&self) -> Uuid;
}

/// Time-sortable random ids (UUID v7).
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn new_id(&self) -> Uuid {
        Uuid::now_v7()
    }
}
