use thiserror::Error;
use uuid::Uuid;

use super::order::OrderStatus;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("Order {order_id} is {status}, only NEW orders can be finished")]
    InvalidOrderState { order_id: Uuid, status: OrderStatus },

    #[error("Order {0} has no line items")]
    OrderDetailMissing(Uuid),

    #[error("Inventory unavailable: {0}")]
    InventoryUnavailable(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Order {0} was modified concurrently")]
    ConcurrentModification(Uuid),

    #[error("Internal error: {0}")]
    Internal(String),
}
