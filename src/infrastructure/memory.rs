//! In-memory adapters for the order ports.
//!
//! Used by the unit and HTTP tests.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::OrderError;
use crate::domain::order::{OrderHeader, OrderLineItem, OrderStatus, ProductQuote, StockReservation};
use crate::domain::ports::{CatalogService, InventoryService, OrderStore};

#[derive(Debug, Default)]
struct StoreState {
    headers: HashMap<Uuid, OrderHeader>,
    lines: Vec<OrderLineItem>,
    writes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of mutating calls that changed state (inserts, updates, deletes).
    pub fn write_count(&self) -> usize {
        self.read().writes
    }

    pub fn header_count(&self) -> usize {
        self.read().headers.len()
    }

    pub fn line_count(&self) -> usize {
        self.read().lines.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn put_line_item(&self, item: &OrderLineItem) -> Result<(), OrderError> {
        let mut state = self.write();
        state.lines.push(item.clone());
        state.writes += 1;
        Ok(())
    }

    async fn put_header(&self, header: &OrderHeader) -> Result<(), OrderError> {
        let mut state = self.write();
        if state.headers.contains_key(&header.order_id) {
            return Err(OrderError::Internal(format!(
                "duplicate order id {}",
                header.order_id
            )));
        }
        state.headers.insert(header.order_id, header.clone());
        state.writes += 1;
        Ok(())
    }

    async fn get_header_by_id(&self, order_id: Uuid) -> Result<Option<OrderHeader>, OrderError> {
        Ok(self.read().headers.get(&order_id).cloned())
    }

    async fn list_line_items_by_order_id(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderLineItem>, OrderError> {
        Ok(self
            .read()
            .lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect())
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
        let mut state = self.write();
        let Some(header) = state.headers.get_mut(&order_id) else {
            return Ok(false);
        };
        if header.version != expected_version {
            return Ok(false);
        }
        header.order_status = status;
        header.version += 1;
        header.updated_at = Utc::now();
        state.writes += 1;
        Ok(true)
    }

    async fn delete_line_items_by_order_id(&self, order_id: Uuid) -> Result<usize, OrderError> {
        let mut state = self.write();
        let before = state.lines.len();
        state.lines.retain(|l| l.order_id != order_id);
        let removed = before - state.lines.len();
        if removed > 0 {
            state.writes += 1;
        }
        Ok(removed)
    }
}

#[derive(Debug, Default)]
struct ProductState {
    quotes: Vec<ProductQuote>,
    stock: HashMap<String, i32>,
    fail_on_quote: bool,
    fail_on_reserve: bool,
    quote_calls: usize,
    reservations: Vec<Vec<StockReservation>>,
}

/// Catalog and inventory backed by a fixed product list.
///
/// `reserve` is all-or-nothing: every requested product must be known and in
/// stock, otherwise nothing is decremented.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductService {
    state: Arc<RwLock<ProductState>>,
}

impl InMemoryProductService {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, ProductState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProductState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_product(self, quote: ProductQuote) -> Self {
        {
            let mut state = self.write();
            state.stock.insert(quote.product_id.clone(), quote.product_stock);
            state.quotes.push(quote);
        }
        self
    }

    /// Stock the inventory knows about but the catalog never quotes.
    pub fn with_stock(self, product_id: &str, quantity: i32) -> Self {
        self.write().stock.insert(product_id.to_string(), quantity);
        self
    }

    pub fn set_fail_on_quote(&self, fail: bool) {
        self.write().fail_on_quote = fail;
    }

    pub fn set_fail_on_reserve(&self, fail: bool) {
        self.write().fail_on_reserve = fail;
    }

    pub fn stock_of(&self, product_id: &str) -> Option<i32> {
        self.read().stock.get(product_id).copied()
    }

    pub fn quote_calls(&self) -> usize {
        self.read().quote_calls
    }

    /// Every batch passed to `reserve`, successful or not.
    pub fn reservations(&self) -> Vec<Vec<StockReservation>> {
        self.read().reservations.clone()
    }
}

#[async_trait]
impl CatalogService for InMemoryProductService {
    async fn quote(&self, product_ids: &[String]) -> Result<Vec<ProductQuote>, OrderError> {
        let mut state = self.write();
        state.quote_calls += 1;
        if state.fail_on_quote {
            return Err(OrderError::CatalogUnavailable(
                "product service unreachable".to_string(),
            ));
        }
        Ok(state
            .quotes
            .iter()
            .filter(|q| product_ids.contains(&q.product_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InventoryService for InMemoryProductService {
    async fn reserve(&self, items: &[StockReservation]) -> Result<(), OrderError> {
        let mut state = self.write();
        state.reservations.push(items.to_vec());
        if state.fail_on_reserve {
            return Err(OrderError::InventoryUnavailable(
                "product service unreachable".to_string(),
            ));
        }

        let mut remaining = state.stock.clone();
        for item in items {
            let available = remaining.get_mut(&item.product_id).ok_or_else(|| {
                OrderError::InventoryUnavailable(format!("unknown product {}", item.product_id))
            })?;
            if *available < item.quantity {
                return Err(OrderError::InventoryUnavailable(format!(
                    "insufficient stock for {}: requested {}, available {}",
                    item.product_id, item.quantity, available
                )));
            }
            *available -= item.quantity;
        }
        state.stock = remaining;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;

    use super::*;

    fn product(id: &str, stock: i32) -> ProductQuote {
        ProductQuote {
            product_id: id.to_string(),
            product_name: format!("product {id}"),
            unit_price: BigDecimal::from(3),
            product_stock: stock,
            product_description: None,
            product_icon: None,
            product_status: 0,
            category_type: 1,
        }
    }

    fn reservation(id: &str, quantity: i32) -> StockReservation {
        StockReservation {
            product_id: id.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn quote_omits_unknown_products() {
        let products = InMemoryProductService::new().with_product(product("P1", 5));

        let quotes = products
            .quote(&["P1".to_string(), "NOPE".to_string()])
            .await
            .unwrap();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].product_id, "P1");
    }

    #[tokio::test]
    async fn reserve_decrements_stock() {
        let products = InMemoryProductService::new()
            .with_product(product("P1", 5))
            .with_product(product("P2", 1));

        products
            .reserve(&[reservation("P1", 2), reservation("P2", 1)])
            .await
            .unwrap();

        assert_eq!(products.stock_of("P1"), Some(3));
        assert_eq!(products.stock_of("P2"), Some(0));
    }

    #[tokio::test]
    async fn reserve_is_all_or_nothing() {
        let products = InMemoryProductService::new()
            .with_product(product("P1", 5))
            .with_product(product("P2", 1));

        let err = products
            .reserve(&[reservation("P1", 2), reservation("P2", 4)])
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::InventoryUnavailable(_)));
        assert_eq!(products.stock_of("P1"), Some(5));
        assert_eq!(products.stock_of("P2"), Some(1));
    }

    fn header(order_id: Uuid) -> OrderHeader {
        let request = crate::domain::order::OrderRequest {
            buyer_id: "b".to_string(),
            buyer_name: "b".to_string(),
            buyer_phone: "1".to_string(),
            buyer_address: "a".to_string(),
            items: vec![],
        };
        OrderHeader::new(order_id, &request, BigDecimal::from(1))
    }

    #[tokio::test]
    async fn stale_version_does_not_update_status() {
        let store = InMemoryOrderStore::new();
        let order_id = Uuid::new_v4();
        store.put_header(&header(order_id)).await.unwrap();

        assert!(store
            .update_header_status(order_id, 0, OrderStatus::Finished)
            .await
            .unwrap());
        assert!(!store
            .update_header_status(order_id, 0, OrderStatus::Finished)
            .await
            .unwrap());

        let header = store.get_header_by_id(order_id).await.unwrap().unwrap();
        assert_eq!(header.order_status, OrderStatus::Finished);
        assert_eq!(header.version, 1);
    }

    #[tokio::test]
    async fn only_finished_is_a_supported_status_write() {
        let store = InMemoryOrderStore::new();
        let order_id = Uuid::new_v4();
        store.put_header(&header(order_id)).await.unwrap();

        let err = store
            .update_header_status(order_id, 0, OrderStatus::Canceled)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Internal(_)));
        let stored = store.get_header_by_id(order_id).await.unwrap().unwrap();
        assert_eq!(stored.order_status, OrderStatus::New);
        assert_eq!(stored.version, 0);
    }

    #[tokio::test]
    async fn duplicate_header_id_is_rejected() {
        let store = InMemoryOrderStore::new();
        let order_id = Uuid::new_v4();
        let original = header(order_id);
        store.put_header(&original).await.unwrap();

        let mut clash = header(order_id);
        clash.order_amount = BigDecimal::from(99);
        let err = store.put_header(&clash).await.unwrap_err();

        assert!(matches!(err, OrderError::Internal(_)));
        assert_eq!(store.header_count(), 1);
        let stored = store.get_header_by_id(order_id).await.unwrap().unwrap();
        assert_eq!(stored.order_amount, BigDecimal::from(1));
        assert_eq!(store.write_count(), 1);
    }
}
