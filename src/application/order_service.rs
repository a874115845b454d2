use std::collections::BTreeSet;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use log::{error, info, warn};
use uuid::Uuid;

use crate::domain::errors::OrderError;
use crate::domain::order::{
    OrderHeader, OrderLineItem, OrderRequest, OrderResult, OrderStatus, ProductQuote,
    StockReservation,
};
use crate::domain::ports::{CatalogService, IdGenerator, InventoryService, OrderStore};

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    catalog: Arc<dyn CatalogService>,
    inventory: Arc<dyn InventoryService>,
    ids: Arc<dyn IdGenerator>,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogService>,
        inventory: Arc<dyn InventoryService>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            store,
            catalog,
            inventory,
            ids,
        }
    }

    /// Prices the request against the catalog, reserves stock and records the
    /// order.
    ///
    /// Line items are written one by one as they are priced; the header is
    /// written last and only after the reservation succeeded. If anything
    /// fails once line items exist, they are deleted again before the error
    /// is returned.
    pub async fn create(&self, request: OrderRequest) -> Result<OrderResult, OrderError> {
        let order_id = self.ids.new_id();
        let quotes = self.lookup_quotes(&request).await?;

        let mut written = Vec::new();
        match self.place(order_id, &request, &quotes, &mut written).await {
            Ok(header) => {
                info!(
                    "Created order {} for buyer {} ({} lines, amount {})",
                    order_id,
                    header.buyer_id,
                    written.len(),
                    header.order_amount
                );
                Ok(OrderResult::compose(header, written))
            }
            Err(e) => {
                self.compensate(order_id, &written, &e).await;
                Err(e)
            }
        }
    }

    async fn lookup_quotes(&self, request: &OrderRequest) -> Result<Vec<ProductQuote>, OrderError> {
        let product_ids: Vec<String> = request
            .items
            .iter()
            .map(|i| i.product_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let quotes = self.catalog.quote(&product_ids).await?;
        if quotes.is_empty() {
            return Err(OrderError::CatalogUnavailable(format!(
                "no quotes returned for products {:?}",
                product_ids
            )));
        }
        Ok(quotes)
    }

    async fn place(
        &self,
        order_id: Uuid,
        request: &OrderRequest,
        quotes: &[ProductQuote],
        written: &mut Vec<OrderLineItem>,
    ) -> Result<OrderHeader, OrderError> {
        let mut order_amount = BigDecimal::from(0);
        for item in &request.items {
            let Some(quote) = quotes.iter().find(|q| q.product_id == item.product_id) else {
                // Kept for compatibility with existing clients; the item is
                // neither priced nor recorded but is still reserved below.
                warn!(
                    "Order {}: no quote for product {}, dropping line",
                    order_id, item.product_id
                );
                continue;
            };

            let line = OrderLineItem::from_quote(quote, item.quantity, order_id, self.ids.new_id());
            order_amount += line.line_total();
            self.store.put_line_item(&line).await?;
            written.push(line);
        }

        let reservations: Vec<StockReservation> =
            request.items.iter().map(StockReservation::from).collect();
        self.inventory.reserve(&reservations).await?;

        let header = OrderHeader::new(order_id, request, order_amount);
        if let Err(e) = self.store.put_header(&header).await {
            error!(
                "Order {}: stock was reserved but the header write failed: {}",
                order_id, e
            );
            return Err(e);
        }
        Ok(header)
    }

    async fn compensate(&self, order_id: Uuid, written: &[OrderLineItem], cause: &OrderError) {
        if written.is_empty() {
            return;
        }
        match self.store.delete_line_items_by_order_id(order_id).await {
            Ok(removed) => warn!(
                "Order {} failed ({}), removed {} line items",
                order_id, cause, removed
            ),
            Err(e) => error!(
                "Order {} failed ({}) and its {} line items could not be removed: {}",
                order_id,
                cause,
                written.len(),
                e
            ),
        }
    }

    /// Moves a NEW order to FINISHED.
    ///
    /// The status write is conditional on the version read, so of two racing
    /// calls only one wins. A missing line item set is reported after the
    /// status has already been written; that write is not undone.
    pub async fn finish(&self, order_id: Uuid) -> Result<OrderResult, OrderError> {
        let mut header = self
            .store
            .get_header_by_id(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        if header.order_status != OrderStatus::New {
            return Err(OrderError::InvalidOrderState {
                order_id,
                status: header.order_status,
            });
        }

        let updated = self
            .store
            .update_header_status(order_id, header.version, OrderStatus::Finished)
            .await?;
        if !updated {
            return Err(OrderError::ConcurrentModification(order_id));
        }
        header.order_status = OrderStatus::Finished;
        header.version += 1;

        let lines = self.store.list_line_items_by_order_id(order_id).await?;
        if lines.is_empty() {
            warn!("Order {} finished but has no line items", order_id);
            return Err(OrderError::OrderDetailMissing(order_id));
        }

        info!("Finished order {}", order_id);
        Ok(OrderResult::compose(header, lines))
    }

    pub async fn get(&self, order_id: Uuid) -> Result<OrderResult, OrderError> {
        let header = self
            .store
            .get_header_by_id(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        let lines = self.store.list_line_items_by_order_id(order_id).await?;
        Ok(OrderResult::compose(header, lines))
    }
}
