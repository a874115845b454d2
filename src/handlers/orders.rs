use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::domain::order::{CartItem, OrderLineItem, OrderRequest, OrderResult};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartItemRequest {
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Buyer's external identifier (e.g. the openid of the shop account).
    pub buyer_id: String,
    pub buyer_name: String,
    pub buyer_phone: String,
    pub buyer_address: String,
    pub items: Vec<CartItemRequest>,
}

impl From<CreateOrderRequest> for OrderRequest {
    fn from(body: CreateOrderRequest) -> Self {
        Self {
            buyer_id: body.buyer_id,
            buyer_name: body.buyer_name,
            buyer_phone: body.buyer_phone,
            buyer_address: body.buyer_address,
            items: body
                .items
                .into_iter()
                .map(|i| CartItem {
                    product_id: i.product_id,
                    quantity: i.quantity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderLineResponse {
    pub line_id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub product_icon: Option<String>,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: String,
}

impl From<OrderLineItem> for OrderLineResponse {
    fn from(l: OrderLineItem) -> Self {
        Self {
            line_id: l.line_id,
            product_id: l.product_id,
            product_name: l.product_name,
            product_icon: l.product_icon,
            quantity: l.quantity,
            unit_price: l.unit_price.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub order_id: Uuid,
    pub buyer_id: String,
    pub buyer_name: String,
    pub buyer_phone: String,
    pub buyer_address: String,
    pub order_amount: String,
    pub order_status: String,
    pub pay_status: String,
    pub created_at: String,
    pub updated_at: String,
    pub lines: Vec<OrderLineResponse>,
}

impl From<OrderResult> for OrderResponse {
    fn from(o: OrderResult) -> Self {
        Self {
            order_id: o.order_id,
            buyer_id: o.buyer_id,
            buyer_name: o.buyer_name,
            buyer_phone: o.buyer_phone,
            buyer_address: o.buyer_address,
            order_amount: o.order_amount.to_string(),
            order_status: o.order_status.to_string(),
            pay_status: o.pay_status.to_string(),
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
            lines: o.line_items.into_iter().map(OrderLineResponse::from).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Prices the cart against the product service, reserves stock and records
/// the order. Products the catalog does not know are left out of the order.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 503, description = "Product service could not price or reserve the order"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<OrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let result = service.create(body.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(result)))
}

/// POST /orders/{id}/finish
///
/// Moves a NEW order to FINISHED.
#[utoipa::path(
    post,
    path = "/orders/{id}/finish",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order finished", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not NEW or was modified concurrently"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn finish_order(
    service: web::Data<OrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let result = service.finish(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(result)))
}

/// GET /orders/{id}
///
/// Returns the order together with its line items.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<OrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let result = service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(result)))
}
