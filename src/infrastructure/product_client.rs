//! HTTP client for the product service, which owns both the catalog and the
//! stock levels.

use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::domain::errors::OrderError;
use crate::domain::order::{ProductQuote, StockReservation};
use crate::domain::ports::{CatalogService, InventoryService};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductInfoOutput {
    product_id: String,
    product_name: String,
    product_price: BigDecimal,
    #[serde(default)]
    product_stock: i32,
    product_description: Option<String>,
    product_icon: Option<String>,
    #[serde(default)]
    product_status: i32,
    #[serde(default)]
    category_type: i32,
}

impl From<ProductInfoOutput> for ProductQuote {
    fn from(p: ProductInfoOutput) -> Self {
        Self {
            product_id: p.product_id,
            product_name: p.product_name,
            unit_price: p.product_price,
            product_stock: p.product_stock,
            product_description: p.product_description,
            product_icon: p.product_icon,
            product_status: p.product_status,
            category_type: p.category_type,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DecreaseStockInput<'a> {
    product_id: &'a str,
    product_quantity: i32,
}

#[derive(Debug, Clone)]
pub struct HttpProductClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpProductClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl CatalogService for HttpProductClient {
    async fn quote(&self, product_ids: &[String]) -> Result<Vec<ProductQuote>, OrderError> {
        let products: Vec<ProductInfoOutput> = self
            .http
            .post(self.url("/product/listForOrder"))
            .json(product_ids)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| OrderError::CatalogUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| OrderError::CatalogUnavailable(e.to_string()))?;

        Ok(products.into_iter().map(ProductQuote::from).collect())
    }
}

#[async_trait]
impl InventoryService for HttpProductClient {
    async fn reserve(&self, items: &[StockReservation]) -> Result<(), OrderError> {
        let body: Vec<DecreaseStockInput<'_>> = items
            .iter()
            .map(|i| DecreaseStockInput {
                product_id: &i.product_id,
                product_quantity: i.quantity,
            })
            .collect();

        self.http
            .post(self.url("/product/decreaseStock"))
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| OrderError::InventoryUnavailable(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use actix_web::{web, App, HttpResponse, HttpServer};
    use serde_json::{json, Value};

    use super::*;

    type Received = Arc<Mutex<Vec<Value>>>;

    /// Starts a stand-in product service on an ephemeral port and returns its
    /// base URL together with the bodies it received on `decreaseStock`.
    fn spawn_product_service(stock_ok: bool) -> (String, Received) {
        let received: Received = Arc::default();
        let sink = received.clone();
        let server = HttpServer::new(move || {
            let sink = sink.clone();
            App::new()
                .route(
                    "/product/listForOrder",
                    web::post().to(|ids: web::Json<Vec<String>>| async move {
                        let products: Vec<Value> = ids
                            .iter()
                            .filter(|id| id.as_str() != "UNKNOWN")
                            .map(|id| {
                                json!({
                                    "productId": id,
                                    "productName": format!("product {id}"),
                                    "productPrice": 10,
                                    "productStock": 99,
                                    "productDescription": null,
                                    "productIcon": "http://img/x.png",
                                    "productStatus": 0,
                                    "categoryType": 2
                                })
                            })
                            .collect();
                        HttpResponse::Ok().json(products)
                    }),
                )
                .route(
                    "/product/decreaseStock",
                    web::post().to(move |body: web::Json<Value>| {
                        let sink = sink.clone();
                        async move {
                            sink.lock().unwrap().push(body.into_inner());
                            if stock_ok {
                                HttpResponse::Ok().finish()
                            } else {
                                HttpResponse::InternalServerError().body("insufficient stock")
                            }
                        }
                    }),
                )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind failed");
        let port = server.addrs()[0].port();
        actix_web::rt::spawn(server.run());
        (format!("http://127.0.0.1:{port}/"), received)
    }

    #[actix_web::test]
    async fn quote_maps_known_products() {
        let (base, _) = spawn_product_service(true);
        let client = HttpProductClient::new(&base, Duration::from_secs(5)).unwrap();

        let quotes = client
            .quote(&["P1".to_string(), "UNKNOWN".to_string()])
            .await
            .unwrap();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].product_id, "P1");
        assert_eq!(quotes[0].unit_price, BigDecimal::from(10));
        assert_eq!(quotes[0].product_icon.as_deref(), Some("http://img/x.png"));
        assert_eq!(quotes[0].category_type, 2);
    }

    #[actix_web::test]
    async fn reserve_sends_camel_case_batch() {
        let (base, received) = spawn_product_service(true);
        let client = HttpProductClient::new(&base, Duration::from_secs(5)).unwrap();

        client
            .reserve(&[
                StockReservation {
                    product_id: "P1".to_string(),
                    quantity: 2,
                },
                StockReservation {
                    product_id: "P2".to_string(),
                    quantity: 1,
                },
            ])
            .await
            .unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(
            received[0],
            json!([
                {"productId": "P1", "productQuantity": 2},
                {"productId": "P2", "productQuantity": 1}
            ])
        );
    }

    #[actix_web::test]
    async fn reserve_error_status_is_inventory_unavailable() {
        let (base, _) = spawn_product_service(false);
        let client = HttpProductClient::new(&base, Duration::from_secs(5)).unwrap();

        let err = client
            .reserve(&[StockReservation {
                product_id: "P1".to_string(),
                quantity: 1,
            }])
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::InventoryUnavailable(_)));
    }

    #[actix_web::test]
    async fn unreachable_catalog_is_catalog_unavailable() {
        // Nothing listens on the port once the listener is dropped.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client =
            HttpProductClient::new(&format!("http://127.0.0.1:{port}"), Duration::from_secs(2))
                .unwrap();

        let err = client.quote(&["P1".to_string()]).await.unwrap_err();

        assert!(matches!(err, OrderError::CatalogUnavailable(_)));
    }
}
