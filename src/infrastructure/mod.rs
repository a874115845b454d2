pub mod memory;
pub mod models;
pub mod order_store;
pub mod product_client;
