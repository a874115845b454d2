use std::io;
use std::sync::Arc;

use dotenvy::dotenv;
use order_service::domain::ports::UuidV7Generator;
use order_service::infrastructure::order_store::DieselOrderStore;
use order_service::infrastructure::product_client::HttpProductClient;
use order_service::{build_server, create_pool, run_migrations, Config, OrderService};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(io::Error::other)?;

    let pool = create_pool(&config.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let products = Arc::new(
        HttpProductClient::new(&config.product_service_url, config.product_service_timeout)
            .map_err(io::Error::other)?,
    );
    let service = OrderService::new(
        Arc::new(DieselOrderStore::new(pool)),
        products.clone(),
        products,
        Arc::new(UuidV7Generator),
    );

    log::info!(
        "Starting server at http://{}:{} (product service {})",
        config.host,
        config.port,
        config.product_service_url
    );

    build_server(service, &config.host, config.port)?.await
}
