//! Pizza-order backend server: loads datasource configuration, builds the
//! persistence connector and the customer-service proxy, mounts routes, serves.

use pizza_order_api::{
    common_routes, connect, datasource_by_name, entity_routes, load_datasources, AppState, Model,
    Order, RestCustomerService, Topping,
};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("pizza_order_api=info,pizza_order_server=info")
            }),
        )
        .init();

    let config_dir =
        std::env::var("DATASOURCES_PATH").unwrap_or_else(|_| "server/datasources".into());
    let datasources = load_datasources(&config_dir).await?;

    let db = datasource_by_name(&datasources, "db")?;
    let connector = connect(db, &[Topping::COLLECTION, Order::COLLECTION]).await?;

    let customer_ds = datasource_by_name(&datasources, "customer")?;
    let customers = Arc::new(RestCustomerService::from_config(customer_ds)?);

    let state = AppState::new(connector, customers);
    let app = Router::new()
        .merge(common_routes(state.clone()))
        .merge(entity_routes(state));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
