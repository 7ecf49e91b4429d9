use std::sync::Arc;

use anyhow::Context;

use storefront_api::app::{build_product_app, ProductServices};
use storefront_infra::ProductServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_observability::init();

    let config = ProductServiceConfig::from_env()?;
    let services = Arc::new(ProductServices::from_config(&config).await?);
    let app = build_product_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("product service listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(storefront_api::shutdown_signal())
        .await?;
    Ok(())
}
