use std::sync::Arc;

use anyhow::Context;

use catalog_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    catalog_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    if config.admin_token.is_none() {
        tracing::warn!("CATALOG_ADMIN_TOKEN not set; admin routes are unauthenticated");
    }

    let services = catalog_api::app::services::build_services(&config).await?;
    let app = catalog_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
