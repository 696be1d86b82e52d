use std::sync::Arc;

use axum::{extract::Extension, routing::get, Router};

use crate::app::dto;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", get(dashboard))
}

/// Never fails; broken queries show up as zeroes.
pub async fn dashboard(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let dashboard = catalog_infra::load_dashboard(services.catalog.store().as_ref()).await;
    dto::ok(dashboard)
}
