use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    routing::get,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(list_newsletter_emails).post(subscribe))
}

pub async fn list_newsletter_emails(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.catalog.list_newsletter_emails().await {
        Ok(emails) => dto::ok(emails),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn subscribe(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::SubscribeRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.subscribe(&body.email).await {
        Ok(entry) => dto::created(entry),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
