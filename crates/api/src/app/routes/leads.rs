use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use catalog_core::LeadId;
use catalog_leads::NewCatalogueRequest;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(list_leads).post(record_lead).delete(delete_lead))
}

pub async fn list_leads(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::PageQuery>,
) -> axum::response::Response {
    match services.catalog.list_leads(query.to_request()).await {
        Ok((leads, pagination)) => dto::paginated(leads, pagination),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn record_lead(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<NewCatalogueRequest>, JsonRejection>,
) -> axum::response::Response {
    let input = match dto::body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.record_lead(input).await {
        Ok(lead) => dto::created(lead),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_lead(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::IdQuery>,
) -> axum::response::Response {
    let Some(raw) = query.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "missing_id", "query parameter `id` is required");
    };
    let id: LeadId = match errors::parse_id(raw) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.delete_lead(id).await {
        Ok(()) => dto::deleted(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
