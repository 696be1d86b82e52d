use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    routing::get,
    Json, Router,
};

use catalog_categories::SubcategoryPatch;
use catalog_core::SubcategoryId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/:id", get(get_subcategory).patch(update_subcategory).delete(delete_subcategory))
        .route("/:id/children", get(list_children))
}

pub async fn get_subcategory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SubcategoryId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.get_subcategory(id).await {
        Ok(subcategory) => dto::ok(subcategory),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn update_subcategory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<SubcategoryPatch>, JsonRejection>,
) -> axum::response::Response {
    let id: SubcategoryId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch = match dto::body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.update_subcategory(id, patch).await {
        Ok(subcategory) => dto::ok(subcategory),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// Children of the removed subcategory are detached, not deleted.
pub async fn delete_subcategory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SubcategoryId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.delete_subcategory(id).await {
        Ok(()) => dto::deleted(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn list_children(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SubcategoryId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.list_child_subcategories(id).await {
        Ok(children) => dto::ok(children),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
