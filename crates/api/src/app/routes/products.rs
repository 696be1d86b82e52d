use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    routing::get,
    Json, Router,
};

use catalog_core::ProductId;
use catalog_products::{NewProduct, ProductPatch, ProductStatus};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).patch(update_product).delete(delete_product))
}

/// Filters combine: `q` narrows first, then `category`, then `status`.
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ProductQuery>,
) -> axum::response::Response {
    let status = match query.status.as_deref().map(str::parse::<ProductStatus>).transpose() {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let term = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let category = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty());

    let result = match (term, category, status) {
        (Some(term), _, _) => services.catalog.search_products(term).await,
        (None, Some(slug), _) => services.catalog.list_products_by_category(slug).await,
        (None, None, Some(status)) => services.catalog.list_products_by_status(status).await,
        (None, None, None) => services.catalog.list_products().await,
    };
    match result {
        Ok(mut products) => {
            if let Some(slug) = category {
                products.retain(|p| p.category == slug);
            }
            if let Some(status) = status {
                products.retain(|p| p.status == status);
            }
            dto::ok(products)
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// Anything other than a draft must pass the publish checks.
pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> axum::response::Response {
    let input = match dto::body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(e) = input.ensure_publishable() {
        return errors::domain_error_to_response(e);
    }
    match services.catalog.create_product(input).await {
        Ok(product) => dto::created(product),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.get_product(id).await {
        Ok(product) => dto::ok(product),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<ProductPatch>, JsonRejection>,
) -> axum::response::Response {
    let id: ProductId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch = match dto::body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.update_product(id, patch).await {
        Ok(product) => dto::ok(product),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.delete_product(id).await {
        Ok(()) => dto::deleted(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
