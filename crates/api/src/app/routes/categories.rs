use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    routing::get,
    Json, Router,
};

use catalog_categories::{CategoryPatch, CategoryStatus, NewCategory};
use catalog_core::CategoryId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/by-slug/:slug", get(get_category_by_slug))
        .route("/:id", get(get_category).patch(update_category).delete(delete_category))
        .route("/:id/subcategories", get(list_subcategories).post(create_subcategory))
        .route("/:id/subcategories/by-slug/:slug", get(get_subcategory_by_slug))
}

/// `q` is a case-insensitive search; `status` filters the result.
pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::CategoryQuery>,
) -> axum::response::Response {
    let status = match query.status.as_deref().map(str::parse::<CategoryStatus>).transpose() {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let term = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let result = match (term, status) {
        (Some(term), _) => services.catalog.search_categories(term).await,
        (None, Some(CategoryStatus::Active)) => services.catalog.list_active_categories().await,
        (None, _) => services.catalog.list_categories().await,
    };
    match result {
        Ok(mut categories) => {
            if let Some(status) = status {
                categories.retain(|c| c.status == status);
            }
            dto::ok(categories)
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> axum::response::Response {
    let input = match dto::body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.create_category(input).await {
        Ok(category) => dto::created(category),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CategoryId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.get_category(id).await {
        Ok(category) => dto::ok(category),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_category_by_slug(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
) -> axum::response::Response {
    match services.catalog.get_category_by_slug(&slug).await {
        Ok(category) => dto::ok(category),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<CategoryPatch>, JsonRejection>,
) -> axum::response::Response {
    let id: CategoryId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch = match dto::body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.update_category(id, patch).await {
        Ok(category) => dto::ok(category),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CategoryId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.delete_category(id).await {
        Ok(()) => dto::deleted(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn list_subcategories(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CategoryId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.list_subcategories(id).await {
        Ok(subcategories) => dto::ok(subcategories),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn create_subcategory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<dto::CreateSubcategoryRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: CategoryId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match dto::body(payload) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.create_subcategory(body.into_new(id)).await {
        Ok(subcategory) => dto::created(subcategory),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_subcategory_by_slug(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, slug)): Path<(String, String)>,
) -> axum::response::Response {
    let id: CategoryId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.get_subcategory_by_slug(id, &slug).await {
        Ok(subcategory) => dto::ok(subcategory),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
