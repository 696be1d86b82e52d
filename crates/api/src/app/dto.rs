//! Request/response DTOs and the success envelope.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use catalog_categories::{CategoryStatus, NewSubcategory};
use catalog_core::{CategoryId, SubcategoryId};
use catalog_leads::{PageInfo, PageRequest};

/// `{success: true, data}`
pub fn ok<T: Serialize>(data: T) -> axum::response::Response {
    with_status(StatusCode::OK, data)
}

pub fn created<T: Serialize>(data: T) -> axum::response::Response {
    with_status(StatusCode::CREATED, data)
}

pub fn with_status<T: Serialize>(status: StatusCode, data: T) -> axum::response::Response {
    (status, Json(json!({ "success": true, "data": data }))).into_response()
}

/// `{success: true, data, pagination}`
pub fn paginated<T: Serialize>(data: T, pagination: PageInfo) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": data, "pagination": pagination })),
    )
        .into_response()
}

pub fn deleted() -> axum::response::Response {
    ok(json!({ "deleted": true }))
}

/// Unwrap a JSON body, answering malformed input with the error envelope.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| crate::app::errors::json_error(e.status(), "invalid_body", e.body_text()))
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub q: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

/// Raw strings so that malformed numbers fall back to defaults instead of
/// failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn to_request(&self) -> PageRequest {
        let parse = |raw: &Option<String>| raw.as_deref().and_then(|v| v.trim().parse::<u32>().ok());
        PageRequest::new(parse(&self.page), parse(&self.limit))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    pub file_name: Option<String>,
    pub object_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UrlQuery {
    pub url: Option<String>,
}

/// Subcategory create body; the owning category comes from the path.
#[derive(Debug, Deserialize)]
pub struct CreateSubcategoryRequest {
    #[serde(default)]
    pub parent_subcategory_id: Option<SubcategoryId>,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<CategoryStatus>,
}

impl CreateSubcategoryRequest {
    pub fn into_new(self, category_id: CategoryId) -> NewSubcategory {
        NewSubcategory {
            category_id,
            parent_subcategory_id: self.parent_subcategory_id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            status: self.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}
