use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Extension, Path, Query},
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde_json::json;

use catalog_infra::Bucket;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Bodies may run one megabyte past the upload limit; `validate_upload`
/// rejects the excess with a JSON error.
pub fn router(max_upload_mb: u64) -> Router {
    let limit = usize::try_from(max_upload_mb.saturating_add(1).saturating_mul(1024 * 1024)).unwrap_or(usize::MAX);
    Router::new()
        .route("/:bucket", post(upload).delete(delete_object))
        .layer(DefaultBodyLimit::max(limit))
}

fn bucket(raw: &str) -> Result<Bucket, axum::response::Response> {
    raw.parse::<Bucket>().map_err(errors::storage_error_to_response)
}

/// Raw request body; `file_name` supplies the extension and `object_name`
/// optionally fixes the stored path.
pub async fn upload(
    Extension(services): Extension<Arc<AppServices>>,
    Path(raw_bucket): Path<String>,
    Query(query): Query<dto::UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let bucket = match bucket(&raw_bucket) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let Some(file_name) = query.file_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "missing_file_name", "query parameter `file_name` is required");
    };
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE);

    match services
        .storage
        .upload(bucket, file_name, content_type, body.to_vec(), query.object_name.as_deref())
        .await
    {
        Ok(url) => dto::created(json!({ "url": url })),
        Err(e) => errors::storage_error_to_response(e),
    }
}

pub async fn delete_object(
    Extension(services): Extension<Arc<AppServices>>,
    Path(raw_bucket): Path<String>,
    Query(query): Query<dto::UrlQuery>,
) -> axum::response::Response {
    let bucket = match bucket(&raw_bucket) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let Some(url) = query.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "missing_url", "query parameter `url` is required");
    };
    match services.storage.delete(bucket, url).await {
        Ok(()) => dto::deleted(),
        Err(e) => errors::storage_error_to_response(e),
    }
}
