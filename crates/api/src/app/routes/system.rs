use serde_json::json;

use crate::app::dto;

pub async fn health() -> axum::response::Response {
    dto::ok(json!({ "status": "ok" }))
}
