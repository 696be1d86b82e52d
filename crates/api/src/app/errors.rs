use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_core::DomainError;
use catalog_infra::{CatalogError, StorageError, StoreError};

/// Failure envelope: `{success: false, error, message}`.
pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::DuplicateSlug { .. } => json_error(StatusCode::CONFLICT, "duplicate_slug", message),
        DomainError::HasDependents { .. } => json_error(StatusCode::CONFLICT, "has_dependents", message),
        DomainError::InvariantViolation(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", message)
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    tracing::error!(error = %err, "store failure");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
}

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::Domain(e) => domain_error_to_response(e),
        CatalogError::Store(e) => store_error_to_response(e),
    }
}

pub fn storage_error_to_response(err: StorageError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        StorageError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        StorageError::InvalidUrl(_) => json_error(StatusCode::BAD_REQUEST, "invalid_url", message),
        StorageError::Rejected { status, .. } => match StatusCode::from_u16(status) {
            Ok(status) if status.is_client_error() => {
                tracing::warn!(%status, error = %message, "storage request rejected");
                json_error(status, rejection_code(status), message)
            }
            _ => {
                tracing::error!(status, error = %message, "storage failure");
                json_error(StatusCode::BAD_GATEWAY, "storage_error", message)
            }
        },
        StorageError::Transport(_) => {
            tracing::error!(error = %message, "storage failure");
            json_error(StatusCode::BAD_GATEWAY, "storage_error", message)
        }
    }
}

fn rejection_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::CONFLICT => "conflict",
        StatusCode::PAYLOAD_TOO_LARGE => "payload_too_large",
        _ => "storage_rejected",
    }
}

/// Parse a path or query identifier, answering 400 on failure.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: std::str::FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(domain_error_to_response)
}
