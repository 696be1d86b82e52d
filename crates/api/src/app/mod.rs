//! Axum router and service wiring.
//!
//! - `services.rs`: backend selection and the shared service bundle
//! - `routes/`: one file per resource
//! - `dto.rs`: query/body DTOs and the success envelope
//! - `errors.rs`: the failure envelope and error-to-status mapping

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (used by `main.rs` and the black-box tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth = middleware::AdminAuth {
        token: services.admin_token.clone(),
    };

    // Everything but /health sits behind the admin token.
    let protected = routes::router(services.storage.max_upload_mb())
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(auth, middleware::admin_auth_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::request_log_middleware)))
}
