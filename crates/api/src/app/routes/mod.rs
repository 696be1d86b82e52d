use axum::Router;

pub mod categories;
pub mod dashboard;
pub mod leads;
pub mod newsletter;
pub mod products;
pub mod storage;
pub mod subcategories;
pub mod system;

/// Router for every admin endpoint (everything except `/health`).
pub fn router(max_upload_mb: u64) -> Router {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/subcategories", subcategories::router())
        .nest("/products", products::router())
        .nest("/leads", leads::router())
        .nest("/newsletter-emails", newsletter::router())
        .nest("/dashboard", dashboard::router())
        .nest("/storage", storage::router(max_upload_mb))
}
