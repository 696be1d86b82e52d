//! HTTP API for the catalog admin: router, handlers and JSON mapping.

pub mod app;
pub mod middleware;
