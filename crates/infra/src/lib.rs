//! Infrastructure for the catalog: configuration, persistence backends, the
//! catalog service, object storage clients and dashboard aggregation.

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod storage;
pub mod store;

pub use catalog::{CatalogError, CatalogResult, CatalogService};
pub use config::{AppConfig, ConfigError};
pub use dashboard::{Dashboard, DashboardStats, RecentProduct, load_dashboard};
pub use storage::{Bucket, StorageError, StorageService};
pub use store::{CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, SharedStore, StoreError};
