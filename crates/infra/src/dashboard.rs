//! Landing-page aggregates for the admin dashboard.

use chrono::{DateTime, Utc};
use serde::Serialize;

use catalog_core::ProductId;
use catalog_products::{Product, ProductStatus};

use crate::store::{CatalogStore, StoreResult};

pub const RECENT_PRODUCTS: u32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_products: u64,
    pub total_categories: u64,
    pub total_leads: u64,
    pub total_media_files: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentProduct {
    pub id: ProductId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub status: ProductStatus,
}

impl From<Product> for RecentProduct {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            created_at: product.created_at,
            status: product.status,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_products: Vec<RecentProduct>,
}

/// Run every dashboard query concurrently. A failed query is logged and
/// reported as zero (or an empty list); the dashboard itself never fails.
#[tracing::instrument(skip(store))]
pub async fn load_dashboard(store: &dyn CatalogStore) -> Dashboard {
    let (products, categories, leads, media, recent) = tokio::join!(
        store.count_products(),
        store.count_categories(),
        store.count_leads(),
        store.count_media_files(),
        store.recent_products(RECENT_PRODUCTS),
    );

    Dashboard {
        stats: DashboardStats {
            total_products: or_default("total_products", products),
            total_categories: or_default("total_categories", categories),
            total_leads: or_default("total_leads", leads),
            total_media_files: or_default("total_media_files", media),
        },
        recent_products: or_default("recent_products", recent)
            .into_iter()
            .map(RecentProduct::from)
            .collect(),
    }
}

fn or_default<T: Default>(query: &'static str, result: StoreResult<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(query, error = %e, "dashboard query failed");
        T::default()
    })
}
