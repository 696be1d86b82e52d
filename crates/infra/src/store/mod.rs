//! Persistence seams for the catalog.
//!
//! One async trait per table family. Backends implement all of them and are
//! handed around as `Arc<dyn CatalogStore>`. Stores do no validation: slug
//! normalisation, duplicate checks and hierarchy rules live in
//! [`crate::catalog::CatalogService`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use catalog_categories::{Category, CategoryDraft, Subcategory, SubcategoryDraft};
use catalog_core::{CategoryId, LeadId, ProductId, SubcategoryId};
use catalog_leads::{CatalogueRequest, NewCatalogueRequest, NewsletterEmail, PageRequest};
use catalog_products::{NewProduct, Product, ProductStatus};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (slug or email already taken).
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },
    #[error("failed to decode row: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn database(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Database {
            operation,
            message: message.into(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation(_))
    }
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// All categories ordered by name, each carrying its product count.
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn list_active_categories(&self) -> StoreResult<Vec<Category>>;
    /// Case-insensitive substring match on name or description.
    async fn search_categories(&self, term: &str) -> StoreResult<Vec<Category>>;
    async fn get_category(&self, id: CategoryId) -> StoreResult<Option<Category>>;
    async fn get_category_by_slug(&self, slug: &str) -> StoreResult<Option<Category>>;
    async fn count_categories(&self) -> StoreResult<u64>;
    async fn insert_category(&self, draft: CategoryDraft, now: DateTime<Utc>) -> StoreResult<Category>;
    /// Persist every mutable column. Returns `None` when the row is gone.
    async fn update_category(&self, category: &Category) -> StoreResult<Option<Category>>;
    /// Remove the category and its subcategories. Returns whether a row existed.
    async fn delete_category(&self, id: CategoryId) -> StoreResult<bool>;
}

#[async_trait]
pub trait SubcategoryStore: Send + Sync {
    /// Every subcategory of the category (any depth), ordered by name.
    async fn list_subcategories(&self, category_id: CategoryId) -> StoreResult<Vec<Subcategory>>;
    async fn list_child_subcategories(&self, parent_id: SubcategoryId) -> StoreResult<Vec<Subcategory>>;
    async fn get_subcategory(&self, id: SubcategoryId) -> StoreResult<Option<Subcategory>>;
    async fn get_subcategory_by_slug(
        &self,
        category_id: CategoryId,
        slug: &str,
    ) -> StoreResult<Option<Subcategory>>;
    async fn has_children(&self, id: SubcategoryId) -> StoreResult<bool>;
    async fn insert_subcategory(&self, draft: SubcategoryDraft, now: DateTime<Utc>) -> StoreResult<Subcategory>;
    async fn update_subcategory(&self, subcategory: &Subcategory) -> StoreResult<Option<Subcategory>>;
    /// Remove the subcategory; its children become top-level.
    async fn delete_subcategory(&self, id: SubcategoryId) -> StoreResult<bool>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Newest edits first.
    async fn list_products(&self) -> StoreResult<Vec<Product>>;
    async fn search_products(&self, query: &str) -> StoreResult<Vec<Product>>;
    async fn list_products_by_category(&self, slug: &str) -> StoreResult<Vec<Product>>;
    async fn list_products_by_status(&self, status: ProductStatus) -> StoreResult<Vec<Product>>;
    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>>;
    async fn insert_product(&self, product: NewProduct, now: DateTime<Utc>) -> StoreResult<Product>;
    async fn update_product(&self, product: &Product) -> StoreResult<Option<Product>>;
    async fn delete_product(&self, id: ProductId) -> StoreResult<bool>;
    async fn count_products(&self) -> StoreResult<u64>;
    async fn count_products_in_category(&self, slug: &str) -> StoreResult<u64>;
    /// Most recently created products, newest first.
    async fn recent_products(&self, limit: u32) -> StoreResult<Vec<Product>>;
    /// Number of object URLs stored across every product's attachment bundle.
    async fn count_media_files(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// One page of leads, newest first, plus the total row count.
    async fn list_leads(&self, page: PageRequest) -> StoreResult<(Vec<CatalogueRequest>, u64)>;
    async fn count_leads(&self) -> StoreResult<u64>;
    async fn record_lead(&self, lead: NewCatalogueRequest, now: DateTime<Utc>) -> StoreResult<CatalogueRequest>;
    async fn delete_lead(&self, id: LeadId) -> StoreResult<bool>;
}

#[async_trait]
pub trait NewsletterStore: Send + Sync {
    async fn list_newsletter_emails(&self) -> StoreResult<Vec<NewsletterEmail>>;
    /// Add a subscriber; an already-subscribed address is a unique violation.
    async fn subscribe(&self, email: &str, now: DateTime<Utc>) -> StoreResult<NewsletterEmail>;
}

/// Every table the admin touches, behind one object-safe handle.
pub trait CatalogStore: CategoryStore + SubcategoryStore + ProductStore + LeadStore + NewsletterStore {}

impl<T> CatalogStore for T where T: CategoryStore + SubcategoryStore + ProductStore + LeadStore + NewsletterStore {}

pub type SharedStore = Arc<dyn CatalogStore>;
