use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use catalog_categories::{Category, CategoryDraft, Subcategory, SubcategoryDraft};
use catalog_core::{CategoryId, LeadId, NewsletterEmailId, ProductId, SubcategoryId};
use catalog_leads::{CatalogueRequest, NewCatalogueRequest, NewsletterEmail, PageRequest};
use catalog_products::{NewProduct, Product, ProductStatus};

use super::{
    CategoryStore, LeadStore, NewsletterStore, ProductStore, StoreError, StoreResult, SubcategoryStore,
};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    categories: BTreeMap<CategoryId, Category>,
    subcategories: BTreeMap<SubcategoryId, Subcategory>,
    products: BTreeMap<ProductId, Product>,
    leads: BTreeMap<LeadId, CatalogueRequest>,
    newsletter: BTreeMap<NewsletterEmailId, NewsletterEmail>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn product_count(&self, slug: &str) -> u64 {
        self.products.values().filter(|p| p.category == slug).count() as u64
    }

    fn with_count(&self, category: &Category) -> Category {
        category.clone().with_product_count(self.product_count(&category.slug))
    }

    fn categories_by_name<F>(&self, keep: F) -> Vec<Category>
    where
        F: Fn(&Category) -> bool,
    {
        let mut out: Vec<Category> = self
            .categories
            .values()
            .filter(|c| keep(c))
            .map(|c| self.with_count(c))
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    fn subcategories_by_name<F>(&self, keep: F) -> Vec<Subcategory>
    where
        F: Fn(&Subcategory) -> bool,
    {
        let mut out: Vec<Subcategory> = self.subcategories.values().filter(|s| keep(s)).cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    fn products_newest_edit_first<F>(&self, keep: F) -> Vec<Product>
    where
        F: Fn(&Product) -> bool,
    {
        let mut out: Vec<Product> = self.products.values().filter(|p| keep(p)).cloned().collect();
        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        out
    }

    fn category_slug_taken(&self, slug: &str, except: Option<CategoryId>) -> bool {
        self.categories
            .values()
            .any(|c| c.slug == slug && Some(c.id) != except)
    }

    fn subcategory_slug_taken(&self, category_id: CategoryId, slug: &str, except: Option<SubcategoryId>) -> bool {
        self.subcategories
            .values()
            .any(|s| s.category_id == category_id && s.slug == slug && Some(s.id) != except)
    }
}

/// In-memory catalog for tests/dev.
///
/// Mirrors the Postgres constraints: unique category slugs, subcategory slugs
/// unique per category, unique newsletter emails, cascading category deletes
/// and `SET NULL` on a deleted parent subcategory.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    tables: RwLock<Tables>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, operation: &'static str) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::database(operation, "lock poisoned"))
    }

    fn write(&self, operation: &'static str) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::database(operation, "lock poisoned"))
    }
}

#[async_trait]
impl CategoryStore for InMemoryCatalogStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.read("list_categories")?.categories_by_name(|_| true))
    }

    async fn list_active_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.read("list_active_categories")?.categories_by_name(Category::is_active))
    }

    async fn search_categories(&self, term: &str) -> StoreResult<Vec<Category>> {
        Ok(self
            .read("search_categories")?
            .categories_by_name(|c| c.matches_search(term)))
    }

    async fn get_category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let tables = self.read("get_category")?;
        Ok(tables.categories.get(&id).map(|c| tables.with_count(c)))
    }

    async fn get_category_by_slug(&self, slug: &str) -> StoreResult<Option<Category>> {
        let tables = self.read("get_category_by_slug")?;
        Ok(tables
            .categories
            .values()
            .find(|c| c.slug == slug)
            .map(|c| tables.with_count(c)))
    }

    async fn count_categories(&self) -> StoreResult<u64> {
        Ok(self.read("count_categories")?.categories.len() as u64)
    }

    async fn insert_category(&self, draft: CategoryDraft, now: DateTime<Utc>) -> StoreResult<Category> {
        let mut tables = self.write("insert_category")?;
        if tables.category_slug_taken(&draft.slug, None) {
            return Err(StoreError::UniqueViolation(format!("categories.slug = {}", draft.slug)));
        }
        let category = Category {
            id: CategoryId::new(tables.next_id()),
            name: draft.name,
            slug: draft.slug,
            description: draft.description,
            status: draft.status,
            catalogue_url: draft.catalogue_url,
            product_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.categories.insert(category.id, category.clone());
        Ok(tables.with_count(&category))
    }

    async fn update_category(&self, category: &Category) -> StoreResult<Option<Category>> {
        let mut tables = self.write("update_category")?;
        if !tables.categories.contains_key(&category.id) {
            return Ok(None);
        }
        if tables.category_slug_taken(&category.slug, Some(category.id)) {
            return Err(StoreError::UniqueViolation(format!("categories.slug = {}", category.slug)));
        }
        let stored = category.clone().with_product_count(0);
        tables.categories.insert(stored.id, stored);
        Ok(Some(tables.with_count(category)))
    }

    async fn delete_category(&self, id: CategoryId) -> StoreResult<bool> {
        let mut tables = self.write("delete_category")?;
        if tables.categories.remove(&id).is_none() {
            return Ok(false);
        }
        tables.subcategories.retain(|_, s| s.category_id != id);
        Ok(true)
    }
}

#[async_trait]
impl SubcategoryStore for InMemoryCatalogStore {
    async fn list_subcategories(&self, category_id: CategoryId) -> StoreResult<Vec<Subcategory>> {
        Ok(self
            .read("list_subcategories")?
            .subcategories_by_name(|s| s.category_id == category_id))
    }

    async fn list_child_subcategories(&self, parent_id: SubcategoryId) -> StoreResult<Vec<Subcategory>> {
        Ok(self
            .read("list_child_subcategories")?
            .subcategories_by_name(|s| s.parent_subcategory_id == Some(parent_id)))
    }

    async fn get_subcategory(&self, id: SubcategoryId) -> StoreResult<Option<Subcategory>> {
        Ok(self.read("get_subcategory")?.subcategories.get(&id).cloned())
    }

    async fn get_subcategory_by_slug(
        &self,
        category_id: CategoryId,
        slug: &str,
    ) -> StoreResult<Option<Subcategory>> {
        Ok(self
            .read("get_subcategory_by_slug")?
            .subcategories
            .values()
            .find(|s| s.category_id == category_id && s.slug == slug)
            .cloned())
    }

    async fn has_children(&self, id: SubcategoryId) -> StoreResult<bool> {
        Ok(self
            .read("has_children")?
            .subcategories
            .values()
            .any(|s| s.parent_subcategory_id == Some(id)))
    }

    async fn insert_subcategory(&self, draft: SubcategoryDraft, now: DateTime<Utc>) -> StoreResult<Subcategory> {
        let mut tables = self.write("insert_subcategory")?;
        if !tables.categories.contains_key(&draft.category_id) {
            return Err(StoreError::database(
                "insert_subcategory",
                format!("category {} does not exist", draft.category_id),
            ));
        }
        if tables.subcategory_slug_taken(draft.category_id, &draft.slug, None) {
            return Err(StoreError::UniqueViolation(format!(
                "subcategories(category_id, slug) = ({}, {})",
                draft.category_id, draft.slug
            )));
        }
        let subcategory = Subcategory {
            id: SubcategoryId::new(tables.next_id()),
            category_id: draft.category_id,
            parent_subcategory_id: draft.parent_subcategory_id,
            name: draft.name,
            slug: draft.slug,
            description: draft.description,
            status: draft.status,
            created_at: now,
            updated_at: now,
        };
        tables.subcategories.insert(subcategory.id, subcategory.clone());
        Ok(subcategory)
    }

    async fn update_subcategory(&self, subcategory: &Subcategory) -> StoreResult<Option<Subcategory>> {
        let mut tables = self.write("update_subcategory")?;
        if !tables.subcategories.contains_key(&subcategory.id) {
            return Ok(None);
        }
        if tables.subcategory_slug_taken(subcategory.category_id, &subcategory.slug, Some(subcategory.id)) {
            return Err(StoreError::UniqueViolation(format!(
                "subcategories(category_id, slug) = ({}, {})",
                subcategory.category_id, subcategory.slug
            )));
        }
        tables.subcategories.insert(subcategory.id, subcategory.clone());
        Ok(Some(subcategory.clone()))
    }

    async fn delete_subcategory(&self, id: SubcategoryId) -> StoreResult<bool> {
        let mut tables = self.write("delete_subcategory")?;
        if tables.subcategories.remove(&id).is_none() {
            return Ok(false);
        }
        for child in tables.subcategories.values_mut() {
            if child.parent_subcategory_id == Some(id) {
                child.parent_subcategory_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl ProductStore for InMemoryCatalogStore {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.read("list_products")?.products_newest_edit_first(|_| true))
    }

    async fn search_products(&self, query: &str) -> StoreResult<Vec<Product>> {
        Ok(self
            .read("search_products")?
            .products_newest_edit_first(|p| p.matches_search(query)))
    }

    async fn list_products_by_category(&self, slug: &str) -> StoreResult<Vec<Product>> {
        Ok(self
            .read("list_products_by_category")?
            .products_newest_edit_first(|p| p.category == slug))
    }

    async fn list_products_by_status(&self, status: ProductStatus) -> StoreResult<Vec<Product>> {
        Ok(self
            .read("list_products_by_status")?
            .products_newest_edit_first(|p| p.status == status))
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.read("get_product")?.products.get(&id).cloned())
    }

    async fn insert_product(&self, product: NewProduct, now: DateTime<Utc>) -> StoreResult<Product> {
        let mut tables = self.write("insert_product")?;
        let status = product.status_or_default();
        let product = Product {
            id: ProductId::new(tables.next_id()),
            name: product.name,
            description: product.description,
            category: product.category,
            subcategory: product.subcategory,
            status,
            data: product.data,
            created_at: now,
            updated_at: now,
        };
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, product: &Product) -> StoreResult<Option<Product>> {
        let mut tables = self.write("update_product")?;
        match tables.products.get_mut(&product.id) {
            Some(slot) => {
                *slot = product.clone();
                Ok(Some(product.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<bool> {
        Ok(self.write("delete_product")?.products.remove(&id).is_some())
    }

    async fn count_products(&self) -> StoreResult<u64> {
        Ok(self.read("count_products")?.products.len() as u64)
    }

    async fn count_products_in_category(&self, slug: &str) -> StoreResult<u64> {
        Ok(self.read("count_products_in_category")?.product_count(slug))
    }

    async fn recent_products(&self, limit: u32) -> StoreResult<Vec<Product>> {
        let tables = self.read("recent_products")?;
        let mut out: Vec<Product> = tables.products.values().cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        out.truncate(limit as usize);
        Ok(out)
    }

    async fn count_media_files(&self) -> StoreResult<u64> {
        Ok(self
            .read("count_media_files")?
            .products
            .values()
            .map(|p| p.data.media_count() as u64)
            .sum())
    }
}

#[async_trait]
impl LeadStore for InMemoryCatalogStore {
    async fn list_leads(&self, page: PageRequest) -> StoreResult<(Vec<CatalogueRequest>, u64)> {
        let tables = self.read("list_leads")?;
        let mut all: Vec<&CatalogueRequest> = tables.leads.values().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = all.len() as u64;
        let rows = all
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok((rows, total))
    }

    async fn count_leads(&self) -> StoreResult<u64> {
        Ok(self.read("count_leads")?.leads.len() as u64)
    }

    async fn record_lead(&self, lead: NewCatalogueRequest, now: DateTime<Utc>) -> StoreResult<CatalogueRequest> {
        let mut tables = self.write("record_lead")?;
        let lead = CatalogueRequest {
            id: LeadId::new(tables.next_id()),
            name: lead.name,
            phone: lead.phone,
            email: lead.email,
            location: lead.location,
            product_id: lead.product_id,
            product_name: lead.product_name,
            created_at: now,
        };
        tables.leads.insert(lead.id, lead.clone());
        Ok(lead)
    }

    async fn delete_lead(&self, id: LeadId) -> StoreResult<bool> {
        Ok(self.write("delete_lead")?.leads.remove(&id).is_some())
    }
}

#[async_trait]
impl NewsletterStore for InMemoryCatalogStore {
    async fn list_newsletter_emails(&self) -> StoreResult<Vec<NewsletterEmail>> {
        let tables = self.read("list_newsletter_emails")?;
        let mut out: Vec<NewsletterEmail> = tables.newsletter.values().cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn subscribe(&self, email: &str, now: DateTime<Utc>) -> StoreResult<NewsletterEmail> {
        let mut tables = self.write("subscribe")?;
        if tables.newsletter.values().any(|e| e.email == email) {
            return Err(StoreError::UniqueViolation(format!("newsletter_emails.email = {email}")));
        }
        let entry = NewsletterEmail {
            id: NewsletterEmailId::new(tables.next_id()),
            email: email.to_string(),
            created_at: now,
        };
        tables.newsletter.insert(entry.id, entry.clone());
        Ok(entry)
    }
}
