//! Postgres-backed catalog store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `UniqueViolation` |
//! | Database (other) | any other | `Database` |
//! | ColumnDecode / Decode | N/A | `Decode` |
//! | Other | N/A | `Database` |
//!
//! Slug uniqueness is enforced twice: once by the service before writing and
//! once by the unique indexes below, which catch the race between the two.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use catalog_categories::{Category, CategoryDraft, CategoryStatus, Subcategory, SubcategoryDraft};
use catalog_core::{CategoryId, LeadId, NewsletterEmailId, ProductId, SubcategoryId};
use catalog_leads::{CatalogueRequest, NewCatalogueRequest, NewsletterEmail, PageRequest};
use catalog_products::{NewProduct, Product, ProductData, ProductStatus};

use super::{
    CategoryStore, LeadStore, NewsletterStore, ProductStore, StoreError, StoreResult, SubcategoryStore,
};

/// Tables and indexes, safe to run on every start.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id            BIGSERIAL PRIMARY KEY,
    name          TEXT NOT NULL,
    slug          TEXT NOT NULL UNIQUE,
    description   TEXT,
    status        TEXT NOT NULL DEFAULT 'Active',
    catalogue_url TEXT,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS subcategories (
    id                    BIGSERIAL PRIMARY KEY,
    category_id           BIGINT NOT NULL REFERENCES categories (id) ON DELETE CASCADE,
    parent_subcategory_id BIGINT REFERENCES subcategories (id) ON DELETE SET NULL,
    name                  TEXT NOT NULL,
    slug                  TEXT NOT NULL,
    description           TEXT,
    status                TEXT NOT NULL DEFAULT 'Active',
    created_at            TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at            TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (category_id, slug)
);

CREATE INDEX IF NOT EXISTS subcategories_parent_idx ON subcategories (parent_subcategory_id);

CREATE TABLE IF NOT EXISTS products (
    id          BIGSERIAL PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT,
    category    TEXT NOT NULL,
    subcategory TEXT,
    status      TEXT NOT NULL DEFAULT 'Draft',
    data        JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS products_category_idx ON products (category);

CREATE TABLE IF NOT EXISTS catalogue_requests (
    id           BIGSERIAL PRIMARY KEY,
    name         TEXT NOT NULL,
    phone        TEXT NOT NULL DEFAULT '',
    email        TEXT NOT NULL,
    location     TEXT NOT NULL DEFAULT '',
    product_id   BIGINT,
    product_name TEXT,
    created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS newsletter_emails (
    id         BIGSERIAL PRIMARY KEY,
    email      TEXT NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

const CATEGORY_COLUMNS: &str = r#"
    c.id, c.name, c.slug, c.description, c.status, c.catalogue_url, c.created_at, c.updated_at,
    (SELECT COUNT(*) FROM products p WHERE p.category = c.slug) AS product_count
"#;

const SUBCATEGORY_COLUMNS: &str =
    "id, category_id, parent_subcategory_id, name, slug, description, status, created_at, updated_at";

const PRODUCT_COLUMNS: &str = "id, name, description, category, subcategory, status, data, created_at, updated_at";

const LEAD_COLUMNS: &str = "id, name, phone, email, location, product_id, product_name, created_at";

/// Bundle keys that hold arrays of stored objects.
const MEDIA_KEYS: [&str; 8] = [
    "images",
    "models",
    "charts",
    "schematics",
    "dimensions",
    "videos",
    "documents",
    "catalogues",
];

/// Postgres-backed catalog.
///
/// Uses the SQLx connection pool, which is `Send + Sync`; clones share it.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url` and apply [`SCHEMA`].
    #[instrument(skip(database_url), err)]
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        tracing::info!("catalog schema applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_categories(
        &self,
        operation: &'static str,
        filter: &str,
        bind: Option<String>,
    ) -> StoreResult<Vec<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories c {filter} ORDER BY c.name ASC");
        let mut query = sqlx::query(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        decode_rows::<CategoryRow, _>(&rows)
    }

    async fn fetch_products(
        &self,
        operation: &'static str,
        filter: &str,
        bind: Option<String>,
    ) -> StoreResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products {filter} ORDER BY updated_at DESC, id DESC");
        let mut query = sqlx::query(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        decode_rows::<ProductRow, _>(&rows)
    }

    async fn fetch_subcategories(
        &self,
        operation: &'static str,
        filter: &str,
        id: i64,
    ) -> StoreResult<Vec<Subcategory>> {
        let sql = format!("SELECT {SUBCATEGORY_COLUMNS} FROM subcategories {filter} ORDER BY name ASC");
        let rows = sqlx::query(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        decode_rows::<SubcategoryRow, _>(&rows)
    }

    async fn count(&self, operation: &'static str, sql: &str) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl CategoryStore for PostgresCatalogStore {
    #[instrument(skip(self), err)]
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        self.fetch_categories("list_categories", "", None).await
    }

    #[instrument(skip(self), err)]
    async fn list_active_categories(&self) -> StoreResult<Vec<Category>> {
        self.fetch_categories(
            "list_active_categories",
            "WHERE c.status = $1",
            Some(CategoryStatus::Active.as_str().to_string()),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn search_categories(&self, term: &str) -> StoreResult<Vec<Category>> {
        self.fetch_categories(
            "search_categories",
            r"WHERE c.name ILIKE $1 ESCAPE '\' OR c.description ILIKE $1 ESCAPE '\'",
            Some(like_pattern(term)),
        )
        .await
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn get_category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_category", e))?;
        decode_optional::<CategoryRow, _>(row)
    }

    #[instrument(skip(self), err)]
    async fn get_category_by_slug(&self, slug: &str) -> StoreResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.slug = $1");
        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_category_by_slug", e))?;
        decode_optional::<CategoryRow, _>(row)
    }

    async fn count_categories(&self) -> StoreResult<u64> {
        self.count("count_categories", "SELECT COUNT(*) FROM categories").await
    }

    #[instrument(skip(self, draft), fields(slug = %draft.slug), err)]
    async fn insert_category(&self, draft: CategoryDraft, now: DateTime<Utc>) -> StoreResult<Category> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO categories (name, slug, description, status, catalogue_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(draft.status.as_str())
        .bind(&draft.catalogue_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_category", e))?;

        self.get_category(CategoryId::new(id))
            .await?
            .ok_or_else(|| StoreError::database("insert_category", "inserted row vanished"))
    }

    #[instrument(skip(self, category), fields(category_id = %category.id), err)]
    async fn update_category(&self, category: &Category) -> StoreResult<Option<Category>> {
        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = $2, slug = $3, description = $4, status = $5, catalogue_url = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(category.id.get())
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.status.as_str())
        .bind(&category.catalogue_url)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_category", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_category(category.id).await
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn delete_category(&self, id: CategoryId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_category", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SubcategoryStore for PostgresCatalogStore {
    #[instrument(skip(self), fields(category_id = %category_id), err)]
    async fn list_subcategories(&self, category_id: CategoryId) -> StoreResult<Vec<Subcategory>> {
        self.fetch_subcategories("list_subcategories", "WHERE category_id = $1", category_id.get())
            .await
    }

    #[instrument(skip(self), fields(parent_id = %parent_id), err)]
    async fn list_child_subcategories(&self, parent_id: SubcategoryId) -> StoreResult<Vec<Subcategory>> {
        self.fetch_subcategories(
            "list_child_subcategories",
            "WHERE parent_subcategory_id = $1",
            parent_id.get(),
        )
        .await
    }

    #[instrument(skip(self), fields(subcategory_id = %id), err)]
    async fn get_subcategory(&self, id: SubcategoryId) -> StoreResult<Option<Subcategory>> {
        let sql = format!("SELECT {SUBCATEGORY_COLUMNS} FROM subcategories WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_subcategory", e))?;
        decode_optional::<SubcategoryRow, _>(row)
    }

    #[instrument(skip(self), fields(category_id = %category_id), err)]
    async fn get_subcategory_by_slug(
        &self,
        category_id: CategoryId,
        slug: &str,
    ) -> StoreResult<Option<Subcategory>> {
        let sql = format!("SELECT {SUBCATEGORY_COLUMNS} FROM subcategories WHERE category_id = $1 AND slug = $2");
        let row = sqlx::query(&sql)
            .bind(category_id.get())
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_subcategory_by_slug", e))?;
        decode_optional::<SubcategoryRow, _>(row)
    }

    async fn has_children(&self, id: SubcategoryId) -> StoreResult<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM subcategories WHERE parent_subcategory_id = $1)")
            .bind(id.get())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("has_children", e))
    }

    #[instrument(skip(self, draft), fields(category_id = %draft.category_id, slug = %draft.slug), err)]
    async fn insert_subcategory(&self, draft: SubcategoryDraft, now: DateTime<Utc>) -> StoreResult<Subcategory> {
        let sql = format!(
            r#"
            INSERT INTO subcategories
                (category_id, parent_subcategory_id, name, slug, description, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {SUBCATEGORY_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(draft.category_id.get())
            .bind(draft.parent_subcategory_id.map(|p| p.get()))
            .bind(&draft.name)
            .bind(&draft.slug)
            .bind(&draft.description)
            .bind(draft.status.as_str())
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_subcategory", e))?;
        decode_row::<SubcategoryRow, _>(&row)
    }

    #[instrument(skip(self, subcategory), fields(subcategory_id = %subcategory.id), err)]
    async fn update_subcategory(&self, subcategory: &Subcategory) -> StoreResult<Option<Subcategory>> {
        let sql = format!(
            r#"
            UPDATE subcategories
            SET parent_subcategory_id = $2, name = $3, slug = $4, description = $5, status = $6, updated_at = $7
            WHERE id = $1
            RETURNING {SUBCATEGORY_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(subcategory.id.get())
            .bind(subcategory.parent_subcategory_id.map(|p| p.get()))
            .bind(&subcategory.name)
            .bind(&subcategory.slug)
            .bind(&subcategory.description)
            .bind(subcategory.status.as_str())
            .bind(subcategory.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_subcategory", e))?;
        decode_optional::<SubcategoryRow, _>(row)
    }

    #[instrument(skip(self), fields(subcategory_id = %id), err)]
    async fn delete_subcategory(&self, id: SubcategoryId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM subcategories WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_subcategory", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProductStore for PostgresCatalogStore {
    #[instrument(skip(self), err)]
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        self.fetch_products("list_products", "", None).await
    }

    #[instrument(skip(self), err)]
    async fn search_products(&self, query: &str) -> StoreResult<Vec<Product>> {
        self.fetch_products(
            "search_products",
            r"WHERE name ILIKE $1 ESCAPE '\' OR description ILIKE $1 ESCAPE '\' OR category ILIKE $1 ESCAPE '\'",
            Some(like_pattern(query)),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn list_products_by_category(&self, slug: &str) -> StoreResult<Vec<Product>> {
        self.fetch_products("list_products_by_category", "WHERE category = $1", Some(slug.to_string()))
            .await
    }

    #[instrument(skip(self), err)]
    async fn list_products_by_status(&self, status: ProductStatus) -> StoreResult<Vec<Product>> {
        self.fetch_products(
            "list_products_by_status",
            "WHERE status = $1",
            Some(status.as_str().to_string()),
        )
        .await
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;
        decode_optional::<ProductRow, _>(row)
    }

    #[instrument(skip(self, product), fields(category = %product.category), err)]
    async fn insert_product(&self, product: NewProduct, now: DateTime<Utc>) -> StoreResult<Product> {
        let status = product.status_or_default();
        let sql = format!(
            r#"
            INSERT INTO products (name, description, category, subcategory, status, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(&product.name)
            .bind(&product.description)
            .bind(&product.category)
            .bind(&product.subcategory)
            .bind(status.as_str())
            .bind(Json(&product.data))
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_product", e))?;
        decode_row::<ProductRow, _>(&row)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn update_product(&self, product: &Product) -> StoreResult<Option<Product>> {
        let sql = format!(
            r#"
            UPDATE products
            SET name = $2, description = $3, category = $4, subcategory = $5, status = $6, data = $7, updated_at = $8
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(product.id.get())
            .bind(&product.name)
            .bind(&product.description)
            .bind(&product.category)
            .bind(&product.subcategory)
            .bind(product.status.as_str())
            .bind(Json(&product.data))
            .bind(product.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_product", e))?;
        decode_optional::<ProductRow, _>(row)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete_product(&self, id: ProductId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_products(&self) -> StoreResult<u64> {
        self.count("count_products", "SELECT COUNT(*) FROM products").await
    }

    #[instrument(skip(self), err)]
    async fn count_products_in_category(&self, slug: &str) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category = $1")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_products_in_category", e))?;
        Ok(count.max(0) as u64)
    }

    #[instrument(skip(self), err)]
    async fn recent_products(&self, limit: u32) -> StoreResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC LIMIT $1");
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("recent_products", e))?;
        decode_rows::<ProductRow, _>(&rows)
    }

    #[instrument(skip(self), err)]
    async fn count_media_files(&self) -> StoreResult<u64> {
        self.count("count_media_files", &media_count_sql()).await
    }
}

#[async_trait]
impl LeadStore for PostgresCatalogStore {
    #[instrument(skip(self), fields(page = page.page, limit = page.limit), err)]
    async fn list_leads(&self, page: PageRequest) -> StoreResult<(Vec<CatalogueRequest>, u64)> {
        let total = self.count_leads().await?;
        let sql = format!(
            "SELECT {LEAD_COLUMNS} FROM catalogue_requests ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(page.limit))
            .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_leads", e))?;
        Ok((decode_rows::<LeadRow, _>(&rows)?, total))
    }

    async fn count_leads(&self) -> StoreResult<u64> {
        self.count("count_leads", "SELECT COUNT(*) FROM catalogue_requests").await
    }

    #[instrument(skip(self, lead), err)]
    async fn record_lead(&self, lead: NewCatalogueRequest, now: DateTime<Utc>) -> StoreResult<CatalogueRequest> {
        let sql = format!(
            r#"
            INSERT INTO catalogue_requests (name, phone, email, location, product_id, product_name, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {LEAD_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(&lead.name)
            .bind(&lead.phone)
            .bind(&lead.email)
            .bind(&lead.location)
            .bind(lead.product_id.map(|p| p.get()))
            .bind(&lead.product_name)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("record_lead", e))?;
        decode_row::<LeadRow, _>(&row)
    }

    #[instrument(skip(self), fields(lead_id = %id), err)]
    async fn delete_lead(&self, id: LeadId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM catalogue_requests WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_lead", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl NewsletterStore for PostgresCatalogStore {
    #[instrument(skip(self), err)]
    async fn list_newsletter_emails(&self) -> StoreResult<Vec<NewsletterEmail>> {
        let rows = sqlx::query("SELECT id, email, created_at FROM newsletter_emails ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_newsletter_emails", e))?;
        decode_rows::<NewsletterRow, _>(&rows)
    }

    #[instrument(skip(self, email), err)]
    async fn subscribe(&self, email: &str, now: DateTime<Utc>) -> StoreResult<NewsletterEmail> {
        let row = sqlx::query(
            "INSERT INTO newsletter_emails (email, created_at) VALUES ($1, $2) RETURNING id, email, created_at",
        )
        .bind(email)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("subscribe", e))?;
        decode_row::<NewsletterRow, _>(&row)
    }
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message().to_string();
            match db_err.code().as_deref() {
                Some("23505") => StoreError::UniqueViolation(message),
                _ => StoreError::database(operation, message),
            }
        }
        e @ (sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_)) => StoreError::Decode(e.to_string()),
        sqlx::Error::PoolClosed => StoreError::database(operation, "connection pool closed"),
        other => StoreError::database(operation, other.to_string()),
    }
}

/// `%term%` with LIKE metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.trim().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn media_count_sql() -> String {
    let terms = MEDIA_KEYS
        .iter()
        .map(|key| {
            format!(
                "CASE WHEN jsonb_typeof(data->'{key}') = 'array' THEN jsonb_array_length(data->'{key}') ELSE 0 END"
            )
        })
        .collect::<Vec<_>>()
        .join(" + ");
    format!("SELECT COALESCE(SUM({terms}), 0)::BIGINT FROM products")
}

fn decode_row<R, T>(row: &PgRow) -> StoreResult<T>
where
    R: for<'r> FromRow<'r, PgRow> + TryInto<T, Error = StoreError>,
{
    R::from_row(row)
        .map_err(|e| StoreError::Decode(e.to_string()))?
        .try_into()
}

fn decode_rows<R, T>(rows: &[PgRow]) -> StoreResult<Vec<T>>
where
    R: for<'r> FromRow<'r, PgRow> + TryInto<T, Error = StoreError>,
{
    rows.iter().map(decode_row::<R, T>).collect()
}

fn decode_optional<R, T>(row: Option<PgRow>) -> StoreResult<Option<T>>
where
    R: for<'r> FromRow<'r, PgRow> + TryInto<T, Error = StoreError>,
{
    row.as_ref().map(decode_row::<R, T>).transpose()
}

fn parse_status<S: core::str::FromStr>(raw: &str) -> StoreResult<S> {
    raw.parse()
        .map_err(|_| StoreError::Decode(format!("unknown status \"{raw}\"")))
}

// SQLx row types

#[derive(Debug)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    status: String,
    catalogue_url: Option<String>,
    product_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for CategoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CategoryRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            catalogue_url: row.try_get("catalogue_url")?,
            product_count: row.try_get("product_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<CategoryRow> for Category {
    type Error = StoreError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Category {
            id: CategoryId::new(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            status: parse_status(&row.status)?,
            catalogue_url: row.catalogue_url,
            product_count: row.product_count.max(0) as u64,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug)]
struct SubcategoryRow {
    id: i64,
    category_id: i64,
    parent_subcategory_id: Option<i64>,
    name: String,
    slug: String,
    description: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for SubcategoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(SubcategoryRow {
            id: row.try_get("id")?,
            category_id: row.try_get("category_id")?,
            parent_subcategory_id: row.try_get("parent_subcategory_id")?,
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<SubcategoryRow> for Subcategory {
    type Error = StoreError;

    fn try_from(row: SubcategoryRow) -> Result<Self, Self::Error> {
        Ok(Subcategory {
            id: SubcategoryId::new(row.id),
            category_id: CategoryId::new(row.category_id),
            parent_subcategory_id: row.parent_subcategory_id.map(SubcategoryId::new),
            name: row.name,
            slug: row.slug,
            description: row.description,
            status: parse_status(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    category: String,
    subcategory: Option<String>,
    status: String,
    data: Json<ProductData>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            subcategory: row.try_get("subcategory")?,
            status: row.try_get("status")?,
            data: row.try_get("data")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            category: row.category,
            subcategory: row.subcategory,
            status: parse_status(&row.status)?,
            data: row.data.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug)]
struct LeadRow {
    id: i64,
    name: String,
    phone: String,
    email: String,
    location: String,
    product_id: Option<i64>,
    product_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for LeadRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(LeadRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            location: row.try_get("location")?,
            product_id: row.try_get("product_id")?,
            product_name: row.try_get("product_name")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<LeadRow> for CatalogueRequest {
    type Error = StoreError;

    fn try_from(row: LeadRow) -> Result<Self, Self::Error> {
        Ok(CatalogueRequest {
            id: LeadId::new(row.id),
            name: row.name,
            phone: row.phone,
            email: row.email,
            location: row.location,
            product_id: row.product_id.map(ProductId::new),
            product_name: row.product_name,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug)]
struct NewsletterRow {
    id: i64,
    email: String,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for NewsletterRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(NewsletterRow {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<NewsletterRow> for NewsletterEmail {
    type Error = StoreError;

    fn try_from(row: NewsletterRow) -> Result<Self, Self::Error> {
        Ok(NewsletterEmail {
            id: NewsletterEmailId::new(row.id),
            email: row.email,
            created_at: row.created_at,
        })
    }
}
