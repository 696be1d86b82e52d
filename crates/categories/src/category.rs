use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::patch::{deserialize_some, non_blank};
use catalog_core::{CategoryId, DomainError, DomainResult, create_slug};

use crate::status::CategoryStatus;

/// Top-level catalog category.
///
/// `product_count` is derived from the products table on read and is never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub status: CategoryStatus,
    pub catalogue_url: Option<String>,
    #[serde(default)]
    pub product_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn with_product_count(mut self, product_count: u64) -> Self {
        self.product_count = product_count;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == CategoryStatus::Active
    }

    /// Case-insensitive substring match on name or description.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term))
    }
}

/// Create request for a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<CategoryStatus>,
    #[serde(default)]
    pub catalogue_url: Option<String>,
}

/// Validated category insert: slug resolved, blanks collapsed, defaults filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub status: CategoryStatus,
    pub catalogue_url: Option<String>,
}

impl NewCategory {
    pub fn into_draft(self) -> DomainResult<CategoryDraft> {
        let name = required_name(&self.name)?;
        let slug = resolve_slug(&name, self.slug.as_deref())?;
        Ok(CategoryDraft {
            name,
            slug,
            description: non_blank(self.description),
            status: self.status.unwrap_or_default(),
            catalogue_url: non_blank(self.catalogue_url),
        })
    }
}

/// Partial update for a category. Omitted fields are left untouched; an
/// explicit `null` clears `description` / `catalogue_url`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<CategoryStatus>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub catalogue_url: Option<Option<String>>,
}

impl CategoryPatch {
    /// Slug the patched record would carry, when the patch touches it.
    ///
    /// An explicit slug wins; otherwise a new name re-derives the slug.
    pub fn target_slug(&self) -> DomainResult<Option<String>> {
        patch_slug(self.name.as_deref(), self.slug.as_deref())
    }

    pub fn apply(&self, category: &mut Category, now: DateTime<Utc>) -> DomainResult<()> {
        let slug = self.target_slug()?;
        if let Some(name) = &self.name {
            category.name = required_name(name)?;
        }
        if let Some(slug) = slug {
            category.slug = slug;
        }
        if let Some(description) = &self.description {
            category.description = non_blank(description.clone());
        }
        if let Some(status) = self.status {
            category.status = status;
        }
        if let Some(url) = &self.catalogue_url {
            category.catalogue_url = non_blank(url.clone());
        }
        category.updated_at = now;
        Ok(())
    }
}

pub(crate) fn required_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(name.to_string())
}

/// Supplied slugs go through the same normalisation as derived ones so the
/// stored value is always URL-safe.
pub(crate) fn resolve_slug(name: &str, explicit: Option<&str>) -> DomainResult<String> {
    let source = match explicit.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => name,
    };
    let slug = create_slug(source);
    if slug.is_empty() {
        return Err(DomainError::validation(format!(
            "\"{source}\" does not produce a usable slug"
        )));
    }
    Ok(slug)
}

pub(crate) fn patch_slug(name: Option<&str>, explicit: Option<&str>) -> DomainResult<Option<String>> {
    match (explicit.map(str::trim), name.map(str::trim)) {
        (Some(s), _) if !s.is_empty() => resolve_slug(s, None).map(Some),
        (_, Some(n)) if !n.is_empty() => resolve_slug(n, None).map(Some),
        _ => Ok(None),
    }
}
