use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::patch::{deserialize_some, non_blank};
use catalog_core::{CategoryId, DomainError, DomainResult, SubcategoryId};

use crate::category::{patch_slug, required_name, resolve_slug};
use crate::status::CategoryStatus;

/// Subcategory owned by exactly one category, optionally nested under one
/// top-level subcategory of the same category.
///
/// Slugs are unique per `category_id`, not globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub category_id: CategoryId,
    pub parent_subcategory_id: Option<SubcategoryId>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub status: CategoryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subcategory {
    pub fn is_top_level(&self) -> bool {
        self.parent_subcategory_id.is_none()
    }
}

/// Create request for a subcategory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubcategory {
    pub category_id: CategoryId,
    #[serde(default)]
    pub parent_subcategory_id: Option<SubcategoryId>,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<CategoryStatus>,
}

/// Validated subcategory insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcategoryDraft {
    pub category_id: CategoryId,
    pub parent_subcategory_id: Option<SubcategoryId>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub status: CategoryStatus,
}

impl NewSubcategory {
    pub fn into_draft(self) -> DomainResult<SubcategoryDraft> {
        let name = required_name(&self.name)?;
        let slug = resolve_slug(&name, self.slug.as_deref())?;
        Ok(SubcategoryDraft {
            category_id: self.category_id,
            parent_subcategory_id: normalize_parent(self.parent_subcategory_id),
            name,
            slug,
            description: non_blank(self.description),
            status: self.status.unwrap_or_default(),
        })
    }
}

/// Partial update for a subcategory. The owning category cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<CategoryStatus>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub parent_subcategory_id: Option<Option<SubcategoryId>>,
}

impl SubcategoryPatch {
    pub fn target_slug(&self) -> DomainResult<Option<String>> {
        patch_slug(self.name.as_deref(), self.slug.as_deref())
    }

    /// Parent requested by the patch: `None` when untouched, `Some(None)` when
    /// detaching. A zero id counts as detaching.
    pub fn target_parent(&self) -> Option<Option<SubcategoryId>> {
        self.parent_subcategory_id.map(normalize_parent)
    }

    pub fn apply(&self, subcategory: &mut Subcategory, now: DateTime<Utc>) -> DomainResult<()> {
        let slug = self.target_slug()?;
        if let Some(name) = &self.name {
            subcategory.name = required_name(name)?;
        }
        if let Some(slug) = slug {
            subcategory.slug = slug;
        }
        if let Some(description) = &self.description {
            subcategory.description = non_blank(description.clone());
        }
        if let Some(status) = self.status {
            subcategory.status = status;
        }
        if let Some(parent) = self.target_parent() {
            subcategory.parent_subcategory_id = parent;
        }
        subcategory.updated_at = now;
        Ok(())
    }
}

fn normalize_parent(parent: Option<SubcategoryId>) -> Option<SubcategoryId> {
    parent.filter(|id| id.get() > 0)
}

/// Check that `parent` may hold a child in `category_id`.
///
/// `child_id` is the subcategory being re-parented (absent on create) and
/// `child_has_children` whether it already holds children of its own. Nesting
/// is one level deep: the parent must be top-level and the child must be a
/// leaf.
pub fn ensure_valid_parent(
    child_id: Option<SubcategoryId>,
    category_id: CategoryId,
    parent: &Subcategory,
    child_has_children: bool,
) -> DomainResult<()> {
    if child_id == Some(parent.id) {
        return Err(DomainError::invariant("a subcategory cannot be its own parent"));
    }
    if parent.category_id != category_id {
        return Err(DomainError::invariant(
            "parent subcategory belongs to a different category",
        ));
    }
    if !parent.is_top_level() {
        return Err(DomainError::invariant(
            "parent subcategory is itself nested; only one level of nesting is allowed",
        ));
    }
    if child_has_children {
        return Err(DomainError::invariant(
            "a subcategory with children cannot be nested under another",
        ));
    }
    Ok(())
}
