use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::patch::{deserialize_some, non_blank};
use catalog_core::{DomainError, DomainResult, ProductId};

use crate::data::ProductData;

/// Product status lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductStatus {
    Active,
    #[default]
    Draft,
    Inactive,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "Active",
            ProductStatus::Draft => "Draft",
            ProductStatus::Inactive => "Inactive",
        }
    }
}

impl core::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(ProductStatus::Active),
            "draft" => Ok(ProductStatus::Draft),
            "inactive" => Ok(ProductStatus::Inactive),
            other => Err(DomainError::validation(format!(
                "status must be one of: Active, Draft, Inactive (got \"{other}\")"
            ))),
        }
    }
}

/// Catalog product.
///
/// `category` and `subcategory` hold slugs, not typed references; nothing
/// stops them from naming a category that no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub status: ProductStatus,
    pub data: ProductData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Case-insensitive substring match on name, description or category.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query)
            || self.category.to_lowercase().contains(&query)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query))
    }

    pub fn is_published(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

/// Create request for a product.
///
/// Stores accept it as-is; form-level completeness lives in
/// [`NewProduct::publish_issues`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub data: ProductData,
}

/// A missing piece that keeps a product from being published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishIssue {
    MissingName,
    MissingCategory,
    MissingDescription,
    NoFeatures,
    NoImages,
}

impl PublishIssue {
    pub fn field(&self) -> &'static str {
        match self {
            PublishIssue::MissingName => "name",
            PublishIssue::MissingCategory => "category",
            PublishIssue::MissingDescription => "description",
            PublishIssue::NoFeatures => "features",
            PublishIssue::NoImages => "images",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PublishIssue::MissingName => "Product name is required",
            PublishIssue::MissingCategory => "Category is required",
            PublishIssue::MissingDescription => "Description is required",
            PublishIssue::NoFeatures => "At least one feature is required",
            PublishIssue::NoImages => "At least one product image is required",
        }
    }
}

impl NewProduct {
    pub fn status_or_default(&self) -> ProductStatus {
        self.status.unwrap_or_default()
    }

    /// Collapse blank optional text to `None` and drop blank features.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.category = self.category.trim().to_string();
        self.description = non_blank(self.description);
        self.subcategory = non_blank(self.subcategory);
        self.data.features = self.data.non_blank_features();
        self
    }

    /// Everything the add-product form would flag before a non-draft save.
    pub fn publish_issues(&self) -> Vec<PublishIssue> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(PublishIssue::MissingName);
        }
        if self.category.trim().is_empty() {
            issues.push(PublishIssue::MissingCategory);
        }
        if self.description.as_deref().is_none_or(|d| d.trim().is_empty()) {
            issues.push(PublishIssue::MissingDescription);
        }
        if self.data.non_blank_features().is_empty() {
            issues.push(PublishIssue::NoFeatures);
        }
        if self.data.images.is_empty() {
            issues.push(PublishIssue::NoImages);
        }
        issues
    }

    /// Reject incomplete products unless they are saved as drafts.
    pub fn ensure_publishable(&self) -> DomainResult<()> {
        if self.status_or_default() == ProductStatus::Draft {
            return Ok(());
        }
        let issues = self.publish_issues();
        if issues.is_empty() {
            return Ok(());
        }
        let msg = issues
            .iter()
            .map(|i| i.message())
            .collect::<Vec<_>>()
            .join("; ");
        Err(DomainError::validation(msg))
    }
}

/// Partial update for a product.
///
/// `name` and `category` only apply when non-blank. `description` and
/// `subcategory` apply whenever present; `null` or a blank string clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub subcategory: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub data: Option<ProductData>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self == &ProductPatch::default()
    }

    pub fn apply(&self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            product.name = name.to_string();
        }
        if let Some(description) = &self.description {
            product.description = non_blank(description.clone());
        }
        if let Some(category) = self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            product.category = category.to_string();
        }
        if let Some(subcategory) = &self.subcategory {
            product.subcategory = non_blank(subcategory.clone());
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        if let Some(data) = &self.data {
            product.data = data.clone();
        }
        product.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> Product {
        let at = Utc::now() - Duration::hours(1);
        Product {
            id: ProductId::new(1),
            name: "VS Pump 1.5HP".to_string(),
            description: Some("Variable speed pool pump".to_string()),
            category: "pool-pumps".to_string(),
            subcategory: Some("variable-speed".to_string()),
            status: ProductStatus::Draft,
            data: ProductData {
                features: vec!["Quiet".to_string()],
                images: vec!["https://cdn/pump.png".to_string()],
                ..Default::default()
            },
            created_at: at,
            updated_at: at,
        }
    }

    fn complete_new_product() -> NewProduct {
        NewProduct {
            name: "Sand Filter".to_string(),
            description: Some("Top-mount sand filter".to_string()),
            category: "filters".to_string(),
            subcategory: None,
            status: Some(ProductStatus::Active),
            data: ProductData {
                features: vec!["Durable".to_string()],
                images: vec!["https://cdn/filter.png".to_string()],
                ..Default::default()
            },
        }
    }

    #[test]
    fn status_defaults_to_draft() {
        let new = NewProduct {
            name: "X".to_string(),
            category: "c".to_string(),
            ..Default::default()
        };
        assert_eq!(new.status_or_default(), ProductStatus::Draft);
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("active".parse::<ProductStatus>().unwrap(), ProductStatus::Active);
        assert_eq!("Draft".parse::<ProductStatus>().unwrap(), ProductStatus::Draft);
        assert!("archived".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let mut product = sample();
        let before = product.clone();
        let patch = ProductPatch {
            status: Some(ProductStatus::Active),
            ..Default::default()
        };

        let now = Utc::now();
        patch.apply(&mut product, now);

        assert_eq!(product.status, ProductStatus::Active);
        assert_eq!(product.name, before.name);
        assert_eq!(product.description, before.description);
        assert_eq!(product.subcategory, before.subcategory);
        assert_eq!(product.data, before.data);
        assert_eq!(product.updated_at, now);
    }

    #[test]
    fn patch_ignores_blank_name_and_category() {
        let mut product = sample();
        let patch = ProductPatch {
            name: Some("   ".to_string()),
            category: Some("".to_string()),
            ..Default::default()
        };

        patch.apply(&mut product, Utc::now());
        assert_eq!(product.name, "VS Pump 1.5HP");
        assert_eq!(product.category, "pool-pumps");
    }

    #[test]
    fn patch_clears_subcategory_with_null_or_blank() {
        let mut product = sample();
        let patch: ProductPatch = serde_json::from_str(r#"{"subcategory": null}"#).unwrap();
        patch.apply(&mut product, Utc::now());
        assert_eq!(product.subcategory, None);

        let mut product = sample();
        let patch: ProductPatch = serde_json::from_str(r#"{"subcategory": ""}"#).unwrap();
        patch.apply(&mut product, Utc::now());
        assert_eq!(product.subcategory, None);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(ProductPatch::default().is_empty());
        let patch: ProductPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert!(!patch.is_empty());
    }

    #[test]
    fn search_matches_name_description_and_category() {
        let product = sample();
        assert!(product.matches_search("pump 1.5"));
        assert!(product.matches_search("VARIABLE"));
        assert!(product.matches_search("pool-pumps"));
        assert!(!product.matches_search("heater"));
    }

    #[test]
    fn complete_product_has_no_publish_issues() {
        let new = complete_new_product();
        assert!(new.publish_issues().is_empty());
        assert!(new.ensure_publishable().is_ok());
    }

    #[test]
    fn incomplete_active_product_is_rejected_but_draft_is_not() {
        let mut new = complete_new_product();
        new.data.images.clear();
        new.data.features = vec!["  ".to_string()];
        new.description = None;

        let issues = new.publish_issues();
        assert_eq!(
            issues,
            vec![PublishIssue::MissingDescription, PublishIssue::NoFeatures, PublishIssue::NoImages]
        );
        assert!(matches!(new.ensure_publishable(), Err(DomainError::Validation(_))));

        new.status = Some(ProductStatus::Draft);
        assert!(new.ensure_publishable().is_ok());
    }

    #[test]
    fn normalized_drops_blank_fields() {
        let new = NewProduct {
            name: "  Heater ".to_string(),
            description: Some("".to_string()),
            category: " heaters ".to_string(),
            subcategory: Some("  ".to_string()),
            status: None,
            data: ProductData {
                features: vec!["".to_string(), "Fast heat-up".to_string()],
                ..Default::default()
            },
        }
        .normalized();

        assert_eq!(new.name, "Heater");
        assert_eq!(new.category, "heaters");
        assert_eq!(new.description, None);
        assert_eq!(new.subcategory, None);
        assert_eq!(new.data.features, vec!["Fast heat-up".to_string()]);
    }
}
