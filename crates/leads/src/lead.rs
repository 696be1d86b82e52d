use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::patch::non_blank;
use catalog_core::{DomainError, DomainResult, LeadId, ProductId};

/// Catalogue download request left by a site visitor.
///
/// `product_id` is a loose reference; deleting the product leaves the lead
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueRequest {
    pub id: LeadId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub location: String,
    pub product_id: Option<ProductId>,
    pub product_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCatalogueRequest {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub product_name: Option<String>,
}

impl NewCatalogueRequest {
    /// Trim every field; name and email are required.
    pub fn validated(self) -> DomainResult<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        let email = crate::newsletter::normalize_email(&self.email)?;
        Ok(Self {
            name,
            phone: self.phone.trim().to_string(),
            email,
            location: self.location.trim().to_string(),
            product_id: self.product_id,
            product_name: non_blank(self.product_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validated_trims_and_collapses_blank_product_name() {
        let lead = NewCatalogueRequest {
            name: "  Dana ".to_string(),
            phone: " 555-0100 ".to_string(),
            email: " Dana@Example.com ".to_string(),
            location: "Perth".to_string(),
            product_id: None,
            product_name: Some("  ".to_string()),
        }
        .validated()
        .unwrap();

        assert_eq!(lead.name, "Dana");
        assert_eq!(lead.phone, "555-0100");
        assert_eq!(lead.email, "dana@example.com");
        assert_eq!(lead.product_name, None);
    }

    #[test]
    fn missing_name_or_bad_email_is_rejected() {
        let no_name = NewCatalogueRequest {
            name: " ".to_string(),
            email: "a@b.co".to_string(),
            ..Default::default()
        };
        assert!(matches!(no_name.validated(), Err(DomainError::Validation(_))));

        let bad_email = NewCatalogueRequest {
            name: "Sam".to_string(),
            email: "not-an-email".to_string(),
            ..Default::default()
        };
        assert!(matches!(bad_email.validated(), Err(DomainError::Validation(_))));
    }
}
