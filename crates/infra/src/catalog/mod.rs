//! Catalog service: the hierarchy and product operations the admin exposes.
//!
//! Every call is a read-check-write pass over a [`CatalogStore`]. There are no
//! multi-row transactions; the unique indexes in the store settle races
//! between the duplicate-slug check and the write.

use std::sync::Arc;

use catalog_core::DomainError;

use crate::store::{CatalogStore, StoreError};

mod hierarchy;
mod leads;
mod products;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogError {
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            CatalogError::Domain(e) => Some(e),
            CatalogError::Store(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }
}

/// Turn a unique-index rejection into the slug conflict it stands for.
fn slug_conflict<'a>(entity: &'static str, slug: &'a str) -> impl FnOnce(StoreError) -> CatalogError + 'a {
    move |err| {
        if err.is_unique_violation() {
            DomainError::duplicate_slug(entity, slug).into()
        } else {
            err.into()
        }
    }
}

fn not_found() -> CatalogError {
    DomainError::not_found().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_becomes_duplicate_slug() {
        let err = slug_conflict("category", "pumps")(StoreError::UniqueViolation("categories_slug_key".into()));
        assert_eq!(
            err.as_domain(),
            Some(&DomainError::duplicate_slug("category", "pumps"))
        );
    }

    #[test]
    fn other_store_errors_pass_through() {
        let err = slug_conflict("category", "pumps")(StoreError::database("insert_category", "boom"));
        assert!(matches!(err, CatalogError::Store(StoreError::Database { .. })));
    }
}
