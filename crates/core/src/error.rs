//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic catalog failures (validation, slug
/// conflicts, dependent records). Storage concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. empty name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record was not found.
    #[error("not found")]
    NotFound,

    /// The slug is already taken inside its uniqueness scope.
    #[error("a {entity} with the slug \"{slug}\" already exists")]
    DuplicateSlug { entity: &'static str, slug: String },

    /// The record is still referenced and cannot be removed.
    #[error("cannot delete: {count} product(s) still reference it")]
    HasDependents { count: u64 },

    /// A structural rule of the catalog was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn duplicate_slug(entity: &'static str, slug: impl Into<String>) -> Self {
        Self::DuplicateSlug {
            entity,
            slug: slug.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_slug_message_names_entity_and_slug() {
        let err = DomainError::duplicate_slug("category", "pumps");
        assert_eq!(err.to_string(), "a category with the slug \"pumps\" already exists");
    }

    #[test]
    fn has_dependents_message_reports_count() {
        let err = DomainError::HasDependents { count: 3 };
        assert_eq!(err.to_string(), "cannot delete: 3 product(s) still reference it");
    }
}
