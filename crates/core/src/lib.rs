//! Shared domain building blocks for the catalog.
//!
//! Identifiers, the domain error model and slug derivation. No IO lives here.

pub mod error;
pub mod id;
pub mod patch;
pub mod slug;

pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, LeadId, NewsletterEmailId, ProductId, SubcategoryId};
pub use slug::{create_slug, is_valid_slug};
