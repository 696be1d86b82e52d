//! Products domain module.
//!
//! Product records, the attachment bundle and the partial-update rules. Pure
//! domain logic (no IO, no HTTP, no storage).

pub mod data;
pub mod product;

pub use data::{DocumentAsset, MediaSlot, ProductData, SectionToggle, VideoAsset};
pub use product::{NewProduct, Product, ProductPatch, ProductStatus, PublishIssue};
