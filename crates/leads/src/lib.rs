//! Visitor-submitted contact records: catalogue requests ("leads") and
//! newsletter subscriptions, plus the page/limit envelope the admin list uses.

pub mod lead;
pub mod newsletter;
pub mod page;

pub use lead::{CatalogueRequest, NewCatalogueRequest};
pub use newsletter::{NewsletterEmail, normalize_email};
pub use page::{PageInfo, PageRequest};
