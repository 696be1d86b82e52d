//! Category → subcategory hierarchy: records, inputs and the rules that do not
//! need a store to evaluate.

pub mod category;
pub mod status;
pub mod subcategory;

pub use category::{Category, CategoryDraft, CategoryPatch, NewCategory};
pub use status::CategoryStatus;
pub use subcategory::{
    NewSubcategory, Subcategory, SubcategoryDraft, SubcategoryPatch, ensure_valid_parent,
};
