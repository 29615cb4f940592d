//! Row structs and write DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the table and the
//! plain structs handlers fill in for inserts and partial updates.

pub mod article;
pub mod banner;
pub mod excel_file;
pub mod section;
pub mod user;
pub mod video;
pub mod workflow;

/// An image a row displays. `public_id` is set only when the object was
/// uploaded through this service and the row owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
    pub public_id: Option<String>,
}
