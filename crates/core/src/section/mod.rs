//! Home-page content sections.
//!
//! - [`registry`] -- which payload fields belong to which section type.
//! - [`validate`] -- itemized checks on create/update bodies.
//! - [`normalize`] -- defaults, type-switch cleanup, and timestamps.
//! - [`reorder`] -- two-phase index reassignment plan.

pub mod normalize;
pub mod registry;
pub mod reorder;
pub mod types;
pub mod validate;

pub use normalize::normalize;
pub use types::{CanonicalSection, Section, SectionPayload, SectionType};
pub use validate::{validate, SectionInput, ValidationMode};
