//! Stored home-page sections.

use entyre_core::section::{Section, SectionPayload, SectionType};
use entyre_core::types::{DbId, Timestamp};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::FromRow;

/// A raw row from the `home_sections` table. JSONB columns are decoded into
/// the typed [`Section`] by [`SectionRow::into_section`].
#[derive(Debug, Clone, FromRow)]
pub struct SectionRow {
    pub id: DbId,
    pub section_index: i32,
    pub title: String,
    pub content: String,
    pub section_type: String,
    pub payload: Value,
    pub layout: Value,
    pub typography: Value,
    pub animation: Value,
    pub display_conditions: Value,
    pub seo: Value,
    pub is_visible: bool,
    pub custom_css: String,
    pub custom_js: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SectionRow {
    /// Decode the row. Sub-objects stored as `{}` (or with missing keys)
    /// come back fully defaulted.
    pub fn into_section(self) -> Result<Section, serde_json::Error> {
        let section_type = SectionType::from_str_value(&self.section_type)
            .map_err(<serde_json::Error as serde::de::Error>::custom)?;
        let fields = match self.payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Ok(Section {
            id: self.id,
            section_index: self.section_index,
            title: self.title,
            content: self.content,
            payload: SectionPayload::from_fields(section_type, fields)?,
            layout: serde_json::from_value(self.layout)?,
            typography: serde_json::from_value(self.typography)?,
            animation: serde_json::from_value(self.animation)?,
            display_conditions: serde_json::from_value(self.display_conditions)?,
            seo: serde_json::from_value(self.seo)?,
            is_visible: self.is_visible,
            custom_css: self.custom_css,
            custom_js: self.custom_js,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Filters for listing sections. `None` means "don't filter".
#[derive(Debug, Clone, Default)]
pub struct SectionFilter {
    pub section_type: Option<SectionType>,
    pub visible: Option<bool>,
    pub limit: Option<i64>,
}

/// Confirmation payload for a deleted section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DeletedSection {
    pub id: DbId,
    pub section_index: i32,
    pub title: String,
}

/// Result of a reorder request.
#[derive(Debug)]
pub enum ReorderOutcome {
    /// Every section, in its new order.
    Applied(Vec<Section>),
    /// The ordering did not name exactly the live sections.
    Rejected(Vec<String>),
}
