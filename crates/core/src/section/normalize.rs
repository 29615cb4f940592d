//! Turn a validated [`SectionInput`] into a [`CanonicalSection`].
//!
//! Order of operations:
//!
//! 1. Resolve the type (patch, then stored, then `text`).
//! 2. Build the payload for that type. The stored payload is only carried
//!    over when the type is unchanged, so a type switch starts empty.
//! 3. Fill each sub-object: a supplied object is merged over defaults, an
//!    absent one keeps the stored value or takes defaults.
//! 4. Stamp `updated_at`, never earlier than the stored value.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::registry;
use super::types::{CanonicalSection, Layout, Section, SectionPayload, SectionType};
use super::validate::SectionInput;
use crate::error::CoreError;

/// Normalize a validated input, optionally on top of the stored document.
pub fn normalize(
    input: SectionInput,
    existing: Option<&Section>,
) -> Result<CanonicalSection, CoreError> {
    let section_type = input
        .section_type
        .or(existing.map(Section::section_type))
        .unwrap_or(SectionType::Text);

    let mut fields = match existing {
        Some(section) if section.section_type() == section_type => section
            .payload
            .to_fields()
            .map_err(|e| CoreError::Internal(format!("Failed to read stored payload: {e}")))?,
        _ => Map::new(),
    };
    fields.extend(input.payload);
    let payload = SectionPayload::from_fields(section_type, fields)
        .map_err(|e| CoreError::Validation(format!("Invalid {section_type} payload: {e}")))?;

    let layout = match input.layout {
        Some(supplied) => build_layout(section_type, supplied)?,
        None => match existing {
            Some(section) => section.layout.clone(),
            None => build_layout(section_type, Map::new())?,
        },
    };

    let title = match (input.title, existing) {
        (Some(title), _) => title,
        (None, Some(section)) => section.title.clone(),
        (None, None) => return Err(CoreError::Validation("title is required".into())),
    };

    let now = Utc::now();
    let updated_at = match existing {
        Some(section) if section.updated_at > now => section.updated_at,
        _ => now,
    };

    Ok(CanonicalSection {
        section_index: input
            .section_index
            .or(existing.map(|s| s.section_index)),
        title,
        content: input
            .content
            .or_else(|| existing.map(|s| s.content.clone()))
            .unwrap_or_default(),
        payload,
        layout,
        typography: merge(input.typography, existing.map(|s| &s.typography), "typography")?,
        animation: merge(input.animation, existing.map(|s| &s.animation), "animation")?,
        display_conditions: merge(
            input.display_conditions,
            existing.map(|s| &s.display_conditions),
            "displayConditions",
        )?,
        seo: merge(input.seo, existing.map(|s| &s.seo), "seo")?,
        is_visible: input
            .is_visible
            .or(existing.map(|s| s.is_visible))
            .unwrap_or(true),
        custom_css: input
            .custom_css
            .or_else(|| existing.map(|s| s.custom_css.clone()))
            .unwrap_or_default(),
        custom_js: input
            .custom_js
            .or_else(|| existing.map(|s| s.custom_js.clone()))
            .unwrap_or_default(),
        updated_at,
    })
}

/// Layout for a fresh or replaced layout object: the type's layout defaults
/// first, then the supplied keys on top.
fn build_layout(section_type: SectionType, supplied: Map<String, Value>) -> Result<Layout, CoreError> {
    let defaults = registry::fields_for(section_type).layout_defaults;
    let mut map = Map::new();
    if let Some(background) = defaults.background {
        map.insert("background".into(), Value::from(background.as_str()));
    }
    if let Some(columns) = defaults.columns {
        map.insert("columns".into(), Value::from(columns));
    }
    map.extend(supplied);
    from_map(map, "layout")
}

/// A supplied sub-object replaces the stored one; missing keys take
/// defaults. An absent sub-object keeps the stored value.
fn merge<T>(supplied: Option<Map<String, Value>>, stored: Option<&T>, name: &str) -> Result<T, CoreError>
where
    T: DeserializeOwned + Clone + Default,
{
    match (supplied, stored) {
        (Some(map), _) => from_map(map, name),
        (None, Some(value)) => Ok(value.clone()),
        (None, None) => Ok(T::default()),
    }
}

fn from_map<T: DeserializeOwned>(map: Map<String, Value>, name: &str) -> Result<T, CoreError> {
    serde_json::from_value(Value::Object(map))
        .map_err(|e| CoreError::Validation(format!("Invalid {name}: {e}")))
}
