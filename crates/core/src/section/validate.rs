//! Request validation for section create and update payloads.
//!
//! [`validate`] checks every rule and reports all violations together, so a
//! form can highlight every problem in one round trip. Values that pass are
//! coerced to their strict wire form and returned as a [`SectionInput`].

use serde_json::{Map, Value};

use super::registry::{self, ArrayField, FieldSpec, Rule, SUB_OBJECTS};
use super::types::SectionType;
use crate::coerce;
use crate::error::CoreError;

/// Largest caller-supplied `sectionIndex`. Keeps the reorder staging range
/// well inside `i32`.
pub const MAX_SECTION_INDEX: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// `title` is required and `type` defaults to `text`.
    Create,
    /// Every field is optional. `current` is the stored type, used to decide
    /// which payload fields apply when `type` is not part of the patch.
    Update { current: SectionType },
}

/// A validated, coerced payload. `None` means "not supplied".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionInput {
    pub section_index: Option<i32>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub section_type: Option<SectionType>,
    /// Payload fields owned by the resolved type, already coerced.
    pub payload: Map<String, Value>,
    pub layout: Option<Map<String, Value>>,
    pub typography: Option<Map<String, Value>>,
    pub animation: Option<Map<String, Value>>,
    pub display_conditions: Option<Map<String, Value>>,
    pub seo: Option<Map<String, Value>>,
    pub is_visible: Option<bool>,
    pub custom_css: Option<String>,
    pub custom_js: Option<String>,
}

/// Validate a raw JSON body.
///
/// Returns [`CoreError::InvalidFields`] with one message per violated rule.
pub fn validate(payload: &Value, mode: ValidationMode) -> Result<SectionInput, CoreError> {
    let Some(body) = payload.as_object() else {
        return Err(CoreError::InvalidFields(vec![
            "Request body must be a JSON object".to_string(),
        ]));
    };

    let mut errors = Vec::new();
    let mut input = SectionInput::default();

    // --- sectionIndex ---
    match supplied(body, "sectionIndex") {
        None => {}
        Some(value @ Value::Number(_)) => match coerce::loose_i64(value) {
            Some(idx) if (0..=MAX_SECTION_INDEX).contains(&idx) => {
                input.section_index = Some(idx as i32);
            }
            Some(_) => errors.push(format!(
                "sectionIndex must be an integer between 0 and {MAX_SECTION_INDEX}"
            )),
            None => errors.push("sectionIndex must be an integer".to_string()),
        },
        Some(_) => errors.push("sectionIndex must be an integer".to_string()),
    }

    // --- title ---
    match supplied(body, "title") {
        Some(Value::String(s)) if !s.trim().is_empty() => {
            input.title = Some(s.trim().to_string());
        }
        Some(_) => errors.push("title must be a non-empty string".to_string()),
        None if mode == ValidationMode::Create => errors.push("title is required".to_string()),
        None => {}
    }

    // --- content ---
    if let Some(value) = body.get("content") {
        input.content = Some(coerce::loose_text_or_json(value));
    }

    // --- type ---
    let mut type_known = true;
    match supplied(body, "type") {
        Some(Value::String(s)) => match SectionType::from_str_value(s) {
            Ok(ty) => input.section_type = Some(ty),
            Err(msg) => {
                errors.push(msg);
                type_known = false;
            }
        },
        Some(_) => {
            errors.push("type must be a string".to_string());
            type_known = false;
        }
        None if mode == ValidationMode::Create => input.section_type = Some(SectionType::Text),
        None => {}
    }

    // --- type-specific payload ---
    if type_known {
        let (resolved, entering) = match mode {
            ValidationMode::Create => (input.section_type.unwrap_or(SectionType::Text), true),
            ValidationMode::Update { current } => {
                let resolved = input.section_type.unwrap_or(current);
                (resolved, resolved != current)
            }
        };
        input.payload = validate_payload(body, resolved, entering, &mut errors);
    }

    // --- sub-objects ---
    for (name, fields) in SUB_OBJECTS {
        let Some(value) = supplied(body, name) else {
            continue;
        };
        let Some(object) = value.as_object() else {
            errors.push(format!("{name} must be an object"));
            continue;
        };
        let coerced = coerce_fields(object, fields, name, &mut errors);
        match *name {
            "layout" => input.layout = Some(coerced),
            "typography" => input.typography = Some(coerced),
            "animation" => input.animation = Some(coerced),
            "displayConditions" => input.display_conditions = Some(coerced),
            _ => input.seo = Some(coerced),
        }
    }

    // --- flags and raw blocks ---
    if let Some(value) = body.get("isVisible") {
        match coerce::loose_bool(value) {
            Some(b) => input.is_visible = Some(b),
            None => errors.push("isVisible must be a boolean".to_string()),
        }
    }
    for (key, slot) in [
        ("customCSS", &mut input.custom_css),
        ("customJS", &mut input.custom_js),
    ] {
        if let Some(value) = body.get(key) {
            match coerce::loose_string(value) {
                Some(s) => *slot = Some(s),
                None => errors.push(format!("{key} must be a string")),
            }
        }
    }

    if errors.is_empty() {
        Ok(input)
    } else {
        Err(CoreError::InvalidFields(errors))
    }
}

/// A key counts as supplied when present and not `null`.
fn supplied<'a>(body: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    body.get(key).filter(|v| !v.is_null())
}

/// Check the payload fields owned by `resolved`. When `entering` the type
/// (create, or a type switch) its required fields must be present;
/// otherwise only supplied fields are checked. Fields owned by other types
/// are dropped.
fn validate_payload(
    body: &Map<String, Value>,
    resolved: SectionType,
    entering: bool,
    errors: &mut Vec<String>,
) -> Map<String, Value> {
    let entry = registry::fields_for(resolved);
    let mut out = Map::new();

    for spec in entry.required {
        match body.get(spec.name) {
            Some(value) => match coerce_value(spec.rule, value, spec.name) {
                Ok(Some(Value::String(s))) if s.trim().is_empty() => {
                    errors.push(required_message(spec.name, resolved));
                }
                Ok(Some(v)) => {
                    out.insert(spec.name.to_string(), v);
                }
                Ok(None) => errors.push(required_message(spec.name, resolved)),
                Err(msg) => errors.push(msg),
            },
            None if entering => errors.push(required_message(spec.name, resolved)),
            None => {}
        }
    }

    for spec in entry.optional {
        if let Some(value) = body.get(spec.name) {
            match coerce_value(spec.rule, value, spec.name) {
                Ok(Some(v)) => {
                    out.insert(spec.name.to_string(), v);
                }
                Ok(None) => {}
                Err(msg) => errors.push(msg),
            }
        }
    }

    if let Some(array) = entry.array_field {
        if let Some(value) = body.get(array.name) {
            if let Some(items) = validate_items(&array, value, errors) {
                out.insert(array.name.to_string(), Value::Array(items));
            }
        }
    }

    out
}

fn required_message(field: &str, section_type: SectionType) -> String {
    format!("{field} is required for {section_type} sections")
}

fn validate_items(
    array: &ArrayField,
    value: &Value,
    errors: &mut Vec<String>,
) -> Option<Vec<Value>> {
    let items = match value {
        Value::Null => return Some(Vec::new()),
        Value::Array(items) => items,
        _ => {
            errors.push(format!("{} must be an array", array.name));
            return None;
        }
    };

    let before = errors.len();
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let path = format!("{}[{i}]", array.name);
        let Some(object) = item.as_object() else {
            errors.push(format!("{path} must be an object"));
            continue;
        };

        let mut entry = Map::new();
        for spec in array.item_required {
            let field_path = format!("{path}.{}", spec.name);
            match object.get(spec.name).map(|v| coerce_value(spec.rule, v, &field_path)) {
                Some(Ok(Some(Value::String(s)))) if !s.trim().is_empty() => {
                    entry.insert(spec.name.to_string(), Value::String(s));
                }
                Some(Ok(Some(v))) if !v.is_string() => {
                    entry.insert(spec.name.to_string(), v);
                }
                Some(Err(msg)) => errors.push(msg),
                _ => errors.push(format!("{field_path} is required")),
            }
        }
        entry.extend(coerce_fields(object, array.item_optional, &path, errors));
        out.push(Value::Object(entry));
    }

    (errors.len() == before).then_some(out)
}

/// Coerce the known keys of an object, dropping unknown keys.
fn coerce_fields(
    object: &Map<String, Value>,
    fields: &[FieldSpec],
    prefix: &str,
    errors: &mut Vec<String>,
) -> Map<String, Value> {
    let mut out = Map::new();
    for spec in fields {
        let Some(value) = object.get(spec.name) else {
            continue;
        };
        let path = format!("{prefix}.{}", spec.name);
        match coerce_value(spec.rule, value, &path) {
            Ok(Some(v)) => {
                out.insert(spec.name.to_string(), v);
            }
            Ok(None) => {}
            Err(msg) => errors.push(msg),
        }
    }
    out
}

/// Coerce one value by rule. `Ok(None)` means "leave unset so the default
/// applies".
fn coerce_value(rule: Rule, value: &Value, path: &str) -> Result<Option<Value>, String> {
    match rule {
        Rule::Text => coerce::loose_string(value)
            .map(|s| Some(Value::String(s)))
            .ok_or_else(|| format!("{path} must be a string")),
        Rule::Bool => coerce::loose_bool(value)
            .map(|b| Some(Value::Bool(b)))
            .ok_or_else(|| format!("{path} must be a boolean")),
        Rule::Int { min, max } => {
            if value.is_null() {
                return Ok(None);
            }
            coerce::loose_i64(value)
                .filter(|n| (min..=max).contains(n))
                .map(|n| Some(Value::from(n)))
                .ok_or_else(|| format!("{path} must be an integer between {min} and {max}"))
        }
        Rule::Choice(values) => match value {
            Value::Null => Ok(None),
            Value::String(s) if values.contains(&s.as_str()) => Ok(Some(value.clone())),
            other => {
                let shown = other
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| other.to_string());
                Err(format!(
                    "Invalid {path} '{shown}'. Must be one of: {}",
                    values.join(", ")
                ))
            }
        },
        Rule::TextList => match value {
            Value::Null => Ok(Some(Value::Array(Vec::new()))),
            Value::String(s) => Ok(Some(Value::from(coerce::split_list(s)))),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                        coerce::loose_string(item).map(Value::String)
                    }
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(|list| Some(Value::Array(list)))
                .ok_or_else(|| format!("{path} must be a list of strings")),
            _ => Err(format!("{path} must be a list of strings")),
        },
        Rule::Timestamp => match value {
            Value::Null => Ok(Some(Value::Null)),
            Value::String(s) if s.trim().is_empty() => Ok(Some(Value::Null)),
            Value::String(s) => chrono::DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| {
                    Some(Value::String(
                        dt.with_timezone(&chrono::Utc).to_rfc3339(),
                    ))
                })
                .map_err(|_| format!("{path} must be an RFC 3339 timestamp")),
            _ => Err(format!("{path} must be an RFC 3339 timestamp")),
        },
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn details(result: Result<SectionInput, CoreError>) -> Vec<String> {
        match result {
            Err(CoreError::InvalidFields(details)) => details,
            other => panic!("expected InvalidFields, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // Create mode
    // -----------------------------------------------------------------------

    #[test]
    fn test_create_minimal_defaults_type_to_text() {
        let input = validate(&json!({"title": "  Welcome  "}), ValidationMode::Create).unwrap();
        assert_eq!(input.title.as_deref(), Some("Welcome"));
        assert_eq!(input.section_type, Some(SectionType::Text));
        assert!(input.payload.is_empty());
    }

    #[test]
    fn test_create_card_without_button_text_is_rejected() {
        let errors = details(validate(
            &json!({"sectionIndex": 1, "title": "Welcome", "type": "card"}),
            ValidationMode::Create,
        ));
        assert!(errors.contains(&"cardButtonText is required for card sections".to_string()));
        assert!(errors.contains(&"cardButtonLink is required for card sections".to_string()));
    }

    #[test]
    fn test_create_card_with_buttons_passes() {
        let input = validate(
            &json!({
                "sectionIndex": 1,
                "title": "Welcome",
                "type": "card",
                "cardButtonText": "Learn more",
                "cardButtonLink": "/about",
            }),
            ValidationMode::Create,
        )
        .unwrap();
        assert_eq!(input.section_index, Some(1));
        assert_eq!(input.payload["cardButtonText"], "Learn more");
    }

    #[test]
    fn test_missing_title_and_bad_type_are_both_reported() {
        let errors = details(validate(&json!({"type": "carousel"}), ValidationMode::Create));
        assert!(errors.len() >= 2, "got {errors:?}");
        assert!(errors.iter().any(|e| e == "title is required"));
        assert!(errors.iter().any(|e| e.starts_with("Invalid section type 'carousel'")));
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        let errors = details(validate(&json!([1, 2]), ValidationMode::Create));
        assert_eq!(errors, vec!["Request body must be a JSON object"]);
    }

    #[test]
    fn test_section_index_must_be_non_negative_integer() {
        let errors = details(validate(
            &json!({"title": "A", "sectionIndex": "one"}),
            ValidationMode::Create,
        ));
        assert_eq!(errors, vec!["sectionIndex must be an integer"]);

        let errors = details(validate(
            &json!({"title": "A", "sectionIndex": -1}),
            ValidationMode::Create,
        ));
        assert!(errors[0].starts_with("sectionIndex must be an integer between 0"));

        let errors = details(validate(
            &json!({"title": "A", "sectionIndex": 1.5}),
            ValidationMode::Create,
        ));
        assert_eq!(errors, vec!["sectionIndex must be an integer"]);
    }

    #[test]
    fn test_integral_float_section_index_is_accepted() {
        let input = validate(
            &json!({"title": "A", "sectionIndex": 1.0}),
            ValidationMode::Create,
        )
        .unwrap();
        assert_eq!(input.section_index, Some(1));
    }

    #[test]
    fn test_step_number_is_a_free_label() {
        let input = validate(
            &json!({
                "title": "How it works",
                "type": "process-steps",
                "steps": [
                    {"title": "Collect", "stepNumber": "01"},
                    {"title": "Shred", "stepNumber": "Step B"},
                    {"title": "Sort", "stepNumber": 3},
                ],
            }),
            ValidationMode::Create,
        )
        .unwrap();
        let steps = input.payload["steps"].as_array().unwrap();
        assert_eq!(steps[0]["stepNumber"], "01");
        assert_eq!(steps[1]["stepNumber"], "Step B");
        assert_eq!(steps[2]["stepNumber"], "3");
    }

    #[test]
    fn test_hero_button_entries_need_text_and_link() {
        let errors = details(validate(
            &json!({
                "title": "Hero",
                "type": "hero",
                "heroButtons": [{"text": "Go", "link": "/x"}, {"text": "", "style": "neon"}],
            }),
            ValidationMode::Create,
        ));
        assert!(errors.contains(&"heroButtons[1].text is required".to_string()));
        assert!(errors.contains(&"heroButtons[1].link is required".to_string()));
        assert!(errors.iter().any(|e| e.starts_with("Invalid heroButtons[1].style 'neon'")));
    }

    #[test]
    fn test_feature_and_stat_entries_are_checked() {
        let errors = details(validate(
            &json!({"title": "F", "type": "features-grid", "features": [{"title": "Only"}]}),
            ValidationMode::Create,
        ));
        assert_eq!(errors, vec!["features[0].description is required"]);

        let errors = details(validate(
            &json!({"title": "S", "type": "stats", "stats": [{"number": 1200}]}),
            ValidationMode::Create,
        ));
        assert_eq!(errors, vec!["stats[0].label is required"]);
    }

    #[test]
    fn test_stat_numbers_are_coerced_to_strings() {
        let input = validate(
            &json!({"title": "S", "type": "stats", "stats": [{"number": 1200, "label": "Tyres"}]}),
            ValidationMode::Create,
        )
        .unwrap();
        assert_eq!(input.payload["stats"][0]["number"], "1200");
    }

    #[test]
    fn test_foreign_payload_fields_are_dropped() {
        let input = validate(
            &json!({"title": "T", "type": "text", "heroButtons": [{"text": "Go", "link": "/"}]}),
            ValidationMode::Create,
        )
        .unwrap();
        assert!(input.payload.is_empty());
    }

    // -----------------------------------------------------------------------
    // Sub-objects
    // -----------------------------------------------------------------------

    #[test]
    fn test_sub_object_enums_are_checked_per_field() {
        let errors = details(validate(
            &json!({
                "title": "A",
                "layout": {"background": "plaid", "columns": 9, "padding": "large"},
                "typography": {"titleSize": "h7"},
            }),
            ValidationMode::Create,
        ));
        assert_eq!(errors.len(), 3, "got {errors:?}");
        assert!(errors.iter().any(|e| e.starts_with("Invalid layout.background 'plaid'")));
        assert!(errors.contains(&"layout.columns must be an integer between 1 and 4".to_string()));
        assert!(errors.iter().any(|e| e.starts_with("Invalid typography.titleSize 'h7'")));
    }

    #[test]
    fn test_sub_object_must_not_be_array() {
        let errors = details(validate(
            &json!({"title": "A", "layout": [], "animation": "fast"}),
            ValidationMode::Create,
        ));
        assert_eq!(
            errors,
            vec!["layout must be an object", "animation must be an object"]
        );
    }

    #[test]
    fn test_sub_object_values_are_coerced() {
        let input = validate(
            &json!({
                "title": "A",
                "animation": {"enabled": "true", "delay": "250", "bogus": 1},
                "seo": {"keywords": "tyres, recycling"},
                "displayConditions": {"startDate": "2025-01-01T00:00:00Z"},
            }),
            ValidationMode::Create,
        )
        .unwrap();
        let animation = input.animation.unwrap();
        assert_eq!(animation["enabled"], true);
        assert_eq!(animation["delay"], 250);
        assert!(!animation.contains_key("bogus"));
        assert_eq!(input.seo.unwrap()["keywords"], json!(["tyres", "recycling"]));
        assert!(input.display_conditions.unwrap()["startDate"].is_string());
    }

    #[test]
    fn test_loose_visibility_flag() {
        let input = validate(&json!({"title": "A", "isVisible": "false"}), ValidationMode::Create)
            .unwrap();
        assert_eq!(input.is_visible, Some(false));

        let errors = details(validate(
            &json!({"title": "A", "isVisible": "sometimes"}),
            ValidationMode::Create,
        ));
        assert_eq!(errors, vec!["isVisible must be a boolean"]);
    }

    // -----------------------------------------------------------------------
    // Update mode
    // -----------------------------------------------------------------------

    #[test]
    fn test_update_accepts_empty_patch() {
        let input = validate(
            &json!({}),
            ValidationMode::Update {
                current: SectionType::Card,
            },
        )
        .unwrap();
        assert_eq!(input, SectionInput::default());
    }

    #[test]
    fn test_update_same_type_checks_only_supplied_fields() {
        let input = validate(
            &json!({"cardButtonLink": "/contact"}),
            ValidationMode::Update {
                current: SectionType::Card,
            },
        )
        .unwrap();
        assert_eq!(input.payload["cardButtonLink"], "/contact");
        assert!(!input.payload.contains_key("cardButtonText"));

        let errors = details(validate(
            &json!({"cardButtonText": ""}),
            ValidationMode::Update {
                current: SectionType::Card,
            },
        ));
        assert_eq!(errors, vec!["cardButtonText is required for card sections"]);
    }

    #[test]
    fn test_update_switching_type_enforces_new_requirements() {
        let errors = details(validate(
            &json!({"type": "video"}),
            ValidationMode::Update {
                current: SectionType::Text,
            },
        ));
        assert_eq!(errors, vec!["videoUrl is required for video sections"]);
    }

    #[test]
    fn test_update_rejects_blank_title() {
        let errors = details(validate(
            &json!({"title": "   "}),
            ValidationMode::Update {
                current: SectionType::Text,
            },
        ));
        assert_eq!(errors, vec!["title must be a non-empty string"]);
    }

    #[test]
    fn test_structured_content_is_kept_as_json_text() {
        let input = validate(
            &json!({"title": "Facts", "type": "key-value", "content": {"Tyres": "1.5bn"}}),
            ValidationMode::Create,
        )
        .unwrap();
        assert_matches!(input.content.as_deref(), Some(r#"{"Tyres":"1.5bn"}"#));
    }
}
