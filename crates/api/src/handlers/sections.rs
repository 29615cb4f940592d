//! Handlers for the `/sections` resource (home-page content blocks).
//!
//! Every write goes through the same pipeline: [`section::validate`] collects
//! all rule violations, [`section::normalize`] produces the canonical
//! document, and [`SectionRepo`] persists it. The unique index on
//! `section_index` is the only authority on duplicates.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use entyre_core::coerce;
use entyre_core::error::CoreError;
use entyre_core::section::{self, reorder, Section, SectionType, ValidationMode};
use entyre_core::types::DbId;
use entyre_db::models::section::{DeletedSection, ReorderOutcome, SectionFilter};
use entyre_db::repositories::SectionRepo;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppResult;
use crate::extract::{AppJson, IdPath};
use crate::middleware::rbac::RequireEditor;
use crate::state::AppState;

/// Upper bound on `?limit=`.
const MAX_LIST_LIMIT: i64 = 1000;

/// Query parameters for `GET /sections`. Kept as raw strings so bad values
/// are reported with the standard validation body.
#[derive(Debug, Default, Deserialize)]
pub struct SectionListParams {
    #[serde(rename = "type")]
    pub section_type: Option<String>,
    pub visible: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSectionResponse {
    pub message: &'static str,
    pub deleted_section: DeletedSection,
}

/// GET /api/v1/sections?type=&visible=&limit=
pub async fn list_sections(
    State(state): State<AppState>,
    Query(params): Query<SectionListParams>,
) -> AppResult<Json<Vec<Section>>> {
    let filter = parse_filter(&params)?;
    let sections = SectionRepo::list(&state.pool, &filter).await?;
    Ok(Json(sections))
}

/// GET /api/v1/sections/{id}
pub async fn get_section(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<Section>> {
    let section = find_section(&state, id).await?;
    Ok(Json(section))
}

/// POST /api/v1/sections
///
/// Returns 201 with the canonical document, 400 with itemized `details`, or
/// 409 when `sectionIndex` is taken.
pub async fn create_section(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    AppJson(body): AppJson<Value>,
) -> AppResult<(StatusCode, Json<Section>)> {
    let input = section::validate(&body, ValidationMode::Create)?;
    let canonical = section::normalize(input, None)?;
    let created = SectionRepo::insert(&state.pool, &canonical).await?;

    tracing::info!(
        section_id = created.id,
        section_index = created.section_index,
        section_type = %created.section_type(),
        user_id = user.user_id,
        "Section created",
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/sections/{id}
///
/// Partial update. Switching `type` discards the old payload; sub-objects
/// that are supplied replace the stored ones.
pub async fn update_section(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    IdPath(id): IdPath,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<Section>> {
    let existing = find_section(&state, id).await?;
    let input = section::validate(
        &body,
        ValidationMode::Update {
            current: existing.section_type(),
        },
    )?;
    let canonical = section::normalize(input, Some(&existing))?;

    let updated = SectionRepo::update(&state.pool, id, &canonical)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Section",
            id,
        })?;

    tracing::info!(
        section_id = id,
        section_type = %updated.section_type(),
        user_id = user.user_id,
        "Section updated",
    );
    Ok(Json(updated))
}

/// DELETE /api/v1/sections/{id}
pub async fn delete_section(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    IdPath(id): IdPath,
) -> AppResult<Json<DeleteSectionResponse>> {
    let deleted = SectionRepo::delete(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Section",
            id,
        })?;

    tracing::info!(section_id = id, user_id = user.user_id, "Section deleted");
    Ok(Json(DeleteSectionResponse {
        message: "Section deleted successfully",
        deleted_section: deleted,
    }))
}

/// PATCH /api/v1/sections/reorder
///
/// Body: `{ "orderedIds": [id, ...] }` naming every live section once.
/// Indices become `1..=N` in the given order.
pub async fn reorder_sections(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<Vec<Section>>> {
    let ordered_ids = parse_ordered_ids(&body)?;
    reorder::validate_order(&ordered_ids)?;

    match SectionRepo::reorder(&state.pool, &ordered_ids).await? {
        ReorderOutcome::Applied(sections) => {
            tracing::info!(count = sections.len(), user_id = user.user_id, "Sections reordered");
            Ok(Json(sections))
        }
        ReorderOutcome::Rejected(messages) => Err(CoreError::InvalidFields(messages).into()),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_section(state: &AppState, id: DbId) -> AppResult<Section> {
    SectionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Section",
                id,
            }
            .into()
        })
}

fn parse_filter(params: &SectionListParams) -> Result<SectionFilter, CoreError> {
    let mut errors = Vec::new();
    let mut filter = SectionFilter::default();

    if let Some(raw) = params.section_type.as_deref().filter(|s| !s.is_empty()) {
        match SectionType::from_str_value(raw) {
            Ok(ty) => filter.section_type = Some(ty),
            Err(msg) => errors.push(msg),
        }
    }
    if let Some(raw) = params.visible.as_deref().filter(|s| !s.is_empty()) {
        match coerce::loose_bool(&Value::String(raw.to_string())) {
            Some(visible) => filter.visible = Some(visible),
            None => errors.push(format!("visible must be true or false, got '{raw}'")),
        }
    }
    if let Some(raw) = params.limit.as_deref().filter(|s| !s.is_empty()) {
        match raw.trim().parse::<i64>() {
            Ok(limit) if limit > 0 => filter.limit = Some(limit.min(MAX_LIST_LIMIT)),
            _ => errors.push(format!("limit must be a positive integer, got '{raw}'")),
        }
    }

    if errors.is_empty() {
        Ok(filter)
    } else {
        Err(CoreError::InvalidFields(errors))
    }
}

fn parse_ordered_ids(body: &Value) -> Result<Vec<DbId>, CoreError> {
    let Some(items) = body.get("orderedIds").and_then(Value::as_array) else {
        return Err(CoreError::InvalidFields(vec![
            "orderedIds must be an array of section ids".to_string(),
        ]));
    };
    if items.is_empty() {
        return Err(CoreError::InvalidFields(vec![
            "orderedIds must not be empty".to_string(),
        ]));
    }

    let mut ids = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (i, item) in items.iter().enumerate() {
        match coerce::loose_i64(item) {
            Some(id) if id > 0 => ids.push(id),
            _ => errors.push(format!("orderedIds[{i}] is not a valid section id")),
        }
    }
    if errors.is_empty() {
        Ok(ids)
    } else {
        Err(CoreError::InvalidFields(errors))
    }
}
