//! Handlers for the `/excel-files` resource: uploaded workbooks used as
//! chart datasets.
//!
//! Every upload is inspected (sheet names, header cells, row count) and
//! classified by file name into a scenario and scope before it is stored.
//! Inspection never fails the request; an unreadable workbook is stored
//! with `metadata.error` set.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use entyre_core::coerce;
use entyre_core::error::CoreError;
use entyre_core::excel::{self, ExcelCategory, ScenarioInfo};
use entyre_core::spreadsheet::{self, WorkbookMetadata};
use entyre_core::types::DbId;
use entyre_db::models::excel_file::{
    CreateExcelFile, ExcelFile, ExcelFileFilter, ReplacementFile, UpdateExcelFile,
};
use entyre_db::repositories::ExcelFileRepo;
use entyre_media::{MediaKind, MediaUpload, StoredMedia};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::extract::IdPath;
use crate::middleware::rbac::RequireEditor;
use crate::state::AppState;
use crate::upload::{self, MultipartForm, UploadedFile};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcelListParams {
    pub category: Option<String>,
    pub active: Option<String>,
    pub scenario_type: Option<String>,
    pub scope_type: Option<String>,
}

/// A dataset row plus its combined scenario identifier.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcelFileResponse {
    #[serde(flatten)]
    pub file: ExcelFile,
    pub scenario_id: Option<String>,
}

impl From<ExcelFile> for ExcelFileResponse {
    fn from(file: ExcelFile) -> Self {
        let scenario_id = file.scenario().scenario_id();
        Self { file, scenario_id }
    }
}

/// What a chart needs to fetch and label a dataset.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcelContentResponse {
    pub file_url: String,
    pub metadata: Value,
    pub title: String,
    pub category: String,
    pub scenario_id: Option<String>,
    pub scenario_type: Option<String>,
    pub scope_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioEntry {
    pub id: String,
    pub scenario_type: Option<String>,
    pub scope_type: Option<String>,
    pub title: String,
    pub original_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleActiveResponse {
    pub message: &'static str,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteExcelFileResponse {
    pub message: &'static str,
    pub file: ExcelFile,
}

/// GET /api/v1/excel-files?category=&active=&scenarioType=&scopeType=
pub async fn list_excel_files(
    State(state): State<AppState>,
    Query(params): Query<ExcelListParams>,
) -> AppResult<Json<Vec<ExcelFileResponse>>> {
    let filter = parse_filter(params)?;
    let files = ExcelFileRepo::list(&state.pool, &filter).await?;
    Ok(Json(files.into_iter().map(ExcelFileResponse::from).collect()))
}

/// GET /api/v1/excel-files/{id}
pub async fn get_excel_file(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ExcelFileResponse>> {
    Ok(Json(find_excel_file(&state, id).await?.into()))
}

/// GET /api/v1/excel-files/{id}/content
pub async fn get_excel_content(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ExcelContentResponse>> {
    let file = find_excel_file(&state, id).await?;
    let scenario = file.scenario();
    Ok(Json(ExcelContentResponse {
        file_url: file.file_url,
        metadata: file.metadata,
        title: file.title,
        category: file.category,
        scenario_id: scenario.scenario_id(),
        scenario_type: scenario.scenario_type,
        scope_type: scenario.scope_type,
    }))
}

/// GET /api/v1/excel-files/meta/categories
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(ExcelFileRepo::distinct_categories(&state.pool).await?))
}

/// GET /api/v1/excel-files/meta/scenarios
///
/// Active datasets that classified to a scenario.
pub async fn list_scenarios(State(state): State<AppState>) -> AppResult<Json<Vec<ScenarioEntry>>> {
    let files = ExcelFileRepo::list_active_scenarios(&state.pool).await?;
    let entries = files
        .into_iter()
        .filter_map(|file| {
            let scenario = file.scenario();
            let id = scenario.scenario_id()?;
            Some(ScenarioEntry {
                id,
                scenario_type: scenario.scenario_type,
                scope_type: scenario.scope_type,
                title: file.title,
                original_name: file.original_name,
            })
        })
        .collect();
    Ok(Json(entries))
}

/// POST /api/v1/excel-files (multipart: `file`, `title`, `description`, `category`, `tags`)
pub async fn create_excel_file(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ExcelFileResponse>)> {
    let mut form = MultipartForm::read(multipart).await?;

    let mut errors = Vec::new();
    let category = optional_category(&form, &mut errors);
    match form.file.as_ref() {
        Some(file) => check_workbook(file, &mut errors),
        None => errors.push("file is required".to_string()),
    }
    upload::ensure_valid(errors)?;

    let Some(file) = form.file.take() else {
        return Err(CoreError::InvalidFields(vec!["file is required".into()]).into());
    };
    let prepared = prepare_workbook(file).await?;

    let title = form
        .text("title")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| excel::file_stem(&prepared.original_name).to_string());

    let stored = store_workbook(&state, &prepared).await?;
    let input = CreateExcelFile {
        title,
        description: form.nullable_text("description").unwrap_or_default(),
        category: category.unwrap_or_default().as_str().to_string(),
        file_url: stored.url.clone(),
        file_public_id: stored.public_id.clone(),
        original_name: prepared.original_name,
        file_size: prepared.size,
        mime_type: prepared.content_type,
        tags: form.text("tags").map(coerce::split_list).unwrap_or_default(),
        metadata: prepared.metadata,
        scenario_type: prepared.scenario.scenario_type,
        scope_type: prepared.scenario.scope_type,
    };

    let created = upload::persist_or_discard(
        state.media.as_ref(),
        Some((stored.public_id.as_str(), MediaKind::Raw)),
        ExcelFileRepo::create(&state.pool, &input),
    )
    .await?;

    tracing::info!(
        excel_file_id = created.id,
        scenario_type = created.scenario_type.as_deref().unwrap_or("-"),
        scope_type = created.scope_type.as_deref().unwrap_or("-"),
        user_id = user.user_id,
        "Excel file uploaded",
    );
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// PUT /api/v1/excel-files/{id}
///
/// Text fields and `isActive` update in place. A new `file` is inspected
/// and classified again, and the previous object is destroyed once the
/// row points at the replacement.
pub async fn update_excel_file(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    IdPath(id): IdPath,
    multipart: Multipart,
) -> AppResult<Json<ExcelFileResponse>> {
    let existing = find_excel_file(&state, id).await?;
    let mut form = MultipartForm::read(multipart).await?;

    let mut errors = Vec::new();
    let mut input = UpdateExcelFile {
        title: form.non_blank("title", &mut errors),
        description: form.nullable_text("description"),
        category: optional_category(&form, &mut errors).map(|c| c.as_str().to_string()),
        tags: form.text("tags").map(coerce::split_list),
        is_active: form.flag("isActive", &mut errors),
        file: None,
    };
    if let Some(file) = form.file.as_ref() {
        check_workbook(file, &mut errors);
    }
    upload::ensure_valid(errors)?;

    let stored = match form.file.take() {
        Some(file) => {
            let prepared = prepare_workbook(file).await?;
            let stored = store_workbook(&state, &prepared).await?;
            input.file = Some(ReplacementFile {
                file_url: stored.url.clone(),
                file_public_id: stored.public_id.clone(),
                original_name: prepared.original_name,
                file_size: prepared.size,
                mime_type: prepared.content_type,
                metadata: prepared.metadata,
                scenario_type: prepared.scenario.scenario_type,
                scope_type: prepared.scenario.scope_type,
            });
            Some(stored)
        }
        None => None,
    };

    let updated = upload::update_or_discard(
        state.media.as_ref(),
        stored.as_ref().map(|s| (s.public_id.as_str(), MediaKind::Raw)),
        CoreError::NotFound {
            entity: "Excel file",
            id,
        },
        ExcelFileRepo::update(&state.pool, id, &input),
    )
    .await?;

    if stored.is_some() {
        upload::discard(
            state.media.as_ref(),
            &existing.file_public_id,
            MediaKind::Raw,
            "workbook replaced",
        )
        .await;
    }

    tracing::info!(
        excel_file_id = id,
        replaced_file = stored.is_some(),
        user_id = user.user_id,
        "Excel file updated",
    );
    Ok(Json(updated.into()))
}

/// DELETE /api/v1/excel-files/{id}
pub async fn delete_excel_file(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    IdPath(id): IdPath,
) -> AppResult<Json<DeleteExcelFileResponse>> {
    let file = ExcelFileRepo::delete(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Excel file",
            id,
        })?;

    upload::discard(
        state.media.as_ref(),
        &file.file_public_id,
        MediaKind::Raw,
        "excel file deleted",
    )
    .await;

    tracing::info!(excel_file_id = id, user_id = user.user_id, "Excel file deleted");
    Ok(Json(DeleteExcelFileResponse {
        message: "Excel file deleted successfully",
        file,
    }))
}

/// POST /api/v1/excel-files/{id}/toggle-active
pub async fn toggle_active(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    IdPath(id): IdPath,
) -> AppResult<Json<ToggleActiveResponse>> {
    let file = ExcelFileRepo::toggle_active(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Excel file",
            id,
        })?;

    tracing::info!(
        excel_file_id = id,
        is_active = file.is_active,
        user_id = user.user_id,
        "Excel file visibility toggled",
    );
    Ok(Json(ToggleActiveResponse {
        message: if file.is_active {
            "File activated successfully"
        } else {
            "File deactivated successfully"
        },
        is_active: file.is_active,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// An uploaded workbook after inspection, ready to store.
struct PreparedWorkbook {
    original_name: String,
    content_type: Option<String>,
    size: i64,
    bytes: Vec<u8>,
    metadata: Value,
    scenario: ScenarioInfo,
}

fn parse_filter(params: ExcelListParams) -> Result<ExcelFileFilter, CoreError> {
    let mut errors = Vec::new();

    let category = match non_empty(params.category) {
        Some(raw) => match ExcelCategory::from_str_value(&raw) {
            Ok(category) => Some(category.as_str().to_string()),
            Err(msg) => {
                errors.push(msg);
                None
            }
        },
        None => None,
    };

    let is_active = match non_empty(params.active) {
        Some(raw) => {
            let parsed = coerce::loose_bool(&Value::String(raw.clone()));
            if parsed.is_none() {
                errors.push(format!("active must be true or false, got '{raw}'"));
            }
            parsed
        }
        None => None,
    };

    upload::ensure_valid(errors)?;
    Ok(ExcelFileFilter {
        category,
        is_active,
        scenario_type: non_empty(params.scenario_type),
        scope_type: non_empty(params.scope_type),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn optional_category(form: &MultipartForm, errors: &mut Vec<String>) -> Option<ExcelCategory> {
    let raw = form.text("category").map(str::trim).filter(|s| !s.is_empty())?;
    match ExcelCategory::from_str_value(raw) {
        Ok(category) => Some(category),
        Err(msg) => {
            errors.push(msg);
            None
        }
    }
}

fn check_workbook(file: &UploadedFile, errors: &mut Vec<String>) {
    if !excel::is_allowed_upload(&file.file_name, file.content_type.as_deref()) {
        errors.push(format!(
            "Only Excel files are allowed ({})",
            excel::ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
}

/// Inspect and classify a workbook. Parsing runs on the blocking pool.
async fn prepare_workbook(file: UploadedFile) -> AppResult<PreparedWorkbook> {
    let (file, metadata): (UploadedFile, WorkbookMetadata) =
        tokio::task::spawn_blocking(move || {
            let metadata = spreadsheet::inspect(&file.bytes);
            (file, metadata)
        })
        .await
        .map_err(|e| AppError::InternalError(format!("Workbook inspection panicked: {e}")))?;

    if let Some(reason) = metadata.error.as_deref() {
        tracing::warn!(file_name = %file.file_name, %reason, "Workbook could not be inspected");
    }

    let metadata = serde_json::to_value(&metadata)
        .map_err(|e| AppError::InternalError(format!("Failed to encode workbook metadata: {e}")))?;
    let scenario = excel::classify_filename(&file.file_name);
    let size = file.size();

    Ok(PreparedWorkbook {
        original_name: file.file_name,
        content_type: file.content_type,
        size,
        bytes: file.bytes,
        metadata,
        scenario,
    })
}

async fn store_workbook(state: &AppState, prepared: &PreparedWorkbook) -> AppResult<StoredMedia> {
    let public_id = format!(
        "excel_{}_{}",
        chrono::Utc::now().timestamp_millis(),
        excel::file_stem(&prepared.original_name)
    );
    let stored = state
        .media
        .upload(MediaUpload {
            folder: excel::STORAGE_FOLDER.to_string(),
            file_name: prepared.original_name.clone(),
            content_type: prepared.content_type.clone(),
            bytes: prepared.bytes.clone(),
            kind: MediaKind::Raw,
            public_id: Some(public_id),
        })
        .await?;
    tracing::debug!(public_id = %stored.public_id, "Workbook stored");
    Ok(stored)
}

async fn find_excel_file(state: &AppState, id: DbId) -> AppResult<ExcelFile> {
    ExcelFileRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Excel file",
                id,
            }
            .into()
        })
}
