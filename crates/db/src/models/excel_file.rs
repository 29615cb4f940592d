//! Uploaded Excel datasets.

use entyre_core::excel::ScenarioInfo;
use entyre_core::types::{DbId, Timestamp};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

/// A row from the `excel_files` table.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExcelFile {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub file_url: String,
    pub file_public_id: String,
    pub original_name: String,
    pub file_size: i64,
    pub mime_type: Option<String>,
    pub tags: Vec<String>,
    pub metadata: Value,
    pub scenario_type: Option<String>,
    pub scope_type: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ExcelFile {
    pub fn scenario(&self) -> ScenarioInfo {
        ScenarioInfo {
            scenario_type: self.scenario_type.clone(),
            scope_type: self.scope_type.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateExcelFile {
    pub title: String,
    pub description: String,
    pub category: String,
    pub file_url: String,
    pub file_public_id: String,
    pub original_name: String,
    pub file_size: i64,
    pub mime_type: Option<String>,
    pub tags: Vec<String>,
    pub metadata: Value,
    pub scenario_type: Option<String>,
    pub scope_type: Option<String>,
}

/// Partial update; `None` leaves the column unchanged. The file columns
/// are replaced together when a new workbook is uploaded.
#[derive(Debug, Clone, Default)]
pub struct UpdateExcelFile {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub file: Option<ReplacementFile>,
}

/// New file columns after a workbook replacement.
#[derive(Debug, Clone)]
pub struct ReplacementFile {
    pub file_url: String,
    pub file_public_id: String,
    pub original_name: String,
    pub file_size: i64,
    pub mime_type: Option<String>,
    pub metadata: Value,
    pub scenario_type: Option<String>,
    pub scope_type: Option<String>,
}

/// Filters for listing datasets. `None` means "don't filter".
#[derive(Debug, Clone, Default)]
pub struct ExcelFileFilter {
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub scenario_type: Option<String>,
    pub scope_type: Option<String>,
}
