//! Repository for the `excel_files` table.

use entyre_core::types::DbId;
use sqlx::PgPool;

use crate::models::excel_file::{CreateExcelFile, ExcelFile, ExcelFileFilter, UpdateExcelFile};

/// Column list for excel_files queries.
const COLUMNS: &str = "id, title, description, category, file_url, file_public_id, \
    original_name, file_size, mime_type, tags, metadata, scenario_type, scope_type, \
    is_active, created_at, updated_at";

pub struct ExcelFileRepo;

impl ExcelFileRepo {
    /// List datasets newest first, applying any supplied filters.
    pub async fn list(pool: &PgPool, filter: &ExcelFileFilter) -> Result<Vec<ExcelFile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM excel_files
             WHERE ($1::text IS NULL OR category = $1)
               AND ($2::bool IS NULL OR is_active = $2)
               AND ($3::text IS NULL OR scenario_type = $3)
               AND ($4::text IS NULL OR scope_type = $4)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ExcelFile>(&query)
            .bind(&filter.category)
            .bind(filter.is_active)
            .bind(&filter.scenario_type)
            .bind(&filter.scope_type)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ExcelFile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM excel_files WHERE id = $1");
        sqlx::query_as::<_, ExcelFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &CreateExcelFile) -> Result<ExcelFile, sqlx::Error> {
        let query = format!(
            "INSERT INTO excel_files
                (title, description, category, file_url, file_public_id, original_name,
                 file_size, mime_type, tags, metadata, scenario_type, scope_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExcelFile>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.file_url)
            .bind(&input.file_public_id)
            .bind(&input.original_name)
            .bind(input.file_size)
            .bind(&input.mime_type)
            .bind(&input.tags)
            .bind(&input.metadata)
            .bind(&input.scenario_type)
            .bind(&input.scope_type)
            .fetch_one(pool)
            .await
    }

    /// Apply a partial update. When `input.file` is set, every file column
    /// (including the scenario classification) is replaced, even with NULL.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateExcelFile,
    ) -> Result<Option<ExcelFile>, sqlx::Error> {
        let query = format!(
            "UPDATE excel_files SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                tags = COALESCE($5, tags),
                is_active = COALESCE($6, is_active),
                file_url = CASE WHEN $7 THEN $8 ELSE file_url END,
                file_public_id = CASE WHEN $7 THEN $9 ELSE file_public_id END,
                original_name = CASE WHEN $7 THEN $10 ELSE original_name END,
                file_size = CASE WHEN $7 THEN $11 ELSE file_size END,
                mime_type = CASE WHEN $7 THEN $12 ELSE mime_type END,
                metadata = CASE WHEN $7 THEN $13 ELSE metadata END,
                scenario_type = CASE WHEN $7 THEN $14 ELSE scenario_type END,
                scope_type = CASE WHEN $7 THEN $15 ELSE scope_type END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let file = input.file.as_ref();
        sqlx::query_as::<_, ExcelFile>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.tags)
            .bind(input.is_active)
            .bind(file.is_some())
            .bind(file.map(|f| f.file_url.as_str()))
            .bind(file.map(|f| f.file_public_id.as_str()))
            .bind(file.map(|f| f.original_name.as_str()))
            .bind(file.map(|f| f.file_size))
            .bind(file.and_then(|f| f.mime_type.as_deref()))
            .bind(file.map(|f| &f.metadata))
            .bind(file.and_then(|f| f.scenario_type.as_deref()))
            .bind(file.and_then(|f| f.scope_type.as_deref()))
            .fetch_optional(pool)
            .await
    }

    /// Delete a dataset, returning the removed row so its file can be
    /// released.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<ExcelFile>, sqlx::Error> {
        let query = format!("DELETE FROM excel_files WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, ExcelFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Flip `is_active`, returning the updated row.
    pub async fn toggle_active(pool: &PgPool, id: DbId) -> Result<Option<ExcelFile>, sqlx::Error> {
        let query = format!(
            "UPDATE excel_files SET is_active = NOT is_active WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExcelFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Distinct categories in use, alphabetically.
    pub async fn distinct_categories(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT DISTINCT category FROM excel_files ORDER BY category")
            .fetch_all(pool)
            .await
    }

    /// Active datasets that carry a scenario classification.
    pub async fn list_active_scenarios(pool: &PgPool) -> Result<Vec<ExcelFile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM excel_files
             WHERE is_active AND scenario_type IS NOT NULL
             ORDER BY scenario_type, scope_type NULLS FIRST, id"
        );
        sqlx::query_as::<_, ExcelFile>(&query).fetch_all(pool).await
    }
}
