//! Repository for the `home_sections` table.
//!
//! Uniqueness of `section_index` is enforced by `uq_home_sections_section_index`.
//! Index assignment and reordering take a transaction-scoped advisory lock
//! so they never interleave with each other.

use entyre_core::error::CoreError;
use entyre_core::section::reorder;
use entyre_core::section::{CanonicalSection, Section};
use entyre_core::types::DbId;
use serde::Serialize;
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::section::{DeletedSection, ReorderOutcome, SectionFilter, SectionRow};

/// Column list for home_sections queries.
const COLUMNS: &str = "id, section_index, title, content, section_type, payload, layout, \
    typography, animation, display_conditions, seo, is_visible, custom_css, custom_js, \
    created_at, updated_at";

/// Advisory lock key serializing index assignment and reorders.
const SECTIONS_LOCK_KEY: i64 = 0x0E17_5EC7;

/// Provides the ordered section store.
pub struct SectionRepo;

impl SectionRepo {
    /// List sections ordered by `section_index` ascending.
    pub async fn list(pool: &PgPool, filter: &SectionFilter) -> Result<Vec<Section>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM home_sections
             WHERE ($1::text IS NULL OR section_type = $1)
               AND ($2::bool IS NULL OR is_visible = $2)
             ORDER BY section_index ASC
             LIMIT $3"
        );
        let rows = sqlx::query_as::<_, SectionRow>(&query)
            .bind(filter.section_type.map(|t| t.as_str()))
            .bind(filter.visible)
            .bind(filter.limit)
            .fetch_all(pool)
            .await?;
        rows.into_iter().map(decode).collect()
    }

    /// Find a section by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Section>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM home_sections WHERE id = $1");
        sqlx::query_as::<_, SectionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(decode)
            .transpose()
    }

    /// Insert a normalized section. When `section_index` is `None` the next
    /// free index (`max + 1`, or `0` for an empty table) is assigned.
    ///
    /// A caller-supplied index that is already taken fails with the
    /// `uq_home_sections_section_index` unique violation.
    pub async fn insert(pool: &PgPool, section: &CanonicalSection) -> Result<Section, sqlx::Error> {
        let mut tx = pool.begin().await?;
        lock_sections(&mut tx).await?;

        let section_index = match section.section_index {
            Some(index) => index,
            None => next_index(&mut tx).await?,
        };

        let query = format!(
            "INSERT INTO home_sections
                (section_index, title, content, section_type, payload, layout, typography,
                 animation, display_conditions, seo, is_visible, custom_css, custom_js,
                 created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, SectionRow>(&query)
            .bind(section_index)
            .bind(&section.title)
            .bind(&section.content)
            .bind(section.payload.section_type().as_str())
            .bind(payload_json(section)?)
            .bind(to_json(&section.layout)?)
            .bind(to_json(&section.typography)?)
            .bind(to_json(&section.animation)?)
            .bind(to_json(&section.display_conditions)?)
            .bind(to_json(&section.seo)?)
            .bind(section.is_visible)
            .bind(&section.custom_css)
            .bind(&section.custom_js)
            .bind(section.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        decode(row)
    }

    /// Replace every stored field of a section with its normalized form.
    /// `updated_at` never moves backwards. Returns `None` if the ID is unknown.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        section: &CanonicalSection,
    ) -> Result<Option<Section>, sqlx::Error> {
        let query = format!(
            "UPDATE home_sections SET
                section_index = COALESCE($2, section_index),
                title = $3,
                content = $4,
                section_type = $5,
                payload = $6,
                layout = $7,
                typography = $8,
                animation = $9,
                display_conditions = $10,
                seo = $11,
                is_visible = $12,
                custom_css = $13,
                custom_js = $14,
                updated_at = GREATEST($15, updated_at)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SectionRow>(&query)
            .bind(id)
            .bind(section.section_index)
            .bind(&section.title)
            .bind(&section.content)
            .bind(section.payload.section_type().as_str())
            .bind(payload_json(section)?)
            .bind(to_json(&section.layout)?)
            .bind(to_json(&section.typography)?)
            .bind(to_json(&section.animation)?)
            .bind(to_json(&section.display_conditions)?)
            .bind(to_json(&section.seo)?)
            .bind(section.is_visible)
            .bind(&section.custom_css)
            .bind(&section.custom_js)
            .bind(section.updated_at)
            .fetch_optional(pool)
            .await?
            .map(decode)
            .transpose()
    }

    /// Delete a section, returning its summary. `None` if the ID is unknown.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<DeletedSection>, sqlx::Error> {
        sqlx::query_as::<_, DeletedSection>(
            "DELETE FROM home_sections WHERE id = $1 RETURNING id, section_index, title",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Reassign indices `1..=N` in the given order.
    ///
    /// `ordered_ids` must name every live section exactly once (duplicates
    /// should already be rejected by the caller). Both phases of the shuffle
    /// run in one transaction under the sections lock, so outside readers
    /// only ever observe the old or the new ordering.
    pub async fn reorder(pool: &PgPool, ordered_ids: &[DbId]) -> Result<ReorderOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;
        lock_sections(&mut tx).await?;

        let live: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM home_sections ORDER BY id FOR UPDATE")
                .fetch_all(&mut *tx)
                .await?;
        if let Err(err) = reorder::check_complete(ordered_ids, &live) {
            tx.rollback().await?;
            let messages = match err {
                CoreError::InvalidFields(messages) => messages,
                other => vec![other.to_string()],
            };
            return Ok(ReorderOutcome::Rejected(messages));
        }

        let current_max: Option<i32> = sqlx::query_scalar("SELECT MAX(section_index) FROM home_sections")
            .fetch_one(&mut *tx)
            .await?;
        let plan = reorder::plan(current_max.unwrap_or(0), ordered_ids);

        for (id, index) in plan.staging.iter().chain(&plan.final_indices) {
            sqlx::query("UPDATE home_sections SET section_index = $2 WHERE id = $1")
                .bind(id)
                .bind(index)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("UPDATE home_sections SET updated_at = GREATEST(NOW(), updated_at)")
            .execute(&mut *tx)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM home_sections ORDER BY section_index ASC");
        let rows = sqlx::query_as::<_, SectionRow>(&query)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        let sections = rows.into_iter().map(decode).collect::<Result<Vec<_>, _>>()?;
        tracing::info!(count = sections.len(), "Sections reordered");
        Ok(ReorderOutcome::Applied(sections))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn lock_sections(tx: &mut Transaction<'_, Postgres>) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SECTIONS_LOCK_KEY)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn next_index(tx: &mut Transaction<'_, Postgres>) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar("SELECT COALESCE(MAX(section_index) + 1, 0) FROM home_sections")
        .fetch_one(&mut **tx)
        .await
}

fn decode(row: SectionRow) -> Result<Section, sqlx::Error> {
    let id = row.id;
    row.into_section().map_err(|e| {
        tracing::error!(section_id = id, error = %e, "Stored section failed to decode");
        sqlx::Error::Decode(Box::new(e))
    })
}

fn payload_json(section: &CanonicalSection) -> Result<Value, sqlx::Error> {
    section
        .payload
        .to_fields()
        .map(Value::Object)
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, sqlx::Error> {
    serde_json::to_value(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}
