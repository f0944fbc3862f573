//! Merge log repository. Insert and read only - logs are immutable.

use serde_json::Value as JsonValue;
use tokio_postgres::Row;

use crate::context::Context;
use crate::db::{Db, SqlExecutor};
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{generate_ulid, MergeLog, NewMergeLog};

const MERGE_LOG_COLUMNS: &str = "id, primary_entity_id, duplicate_entity_id, merged_fields, \
                                 primary_snapshot, duplicate_snapshot, note, created_at";

/// Repository for the merge audit log.
#[derive(FromContext, Clone)]
pub struct MergeLogRepository {
    db: Db,
}

impl MergeLogRepository {
    /// Merge logs naming an entity on either side, newest first.
    ///
    /// For a deleted duplicate this is the only remaining record of it.
    pub async fn find_for_entity(&self, entity_id: &str) -> Result<Vec<MergeLog>, AppError> {
        let rows = self
            .db
            .query(
                &format!(
                    "SELECT {MERGE_LOG_COLUMNS} FROM entity_merge_logs
                     WHERE primary_entity_id = $1 OR duplicate_entity_id = $1
                     ORDER BY created_at DESC"
                ),
                &[&entity_id],
            )
            .await?;

        rows.iter().map(Self::row_to_log).collect()
    }

    // ------------------------------------------------------------------
    // Executor-scoped operations (shared with the merge transaction)
    // ------------------------------------------------------------------

    /// Insert a new merge log row on the given executor.
    pub async fn insert_in(db: &dyn SqlExecutor, new: NewMergeLog) -> Result<MergeLog, AppError> {
        let id = generate_ulid();
        let merged_fields = JsonValue::Object(new.merged_fields);

        let row = db
            .query_opt(
                &format!(
                    "INSERT INTO entity_merge_logs
                         (id, primary_entity_id, duplicate_entity_id, merged_fields,
                          primary_snapshot, duplicate_snapshot, note)
                     VALUES ($1, $2, $3, $4, $5, $6, $7)
                     RETURNING {MERGE_LOG_COLUMNS}"
                ),
                &[
                    &id,
                    &new.primary_entity_id,
                    &new.duplicate_entity_id,
                    &merged_fields,
                    &new.primary_snapshot,
                    &new.duplicate_snapshot,
                    &new.note,
                ],
            )
            .await?
            .ok_or_else(|| AppError::Internal("INSERT .. RETURNING produced no row".into()))?;

        Self::row_to_log(&row)
    }

    /// Convert a row to a MergeLog.
    fn row_to_log(row: &Row) -> Result<MergeLog, AppError> {
        let merged_fields: JsonValue = row.try_get("merged_fields")?;

        Ok(MergeLog {
            id: row.try_get("id")?,
            primary_entity_id: row.try_get("primary_entity_id")?,
            duplicate_entity_id: row.try_get("duplicate_entity_id")?,
            merged_fields: merged_fields.as_object().cloned().unwrap_or_default(),
            primary_snapshot: row.try_get("primary_snapshot")?,
            duplicate_snapshot: row.try_get("duplicate_snapshot")?,
            note: row.try_get("note")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
