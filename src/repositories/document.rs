//! Document record repository, including bulk ownership reassignment.

use std::str::FromStr;

use serde_json::Value as JsonValue;
use tokio_postgres::Row;

use crate::context::Context;
use crate::db::{Db, SqlExecutor};
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{generate_ulid, DocumentRecord, DocumentStatus, NewDocumentRecord};

const DOCUMENT_COLUMNS: &str =
    "id, entity_id, template_id, status, payload, created_at, updated_at";

/// Repository for document records.
#[derive(FromContext, Clone)]
pub struct DocumentRepository {
    db: Db,
}

impl DocumentRepository {
    /// Create a new document record in the pending state.
    pub async fn create(&self, new: NewDocumentRecord) -> Result<DocumentRecord, AppError> {
        let id = generate_ulid();
        let payload = JsonValue::Object(new.payload);

        let row = self
            .db
            .query_opt(
                &format!(
                    "INSERT INTO document_records (id, entity_id, template_id, payload)
                     VALUES ($1, $2, $3, $4)
                     RETURNING {DOCUMENT_COLUMNS}"
                ),
                &[&id, &new.entity_id, &new.template_id, &payload],
            )
            .await?
            .ok_or_else(|| AppError::Internal("INSERT .. RETURNING produced no row".into()))?;

        Self::row_to_document(&row)
    }

    /// Document records owned by an entity, newest first.
    pub async fn find_by_entity(&self, entity_id: &str) -> Result<Vec<DocumentRecord>, AppError> {
        let rows = self
            .db
            .query(
                &format!(
                    "SELECT {DOCUMENT_COLUMNS} FROM document_records
                     WHERE entity_id = $1 ORDER BY created_at DESC"
                ),
                &[&entity_id],
            )
            .await?;

        rows.iter().map(Self::row_to_document).collect()
    }

    /// Repoint every document owned by one entity at another.
    pub async fn reassign_owner(&self, from: &str, to: &str) -> Result<u64, AppError> {
        Self::reassign_owner_in(&self.db, from, to).await
    }

    // ------------------------------------------------------------------
    // Executor-scoped operations (shared with the merge transaction)
    // ------------------------------------------------------------------

    /// Bulk ownership reassignment on the given executor. Returns the
    /// number of documents repointed.
    pub async fn reassign_owner_in(
        db: &dyn SqlExecutor,
        from: &str,
        to: &str,
    ) -> Result<u64, AppError> {
        db.execute(
            "UPDATE document_records SET entity_id = $1, updated_at = now() WHERE entity_id = $2",
            &[&to, &from],
        )
        .await
    }

    /// Convert a row to a DocumentRecord.
    fn row_to_document(row: &Row) -> Result<DocumentRecord, AppError> {
        let status: String = row.try_get("status")?;
        let payload: JsonValue = row.try_get("payload")?;

        Ok(DocumentRecord {
            id: row.try_get("id")?,
            entity_id: row.try_get("entity_id")?,
            template_id: row.try_get("template_id")?,
            status: DocumentStatus::from_str(&status).map_err(AppError::Internal)?,
            payload: payload.as_object().cloned().unwrap_or_default(),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
