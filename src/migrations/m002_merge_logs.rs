//! Dedup support: the merge audit log and a normalized phone column.

use futures::future::BoxFuture;

use crate::db::SqlExecutor;
use crate::error::AppError;
use crate::migrations::Migration;

pub struct M002MergeLogs;

impl Migration for M002MergeLogs {
    fn id(&self) -> &'static str {
        "m002_merge_logs"
    }

    fn version(&self) -> u32 {
        2
    }

    fn description(&self) -> &'static str {
        "entity_merge_logs audit table, normalized_phone column"
    }

    fn up<'a>(&'a self, db: &'a dyn SqlExecutor) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(async move {
            // The entity-id columns deliberately carry no foreign keys:
            // the duplicate row is deleted in the same transaction that
            // writes the log, and the log must outlive it.
            db.batch(
                r#"
                CREATE TABLE IF NOT EXISTS entity_merge_logs (
                    id TEXT PRIMARY KEY,
                    primary_entity_id TEXT NOT NULL,
                    duplicate_entity_id TEXT NOT NULL,
                    merged_fields JSONB NOT NULL DEFAULT '{}'::jsonb,
                    primary_snapshot JSONB NOT NULL,
                    duplicate_snapshot JSONB NOT NULL,
                    note TEXT,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
                );

                CREATE INDEX IF NOT EXISTS entity_merge_logs_primary_idx
                    ON entity_merge_logs (primary_entity_id);
                CREATE INDEX IF NOT EXISTS entity_merge_logs_duplicate_idx
                    ON entity_merge_logs (duplicate_entity_id);
                CREATE INDEX IF NOT EXISTS entity_merge_logs_created_idx
                    ON entity_merge_logs (created_at);

                ALTER TABLE entities
                    ADD COLUMN IF NOT EXISTS normalized_phone TEXT GENERATED ALWAYS AS (
                        regexp_replace(coalesce(phone, ''), '[^0-9]', '', 'g')
                    ) STORED;

                CREATE INDEX IF NOT EXISTS entities_normalized_phone_idx
                    ON entities (normalized_phone) WHERE normalized_phone <> '';
                "#,
            )
            .await
        })
    }
}
