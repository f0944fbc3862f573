//! Initial schema: entities, categories, links, and document records.

use futures::future::BoxFuture;

use crate::db::SqlExecutor;
use crate::error::AppError;
use crate::migrations::Migration;

pub struct M001Schema;

impl Migration for M001Schema {
    fn id(&self) -> &'static str {
        "m001_schema"
    }

    fn version(&self) -> u32 {
        1
    }

    fn description(&self) -> &'static str {
        "entities, categories, entity_categories, document_records"
    }

    fn up<'a>(&'a self, db: &'a dyn SqlExecutor) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(async move {
            db.batch(
                r#"
                CREATE TABLE IF NOT EXISTS entities (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE,
                    phone TEXT,
                    external_reference TEXT,
                    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
                );

                CREATE TABLE IF NOT EXISTS categories (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL UNIQUE,
                    description TEXT,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
                );

                CREATE TABLE IF NOT EXISTS entity_categories (
                    entity_id TEXT NOT NULL REFERENCES entities (id) ON DELETE CASCADE,
                    category_id TEXT NOT NULL REFERENCES categories (id) ON DELETE CASCADE,
                    PRIMARY KEY (entity_id, category_id)
                );

                CREATE INDEX IF NOT EXISTS entity_categories_category_idx
                    ON entity_categories (category_id);

                CREATE TABLE IF NOT EXISTS document_records (
                    id TEXT PRIMARY KEY,
                    entity_id TEXT NOT NULL REFERENCES entities (id),
                    template_id TEXT,
                    status TEXT NOT NULL DEFAULT 'pending'
                        CHECK (status IN ('pending', 'processing', 'completed', 'failed')),
                    payload JSONB NOT NULL DEFAULT '{}'::jsonb,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
                );

                CREATE INDEX IF NOT EXISTS document_records_entity_idx
                    ON document_records (entity_id);
                "#,
            )
            .await
        })
    }
}
